//! Compiler configuration.
//!
//! Options shape diagnostics and a handful of policy points; they never
//! change the meaning of a well-formed document. All fields have defaults so
//! partial option files deserialize cleanly.

use serde::{Deserialize, Serialize};

/// What to do with a reserved-sigil tag the compiler does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownDirectivePolicy {
    /// Emit the tag literally, as ordinary markup.
    Passthrough,
    /// Remove the tag from the output (its content is kept).
    Drop,
}

impl Default for UnknownDirectivePolicy {
    fn default() -> Self {
        Self::Passthrough
    }
}

/// Options for one compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Emit non-fatal diagnostics.
    pub log_warnings: bool,
    /// Emit fatal and serious diagnostics.
    pub log_errors: bool,
    /// Emit trace-level diagnostics, including every substitution match.
    pub verbose: bool,
    /// Whether comments reach the output at all.
    pub preserve_comments: bool,
    /// Whether expression substitution runs inside preserved comments.
    pub evaluate_expressions_in_comments: bool,
    /// Policy for unrecognized `@`-prefixed tags.
    pub unknown_directives: UnknownDirectivePolicy,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            log_warnings: true,
            log_errors: true,
            verbose: false,
            preserve_comments: false,
            evaluate_expressions_in_comments: false,
            unknown_directives: UnknownDirectivePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_surface() {
        let options = CompilerOptions::default();
        assert!(options.log_warnings);
        assert!(options.log_errors);
        assert!(!options.verbose);
        assert!(!options.preserve_comments);
        assert!(!options.evaluate_expressions_in_comments);
        assert_eq!(
            options.unknown_directives,
            UnknownDirectivePolicy::Passthrough
        );
    }

    #[test]
    fn partial_json_fills_defaults() {
        let options: CompilerOptions =
            serde_json::from_str(r#"{"logWarnings":false,"unknownDirectives":"drop"}"#)
                .expect("partial options should deserialize");
        assert!(!options.log_warnings);
        assert!(options.log_errors);
        assert_eq!(options.unknown_directives, UnknownDirectivePolicy::Drop);
    }
}
