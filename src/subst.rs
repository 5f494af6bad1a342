//! Expression substitution.
//!
//! Scans a string for brace-delimited regions, evaluates each against the
//! variable environment, and splices the results in. Braces do not nest.
//! Backslashes immediately before the opening brace escape it: each pair of
//! backslashes collapses to one literal backslash, and a remaining odd
//! backslash keeps the braced region literal instead of evaluating it.
//! Evaluation failures are recoverable: the reporter logs them and the empty
//! string is spliced.
//!
//! A bare variable reference splices the stored string unchanged, so
//! `<@var id="007"/>{id}` keeps its leading zeros. Coercion to numbers
//! happens only inside composite expressions.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::diagnostics::Reporter;
use crate::env::VarEnv;
use crate::eval;

/// Any brace-delimited region plus the backslashes immediately preceding it.
static EXPRESSION_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\\*)\{([^{}]+)\}").expect("expression region pattern"));

/// Replaces every brace-delimited region in `input` with its evaluated form.
pub fn substitute(input: &str, env: &VarEnv, reporter: &Reporter) -> String {
    if !input.contains('{') {
        return input.to_string();
    }
    EXPRESSION_REGION
        .replace_all(input, |caps: &Captures| {
            let escapes = caps[1].len();
            let expression = &caps[2];
            reporter.trace(format!("match found: {{{expression}}}"));
            let kept = "\\".repeat(escapes / 2);
            if escapes % 2 == 1 {
                reporter.trace("match escaped");
                return format!("{kept}{{{expression}}}");
            }
            let trimmed = expression.trim();
            if is_identifier(trimmed) {
                if let Some(value) = env.get(trimmed) {
                    return format!("{kept}{value}");
                }
            }
            match eval::evaluate(expression, env) {
                Ok(value) => format!("{kept}{}", eval::to_output(&value)),
                Err(err) => {
                    reporter.error(format!("failed to evaluate {{{expression}}}: {err}"));
                    kept
                }
            }
        })
        .into_owned()
}

/// The expression when `input` is exactly one unescaped brace region,
/// surrounding whitespace aside. Directive attributes (`@if condition`) must
/// be a whole-value expression; anything else is `None`.
pub fn whole_expression(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    let caps = EXPRESSION_REGION.captures(trimmed)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 || whole.end() != trimmed.len() || !caps[1].is_empty() {
        return None;
    }
    caps.get(2).map(|m| m.as_str())
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
