//! Command-line arguments and subcommands for the `h2ml` CLI.
//!
//! Uses `clap` with its derive feature for a declarative, type-safe argument
//! structure.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::options::{CompilerOptions, UnknownDirectivePolicy};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "h2ml",
    version,
    about = "A macro-expansion compiler for H2ML markup templates."
)]
pub struct H2mlArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand a document and print the result.
    Compile {
        /// The path to the H2ML document to compile.
        #[arg(required = true)]
        file: PathBuf,
        #[command(flatten)]
        flags: OptionFlags,
    },
    /// List the template definitions captured from a document.
    Templates {
        /// The path to the H2ML document to scan.
        #[arg(required = true)]
        file: PathBuf,
        #[command(flatten)]
        flags: OptionFlags,
    },
}

/// Compiler option flags shared by every subcommand. Flags override values
/// loaded from `--options`.
#[derive(Debug, Args)]
pub struct OptionFlags {
    /// Load compiler options from a JSON file.
    #[arg(long)]
    pub options: Option<PathBuf>,
    /// Emit trace-level diagnostics, including every substitution match.
    #[arg(long)]
    pub verbose: bool,
    /// Suppress non-fatal diagnostics.
    #[arg(long)]
    pub no_warnings: bool,
    /// Suppress error diagnostics.
    #[arg(long)]
    pub no_errors: bool,
    /// Keep comments in the output.
    #[arg(long)]
    pub preserve_comments: bool,
    /// Evaluate brace expressions inside preserved comments.
    #[arg(long)]
    pub evaluate_comment_expressions: bool,
    /// Drop unrecognized @-tags instead of passing them through.
    #[arg(long)]
    pub drop_unknown_directives: bool,
}

impl OptionFlags {
    pub fn apply(&self, options: &mut CompilerOptions) {
        if self.verbose {
            options.verbose = true;
        }
        if self.no_warnings {
            options.log_warnings = false;
        }
        if self.no_errors {
            options.log_errors = false;
        }
        if self.preserve_comments {
            options.preserve_comments = true;
        }
        if self.evaluate_comment_expressions {
            options.evaluate_expressions_in_comments = true;
        }
        if self.drop_unknown_directives {
            options.unknown_directives = UnknownDirectivePolicy::Drop;
        }
    }
}
