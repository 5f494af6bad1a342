//! H2ML: a macro-expansion engine for markup templates.
//!
//! Documents are well-formed tag/text/comment streams in which reserved
//! `@`-prefixed tags are compile-time directives rather than output markup,
//! and curly-brace regions embed expressions evaluated against a variable
//! environment:
//!
//! - `<@var x="1"/>` binds variables; values are expressions themselves.
//! - `{x*2}` substitutes an evaluated expression into text, attributes, or
//!   computed tag names. `\{x}` keeps the braces literal.
//! - `<@repeat count=3>...</@repeat>` unrolls its body, re-applying the
//!   variable assignments made inside it before each extra iteration.
//! - `<@if condition="{x==1}">...</@if>` suppresses its subtree when false.
//! - `<@template name="t">...</@template>` captures a definition without
//!   emitting it.
//!
//! ```
//! let options = h2ml::CompilerOptions::default();
//! let expansion =
//!     h2ml::compile(r#"<@var x="1"/><@repeat count=4><@var x="{x*2}"/>{x}</@repeat>"#, &options)
//!         .expect("well-formed document");
//! assert_eq!(expansion.document, "24816");
//! ```

pub use crate::diagnostics::{
    BufferSink, ConsoleSink, DiagnosticSink, Level, NullSink, Reporter, SharedSink,
};
pub use crate::engine::{compile, compile_with_sink};
pub use crate::errors::{ErrorKind, ErrorReporting, H2mlError, SourceContext};
pub use crate::expander::Expansion;
pub use crate::options::{CompilerOptions, UnknownDirectivePolicy};

pub mod cli;
pub mod diagnostics;
pub mod engine;
pub mod env;
pub mod errors;
pub mod eval;
pub mod events;
pub mod expander;
pub mod frames;
pub mod options;
pub mod subst;
