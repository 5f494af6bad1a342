//! Unified error type for fatal compilation failures.
//!
//! Only structural violations abort a compilation; everything else is routed
//! through the diagnostic sink and the pass continues. The single
//! [`H2mlError`] struct separates what went wrong ([`ErrorKind`]) from where
//! it happened ([`SourceInfo`]) and how to help ([`DiagnosticInfo`]).

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use thiserror::Error;

use crate::events::Span;

/// The document being compiled, kept for rendering labeled diagnostics.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_document(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::from_document("document", "")
    }
}

/// Structural violations that abort the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unmatched </{directive}> with no open {directive} of that kind")]
    UnmatchedDirectiveClose { directive: String },
    #[error("@template definitions cannot nest")]
    NestedTemplate,
}

impl ErrorKind {
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::UnmatchedDirectiveClose { .. } => "unmatched_close",
            Self::NestedTemplate => "nested_template",
        }
    }

    fn help(&self) -> Option<String> {
        match self {
            Self::UnmatchedDirectiveClose { directive } => Some(format!(
                "every </{directive}> must close the most recently opened <{directive}>"
            )),
            Self::NestedTemplate => {
                Some("close the enclosing @template before opening another".to_string())
            }
        }
    }
}

/// Where the failure happened.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// A fatal compilation failure.
#[derive(Debug)]
pub struct H2mlError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

impl fmt::Display for H2mlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for H2mlError {}

impl Diagnostic for H2mlError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(self.source_info.source.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(
            Some(self.kind.to_string()),
            self.source_info.primary_span,
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Context-aware error creation: the interpreter knows its source and the
/// span of the event it is processing.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> H2mlError;

    fn unmatched_close(&self, directive: &str, span: SourceSpan) -> H2mlError {
        self.report(
            ErrorKind::UnmatchedDirectiveClose {
                directive: directive.into(),
            },
            span,
        )
    }

    fn nested_template(&self, span: SourceSpan) -> H2mlError {
        self.report(ErrorKind::NestedTemplate, span)
    }
}

/// Builds the diagnostic payload shared by every error site.
pub fn diagnostic_info_for(kind: &ErrorKind) -> DiagnosticInfo {
    DiagnosticInfo {
        help: kind.help(),
        error_code: format!("h2ml::expand::{}", kind.code_suffix()),
    }
}

pub fn to_source_span(span: Span) -> SourceSpan {
    let len = span.end.saturating_sub(span.start).max(1);
    SourceSpan::new(span.start.into(), len)
}
