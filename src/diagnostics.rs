//! Diagnostic sinks and the reporter.
//!
//! Recoverable problems never abort a compilation; they are routed through a
//! pluggable [`DiagnosticSink`] so hosts can capture, colorize, or discard
//! them. The [`Reporter`] wraps a shared sink and applies the logging switches
//! from [`CompilerOptions`].

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::options::CompilerOptions;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Trace,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Trace => "trace",
        }
    }
}

/// Destination for diagnostics, injectable to make them testable.
pub trait DiagnosticSink {
    fn emit(&mut self, level: Level, message: &str);
}

/// Discards everything.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _level: Level, _message: &str) {}
}

/// Writes colorized diagnostics to stderr. The default sink for the CLI.
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn emit(&mut self, level: Level, message: &str) {
        let mut stream = StandardStream::stderr(ColorChoice::Auto);
        let color = match level {
            Level::Error => Color::Red,
            Level::Warning => Color::Yellow,
            Level::Trace => Color::Cyan,
        };
        let _ = stream.set_color(ColorSpec::new().set_fg(Some(color)));
        let _ = write!(stream, "{}", level.label());
        let _ = stream.reset();
        let _ = writeln!(stream, ": {message}");
    }
}

/// Collects diagnostics into memory for tests or programmatic capture.
/// Clones share the same backing buffer.
#[derive(Clone, Default)]
pub struct BufferSink {
    lines: Rc<RefCell<Vec<(Level, String)>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.borrow().clone()
    }

    /// True if any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .borrow()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    pub fn count(&self, level: Level) -> usize {
        self.lines.borrow().iter().filter(|(l, _)| *l == level).count()
    }
}

impl DiagnosticSink for BufferSink {
    fn emit(&mut self, level: Level, message: &str) {
        self.lines.borrow_mut().push((level, message.to_string()));
    }
}

/// Shared, mutable handle to a sink. Compilations are single-threaded, so a
/// plain `Rc<RefCell<..>>` is all the sharing this needs.
#[derive(Clone)]
pub struct SharedSink(Rc<RefCell<dyn DiagnosticSink>>);

impl SharedSink {
    pub fn new<T: DiagnosticSink + 'static>(sink: T) -> Self {
        SharedSink(Rc::new(RefCell::new(sink)))
    }

    pub fn emit(&self, level: Level, message: &str) {
        self.0.borrow_mut().emit(level, message);
    }
}

/// A sink plus the logging switches from the compiler options.
#[derive(Clone)]
pub struct Reporter {
    sink: SharedSink,
    log_warnings: bool,
    log_errors: bool,
    verbose: bool,
}

impl Reporter {
    pub fn new(sink: SharedSink, options: &CompilerOptions) -> Self {
        Self {
            sink,
            log_warnings: options.log_warnings,
            log_errors: options.log_errors,
            verbose: options.verbose,
        }
    }

    pub fn error(&self, message: impl AsRef<str>) {
        if self.log_errors {
            self.sink.emit(Level::Error, message.as_ref());
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        if self.log_warnings {
            self.sink.emit(Level::Warning, message.as_ref());
        }
    }

    pub fn trace(&self, message: impl AsRef<str>) {
        if self.verbose {
            self.sink.emit(Level::Trace, message.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_honors_logging_switches() {
        let buffer = BufferSink::new();
        let options = CompilerOptions {
            log_warnings: false,
            verbose: true,
            ..CompilerOptions::default()
        };
        let reporter = Reporter::new(SharedSink::new(buffer.clone()), &options);
        reporter.warn("suppressed");
        reporter.error("kept");
        reporter.trace("traced");
        assert!(!buffer.contains(Level::Warning, "suppressed"));
        assert!(buffer.contains(Level::Error, "kept"));
        assert!(buffer.contains(Level::Trace, "traced"));
    }
}
