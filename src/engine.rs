//! Compilation entry points.
//!
//! One compilation is one synchronous pass over one document. Every call
//! owns its own environment, stacks, and output buffer; nothing is shared
//! across concurrent compilations.

use crate::diagnostics::{ConsoleSink, Reporter, SharedSink};
use crate::errors::{H2mlError, SourceContext};
use crate::events::EventSource;
use crate::expander::{Expander, Expansion};
use crate::options::CompilerOptions;

/// Expands `input`, reporting diagnostics to stderr.
pub fn compile(input: &str, options: &CompilerOptions) -> Result<Expansion, H2mlError> {
    compile_with_sink(input, options, SharedSink::new(ConsoleSink))
}

/// Expands `input` with a caller-supplied diagnostic sink.
///
/// Tokenizer failures end the pass without aborting it: the error is routed
/// through the sink and the document expanded so far is returned. Only
/// structural violations (unmatched directive closes, nested `@template`)
/// surface as `Err`.
pub fn compile_with_sink(
    input: &str,
    options: &CompilerOptions,
    sink: SharedSink,
) -> Result<Expansion, H2mlError> {
    let reporter = Reporter::new(sink, options);
    let source = SourceContext::from_document("document", input);
    let mut expander = Expander::new(options.clone(), reporter.clone(), source);
    let mut events = EventSource::new(input, reporter.clone());

    reporter.trace("beginning macro expansion");
    while let Some(next) = events.next_event() {
        match next {
            Ok((event, span)) => expander.handle(event, span)?,
            Err(err) => {
                reporter.error(format!("tokenizer error: {err}"));
                break;
            }
        }
    }
    reporter.trace("finished macro expansion");
    Ok(expander.finish())
}
