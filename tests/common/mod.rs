//! Shared helpers for the integration tests.

use h2ml::{
    compile_with_sink, BufferSink, CompilerOptions, Expansion, H2mlError, SharedSink,
};

/// Expands a document with default options; panics on fatal errors.
pub fn expand(input: &str) -> String {
    expand_with(input, &CompilerOptions::default()).document
}

/// Expands a document with the given options; panics on fatal errors.
pub fn expand_with(input: &str, options: &CompilerOptions) -> Expansion {
    let sink = BufferSink::new();
    compile_with_sink(input, options, SharedSink::new(sink))
        .expect("expansion should succeed")
}

/// Expands a document, returning the result and the captured diagnostics.
pub fn expand_collecting(
    input: &str,
    options: &CompilerOptions,
) -> (Result<Expansion, H2mlError>, BufferSink) {
    let sink = BufferSink::new();
    let result = compile_with_sink(input, options, SharedSink::new(sink.clone()));
    (result, sink)
}
