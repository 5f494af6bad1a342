//! Whole-pipeline tests: options surface, comments, self-closing
//! normalization, tokenizer tolerance.

mod common;

use common::{expand, expand_collecting, expand_with};
use h2ml::{CompilerOptions, Level};

#[test]
fn comments_are_dropped_by_default() {
    assert_eq!(expand("a<!--c-->b"), "ab");
}

#[test]
fn preserved_comments_round_trip() {
    let options = CompilerOptions {
        preserve_comments: true,
        ..CompilerOptions::default()
    };
    assert_eq!(expand_with("a<!--c-->b", &options).document, "a<!--c-->b");
}

#[test]
fn comment_expressions_stay_literal_unless_enabled() {
    let options = CompilerOptions {
        preserve_comments: true,
        ..CompilerOptions::default()
    };
    assert_eq!(
        expand_with(r#"<@var x="5"/><!--{x}-->"#, &options).document,
        "<!--{x}-->"
    );
}

#[test]
fn comment_expressions_evaluate_when_enabled() {
    let options = CompilerOptions {
        preserve_comments: true,
        evaluate_expressions_in_comments: true,
        ..CompilerOptions::default()
    };
    assert_eq!(
        expand_with(r#"<@var x="5"/><!--{x}-->"#, &options).document,
        "<!--5-->"
    );
}

#[test]
fn preserved_comments_replicate_inside_repeat() {
    let options = CompilerOptions {
        preserve_comments: true,
        ..CompilerOptions::default()
    };
    assert_eq!(
        expand_with("<@repeat count=2><!--c--></@repeat>", &options).document,
        "<!--c--><!--c-->"
    );
}

#[test]
fn self_closing_tag_round_trips() {
    assert_eq!(expand("<br/>"), "<br/>");
    assert_eq!(expand(r#"<img src="x.png"/>"#), r#"<img src="x.png"/>"#);
}

#[test]
fn open_close_pairs_are_not_collapsed() {
    assert_eq!(expand("<div></div>"), "<div></div>");
}

#[test]
fn warnings_can_be_silenced() {
    let options = CompilerOptions {
        log_warnings: false,
        ..CompilerOptions::default()
    };
    let (result, diagnostics) = expand_collecting("<@repeat>X</@repeat>", &options);
    assert_eq!(result.expect("still recoverable").document, "X");
    assert_eq!(diagnostics.count(Level::Warning), 0);
}

#[test]
fn verbose_mode_traces_substitution_matches() {
    let options = CompilerOptions {
        verbose: true,
        ..CompilerOptions::default()
    };
    let (result, diagnostics) = expand_collecting(r#"<@var x="1"/>{x}"#, &options);
    assert_eq!(result.expect("trace does not change output").document, "1");
    assert!(diagnostics.count(Level::Trace) > 0);
}

#[test]
fn tokenizer_failure_is_surfaced_not_fatal() {
    let (result, diagnostics) =
        expand_collecting("ab<!-- never closed", &CompilerOptions::default());
    let expansion = result.expect("tokenizer errors are recoverable");
    assert_eq!(expansion.document, "ab");
    assert!(diagnostics.contains(Level::Error, "tokenizer"));
}

#[test]
fn mixed_document_expands_end_to_end() {
    let input = concat!(
        r#"<@var rows="2" label="row"/>"#,
        "<table>",
        r#"<@repeat count="{rows}">"#,
        r#"<tr class="{label}"><td>{rows*10}</td></tr>"#,
        "</@repeat>",
        "</table>"
    );
    assert_eq!(
        expand(input),
        concat!(
            "<table>",
            r#"<tr class="row"><td>20</td></tr>"#,
            r#"<tr class="row"><td>20</td></tr>"#,
            "</table>"
        )
    );
}

#[test]
fn case_insensitive_tag_and_attribute_names() {
    assert_eq!(
        expand(r#"<@VAR x="2"/><@REPEAT Count=2>{x}</@REPEAT>"#),
        "22"
    );
}
