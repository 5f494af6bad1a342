//! Expression substitution and `@var` binding tests.

mod common;

use common::{expand, expand_collecting};
use h2ml::{CompilerOptions, Level};

#[test]
fn variable_overwrite_is_shadow_free() {
    assert_eq!(expand(r#"<@var x="1"/>{x}<@var x="2"/>{x}"#), "12");
}

#[test]
fn self_referential_increment_under_replay() {
    // Each iteration doubles the previous iteration's value, not a fixed
    // increment: 2, 4, 8, 16.
    assert_eq!(
        expand(r#"<@var x="1"/><@repeat count=4><@var x="{x*2}"/>{x}</@repeat>"#),
        "24816"
    );
}

#[test]
fn assignment_reads_the_old_value() {
    assert_eq!(expand(r#"<@var x="3"/><@var x="{x+1}"/>{x}"#), "4");
}

#[test]
fn later_attributes_see_earlier_ones() {
    assert_eq!(expand(r#"<@var a="2" b="{a*3}"/>{b}"#), "6");
}

#[test]
fn arithmetic_follows_precedence() {
    assert_eq!(expand("{1+2*3}"), "7");
}

#[test]
fn comparison_renders_as_boolean() {
    assert_eq!(expand("{1==1}"), "true");
}

#[test]
fn escaped_brace_stays_literal() {
    let (result, _) = expand_collecting(
        "<@var x=\"7\"/>\\{x}",
        &CompilerOptions::default(),
    );
    assert_eq!(result.expect("escape is not an error").document, "{x}");
}

#[test]
fn double_backslash_escapes_the_backslash_and_evaluates() {
    let (result, _) = expand_collecting(
        "<@var x=\"7\"/>\\\\{x}",
        &CompilerOptions::default(),
    );
    assert_eq!(result.expect("escape is not an error").document, "\\7");
}

#[test]
fn unknown_variable_splices_empty_and_reports() {
    let (result, diagnostics) = expand_collecting("a{missing}b", &CompilerOptions::default());
    assert_eq!(result.expect("evaluation failure is recoverable").document, "ab");
    assert!(diagnostics.contains(Level::Error, "missing"));
}

#[test]
fn attribute_values_are_substituted() {
    assert_eq!(
        expand(r#"<@var c="wide"/><div class="{c}">x</div>"#),
        r#"<div class="wide">x</div>"#
    );
}

#[test]
fn tag_names_can_be_computed() {
    assert_eq!(expand(r#"<@var t="em"/><{t}>x</{t}>"#), "<em>x</em>");
}

#[test]
fn numeric_looking_strings_substitute_verbatim() {
    assert_eq!(expand(r#"<@var id="007"/>{id}"#), "007");
}

#[test]
fn string_variables_substitute_verbatim() {
    assert_eq!(expand(r#"<@var who="world"/>hello {who}"#), "hello world");
}

#[test]
fn attribute_substitution_inside_repeat_replays() {
    assert_eq!(
        expand(r#"<@var i="0"/><@repeat count=3><@var i="{i+1}"/><li id="{i}"/></@repeat>"#),
        r#"<li id="1"/><li id="2"/><li id="3"/>"#
    );
}

#[test]
fn var_with_a_body_warns_but_processes_the_body() {
    let (result, diagnostics) =
        expand_collecting(r#"<@var x="1">{x}</@var>"#, &CompilerOptions::default());
    assert_eq!(result.expect("@var body is recoverable").document, "1");
    assert!(diagnostics.contains(Level::Warning, "@var"));
}
