//! The macro interpreter and output assembler.
//!
//! Consumes tokenizer events, dispatches on reserved-tag names, mutates the
//! nested expansion state (repeat, conditional, variable, template), and
//! appends finalized text to the output while propagating raw content into
//! every open repeat frame.
//!
//! Visibility is re-checked on every append, so a conditional toggling
//! mid-stream affects subsequent content only. Content suppressed by `@if`
//! is not captured into repeat buffers: suppression means "as if absent".

use std::collections::HashMap;

use miette::SourceSpan;

use crate::diagnostics::Reporter;
use crate::env::VarEnv;
use crate::errors::{
    diagnostic_info_for, to_source_span, ErrorKind, ErrorReporting, H2mlError, SourceContext,
    SourceInfo,
};
use crate::eval;
use crate::events::{MarkupEvent, Span};
use crate::frames::{
    rewrite_self_closing, ConditionalStack, Piece, RepeatFrame, TemplateFrame,
};
use crate::options::{CompilerOptions, UnknownDirectivePolicy};
use crate::subst;

/// Tags beginning with this sigil are compile-time directives.
pub const DIRECTIVE_SIGIL: char = '@';

pub const REPEAT_TAG: &str = "@repeat";
pub const VAR_TAG: &str = "@var";
pub const IF_TAG: &str = "@if";
pub const TEMPLATE_TAG: &str = "@template";

/// The result of one compilation: the expanded document plus the template
/// definitions captured along the way (definitions are inert; invoking them
/// is a future concern).
#[derive(Debug, Default)]
pub struct Expansion {
    pub document: String,
    pub templates: HashMap<String, String>,
}

pub struct Expander {
    options: CompilerOptions,
    reporter: Reporter,
    source: SourceContext,
    env: VarEnv,
    repeats: Vec<RepeatFrame>,
    conditionals: ConditionalStack,
    template: Option<TemplateFrame>,
    templates: HashMap<String, String>,
    out: String,
    span: Span,
}

impl Expander {
    pub fn new(options: CompilerOptions, reporter: Reporter, source: SourceContext) -> Self {
        Self {
            options,
            reporter,
            source,
            env: VarEnv::new(),
            repeats: Vec::new(),
            conditionals: ConditionalStack::default(),
            template: None,
            templates: HashMap::new(),
            out: String::new(),
            span: Span::default(),
        }
    }

    /// Processes one tokenizer event. Only structural violations return an
    /// error; everything else is reported through the sink and the pass
    /// continues.
    pub fn handle(&mut self, event: MarkupEvent, span: Span) -> Result<(), H2mlError> {
        self.span = span;
        match event {
            MarkupEvent::Open {
                name,
                attributes,
                self_closing,
            } => self.on_open(&name, &attributes, self_closing),
            MarkupEvent::Text(data) => {
                self.on_text(&data);
                Ok(())
            }
            MarkupEvent::Comment(data) => {
                self.on_comment(&data);
                Ok(())
            }
            MarkupEvent::Close { name, self_closing } => self.on_close(&name, self_closing),
        }
    }

    /// Ends the compilation, reporting frames left open at end of input.
    pub fn finish(mut self) -> Expansion {
        if let Some(frame) = self.template.take() {
            self.reporter.error(format!(
                "@template {:?} left open at end of input, definition discarded",
                frame.name.as_deref().unwrap_or("")
            ));
        }
        if !self.repeats.is_empty() {
            self.reporter.error(format!(
                "{} @repeat frame(s) left open at end of input, pending replays discarded",
                self.repeats.len()
            ));
        }
        if self.conditionals.depth() > 0 {
            self.reporter.warn(format!(
                "{} @if frame(s) left open at end of input",
                self.conditionals.depth()
            ));
        }
        Expansion {
            document: self.out,
            templates: self.templates,
        }
    }

    // ------------------------------------------------------------------
    // Event handlers
    // ------------------------------------------------------------------

    fn on_open(
        &mut self,
        raw_name: &str,
        attributes: &[(String, String)],
        self_closing: bool,
    ) -> Result<(), H2mlError> {
        // Template bodies are captured raw; nothing inside them executes.
        if self.template.is_some() {
            if raw_name == TEMPLATE_TAG {
                return Err(self.nested_template(self.source_span()));
            }
            self.capture_template(&raw_open_tag(raw_name, attributes));
            return Ok(());
        }
        // Tag names may themselves be computed: <{tag}>.
        let name = subst::substitute(raw_name, &self.env, &self.reporter);
        if name.starts_with(DIRECTIVE_SIGIL) {
            return self.on_directive_open(&name, raw_name, attributes, self_closing);
        }
        let rendered = self.rendered_open_tag(&name, attributes);
        self.append(&rendered, Piece::Eval(raw_open_tag(raw_name, attributes)));
        Ok(())
    }

    fn on_text(&mut self, data: &str) {
        if self.template.is_some() {
            self.capture_template(data);
            return;
        }
        let rendered = subst::substitute(data, &self.env, &self.reporter);
        self.append(&rendered, Piece::Eval(data.to_string()));
    }

    fn on_comment(&mut self, data: &str) {
        if !self.options.preserve_comments {
            return;
        }
        let raw = format!("<!--{data}-->");
        if self.template.is_some() {
            self.capture_template(&raw);
            return;
        }
        if self.options.evaluate_expressions_in_comments {
            let rendered = format!(
                "<!--{}-->",
                subst::substitute(data, &self.env, &self.reporter)
            );
            self.append(&rendered, Piece::Eval(raw));
        } else {
            let rendered = raw.clone();
            self.append(&rendered, Piece::Verbatim(raw));
        }
    }

    fn on_close(&mut self, raw_name: &str, self_closing: bool) -> Result<(), H2mlError> {
        if self.template.is_some() && raw_name != TEMPLATE_TAG {
            if self_closing {
                if let Some(frame) = &mut self.template {
                    rewrite_self_closing(&mut frame.body);
                }
            } else {
                self.capture_template(&format!("</{raw_name}>"));
            }
            return Ok(());
        }
        let name = subst::substitute(raw_name, &self.env, &self.reporter);
        if name.starts_with(DIRECTIVE_SIGIL) {
            return self.on_directive_close(&name, raw_name, self_closing);
        }
        if self_closing {
            // The tokenizer says the original tag was self-closed; rewrite
            // the open tag we already emitted instead of appending a close.
            self.normalize_self_closing();
        } else {
            self.append(&format!("</{name}>"), Piece::Eval(format!("</{raw_name}>")));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Directive dispatch
    // ------------------------------------------------------------------

    fn on_directive_open(
        &mut self,
        name: &str,
        raw_name: &str,
        attributes: &[(String, String)],
        self_closing: bool,
    ) -> Result<(), H2mlError> {
        match name {
            REPEAT_TAG => self.open_repeat(attributes),
            VAR_TAG => self.bind_variables(attributes, self_closing),
            IF_TAG => self.open_conditional(attributes),
            TEMPLATE_TAG => self.open_template(attributes),
            _ => {
                self.reporter.warn(format!("unknown directive <{name}>"));
                if self.options.unknown_directives == UnknownDirectivePolicy::Passthrough {
                    let rendered = self.rendered_open_tag(name, attributes);
                    self.append(&rendered, Piece::Eval(raw_open_tag(raw_name, attributes)));
                }
            }
        }
        Ok(())
    }

    fn on_directive_close(
        &mut self,
        name: &str,
        raw_name: &str,
        self_closing: bool,
    ) -> Result<(), H2mlError> {
        match name {
            REPEAT_TAG => self.close_repeat(),
            IF_TAG => {
                if self.conditionals.pop().is_none() {
                    return Err(self.unmatched_close(IF_TAG, self.source_span()));
                }
                Ok(())
            }
            // The open tag already warned about any body; nothing to emit.
            VAR_TAG => Ok(()),
            TEMPLATE_TAG => self.close_template(),
            _ => {
                if self.options.unknown_directives == UnknownDirectivePolicy::Passthrough {
                    if self_closing {
                        self.normalize_self_closing();
                    } else {
                        self.append(&format!("</{name}>"), Piece::Eval(format!("</{raw_name}>")));
                    }
                }
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // @repeat
    // ------------------------------------------------------------------

    fn open_repeat(&mut self, attributes: &[(String, String)]) {
        let count = match attribute(attributes, "count") {
            None => {
                self.reporter
                    .warn("@repeat without a count attribute, defaulting to 1");
                1
            }
            Some(raw) => {
                let resolved = subst::substitute(raw, &self.env, &self.reporter);
                match resolved.trim().parse::<f64>() {
                    Ok(number) if number.is_finite() => {
                        let rounded = number.round() as i64;
                        if rounded < 1 {
                            self.reporter.error(format!(
                                "@repeat count {resolved:?} is out of range, clamping to 1"
                            ));
                            1
                        } else {
                            rounded as usize
                        }
                    }
                    _ => {
                        self.reporter.warn(format!(
                            "@repeat count {resolved:?} is not a number, defaulting to 1"
                        ));
                        1
                    }
                }
            }
        };
        self.repeats.push(RepeatFrame::new(count));
    }

    fn close_repeat(&mut self) -> Result<(), H2mlError> {
        let Some(frame) = self.repeats.pop() else {
            return Err(self.unmatched_close(REPEAT_TAG, self.source_span()));
        };
        // The body is already in the stream once; replay count - 1 more
        // times. A suppressed frame captured nothing and replays nothing.
        if frame.count() < 2 || !self.conditionals.visible() {
            return Ok(());
        }
        for _ in 1..frame.count() {
            frame.replay_writes(&mut self.env, &self.reporter);
            let rendered = frame.render(&self.env, &self.reporter);
            self.out.push_str(&rendered);
            for parent in &mut self.repeats {
                for piece in frame.pieces() {
                    parent.push(piece.clone());
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // @var
    // ------------------------------------------------------------------

    fn bind_variables(&mut self, attributes: &[(String, String)], self_closing: bool) {
        if !self_closing {
            self.reporter
                .warn("@var with a body, the body is processed as ordinary content");
        }
        if !self.conditionals.visible() {
            return;
        }
        for (name, raw_value) in attributes {
            // Evaluate before writing, so x="{x+1}" reads the old x. Later
            // attributes of the same tag see earlier ones.
            let value = subst::substitute(raw_value, &self.env, &self.reporter);
            self.reporter.trace(format!("@var {name} = {value:?}"));
            self.env.set(name, value);
            for frame in &mut self.repeats {
                frame.record_write(name, raw_value);
            }
        }
    }

    // ------------------------------------------------------------------
    // @if
    // ------------------------------------------------------------------

    fn open_conditional(&mut self, attributes: &[(String, String)]) {
        let visible = match attribute(attributes, "condition") {
            None => {
                self.reporter
                    .warn("@if without a condition attribute, defaulting to visible");
                true
            }
            Some(raw) => match subst::whole_expression(raw) {
                None => {
                    self.reporter.warn(format!(
                        "@if condition {raw:?} is not a brace expression, defaulting to visible"
                    ));
                    true
                }
                Some(expression) => match eval::evaluate(expression, &self.env) {
                    Ok(value) => eval::is_truthy(&value),
                    Err(err) => {
                        self.reporter.warn(format!(
                            "@if condition {{{expression}}} failed to evaluate ({err}), \
                             defaulting to visible"
                        ));
                        true
                    }
                },
            },
        };
        self.conditionals.push(visible);
    }

    // ------------------------------------------------------------------
    // @template
    // ------------------------------------------------------------------

    fn open_template(&mut self, attributes: &[(String, String)]) {
        let name = attribute(attributes, "name")
            .map(|raw| subst::substitute(raw, &self.env, &self.reporter));
        if name.is_none() {
            self.reporter
                .warn("@template without a name attribute, the definition will be discarded");
        }
        self.template = Some(TemplateFrame {
            name,
            body: String::new(),
            visible: self.conditionals.visible(),
        });
    }

    fn close_template(&mut self) -> Result<(), H2mlError> {
        let Some(frame) = self.template.take() else {
            return Err(self.unmatched_close(TEMPLATE_TAG, self.source_span()));
        };
        if let Some(name) = frame.name {
            if frame.visible {
                self.reporter.trace(format!("captured template {name:?}"));
                self.templates.insert(name, frame.body);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Output assembly
    // ------------------------------------------------------------------

    /// Appends rendered text to the document and captures the raw form into
    /// every open repeat frame. Visibility is re-checked on every call.
    fn append(&mut self, rendered: &str, raw: Piece) {
        if !self.conditionals.visible() {
            return;
        }
        self.out.push_str(rendered);
        for frame in &mut self.repeats {
            frame.push(raw.clone());
        }
    }

    fn normalize_self_closing(&mut self) {
        if !self.conditionals.visible() {
            return;
        }
        rewrite_self_closing(&mut self.out);
        for frame in &mut self.repeats {
            frame.rewrite_last_self_closing();
        }
    }

    fn capture_template(&mut self, raw: &str) {
        if let Some(frame) = &mut self.template {
            frame.body.push_str(raw);
        }
    }

    fn rendered_open_tag(&self, name: &str, attributes: &[(String, String)]) -> String {
        let mut tag = format!("<{name}");
        for (key, raw_value) in attributes {
            let value = subst::substitute(raw_value, &self.env, &self.reporter);
            tag.push_str(&format!(" {key}=\"{value}\""));
        }
        tag.push('>');
        tag
    }

    fn source_span(&self) -> SourceSpan {
        to_source_span(self.span)
    }
}

impl ErrorReporting for Expander {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> H2mlError {
        H2mlError {
            diagnostic_info: diagnostic_info_for(&kind),
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
            },
            kind,
        }
    }
}

fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn raw_open_tag(name: &str, attributes: &[(String, String)]) -> String {
    let mut tag = format!("<{name}");
    for (key, value) in attributes {
        tag.push_str(&format!(" {key}=\"{value}\""));
    }
    tag.push('>');
    tag
}
