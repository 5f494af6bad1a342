//! Nested expansion state.
//!
//! Repeat, conditional, and template state are plain growable stacks, alive
//! between a directive's open and matching close event. Repeat frames capture
//! content pre-substitution so replays re-evaluate expressions against the
//! environment as it stands at replay time, and record the variables last
//! assigned while the frame was open so each replay sees per-iteration
//! values ("frame-local write-set, global read environment").

use crate::diagnostics::Reporter;
use crate::env::VarEnv;
use crate::subst;

/// One captured piece of repeat or template content.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    /// Captured pre-substitution; re-evaluated on every replay.
    Eval(String),
    /// Already final; replayed verbatim (comments with evaluation disabled).
    Verbatim(String),
}

impl Piece {
    fn text_mut(&mut self) -> &mut String {
        match self {
            Piece::Eval(text) | Piece::Verbatim(text) => text,
        }
    }
}

/// One open `@repeat`.
#[derive(Debug, Default)]
pub struct RepeatFrame {
    count: usize,
    pieces: Vec<Piece>,
    writes: Vec<(String, String)>,
}

impl RepeatFrame {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            pieces: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn push(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Records a `@var` assignment made while this frame is open. Last write
    /// per name wins; first-write order is preserved for replay.
    pub fn record_write(&mut self, name: &str, raw_value: &str) {
        if let Some(entry) = self.writes.iter_mut().find(|(n, _)| n == name) {
            entry.1 = raw_value.to_string();
        } else {
            self.writes.push((name.to_string(), raw_value.to_string()));
        }
    }

    /// Re-applies the frame's write-set, re-evaluating each right-hand side
    /// against the environment as it stands now. Runs before every replay.
    pub fn replay_writes(&self, env: &mut VarEnv, reporter: &Reporter) {
        for (name, raw_value) in &self.writes {
            let value = subst::substitute(raw_value, env, reporter);
            env.set(name, value);
        }
    }

    /// Renders the captured content against the current environment.
    pub fn render(&self, env: &VarEnv, reporter: &Reporter) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Eval(text) => subst::substitute(text, env, reporter),
                Piece::Verbatim(text) => text.clone(),
            })
            .collect()
    }

    pub fn rewrite_last_self_closing(&mut self) {
        if let Some(piece) = self.pieces.last_mut() {
            rewrite_self_closing(piece.text_mut());
        }
    }
}

/// The visibility stack for `@if`. Effective visibility is the AND of every
/// open frame, re-evaluated on each append.
#[derive(Debug, Default)]
pub struct ConditionalStack {
    frames: Vec<bool>,
}

impl ConditionalStack {
    pub fn push(&mut self, visible: bool) {
        self.frames.push(visible);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.frames.pop()
    }

    pub fn visible(&self) -> bool {
        self.frames.iter().all(|visible| *visible)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// The single open `@template`, if any. Its body is captured raw and stored
/// on close; nothing inside it executes or reaches the output.
#[derive(Debug, Default)]
pub struct TemplateFrame {
    pub name: Option<String>,
    pub body: String,
    pub visible: bool,
}

/// Rewrites a trailing `<tag>` into `<tag/>`. The tokenizer reports
/// self-closing on the close event, after the open tag was already emitted.
pub fn rewrite_self_closing(buffer: &mut String) {
    if buffer.ends_with('>') && !buffer.ends_with("/>") {
        buffer.pop();
        buffer.push_str("/>");
    }
}
