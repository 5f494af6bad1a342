//! Markup event source.
//!
//! The interpreter never parses raw characters; it consumes ordered events
//! from a streaming tokenizer. This module adapts `quick-xml`'s pull parser
//! to that contract: tag and attribute names are lowercased (H2ML is
//! case-insensitive), self-closing tags surface as an open event followed by
//! a close event with the self-closing flag set, and declarations, processing
//! instructions, doctypes, and CDATA all degrade to text so they round-trip.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::diagnostics::Reporter;

/// Byte range of one event in the input document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One tokenizer event, names already lowercased, attributes in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupEvent {
    Open {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    Text(String),
    Comment(String),
    Close {
        name: String,
        self_closing: bool,
    },
}

pub struct EventSource<'a> {
    reader: Reader<&'a [u8]>,
    reporter: Reporter,
    pending: Option<(MarkupEvent, Span)>,
    done: bool,
}

impl<'a> EventSource<'a> {
    pub fn new(input: &'a str, reporter: Reporter) -> Self {
        let mut reader = Reader::from_str(input);
        // Balance is the interpreter's concern; the tokenizer only streams.
        // Unmatched closes must reach the interpreter as events so it can
        // raise its own structural error.
        reader.config_mut().check_end_names = false;
        reader.config_mut().allow_unmatched_ends = true;
        Self {
            reader,
            reporter,
            pending: None,
            done: false,
        }
    }

    /// The next event with its byte span. `None` at end of input. A tokenizer
    /// failure ends the stream; the caller surfaces it through the sink.
    pub fn next_event(&mut self) -> Option<Result<(MarkupEvent, Span), quick_xml::Error>> {
        if let Some(pending) = self.pending.take() {
            return Some(Ok(pending));
        }
        if self.done {
            return None;
        }
        let start = self.reader.buffer_position() as usize;
        let event = match self.reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        let span = Span {
            start,
            end: self.reader.buffer_position() as usize,
        };
        let mapped = match event {
            Event::Start(tag) => self.open_event(&tag, false),
            Event::Empty(tag) => {
                let open = self.open_event(&tag, true);
                if let MarkupEvent::Open { name, .. } = &open {
                    let close = MarkupEvent::Close {
                        name: name.clone(),
                        self_closing: true,
                    };
                    self.pending = Some((close, span));
                }
                open
            }
            Event::End(tag) => MarkupEvent::Close {
                name: lowercase(tag.name().as_ref()),
                self_closing: false,
            },
            Event::Text(text) => MarkupEvent::Text(raw_string(&text)),
            Event::CData(data) => MarkupEvent::Text(raw_string(&data)),
            Event::Comment(text) => MarkupEvent::Comment(raw_string(&text)),
            Event::Decl(decl) => MarkupEvent::Text(format!("<?{}?>", raw_string(&decl))),
            Event::PI(pi) => MarkupEvent::Text(format!("<?{}?>", raw_string(&pi))),
            Event::DocType(text) => {
                MarkupEvent::Text(format!("<!DOCTYPE {}>", raw_string(&text).trim()))
            }
            Event::Eof => {
                self.done = true;
                return None;
            }
            _ => MarkupEvent::Text(String::new()),
        };
        Some(Ok((mapped, span)))
    }

    fn open_event(&self, tag: &BytesStart, self_closing: bool) -> MarkupEvent {
        let name = lowercase(tag.name().as_ref());
        let mut attributes = Vec::new();
        for attribute in tag.html_attributes() {
            match attribute {
                Ok(attribute) => attributes.push((
                    lowercase(attribute.key.as_ref()),
                    raw_string(&attribute.value),
                )),
                Err(err) => {
                    self.reporter
                        .warn(format!("malformed attribute on <{name}>: {err}"));
                }
            }
        }
        MarkupEvent::Open {
            name,
            attributes,
            self_closing,
        }
    }
}

fn lowercase(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_ascii_lowercase()
}

fn raw_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
