//! Minimal element tree built from quick-xml events.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An XML element with its direct text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Text before the first child element
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let attributes = start
            .attributes()
            .flatten()
            .map(|attr| (decode(attr.key.as_ref()), decode(&attr.value)))
            .collect();
        Self {
            name: decode(start.name().as_ref()),
            attributes,
            ..Default::default()
        }
    }

    /// Value of the attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First element called `name` in document order, this one included.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_first(name))
    }
}

/// Lossy UTF-8 decode plus entity references.
///
/// pdftohtml emits HTML entities in its XML, which a strict XML unescape
/// would reject.
fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    html_escape::decode_html_entities(&text).into_owned()
}

/// Parse `xml` into a tree rooted at an unnamed document node.
pub(crate) fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Element::default()];

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::OutlineExtraction(format!(
                "malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)),
            Event::Empty(start) => {
                let element = Element::from_start(&start);
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(_) => {
                let element = stack.pop();
                match (element, stack.last_mut()) {
                    (Some(element), Some(parent)) => parent.children.push(element),
                    _ => {
                        return Err(Error::OutlineExtraction(
                            "unbalanced closing tag".to_string(),
                        ))
                    }
                }
            }
            Event::Text(text) => {
                let bytes: &[u8] = &text;
                if let Some(current) = stack.last_mut().filter(|e| e.children.is_empty()) {
                    current.text.push_str(&decode(bytes));
                }
            }
            Event::CData(data) => {
                let bytes: &[u8] = &data;
                if let Some(current) = stack.last_mut().filter(|e| e.children.is_empty()) {
                    current.text.push_str(&String::from_utf8_lossy(bytes));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(Error::OutlineExtraction(
            "unexpected end of document".to_string(),
        )),
    }
}
