//! Strict XML parsing into an [`ego_tree::Tree`].

use ego_tree::{NodeId, Tree};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, TtmlCaptureError};

/// A node of a parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum XmlNode {
    Document,
    Element(Element),
    /// Unescaped character data.
    Text(String),
}

impl XmlNode {
    pub(crate) fn is_element(&self) -> bool {
        matches!(self, XmlNode::Element(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    pub(crate) name: String,
    /// `(name, raw value)` pairs in source order.
    pub(crate) attrs: Vec<(String, String)>,
}

fn malformed(msg: impl std::fmt::Display) -> TtmlCaptureError {
    TtmlCaptureError::Xml(msg.to_string())
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(malformed)
}

/// XML 1.0 `Char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Validate an XML `Name` production.
fn xml_name(bytes: &[u8]) -> Result<&str> {
    let name = utf8(bytes)?;
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) && chars.all(is_name_char) => Ok(name),
        _ => Err(malformed(format!("invalid name {name:?}"))),
    }
}

fn element(start: &BytesStart<'_>) -> Result<Element> {
    let name = xml_name(start.name().as_ref())?.to_string();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = xml_name(attr.key.as_ref())?.to_string();
        let value = utf8(&attr.value)?;
        if value.contains('<') {
            return Err(malformed(format!("'<' in value of attribute {key}")));
        }
        attr.unescape_value().map_err(malformed)?;
        attrs.push((key, value.to_string()));
    }
    Ok(Element { name, attrs })
}

/// Parse `xml` into a tree rooted at [`XmlNode::Document`].
///
/// Comments, processing instructions, declarations, and doctypes are dropped.
/// CDATA sections become text. Anything that is not a single well-formed
/// root element is rejected.
pub(crate) fn parse(xml: &str) -> Result<Tree<XmlNode>> {
    if let Some(c) = xml.chars().find(|&c| !is_xml_char(c)) {
        return Err(malformed(format!("illegal character {c:?}")));
    }

    let mut reader = Reader::from_str(xml);
    let mut tree = Tree::new(XmlNode::Document);
    let mut open: Vec<NodeId> = vec![tree.root().id()];
    let mut seen_root = false;
    let mut seen_doctype = false;
    let mut first = true;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(format!("{e} at byte {}", reader.buffer_position())))?;
        let opens = matches!(event, Event::Start(_));
        let at_start = std::mem::replace(&mut first, false);

        let node = match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                if open.len() == 1 {
                    if seen_root {
                        return Err(malformed("more than one root element"));
                    }
                    seen_root = true;
                }
                XmlNode::Element(element(start)?)
            }
            Event::End(_) => {
                if open.len() == 1 {
                    return Err(malformed("unmatched end tag"));
                }
                open.pop();
                continue;
            }
            Event::Text(text) => {
                if text.windows(3).any(|w| w == b"]]>") {
                    return Err(malformed("']]>' in character data"));
                }
                let text = text.unescape().map_err(malformed)?;
                if open.len() == 1 {
                    if !text.trim().is_empty() {
                        return Err(malformed("text outside the root element"));
                    }
                    continue;
                }
                XmlNode::Text(text.into_owned())
            }
            Event::CData(data) => {
                if open.len() == 1 {
                    return Err(malformed("CDATA outside the root element"));
                }
                XmlNode::Text(utf8(&data)?.to_string())
            }
            Event::Eof => break,
            Event::Decl(_) if !at_start => {
                return Err(malformed("XML declaration not at start of document"));
            }
            Event::DocType(_) if seen_root || seen_doctype => {
                return Err(malformed("misplaced doctype"));
            }
            Event::DocType(_) => {
                seen_doctype = true;
                continue;
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) => continue,
        };

        let parent = *open.last().ok_or_else(|| malformed("no open element"))?;
        let mut parent = tree
            .get_mut(parent)
            .ok_or_else(|| malformed("dangling parent node"))?;
        let id = parent.append(node).id();
        if opens {
            open.push(id);
        }
    }

    if open.len() > 1 {
        return Err(malformed("unclosed element at end of input"));
    }
    if !seen_root {
        return Err(malformed("no root element"));
    }
    Ok(tree)
}
