//! Element tree for EPUB content documents.
//!
//! EPUB chapters are XHTML, so they are parsed as XML with [`quick_xml`]
//! into a simple immutable tree: an [`Element`] has a lowercased tag name,
//! ordered attributes, and ordered children of elements and text spans.
//! The conversion engine walks this tree; nothing here interprets tags.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// A child of an [`Element`]: either a nested element or a raw text span.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A node of the parsed document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Lowercased tag name without namespace prefix (e.g. "p", "h1").
    pub name: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct element children, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First descendant element with the given tag name, depth-first.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendant elements with the given tag name, depth-first order.
    pub fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.name == name {
                out.push(child);
            }
            child.find_all(name, out);
        }
    }

    /// Concatenated raw text of all descendant text nodes, unmodified.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Append text, merging with a trailing text node if present.
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

/// Parse an XHTML document into an element tree.
///
/// Returns a synthetic root element whose children are the document's
/// top-level nodes; callers usually look up `body` beneath it. Parse errors
/// (mismatched or unclosed tags, invalid syntax) are returned so that a
/// single bad chapter can be skipped without aborting the whole book.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);

    // Text is kept untrimmed: inline whitespace collapsing is a rendering
    // concern, not a parsing one.
    let mut stack: Vec<Element> = vec![Element::new("#document")];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(element_from(&e));
            }
            Ok(Event::Empty(e)) => {
                let el = element_from(&e);
                attach(&mut stack, el)?;
            }
            Ok(Event::End(_)) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| Error::MalformedDocument("unbalanced end tag".into()))?;
                if stack.is_empty() {
                    return Err(Error::MalformedDocument("unbalanced end tag".into()));
                }
                attach(&mut stack, el)?;
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(e.as_ref()).into_owned();
                if let Some(top) = stack.last_mut() {
                    top.push_text(&raw);
                }
            }
            Ok(Event::CData(e)) => {
                let raw = String::from_utf8_lossy(e.as_ref()).into_owned();
                if let Some(top) = stack.last_mut() {
                    top.push_text(&raw);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity)
                    && let Some(top) = stack.last_mut()
                {
                    let mut buf = [0u8; 4];
                    top.push_text(resolved.encode_utf8(&mut buf));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(Error::MalformedDocument(format!(
            "{} unclosed element(s) at end of document",
            stack.len() - 1
        )));
    }

    stack
        .pop()
        .ok_or_else(|| Error::MalformedDocument("empty document".into()))
}

fn attach(stack: &mut Vec<Element>, el: Element) -> Result<()> {
    stack
        .last_mut()
        .ok_or_else(|| Error::MalformedDocument("unbalanced end tag".into()))?
        .children
        .push(Node::Element(el));
    Ok(())
}

fn element_from(e: &BytesStart) -> Element {
    let name = e.name();
    let local = local_name(name.as_ref());
    let mut element = Element::new(String::from_utf8_lossy(local).to_ascii_lowercase());

    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(local_name(attr.key.as_ref())).to_ascii_lowercase();
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        element.attrs.push((key, value));
    }

    element
}

/// Resolve a named or numeric character reference.
///
/// The predefined XML entities plus `nbsp` (ubiquitous in EPUB content)
/// are handled; unknown names are dropped.
fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            // Numeric character references: &#8212; or &#x2014;
            let code = entity.strip_prefix('#')?;
            let value = if let Some(hex) = code.strip_prefix('x').or_else(|| code.strip_prefix('X'))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                code.parse().ok()?
            };
            char::from_u32(value)
        }
    }
}

/// Extract local name from potentially namespaced XML name
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_text() {
        let root = parse_document("<p>Hello <b>world</b>!</p>").unwrap();
        let p = root.find("p").unwrap();
        assert_eq!(p.children.len(), 3);
        assert_eq!(p.children[0], Node::Text("Hello ".into()));
        let b = p.find("b").unwrap();
        assert_eq!(b.text_content(), "world");
        assert_eq!(p.children[2], Node::Text("!".into()));
    }

    #[test]
    fn lowercases_names_and_keeps_attr_order() {
        let root = parse_document(r#"<IMG SRC="a.png" alt="Alt" class="x"/>"#).unwrap();
        let img = root.find("img").unwrap();
        assert_eq!(img.attr("src"), Some("a.png"));
        assert_eq!(img.attrs[0].0, "src");
        assert_eq!(img.attrs[2].0, "class");
    }

    #[test]
    fn strips_namespace_prefixes() {
        let root = parse_document(r#"<html:body><html:p>x</html:p></html:body>"#).unwrap();
        assert!(root.find("body").is_some());
        assert!(root.find("p").is_some());
    }

    #[test]
    fn resolves_entities() {
        let root = parse_document("<p>Tom &amp; Jerry&nbsp;&#8212;&#x2014;</p>").unwrap();
        let p = root.find("p").unwrap();
        assert_eq!(p.text_content(), "Tom & Jerry\u{a0}\u{2014}\u{2014}");
    }

    #[test]
    fn merges_adjacent_text_nodes() {
        let root = parse_document("<p>a&amp;b</p>").unwrap();
        let p = root.find("p").unwrap();
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0], Node::Text("a&b".into()));
    }

    #[test]
    fn rejects_unclosed_elements() {
        assert!(parse_document("<p><b>text</p>").is_err());
        assert!(parse_document("<p>never closed").is_err());
    }

    #[test]
    fn find_all_gathers_descendants_in_order() {
        let root =
            parse_document("<table><thead><tr/></thead><tbody><tr/><tr/></tbody></table>").unwrap();
        let table = root.find("table").unwrap();
        let mut rows = Vec::new();
        table.find_all("tr", &mut rows);
        assert_eq!(rows.len(), 3);
    }
}
