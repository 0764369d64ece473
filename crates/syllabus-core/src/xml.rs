//! Mutable XML tree over quick-xml events
//!
//! Only as much structure as template filling needs: elements keep their raw
//! start tag, text stays in its escaped source form, and everything else
//! (declaration, comments, CDATA, processing instructions) is carried through
//! as the original event.

use std::borrow::Cow;

use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::DocxError;

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    /// Escaped character data, exactly as it appears in the source
    Text(String),
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            start: BytesStart::new(name),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    /// Qualified tag name, prefix included (`w:p`)
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|attr| attr.key.as_ref() == key.as_bytes())
            .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.is(name))
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|el| el.is(name))
    }

    /// Keep only child elements whose name is in `names`; text and other
    /// nodes are dropped as well.
    pub fn retain_elements(&mut self, names: &[&str]) {
        self.children.retain(|node| match node {
            Node::Element(el) => names.iter().any(|name| el.is(name)),
            _ => false,
        });
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Append literal text, escaping it for output
    pub fn push_text(&mut self, text: &str) {
        self.children.push(Node::Text(partial_escape(text).into_owned()));
    }

    /// Unescaped concatenation of this element's direct text children
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(raw) = node {
                out.push_str(&unescape_lossy(raw));
            }
        }
        out
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), DocxError> {
        if self.children.is_empty() {
            return write_event(writer, Event::Empty(self.start.borrow()));
        }

        write_event(writer, Event::Start(self.start.borrow()))?;
        for child in &self.children {
            child.write_to(writer)?;
        }
        write_event(writer, Event::End(self.start.to_end()))
    }
}

impl Node {
    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), DocxError> {
        match self {
            Node::Element(el) => el.write_to(writer),
            Node::Text(raw) => {
                if let Some(ch) = raw.chars().find(|&ch| !is_xml_char(ch)) {
                    return Err(DocxError::Xml(format!(
                        "text contains U+{:04X}, which XML 1.0 does not allow",
                        u32::from(ch)
                    )));
                }
                write_event(writer, Event::Text(BytesText::from_escaped(raw.as_str())))
            }
            Node::Other(event) => write_event(writer, event.clone()),
        }
    }
}

/// A parsed XML part
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
}

impl XmlTree {
    pub fn parse(xml: &str) -> Result<Self, DocxError> {
        let mut reader = Reader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                DocxError::Xml(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            match event {
                Event::Start(start) => open.push(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                }),
                Event::Empty(start) => attach(
                    &mut open,
                    &mut nodes,
                    Node::Element(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                    }),
                ),
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| DocxError::Xml("unbalanced end tag".into()))?;
                    attach(&mut open, &mut nodes, Node::Element(element));
                }
                Event::Text(text) => {
                    let raw = std::str::from_utf8(&text)
                        .map_err(|_| DocxError::Encoding("text node".into()))?;
                    attach_text(&mut open, &mut nodes, raw);
                }
                Event::GeneralRef(reference) => {
                    let name = std::str::from_utf8(&reference)
                        .map_err(|_| DocxError::Encoding("entity reference".into()))?;
                    attach_text(&mut open, &mut nodes, &format!("&{};", name));
                }
                Event::Eof => break,
                other => attach(&mut open, &mut nodes, Node::Other(other.into_owned())),
            }
        }

        if !open.is_empty() {
            return Err(DocxError::Xml(format!("{} unclosed element(s)", open.len())));
        }

        Ok(Self { nodes })
    }

    /// First top-level element
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            node.write_to(&mut writer)?;
        }
        Ok(writer.into_inner())
    }
}

fn attach(open: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

fn attach_text(open: &mut [Element], nodes: &mut Vec<Node>, raw: &str) {
    let siblings = match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => nodes,
    };
    match siblings.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(raw),
        _ => siblings.push(Node::Text(raw.to_string())),
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), DocxError> {
    writer
        .write_event(event)
        .map_err(|e| DocxError::Xml(format!("write failed: {}", e)))
}

/// XML 1.0 `Char`: C0 controls other than tab, LF and CR are excluded,
/// as are U+FFFE and U+FFFF.
fn is_xml_char(ch: char) -> bool {
    !matches!(
        ch,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

// Entities outside the predefined five only appear with a DTD, which
// WordprocessingML parts never carry; keep such text verbatim.
fn unescape_lossy(raw: &str) -> Cow<'_, str> {
    unescape(raw).unwrap_or(Cow::Borrowed(raw))
}
