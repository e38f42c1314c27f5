//! A small, owned svg document tree.
//!
//! Enough of xml to read designer exports, rewrite them, and write them back
//! out deterministically. Attribute order is preserved as read.

use indexmap::IndexMap;
use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};

use crate::error::SvgError;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Element {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Element {
        self.children.push(Node::Element(child));
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// The name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Text directly inside this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn from_start(start: &BytesStart) -> Result<Element, SvgError> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attrs.insert(key, value);
        }
        Ok(element)
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in self.attrs.iter() {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in self.children.iter() {
            match child {
                Node::Element(e) => e.write_to(out),
                Node::Text(t) => out.push_str(&escape(t.as_str())),
                Node::Comment(c) => {
                    out.push_str("<!--");
                    out.push_str(c);
                    out.push_str("-->");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serialize this element and its subtree.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }
}

pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// A parsed svg file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Declarations, doctype and processing instructions ahead of the root,
    /// as raw markup.
    pub prolog: Vec<String>,
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Document {
        Document {
            prolog: Vec::new(),
            root,
        }
    }

    pub fn parse(xml: &str) -> Result<Document, SvgError> {
        let mut reader = Reader::from_str(xml);
        let mut prolog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let Some(element) = stack.pop() else {
                        return Err(SvgError::MismatchedTag(name));
                    };
                    if element.name != name {
                        return Err(SvgError::MismatchedTag(name));
                    }
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape()?.into_owned();
                        if !text.is_empty() {
                            parent.children.push(Node::Text(text));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        parent.children.push(Node::Text(text));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&comment).into_owned();
                        parent.children.push(Node::Comment(text));
                    }
                }
                Event::Decl(decl) => {
                    prolog.push(format!("<?{}?>", String::from_utf8_lossy(&decl)));
                }
                Event::PI(pi) => {
                    prolog.push(format!("<?{}?>", String::from_utf8_lossy(&pi)));
                }
                Event::DocType(doctype) => {
                    prolog.push(format!("<!DOCTYPE {}>", String::from_utf8_lossy(&doctype)));
                }
                Event::Eof => break,
                #[allow(unreachable_patterns)]
                _ => (),
            }
        }
        if let Some(open) = stack.pop() {
            return Err(SvgError::Unclosed(open.name));
        }
        let root = root.ok_or(SvgError::NoRoot)?;
        Ok(Document { prolog, root })
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for item in self.prolog.iter() {
            out.push_str(item);
        }
        self.root.write_to(&mut out);
        out
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        // only the first top level element counts
        None if root.is_none() => *root = Some(element),
        None => (),
    }
}
