// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML utilities for WebDAV/CalDAV processing: namespace prefixes, a
//! namespace-resolved element tree, and an indenting writer.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::Cursor;
use std::sync::{LazyLock, PoisonError, RwLock};

use quick_xml::Writer;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{NamespaceResolver, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::ParseError;

/// XML namespaces used in WebDAV and its extensions.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CalDAV` namespace.
    pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

    /// `CardDAV` namespace.
    pub const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";

    /// Yahoo! extension namespace.
    pub const YAHOO: &str = "http://yahoo.com/ns/";
}

static PREFIXES: LazyLock<RwLock<HashMap<String, String>>> = LazyLock::new(|| {
    let defaults = [
        (ns::DAV, "D"),
        (ns::CALDAV, "C"),
        (ns::CARDDAV, "CR"),
        (ns::YAHOO, "Y"),
    ];
    RwLock::new(
        defaults
            .into_iter()
            .map(|(namespace, prefix)| (namespace.to_string(), prefix.to_string()))
            .collect(),
    )
});

/// Registers the prefix used when serializing elements of `namespace`.
///
/// Call this during setup, before any request is built.
pub fn set_prefix(namespace: &str, prefix: &str) {
    PREFIXES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(namespace.to_string(), prefix.to_string());
}

/// Returns the prefix registered for `namespace`.
#[must_use]
pub fn prefix(namespace: &str) -> Option<String> {
    PREFIXES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(namespace)
        .cloned()
}

/// A node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A child element.
    Element(Element),
    /// Character data, with entities resolved and adjacent runs merged.
    Text(String),
}

/// An element with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    #[must_use]
    pub fn new(namespace: Option<&str>, name: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Local name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI, if the element is namespaced.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether this element is `name` in `namespace`.
    #[must_use]
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Whether this element belongs to `namespace`.
    #[must_use]
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }

    /// All child nodes in document order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Looks up an attribute by local name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated character data of the direct children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Appends a child element.
    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Appends character data, merging it with a preceding text node.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name)
    }
}

/// Parses `bytes` into an element tree and returns the root.
///
/// # Errors
///
/// Returns [`ParseError::ParserFailed`] for malformed input and
/// [`ParseError::EmptyDocument`] when there is no root element.
pub fn parse_document(bytes: &[u8]) -> Result<Element, ParseError> {
    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(parser_failed)? {
            Event::Start(ref e) => stack.push(open_element(reader.resolver(), e)?),
            Event::Empty(ref e) => {
                let element = open_element(reader.resolver(), e)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root)?;
                }
            }
            Event::Text(ref t) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&t.decode().map_err(parser_failed)?);
                }
            }
            Event::CData(ref t) => {
                if let Some(top) = stack.last_mut() {
                    top.push_text(&t.decode().map_err(parser_failed)?);
                }
            }
            Event::GeneralRef(ref r) => {
                if let Some(top) = stack.last_mut() {
                    match r.resolve_char_ref().map_err(parser_failed)? {
                        Some(ch) => top.push_text(ch.encode_utf8(&mut [0; 4])),
                        None => {
                            let name = r.decode().map_err(parser_failed)?;
                            let text = resolve_predefined_entity(&name).ok_or_else(|| {
                                ParseError::ParserFailed(format!("Entity '{name}' not defined"))
                            })?;
                            top.push_text(text);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::ParserFailed(
            "Premature end of data: unclosed element".to_string(),
        ));
    }
    root.ok_or(ParseError::EmptyDocument)
}

fn parser_failed(err: impl fmt::Display) -> ParseError {
    ParseError::ParserFailed(err.to_string())
}

fn utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(bytes).map_err(parser_failed)
}

fn open_element(
    resolver: &NamespaceResolver,
    start: &BytesStart<'_>,
) -> Result<Element, ParseError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(parser_failed)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let value = unescape(utf8(&attr.value)?).map_err(parser_failed)?;
        attributes.push((
            utf8(attr.key.local_name().as_ref())?.to_string(),
            value.into_owned(),
        ));
    }

    let (resolved, local) = resolver.resolve_element(start.name());
    let namespace = match resolved {
        ResolveResult::Bound(uri) => Some(utf8(uri.into_inner())?.to_string()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(ParseError::ParserFailed(format!(
                "Namespace prefix '{}' is not defined",
                String::from_utf8_lossy(&prefix)
            )));
        }
    };

    Ok(Element {
        namespace,
        name: utf8(local.as_ref())?.to_string(),
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.push_element(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(ParseError::ParserFailed(
            "Extra content at the end of the document".to_string(),
        ))
    }
}

/// Streams an indented XML document whose root declares a fixed set of
/// namespace prefixes.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
    prefixes: Vec<(String, String)>,
    root_written: bool,
}

impl fmt::Debug for XmlWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlWriter")
            .field("prefixes", &self.prefixes)
            .field("root_written", &self.root_written)
            .finish_non_exhaustive()
    }
}

impl XmlWriter {
    /// Creates a writer declaring `DAV:` plus every namespace in `namespaces`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Internal`] if a namespace has no registered prefix.
    pub fn new<'a>(namespaces: impl IntoIterator<Item = &'a str>) -> Result<Self, ParseError> {
        let mut uris: BTreeSet<&str> = namespaces.into_iter().collect();
        uris.remove(ns::DAV);

        let mut prefixes = Vec::with_capacity(uris.len() + 1);
        for uri in std::iter::once(ns::DAV).chain(uris) {
            let p = prefix(uri).ok_or_else(|| {
                ParseError::Internal(format!("No XML namespace prefix registered for '{uri}'"))
            })?;
            prefixes.push((uri.to_string(), p));
        }

        Ok(Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
            prefixes,
            root_written: false,
        })
    }

    fn qualify(&self, namespace: &str, name: &str) -> Result<String, ParseError> {
        self.prefixes
            .iter()
            .find(|(uri, _)| uri == namespace)
            .map(|(_, p)| format!("{p}:{name}"))
            .ok_or_else(|| {
                ParseError::Internal(format!(
                    "Namespace '{namespace}' of element <{name}> was not declared"
                ))
            })
    }

    fn open(&mut self, namespace: &str, name: &str) -> Result<BytesStart<'static>, ParseError> {
        let mut start = BytesStart::new(self.qualify(namespace, name)?);
        if !self.root_written {
            self.root_written = true;
            for (uri, p) in &self.prefixes {
                start.push_attribute((format!("xmlns:{p}").as_str(), uri.as_str()));
            }
        }
        Ok(start)
    }

    /// Writes a start tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is undeclared or writing fails.
    pub fn start(&mut self, namespace: &str, name: &str) -> Result<(), ParseError> {
        let start = self.open(namespace, name)?;
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    /// Writes an end tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is undeclared or writing fails.
    pub fn end(&mut self, namespace: &str, name: &str) -> Result<(), ParseError> {
        let qname = self.qualify(namespace, name)?;
        self.writer.write_event(Event::End(BytesEnd::new(qname)))?;
        Ok(())
    }

    /// Writes a self-closing element.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is undeclared or writing fails.
    pub fn empty(&mut self, namespace: &str, name: &str) -> Result<(), ParseError> {
        let start = self.open(namespace, name)?;
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    /// Writes a self-closing element carrying `attributes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is undeclared or writing fails.
    pub fn empty_with_attributes(
        &mut self,
        namespace: &str,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), ParseError> {
        let mut start = self.open(namespace, name)?;
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    /// Writes escaped character data.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn text(&mut self, text: &str) -> Result<(), ParseError> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Writes `<name>text</name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is undeclared or writing fails.
    pub fn text_element(
        &mut self,
        namespace: &str,
        name: &str,
        text: &str,
    ) -> Result<(), ParseError> {
        self.start(namespace, name)?;
        self.text(text)?;
        self.end(namespace, name)
    }

    /// Consumes the writer and returns the document bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}
