//! Order-preserving XML tree codec for slide parts.
//!
//! Slide XML is parsed into a typed tree and serialized back with
//! element order, attribute order, and whitespace-exact text content
//! intact. Namespace prefixes are opaque parts of the name string; no
//! namespace resolution happens here.
//!
//! Round-trip law: for any bytes produced by [`XmlDocument::to_bytes`],
//! parsing and re-serializing yields the same bytes. Third-party input
//! using equivalent-but-differently-spelled constructs (entity choice,
//! `<x></x>` vs `<x/>`) normalizes on the first pass and is stable from
//! then on; the parsed *form* of an empty element is preserved rather
//! than collapsed.

use deck_core::{Error, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// One node of a parsed slide document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// An element with its ordered attributes and children.
    Element(XmlElement),
    /// Character data, unescaped. Whitespace-only values are kept.
    Text(String),
    /// A CDATA section, raw.
    CData(String),
    /// A comment, raw (without the `<!--` / `-->` delimiters).
    Comment(String),
}

/// An element: tag name (prefix included, verbatim), attributes in
/// declaration order, children in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Whether the source spelled this element self-closing (`<x/>`).
    /// Only consulted when there are no children.
    self_closing: bool,
}

impl XmlElement {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }
}

/// The XML declaration, kept so the prolog survives the round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
struct XmlDeclInfo {
    version: String,
    encoding: Option<String>,
    standalone: Option<String>,
}

/// A parsed slide document: optional declaration, whitespace around the
/// root, and the root element itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    decl: Option<XmlDeclInfo>,
    /// Whitespace between the declaration and the root element.
    prolog_gap: String,
    root: XmlElement,
    /// Whitespace after the root element.
    trailing: String,
}

impl XmlDocument {
    /// Parse a slide part.
    ///
    /// Fails with [`Error::XmlError`] on invalid UTF-8, unbalanced
    /// tags, missing or multiple roots, and prolog constructs this
    /// codec does not model (DOCTYPE, processing instructions). The
    /// caller treats a parse failure as "leave this entry untouched".
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| Error::XmlError(format!("Invalid UTF-8: {}", e)))?;

        let mut reader = Reader::from_str(content);
        let mut decl = None;
        let mut prolog_gap = String::new();
        let mut trailing = String::new();
        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Decl(ref d)) if root.is_none() && stack.is_empty() => {
                    decl = Some(decl_info(d)?);
                }
                Ok(Event::Start(ref e)) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(Error::XmlError("Multiple root elements".into()));
                    }
                    stack.push(element_from(e)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let mut element = element_from(e)?;
                    element.self_closing = true;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::XmlError("Unexpected closing tag".into()))?;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Ok(Event::Text(ref t)) => {
                    let value = t
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad text content: {}", e)))?
                        .into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(value));
                    } else if value.trim().is_empty() {
                        if root.is_none() {
                            prolog_gap.push_str(&value);
                        } else {
                            trailing.push_str(&value);
                        }
                    } else {
                        return Err(Error::XmlError("Text outside root element".into()));
                    }
                }
                Ok(Event::CData(c)) => {
                    let value = String::from_utf8(c.into_inner().into_owned())
                        .map_err(|e| Error::XmlError(format!("Invalid CDATA: {}", e)))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::CData(value)),
                        None => return Err(Error::XmlError("CDATA outside root element".into())),
                    }
                }
                Ok(Event::Comment(ref c)) => {
                    let value = String::from_utf8(c.to_vec())
                        .map_err(|e| Error::XmlError(format!("Invalid comment: {}", e)))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Comment(value)),
                        None => {
                            return Err(Error::XmlError("Comment outside root element".into()))
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {
                    return Err(Error::XmlError(
                        "Unsupported XML construct (DOCTYPE or processing instruction)".into(),
                    ));
                }
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        if !stack.is_empty() {
            return Err(Error::XmlError("Unexpected end of document".into()));
        }

        let root = root.ok_or_else(|| Error::XmlError("No root element".into()))?;

        Ok(Self {
            decl,
            prolog_gap,
            root,
            trailing,
        })
    }

    /// The root element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// The root element, mutably.
    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    /// Serialize back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        if let Some(decl) = &self.decl {
            let event = BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            );
            writer
                .write_event(Event::Decl(event))
                .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)))?;
        }
        write_raw_text(&mut writer, &self.prolog_gap)?;
        write_element(&mut writer, &self.root)?;
        write_raw_text(&mut writer, &self.trailing)?;

        Ok(writer.into_inner().into_inner())
    }
}

/// Attach a completed node to its parent, or install it as the root.
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match (node, root.is_some()) {
        (XmlNode::Element(element), false) => {
            *root = Some(element);
            Ok(())
        }
        _ => Err(Error::XmlError("Multiple root elements".into())),
    }
}

fn element_from(e: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::XmlError(format!("Bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::XmlError(format!("Bad attribute value: {}", e)))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        self_closing: false,
    })
}

fn decl_info(d: &BytesDecl) -> Result<XmlDeclInfo> {
    let version = d
        .version()
        .map_err(|e| Error::XmlError(format!("Bad XML declaration: {}", e)))?;
    let version = String::from_utf8_lossy(&version).into_owned();

    let encoding = match d.encoding() {
        Some(value) => Some(
            String::from_utf8_lossy(
                &value.map_err(|e| Error::XmlError(format!("Bad XML declaration: {}", e)))?,
            )
            .into_owned(),
        ),
        None => None,
    };

    let standalone = match d.standalone() {
        Some(value) => Some(
            String::from_utf8_lossy(
                &value.map_err(|e| Error::XmlError(format!("Bad XML declaration: {}", e)))?,
            )
            .into_owned(),
        ),
        None => None,
    };

    Ok(XmlDeclInfo {
        version,
        encoding,
        standalone,
    })
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.self_closing {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)))?;

    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(value) => writer
                .write_event(Event::Text(BytesText::new(value)))
                .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)))?,
            XmlNode::CData(value) => writer
                .write_event(Event::CData(BytesCData::new(value)))
                .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)))?,
            XmlNode::Comment(value) => writer
                .write_event(Event::Comment(BytesText::from_escaped(value.as_str())))
                .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)))?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)))
}

/// Emit already-literal whitespace without re-escaping.
fn write_raw_text<W: std::io::Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    writer
        .write_event(Event::Text(BytesText::from_escaped(text)))
        .map_err(|e| Error::XmlError(format!("Failed to serialize XML: {}", e)))
}
