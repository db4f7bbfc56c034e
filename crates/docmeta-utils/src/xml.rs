//! Mutable XML document tree built on quick-xml.
//!
//! Only what metadata parts need: parse with namespace resolution, find
//! elements the way DOM `getElementsByTagName[NS]` does, replace text, append
//! children and write the tree back out.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use thiserror::Error;

/// Declaration prepended to serialized parts that lack one.
pub const XML_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Syntax(String),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("second root element <{0}>")]
    MultipleRoots(String),
}

pub type XmlResult<T> = std::result::Result<T, XmlError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    Declaration(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Element with no namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element in namespace `uri` with qualified name `name` (`prefix:local` or `local`).
    pub fn new_ns(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(uri.into()),
            ..Self::new(name)
        }
    }

    fn from_start(start: &BytesStart<'_>, namespace: Option<String>) -> XmlResult<Self> {
        let mut element = Self::new(String::from_utf8_lossy(start.name().as_ref()));
        element.namespace = namespace;
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Syntax(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Syntax(e.to_string()))?
                .into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }

    /// Qualified name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Replace all children with a single text node (none for an empty value).
    pub fn set_text(&mut self, value: &str) {
        self.children.clear();
        if !value.is_empty() {
            self.children.push(Node::Text(value.to_string()));
        }
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// First element in document order (self included) matching `pred`.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find(pred))
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(&*self) {
            return Some(self);
        }
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                if let Some(found) = el.find_mut(pred) {
                    return Some(found);
                }
            }
        }
        None
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(t) | Node::CData(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
            _ => {}
        }
    }
}

/// A parsed XML document: prolog nodes, one root element, trailing nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl XmlDocument {
    pub fn parse(xml: &str) -> XmlResult<Self> {
        let mut reader = NsReader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader
                .read_resolved_event()
                .map_err(|e| XmlError::Syntax(e.to_string()))?;
            // Unknown prefixes are kept unbound; tag-name lookups still find them.
            let namespace = match resolved {
                ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
                _ => None,
            };

            let node = match event {
                Event::Start(e) => {
                    stack.push(Element::from_start(&e, namespace)?);
                    continue;
                }
                Event::Empty(e) => Node::Element(Element::from_start(&e, namespace)?),
                Event::End(e) => match stack.pop() {
                    Some(el) => Node::Element(el),
                    None => {
                        return Err(XmlError::UnexpectedEnd(
                            String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        ))
                    }
                },
                Event::Text(e) => Node::Text(
                    e.unescape()
                        .map_err(|err| XmlError::Syntax(err.to_string()))?
                        .into_owned(),
                ),
                Event::CData(e) => Node::CData(String::from_utf8_lossy(&e).into_owned()),
                Event::Comment(e) => Node::Comment(String::from_utf8_lossy(&e).into_owned()),
                Event::PI(e) => {
                    Node::ProcessingInstruction(String::from_utf8_lossy(&e).into_owned())
                }
                Event::Decl(e) => Node::Declaration(String::from_utf8_lossy(&e).into_owned()),
                Event::DocType(e) => Node::DocType(String::from_utf8_lossy(&e).into_owned()),
                Event::Eof => break,
            };

            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
                continue;
            }
            match (node, root.is_some()) {
                (Node::Element(el), false) => root = Some(el),
                (Node::Element(el), true) => return Err(XmlError::MultipleRoots(el.name)),
                (other, false) => prolog.push(other),
                (other, true) => epilog.push(other),
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        let root = root.ok_or(XmlError::NoRoot)?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn has_declaration(&self) -> bool {
        self.prolog
            .iter()
            .any(|n| matches!(n, Node::Declaration(_)))
    }

    /// First element with namespace `uri` and local name `local`.
    pub fn find_by_namespace(&self, uri: &str, local: &str) -> Option<&Element> {
        self.root
            .find(&|e: &Element| e.namespace() == Some(uri) && e.local_name() == local)
    }

    pub fn find_by_namespace_mut(&mut self, uri: &str, local: &str) -> Option<&mut Element> {
        self.root
            .find_mut(&|e: &Element| e.namespace() == Some(uri) && e.local_name() == local)
    }

    /// First element whose qualified name is exactly `name`.
    pub fn find_by_tag(&self, name: &str) -> Option<&Element> {
        self.root.find(&|e: &Element| e.name() == name)
    }

    pub fn find_by_tag_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.root.find_mut(&|e: &Element| e.name() == name)
    }

    /// Serialize the tree. A declaration is written only if the source had one,
    /// and its `encoding` is rewritten to UTF-8 to match the returned text.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        for node in &self.prolog {
            write_node(node, &mut Vec::new(), &mut out);
        }
        write_element(&self.root, &mut Vec::new(), &mut out);
        for node in &self.epilog {
            write_node(node, &mut Vec::new(), &mut out);
        }
        out
    }
}

/// Prefix the canonical declaration and a CRLF unless `xml` already starts
/// with a declaration.
pub fn ensure_declaration(xml: String) -> String {
    if xml.starts_with("<?xml") {
        return xml;
    }
    let mut out = String::with_capacity(XML_DECLARATION.len() + 2 + xml.len());
    out.push_str(XML_DECLARATION);
    out.push_str("\r\n");
    out.push_str(&xml);
    out
}

/// In-scope namespace bindings: `(prefix, uri)`, empty prefix for the default namespace.
type Scope = Vec<(String, String)>;

fn bound_uri<'a>(scope: &'a Scope, prefix: &str) -> Option<&'a str> {
    scope
        .iter()
        .rev()
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.as_str())
}

fn write_node(node: &Node, scope: &mut Scope, out: &mut String) {
    match node {
        Node::Element(e) => write_element(e, scope, out),
        Node::Text(t) => out.push_str(&escape_xml_text(t)),
        Node::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        Node::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(t) => {
            out.push_str("<?");
            out.push_str(t);
            out.push_str("?>");
        }
        Node::Declaration(t) => {
            out.push_str("<?");
            out.push_str(&declare_utf8(t));
            out.push_str("?>");
        }
        Node::DocType(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t);
            out.push('>');
        }
    }
}

fn write_element(element: &Element, scope: &mut Scope, out: &mut String) {
    let scope_len = scope.len();
    for (key, value) in &element.attributes {
        if key == "xmlns" {
            scope.push((String::new(), value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((prefix.to_string(), value.clone()));
        }
    }

    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        push_attr(out, key, value);
    }

    // Elements created in memory may need their namespace declared here.
    let prefix = element.prefix().unwrap_or("");
    match element.namespace() {
        Some(uri) if bound_uri(scope, prefix) != Some(uri) => {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{}", prefix)
            };
            push_attr(out, &key, uri);
            scope.push((prefix.to_string(), uri.to_string()));
        }
        None if prefix.is_empty() && bound_uri(scope, "").is_some_and(|u| !u.is_empty()) => {
            push_attr(out, "xmlns", "");
            scope.push((String::new(), String::new()));
        }
        _ => {}
    }

    if element.children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        for child in &element.children {
            write_node(child, scope, out);
        }
        out.push_str("</");
        out.push_str(&element.name);
        out.push('>');
    }
    scope.truncate(scope_len);
}

/// Set the `encoding` pseudo-attribute of a declaration body to UTF-8.
/// Bodies without one, or already declaring UTF-8 in any case, are kept as is.
fn declare_utf8(decl: &str) -> String {
    let Some(pos) = decl.find("encoding") else {
        return decl.to_string();
    };
    let rest = decl[pos + "encoding".len()..].trim_start();
    let Some(value) = rest.strip_prefix('=').map(str::trim_start) else {
        return decl.to_string();
    };
    let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return decl.to_string();
    };
    let Some(len) = value[1..].find(quote) else {
        return decl.to_string();
    };
    let start = decl.len() - value.len() + 1;
    let end = start + len;
    if decl[start..end].eq_ignore_ascii_case("UTF-8") {
        return decl.to_string();
    }
    format!("{}UTF-8{}", &decl[..start], &decl[end..])
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape_xml_attr(value));
    out.push('"');
}

/// Escape special characters in XML text content.
pub fn escape_xml_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape special characters in XML attribute values.
pub fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
