//! Node kinds and element payloads.

use strum_macros::Display;

/// A type-safe index into a [`DomTree`](crate::DomTree).
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// Parent links are stored as `NodeId`s rather than references, so a child
/// never owns its parent and the tree has no reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 1.2 Namespaces](https://infra.spec.whatwg.org/#namespaces)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Namespace {
    /// "The HTML namespace is `http://www.w3.org/1999/xhtml`."
    #[strum(serialize = "html")]
    Html,
    /// "The MathML namespace is `http://www.w3.org/1998/Math/MathML`."
    #[strum(serialize = "math")]
    MathMl,
    /// "The SVG namespace is `http://www.w3.org/2000/svg`."
    #[strum(serialize = "svg")]
    Svg,
    /// "The XLink namespace is `http://www.w3.org/1999/xlink`."
    #[strum(serialize = "xlink")]
    XLink,
    /// "The XML namespace is `http://www.w3.org/XML/1998/namespace`."
    #[strum(serialize = "xml")]
    Xml,
    /// "The XMLNS namespace is `http://www.w3.org/2000/xmlns/`."
    #[strum(serialize = "xmlns")]
    XmlNs,
}

impl Namespace {
    /// The namespace URI.
    #[must_use]
    pub const fn url(self) -> &'static str {
        match self {
            Self::Html => "http://www.w3.org/1999/xhtml",
            Self::MathMl => "http://www.w3.org/1998/Math/MathML",
            Self::Svg => "http://www.w3.org/2000/svg",
            Self::XLink => "http://www.w3.org/1999/xlink",
            Self::Xml => "http://www.w3.org/XML/1998/namespace",
            Self::XmlNs => "http://www.w3.org/2000/xmlns/",
        }
    }
}

/// A tree member.
///
/// Sibling relationships are derived from the parent's child list, so the
/// only stored links are the owning `children` vector and the non-owning
/// `parent` back-pointer.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    /// "Doctypes have an associated name, public ID, and system ID."
    DocumentType {
        /// The doctype name, empty when the token had none.
        name: String,
        /// The public identifier, empty when missing.
        public_id: String,
        /// The system identifier, empty when missing.
        system_id: String,
    },
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    ///
    /// Used for `<template>` contents.
    DocumentFragment,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
///
/// "Attr nodes have a namespace (null or a non-empty string), namespace
/// prefix (null or a non-empty string), local name (a non-empty string),
/// value (a string)".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Local name. For unadjusted attributes this is the full name as it
    /// appeared in the markup.
    pub name: String,
    /// Attribute value.
    pub value: String,
    /// Set only for the adjusted `xlink:`, `xml:` and `xmlns` attributes of
    /// foreign elements.
    pub namespace: Option<Namespace>,
    /// Namespace prefix, e.g. `xlink`.
    pub prefix: Option<String>,
}

impl Attribute {
    /// An attribute in no namespace.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            namespace: None,
            prefix: None,
        }
    }

    /// The qualified name, `prefix:name` when a prefix is set.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Element-specific data.
///
/// "Elements have an associated namespace, namespace prefix, local name"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name"
    pub local_name: String,
    /// The element's namespace.
    pub namespace: Namespace,
    /// Namespace prefix. The HTML parser never sets one.
    pub prefix: Option<String>,
    /// "An element has an associated attribute list", kept in insertion order.
    pub attrs: Vec<Attribute>,
    /// [§ 4.12.3](https://html.spec.whatwg.org/multipage/scripting.html#template-contents)
    /// The `DocumentFragment` holding a `<template>` element's contents.
    pub template_contents: Option<NodeId>,
}

impl ElementData {
    /// An element with no attributes.
    pub fn new(local_name: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            local_name: local_name.into(),
            namespace,
            prefix: None,
            attrs: Vec::new(),
            template_contents: None,
        }
    }

    /// Whether this is an element called `name` in `namespace`.
    #[must_use]
    pub fn is(&self, namespace: Namespace, name: &str) -> bool {
        self.namespace == namespace && self.local_name == name
    }

    /// Whether this is an HTML element called `name`.
    #[must_use]
    pub fn is_html(&self, name: &str) -> bool {
        self.is(Namespace::Html, name)
    }

    /// Look up an attribute value by (local) name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether an attribute with this name exists.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}
