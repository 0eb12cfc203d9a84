//! The parse result handed to callers.

use strum_macros::Display;
use wren_common::issue::ParseIssue;

use crate::node::{NodeId, NodeType};
use crate::tree::DomTree;

/// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated ... mode ("no-quirks", "quirks", or
/// "limited-quirks")".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum QuirksMode {
    /// "no-quirks"
    #[default]
    #[strum(serialize = "no-quirks")]
    NoQuirks,
    /// "limited-quirks"
    #[strum(serialize = "limited-quirks")]
    LimitedQuirks,
    /// "quirks"
    #[strum(serialize = "quirks")]
    Quirks,
}

/// A parsed document: the node tree plus what the parser learned on the way.
#[derive(Debug, Clone)]
pub struct Document {
    /// The node tree. [`NodeId::ROOT`] is the Document node.
    pub tree: DomTree,
    /// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-encoding)
    /// The resolved encoding label, `"utf-8"` unless sniffing said otherwise.
    pub character_set: String,
    /// Document mode chosen from the doctype.
    pub quirks_mode: QuirksMode,
    /// True if any decode, tokenizer or tree-construction error occurred.
    pub had_errors: bool,
    /// Individual errors, populated only when issue collection is enabled.
    pub issues: Vec<ParseIssue>,
}

impl Document {
    /// An empty document with the default character set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: DomTree::new(),
            character_set: "utf-8".to_string(),
            quirks_mode: QuirksMode::NoQuirks,
            had_errors: false,
            issues: Vec::new(),
        }
    }

    /// The DocumentType child of the document, if one was inserted.
    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.tree
            .children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| {
                matches!(
                    self.tree.get(id).map(|n| &n.node_type),
                    Some(NodeType::DocumentType { .. })
                )
            })
    }

    /// The root element, normally `<html>`.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.document_element()
    }

    /// The `<head>` element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.tree.head()
    }

    /// The `<body>` or `<frameset>` element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.tree.body()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
