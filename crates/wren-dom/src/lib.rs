//! Node tree for the Wren HTML parser.
//!
//! This crate provides an arena-based tree following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! Every node lives in a [`DomTree`] and is addressed by a [`NodeId`]. A
//! parent owns its ordered child list; the child's `parent` field is a plain
//! index, so there are no ownership cycles and no borrow juggling when the
//! parser moves subtrees around.

mod document;
mod error;
mod node;
mod tree;

pub use document::{Document, QuirksMode};
pub use error::DomError;
pub use node::{Attribute, ElementData, Namespace, Node, NodeId, NodeType};
pub use tree::{AncestorIterator, DomTree, PrecedingSiblingIterator};
