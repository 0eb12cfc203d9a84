//! Errors raised by tree mutation.

use thiserror::Error;

use crate::NodeId;

/// A rejected tree mutation.
///
/// [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomError {
    /// "If node is a host-including inclusive ancestor of parent, then throw a
    /// HierarchyRequestError."
    #[error("cannot insert node {child:?} under {parent:?}: it would create a cycle")]
    HierarchyRequest {
        /// The would-be parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },
    /// "If child is non-null and its parent is not parent, then throw a
    /// NotFoundError."
    #[error("node {0:?} is not in this tree or not a child of the given parent")]
    NotFound(NodeId),
}
