//! Tests for DOM tree mutation methods: insert_before, remove_child, move_children.

use wren_dom::{Document, DomError, DomTree, ElementData, Namespace, NodeId, NodeType};

/// Helper to create an HTML element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag, Namespace::Html)))
}

/// Helper to build `ROOT > div` and return the div.
fn tree_with_parent() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();
    (tree, parent)
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let (mut tree, parent) = tree_with_parent();
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child).unwrap();

    tree.remove_child(parent, child).unwrap();

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let (mut tree, parent) = tree_with_parent();
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    for node in [a, b, c] {
        tree.append_child(parent, node).unwrap();
    }

    tree.remove_child(parent, b).unwrap();

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_with_wrong_parent_is_rejected() {
    let (mut tree, parent) = tree_with_parent();
    let child = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, child).unwrap();

    assert_eq!(
        tree.remove_child(parent, child),
        Err(DomError::NotFound(child))
    );
    assert_eq!(tree.parent(child), Some(NodeId::ROOT));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_reference() {
    let (mut tree, parent) = tree_with_parent();
    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a).unwrap();
    tree.append_child(parent, c).unwrap();

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, Some(c)).unwrap();

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.index_in_parent(b), Some(1));
}

#[test]
fn test_insert_moves_node_from_old_parent() {
    let (mut tree, parent) = tree_with_parent();
    let other = alloc_element(&mut tree, "section");
    tree.append_child(NodeId::ROOT, other).unwrap();
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child).unwrap();

    tree.append_child(other, child).unwrap();

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.children(other), &[child]);
    assert_eq!(tree.parent(child), Some(other));
}

#[test]
fn test_insert_rejects_cycles() {
    let (mut tree, parent) = tree_with_parent();
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child).unwrap();

    assert_eq!(
        tree.append_child(child, parent),
        Err(DomError::HierarchyRequest {
            parent: child,
            child: parent
        })
    );
    assert!(matches!(
        tree.append_child(parent, parent),
        Err(DomError::HierarchyRequest { .. })
    ));
    // Nothing moved.
    assert_eq!(tree.parent(parent), Some(NodeId::ROOT));
    assert_eq!(tree.children(parent), &[child]);
}

#[test]
fn test_insert_rejects_unknown_ids_and_foreign_references() {
    let (mut tree, parent) = tree_with_parent();
    let child = alloc_element(&mut tree, "p");
    let stranger = alloc_element(&mut tree, "span");

    assert_eq!(
        tree.append_child(parent, NodeId(999)),
        Err(DomError::NotFound(NodeId(999)))
    );
    assert_eq!(
        tree.insert_before(parent, child, Some(stranger)),
        Err(DomError::NotFound(stranger))
    );
}

// ========== move_children ==========

#[test]
fn test_move_children_preserves_order() {
    let (mut tree, from) = tree_with_parent();
    let to = alloc_element(&mut tree, "b");
    tree.append_child(NodeId::ROOT, to).unwrap();
    let existing = tree.alloc(NodeType::Text("0".to_string()));
    tree.append_child(to, existing).unwrap();

    let one = tree.alloc(NodeType::Text("1".to_string()));
    let two = alloc_element(&mut tree, "i");
    tree.append_child(from, one).unwrap();
    tree.append_child(from, two).unwrap();

    tree.move_children(from, to).unwrap();

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, one, two]);
    assert_eq!(tree.parent(two), Some(to));
    assert_eq!(tree.text_content(to), "01");
}

#[test]
fn test_move_children_into_own_descendant_is_rejected() {
    let (mut tree, parent) = tree_with_parent();
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child).unwrap();

    assert!(tree.move_children(parent, child).is_err());
    assert_eq!(tree.children(parent), &[child]);
}

// ========== navigation ==========

#[test]
fn test_ancestors_walk_to_the_document() {
    let (mut tree, parent) = tree_with_parent();
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child).unwrap();

    let ancestors: Vec<NodeId> = tree.ancestors(child).collect();
    assert_eq!(ancestors, vec![parent, NodeId::ROOT]);
    assert!(tree.is_descendant_of(child, NodeId::ROOT));
    assert!(!tree.is_descendant_of(parent, child));
}

#[test]
fn test_document_accessors() {
    let mut document = Document::new();
    let tree = &mut document.tree;
    let doctype = tree.alloc(NodeType::DocumentType {
        name: "html".to_string(),
        public_id: String::new(),
        system_id: String::new(),
    });
    tree.append_child(NodeId::ROOT, doctype).unwrap();
    let html = alloc_element(tree, "html");
    let head = alloc_element(tree, "head");
    let body = alloc_element(tree, "body");
    tree.append_child(NodeId::ROOT, html).unwrap();
    tree.append_child(html, head).unwrap();
    tree.append_child(html, body).unwrap();

    assert_eq!(document.doctype(), Some(doctype));
    assert_eq!(document.document_element(), Some(html));
    assert_eq!(document.head(), Some(head));
    assert_eq!(document.body(), Some(body));
    assert_eq!(document.character_set, "utf-8");
}
