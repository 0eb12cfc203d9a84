//! Text and JSON views of a node tree.
//!
//! [`dump_tree`] writes the indented format used by the html5lib
//! tree-construction tests, which makes parser output easy to compare in
//! tests and readable on a terminal.

use std::fmt::Write as _;

use serde_json::{Map, Value, json};
use wren_dom::{DomTree, ElementData, Namespace, NodeId, NodeType};

/// Dump the children of `id`, one node per line.
///
/// ```
/// let document = wren_html::parse_str("<p class=x>Hi");
/// let dump = wren_html::serialize::dump_tree(&document.tree, document.tree.root());
/// assert_eq!(
///     dump,
///     "| <html>\n|   <head>\n|   <body>\n|     <p>\n|       class=\"x\"\n|       \"Hi\"\n"
/// );
/// ```
#[must_use]
pub fn dump_tree(tree: &DomTree, id: NodeId) -> String {
    dump_nodes(tree, tree.children(id))
}

/// Dump a list of sibling nodes, such as the nodes of a parsed fragment.
#[must_use]
pub fn dump_nodes(tree: &DomTree, nodes: &[NodeId]) -> String {
    let mut out = String::new();
    for &node in nodes {
        dump_node(tree, node, 0, &mut out);
    }
    out
}

fn line(out: &mut String, depth: usize, text: &str) {
    let _ = writeln!(out, "| {}{text}", "  ".repeat(depth));
}

fn dump_node(tree: &DomTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document | NodeType::DocumentFragment => {
            for &child in &node.children {
                dump_node(tree, child, depth, out);
            }
            return;
        }
        NodeType::DocumentType {
            name,
            public_id,
            system_id,
        } => {
            if public_id.is_empty() && system_id.is_empty() {
                line(out, depth, &format!("<!DOCTYPE {name}>"));
            } else {
                line(
                    out,
                    depth,
                    &format!("<!DOCTYPE {name} \"{public_id}\" \"{system_id}\">"),
                );
            }
        }
        NodeType::Element(element) => {
            line(out, depth, &format!("<{}>", element_label(element)));
            for (name, value) in sorted_attributes(element) {
                line(out, depth + 1, &format!("{name}=\"{value}\""));
            }
            if let Some(contents) = element.template_contents {
                line(out, depth + 1, "content");
                for &child in tree.children(contents) {
                    dump_node(tree, child, depth + 2, out);
                }
            }
        }
        NodeType::Text(data) => line(out, depth, &format!("\"{data}\"")),
        NodeType::Comment(data) => line(out, depth, &format!("<!-- {data} -->")),
    }
    for &child in &node.children {
        dump_node(tree, child, depth + 1, out);
    }
}

/// `div` for HTML elements, `svg path` / `math mi` for foreign ones.
fn element_label(element: &ElementData) -> String {
    if element.namespace == Namespace::Html {
        element.local_name.clone()
    } else {
        format!("{} {}", element.namespace, element.local_name)
    }
}

/// Attributes sorted by displayed name. Namespaced ones show as
/// `xlink href`.
fn sorted_attributes(element: &ElementData) -> Vec<(String, &str)> {
    let mut attrs: Vec<(String, &str)> = element
        .attrs
        .iter()
        .map(|attr| {
            let name = match attr.namespace {
                Some(namespace) => format!("{namespace} {}", attr.name),
                None => attr.name.clone(),
            };
            (name, attr.value.as_str())
        })
        .collect();
    attrs.sort_by(|a, b| a.0.cmp(&b.0));
    attrs
}

/// A JSON rendering of the subtree at `id`.
#[must_use]
pub fn to_json(tree: &DomTree, id: NodeId) -> Value {
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };
    let children = || -> Vec<Value> {
        node.children
            .iter()
            .map(|&child| to_json(tree, child))
            .collect()
    };
    match &node.node_type {
        NodeType::Document => json!({ "type": "document", "children": children() }),
        NodeType::DocumentFragment => json!({ "type": "fragment", "children": children() }),
        NodeType::DocumentType {
            name,
            public_id,
            system_id,
        } => json!({
            "type": "doctype",
            "name": name,
            "publicId": public_id,
            "systemId": system_id,
        }),
        NodeType::Element(element) => {
            let attributes: Map<String, Value> = sorted_attributes(element)
                .into_iter()
                .map(|(name, value)| (name, Value::from(value)))
                .collect();
            let mut value = json!({
                "type": "element",
                "name": element.local_name,
                "namespace": element.namespace.url(),
                "attributes": attributes,
                "children": children(),
            });
            if let Some(contents) = element.template_contents
                && let Some(object) = value.as_object_mut()
            {
                let _ = object.insert("content".to_string(), to_json(tree, contents));
            }
            value
        }
        NodeType::Text(data) => json!({ "type": "text", "data": data }),
        NodeType::Comment(data) => json!({ "type": "comment", "data": data }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren_dom::Attribute;

    #[test]
    fn foreign_elements_and_attributes_carry_their_namespace() {
        let mut tree = DomTree::new();
        let mut svg = ElementData::new("svg", Namespace::Svg);
        let mut href = Attribute::new("href", "#a");
        href.namespace = Some(Namespace::XLink);
        href.prefix = Some("xlink".to_string());
        svg.attrs.push(href);
        svg.attrs.push(Attribute::new("class", "c"));
        let svg = tree.alloc(NodeType::Element(svg));
        tree.append_child(NodeId::ROOT, svg).unwrap();

        assert_eq!(
            dump_tree(&tree, NodeId::ROOT),
            "| <svg svg>\n|   class=\"c\"\n|   xlink href=\"#a\"\n"
        );
    }

    #[test]
    fn json_lists_children_in_order() {
        let mut tree = DomTree::new();
        let comment = tree.alloc(NodeType::Comment("x".to_string()));
        tree.append_child(NodeId::ROOT, comment).unwrap();
        let value = to_json(&tree, NodeId::ROOT);
        assert_eq!(value["type"], "document");
        assert_eq!(value["children"][0]["data"], "x");
    }
}
