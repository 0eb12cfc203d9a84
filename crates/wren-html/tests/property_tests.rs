//! Property tests: the parser accepts any input.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use wren_dom::{Document, NodeId, NodeType};
use wren_html::serialize::dump_tree;
use wren_html::{FragmentContext, parse, parse_fragment, parse_str};

/// Markup-heavy strings shake out more tree builder paths than random text.
fn markup_from(pieces: &[u8]) -> String {
    const SNIPPETS: &[&str] = &[
        "<p>", "</p>", "<b>", "</b>", "<i>", "</a>", "<a href=x>", "<table>", "<tr>", "<td>",
        "</table>", "<select>", "<option>", "<svg>", "</svg>", "<math>", "<mi>", "<template>",
        "</template>", "<frameset>", "<!--c-->", "<!DOCTYPE html>", "&amp;", "&#x80;", "text",
        " ", "\r\n", "\0", "<script>", "</script>", "<textarea>", "<font color=red>", "</body>",
        "<html>", "<br/>", "<![CDATA[x]]>",
    ];
    pieces
        .iter()
        .map(|&piece| SNIPPETS[usize::from(piece) % SNIPPETS.len()])
        .collect()
}

fn no_carriage_returns(document: &Document) -> bool {
    (0..document.tree.len()).all(|index| match document.tree.get(NodeId(index)) {
        Some(node) => match &node.node_type {
            NodeType::Text(data) | NodeType::Comment(data) => !data.contains('\r'),
            _ => true,
        },
        None => true,
    })
}

#[quickcheck]
fn parsing_bytes_never_panics_and_keeps_the_skeleton(bytes: Vec<u8>) -> bool {
    let document = parse(&bytes);
    document.document_element().is_some()
}

#[quickcheck]
fn parsing_is_deterministic(pieces: Vec<u8>) -> bool {
    let markup = markup_from(&pieces);
    let first = parse_str(&markup);
    let second = parse_str(&markup);
    dump_tree(&first.tree, NodeId::ROOT) == dump_tree(&second.tree, NodeId::ROOT)
        && first.had_errors == second.had_errors
        && first.quirks_mode == second.quirks_mode
}

#[quickcheck]
fn decoded_text_never_contains_carriage_returns(bytes: Vec<u8>) -> bool {
    no_carriage_returns(&parse(&bytes))
}

#[quickcheck]
fn markup_text_never_contains_carriage_returns(pieces: Vec<u8>) -> bool {
    no_carriage_returns(&parse_str(&markup_from(&pieces)))
}

#[quickcheck]
fn fragments_never_panic(pieces: Vec<u8>, context: u8) -> TestResult {
    const CONTEXTS: &[&str] = &["div", "td", "tr", "table", "select", "title", "template", "body"];
    let context = FragmentContext::html(CONTEXTS[usize::from(context) % CONTEXTS.len()]);
    let fragment = parse_fragment(&markup_from(&pieces), &context);
    // Every top-level node resolves in the returned tree.
    TestResult::from_bool(
        fragment
            .nodes
            .iter()
            .all(|&node| fragment.tree.get(node).is_some()),
    )
}
