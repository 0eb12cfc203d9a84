//! Integration tests for tree construction.
//!
//! Expected trees use the html5lib tree-construction format produced by
//! `serialize::dump_tree`.

use wren_dom::{Namespace, NodeId, QuirksMode};
use wren_html::serialize::{dump_nodes, dump_tree};
use wren_html::{FragmentContext, ParserOptions, parse_fragment, parse_str, parse_with_options};

/// Parse a string and dump the whole document.
fn dump(input: &str) -> String {
    let document = parse_str(input);
    dump_tree(&document.tree, NodeId::ROOT)
}

/// Parse a fragment and dump its nodes.
fn dump_fragment(input: &str, context: &FragmentContext) -> String {
    let fragment = parse_fragment(input, context);
    dump_nodes(&fragment.tree, &fragment.nodes)
}

/// Build the expected dump from lines written without the `| ` prefix.
fn lines(expected: &[&str]) -> String {
    expected.iter().map(|line| format!("| {line}\n")).collect()
}

/// Expected dump for `<html><head></head><body>` + `body` lines, each of
/// which is indented under `<body>`.
fn in_body(body: &[&str]) -> String {
    let mut all = vec!["<html>".to_string(), "  <head>".to_string(), "  <body>".to_string()];
    all.extend(body.iter().map(|line| format!("    {line}")));
    all.iter().map(|line| format!("| {line}\n")).collect()
}

// ========== document structure ==========

#[test]
fn test_empty_document_gets_html_head_body() {
    assert_eq!(dump(""), lines(&["<html>", "  <head>", "  <body>"]));
}

#[test]
fn test_full_document() {
    let document = parse_str("<!DOCTYPE html><html><head><title>T</title></head><body><p>Hello</p></body></html>");
    assert!(!document.had_errors);
    assert_eq!(document.quirks_mode, QuirksMode::NoQuirks);
    assert_eq!(
        dump_tree(&document.tree, NodeId::ROOT),
        lines(&[
            "<!DOCTYPE html>",
            "<html>",
            "  <head>",
            "    <title>",
            "      \"T\"",
            "  <body>",
            "    <p>",
            "      \"Hello\"",
        ])
    );
}

#[test]
fn test_comments_outside_html() {
    assert_eq!(
        dump("<!--a--><html></html><!--b-->"),
        lines(&["<!-- a -->", "<html>", "  <head>", "  <body>", "<!-- b -->"])
    );
}

#[test]
fn test_whitespace_between_head_and_body() {
    assert_eq!(
        dump("<html><head></head> <body></body></html>"),
        lines(&["<html>", "  <head>", "  \" \"", "  <body>"])
    );
}

#[test]
fn test_text_after_body_end_tag_goes_into_body() {
    assert_eq!(dump("<p>a</body>b"), in_body(&["<p>", "  \"ab\""]));
}

#[test]
fn test_second_html_tag_merges_attributes() {
    let document = parse_str("<html lang=en><body><html lang=fr dir=ltr>");
    let html = document.document_element().unwrap();
    let element = document.tree.as_element(html).unwrap();
    assert_eq!(element.attr("lang"), Some("en"));
    assert_eq!(element.attr("dir"), Some("ltr"));
    assert!(document.had_errors);
}

#[test]
fn test_head_elements_after_head_are_moved_into_head() {
    let document = parse_str("<head></head><link rel=x><p>");
    let head = document.head().unwrap();
    let children = document.tree.children(head);
    assert_eq!(children.len(), 1);
    assert!(document.tree.as_element(children[0]).unwrap().is_html("link"));
}

// ========== in body ==========

#[test]
fn test_implied_end_tags_for_paragraphs() {
    assert_eq!(
        dump("<p>One<p>Two<div>Three"),
        in_body(&["<p>", "  \"One\"", "<p>", "  \"Two\"", "<div>", "  \"Three\""])
    );
}

#[test]
fn test_duplicate_attribute_on_rcdata_start_tag_still_closes() {
    // The end tag must match the last start tag even after a duplicate
    // attribute was dropped from it.
    let document = parse_str("<title id=a id=b>T</title><p>x");
    assert!(document.had_errors);
    assert_eq!(
        dump_tree(&document.tree, NodeId::ROOT),
        lines(&[
            "<html>",
            "  <head>",
            "    <title>",
            "      id=\"a\"",
            "      \"T\"",
            "  <body>",
            "    <p>",
            "      \"x\"",
        ])
    );
}

#[test]
fn test_stray_end_p_creates_empty_paragraph() {
    let document = parse_str("<body></p>");
    assert!(document.had_errors);
    assert_eq!(dump_tree(&document.tree, NodeId::ROOT), in_body(&["<p>"]));
}

#[test]
fn test_list_items_close_each_other() {
    assert_eq!(
        dump("<ul><li>a<li>b</ul>"),
        in_body(&["<ul>", "  <li>", "    \"a\"", "  <li>", "    \"b\""])
    );
}

#[test]
fn test_nested_headings() {
    assert_eq!(
        dump("<h1>a<h2>b"),
        in_body(&["<h1>", "  \"a\"", "<h2>", "  \"b\""])
    );
}

#[test]
fn test_nested_form_is_ignored() {
    assert_eq!(
        dump("<form><form><input></form>"),
        in_body(&["<form>", "  <input>"])
    );
}

#[test]
fn test_pre_drops_leading_newline() {
    assert_eq!(dump("<pre>\nx</pre>"), in_body(&["<pre>", "  \"x\""]));
    assert_eq!(
        dump("<textarea>\n\nx</textarea>"),
        in_body(&["<textarea>", "  \"\nx\""])
    );
}

#[test]
fn test_image_becomes_img() {
    assert_eq!(dump("<image src=a>"), in_body(&["<img>", "  src=\"a\""]));
}

#[test]
fn test_plaintext_swallows_the_rest() {
    assert_eq!(
        dump("<plaintext></plaintext><b>"),
        in_body(&["<plaintext>", "  \"</plaintext><b>\""])
    );
}

#[test]
fn test_null_characters_are_dropped_in_body() {
    assert_eq!(dump("<p>a\0b"), in_body(&["<p>", "  \"ab\""]));
}

#[test]
fn test_character_references_in_text_and_attributes() {
    assert_eq!(
        dump("<p title=\"&lt;x&gt;\">a &amp; b</p>"),
        in_body(&["<p>", "  title=\"<x>\"", "  \"a & b\""])
    );
}

// ========== adoption agency ==========

#[test]
fn test_adoption_without_furthest_block() {
    assert_eq!(
        dump("<b><i>X</b>Y</i>"),
        in_body(&["<b>", "  <i>", "    \"X\"", "<i>", "  \"Y\""])
    );
}

#[test]
fn test_adoption_with_furthest_block() {
    assert_eq!(
        dump("<a>1<p>2</a>3</p>"),
        in_body(&["<a>", "  \"1\"", "<p>", "  <a>", "    \"2\"", "  \"3\""])
    );
}

#[test]
fn test_adoption_bold_paragraph() {
    assert_eq!(
        dump("<b>1<p>2</b>3</p>"),
        in_body(&["<b>", "  \"1\"", "<p>", "  <b>", "    \"2\"", "  \"3\""])
    );
}

#[test]
fn test_anchor_inside_anchor_closes_the_first() {
    assert_eq!(
        dump("<a href=1>x<a href=2>y"),
        in_body(&["<a>", "  href=\"1\"", "  \"x\"", "<a>", "  href=\"2\"", "  \"y\""])
    );
}

#[test]
fn test_formatting_elements_are_reconstructed() {
    assert_eq!(
        dump("<p><b>x</p><p>y"),
        in_body(&["<p>", "  <b>", "    \"x\"", "<p>", "  <b>", "    \"y\""])
    );
}

#[test]
fn test_noahs_ark_limits_identical_formatting_elements() {
    // Four <b> are open, but only the last three are remembered.
    assert_eq!(
        dump("<p><b><b><b><b>x<p>y"),
        in_body(&[
            "<p>",
            "  <b>",
            "    <b>",
            "      <b>",
            "        <b>",
            "          \"x\"",
            "<p>",
            "  <b>",
            "    <b>",
            "      <b>",
            "        \"y\"",
        ])
    );
}

#[test]
fn test_adoption_reopens_formatting_after_paragraph() {
    assert_eq!(
        dump("<p><b>1<i>2</p>3</b></p>"),
        in_body(&[
            "<p>",
            "  <b>",
            "    \"1\"",
            "    <i>",
            "      \"2\"",
            "<b>",
            "  <i>",
            "    \"3\"",
            "<p>",
        ])
    );
}

// ========== tables ==========

#[test]
fn test_table_implies_tbody_and_tr() {
    assert_eq!(
        dump("<table><td>x"),
        in_body(&["<table>", "  <tbody>", "    <tr>", "      <td>", "        \"x\""])
    );
}

#[test]
fn test_foster_parenting_text() {
    assert_eq!(
        dump("<table>foo<tr><td>bar</td></tr></table>"),
        in_body(&[
            "\"foo\"",
            "<table>",
            "  <tbody>",
            "    <tr>",
            "      <td>",
            "        \"bar\"",
        ])
    );
}

#[test]
fn test_foster_parenting_elements() {
    assert_eq!(
        dump("<table><b>x</b><tr><td>y"),
        in_body(&[
            "<b>",
            "  \"x\"",
            "<table>",
            "  <tbody>",
            "    <tr>",
            "      <td>",
            "        \"y\"",
        ])
    );
}

#[test]
fn test_foster_parenting_text_around_block() {
    assert_eq!(
        dump("<table>A<div>B</div>C</table>"),
        in_body(&["\"A\"", "<div>", "  \"B\"", "\"C\"", "<table>"])
    );
}

#[test]
fn test_whitespace_in_table_stays_in_table() {
    assert_eq!(
        dump("<table> <tr><td>x</td></tr></table>"),
        in_body(&[
            "<table>",
            "  \" \"",
            "  <tbody>",
            "    <tr>",
            "      <td>",
            "        \"x\"",
        ])
    );
}

#[test]
fn test_hidden_input_is_not_fostered() {
    assert_eq!(
        dump("<table><input type=hidden></table>"),
        in_body(&["<table>", "  <input>", "    type=\"hidden\""])
    );
}

#[test]
fn test_caption_and_colgroup() {
    assert_eq!(
        dump("<table><caption>c<col><tr><td>x"),
        in_body(&[
            "<table>",
            "  <caption>",
            "    \"c\"",
            "  <colgroup>",
            "    <col>",
            "  <tbody>",
            "    <tr>",
            "      <td>",
            "        \"x\"",
        ])
    );
}

#[test]
fn test_cell_start_closes_previous_cell() {
    assert_eq!(
        dump("<table><tr><td>a<td>b</table>"),
        in_body(&[
            "<table>",
            "  <tbody>",
            "    <tr>",
            "      <td>",
            "        \"a\"",
            "      <td>",
            "        \"b\"",
        ])
    );
}

#[test]
fn test_nested_table_start_closes_outer() {
    assert_eq!(
        dump("<table><table>"),
        in_body(&["<table>", "<table>"])
    );
}

// ========== void elements ==========

#[test]
fn test_self_closing_void_element_matches_plain() {
    let slashed = parse_str("<!DOCTYPE html><br/>");
    let plain = parse_str("<!DOCTYPE html><br>");
    assert_eq!(
        dump_tree(&slashed.tree, NodeId::ROOT),
        dump_tree(&plain.tree, NodeId::ROOT)
    );
    assert!(!slashed.had_errors);
}

#[test]
fn test_self_closing_non_void_is_an_error() {
    let document = parse_str("<!DOCTYPE html><div/>x");
    assert!(document.had_errors);
    // The flag is ignored: the text lands inside the div.
    assert_eq!(
        dump_tree(&document.tree, NodeId::ROOT),
        lines(&["<!DOCTYPE html>", "<html>", "  <head>", "  <body>", "    <div>", "      \"x\""])
    );
}

// ========== select ==========

#[test]
fn test_select_options() {
    assert_eq!(
        dump("<select><option>a<option>b</select>"),
        in_body(&["<select>", "  <option>", "    \"a\"", "  <option>", "    \"b\""])
    );
}

#[test]
fn test_select_ignores_unknown_tags() {
    assert_eq!(
        dump("<select><b>x</b></select>"),
        in_body(&["<select>", "  \"x\""])
    );
}

#[test]
fn test_select_in_table_closes_on_cell_tag() {
    assert_eq!(
        dump("<table><tr><td><select><td>x"),
        in_body(&[
            "<table>",
            "  <tbody>",
            "    <tr>",
            "      <td>",
            "        <select>",
            "      <td>",
            "        \"x\"",
        ])
    );
}

// ========== templates ==========

#[test]
fn test_template_contents() {
    assert_eq!(
        dump("<template><td>x</td></template>"),
        lines(&[
            "<html>",
            "  <head>",
            "    <template>",
            "      content",
            "        <td>",
            "          \"x\"",
            "  <body>",
        ])
    );
}

#[test]
fn test_template_children_live_in_the_fragment() {
    let document = parse_str("<body><template><p>x</p></template>");
    let body = document.body().unwrap();
    let template = document.tree.children(body)[0];
    assert!(document.tree.children(template).is_empty());
    let contents = document
        .tree
        .as_element(template)
        .and_then(|element| element.template_contents)
        .unwrap();
    assert_eq!(document.tree.text_content(contents), "x");
}

// ========== foreign content ==========

#[test]
fn test_svg_with_foreign_object() {
    assert_eq!(
        dump("<svg viewbox=\"0 0 1 1\"><foreignObject><p>x</p></foreignObject></svg>"),
        in_body(&[
            "<svg svg>",
            "  viewBox=\"0 0 1 1\"",
            "  <svg foreignObject>",
            "    <p>",
            "      \"x\"",
        ])
    );
}

#[test]
fn test_svg_tag_names_are_adjusted() {
    assert_eq!(
        dump("<svg><clippath></clippath></svg>"),
        in_body(&["<svg svg>", "  <svg clipPath>"])
    );
}

#[test]
fn test_xlink_attributes_are_namespaced() {
    let document = parse_str("<svg><a xlink:href=\"#x\"/></svg>");
    assert_eq!(
        dump_tree(&document.tree, NodeId::ROOT),
        in_body(&["<svg svg>", "  <svg a>", "    xlink href=\"#x\""])
    );
    let body = document.body().unwrap();
    let svg = document.tree.children(body)[0];
    let anchor = document.tree.children(svg)[0];
    let attr = &document.tree.as_element(anchor).unwrap().attrs[0];
    assert_eq!(attr.namespace, Some(Namespace::XLink));
    assert_eq!(attr.prefix.as_deref(), Some("xlink"));
}

#[test]
fn test_mathml_text_integration_point() {
    assert_eq!(
        dump("<math><mi><b>x</b></mi></math>"),
        in_body(&["<math math>", "  <math mi>", "    <b>", "      \"x\""])
    );
}

#[test]
fn test_html_start_tag_breaks_out_of_svg() {
    assert_eq!(
        dump("<svg><g><p>x"),
        in_body(&["<svg svg>", "  <svg g>", "<p>", "  \"x\""])
    );
}

#[test]
fn test_font_with_color_breaks_out_of_svg() {
    assert_eq!(
        dump("<svg><font color=red>x</font></svg>"),
        in_body(&["<svg svg>", "<font>", "  color=\"red\"", "  \"x\""])
    );
}

#[test]
fn test_plain_font_stays_in_svg() {
    assert_eq!(
        dump("<svg><font>x</font></svg>"),
        in_body(&["<svg svg>", "  <svg font>", "    \"x\""])
    );
}

#[test]
fn test_cdata_in_svg() {
    assert_eq!(
        dump("<svg><![CDATA[a<b]]></svg>"),
        in_body(&["<svg svg>", "  \"a<b\""])
    );
}

// ========== frameset ==========

#[test]
fn test_frameset_document() {
    assert_eq!(
        dump("<!DOCTYPE html><frameset><frame></frameset>"),
        lines(&["<!DOCTYPE html>", "<html>", "  <head>", "  <frameset>", "    <frame>"])
    );
}

#[test]
fn test_frameset_after_content_is_ignored() {
    assert_eq!(dump("<p>x<frameset>"), in_body(&["<p>", "  \"x\""]));
}

// ========== quirks ==========

#[test]
fn test_quirks_modes() {
    assert_eq!(parse_str("<p>").quirks_mode, QuirksMode::Quirks);
    assert_eq!(parse_str("<!DOCTYPE html>").quirks_mode, QuirksMode::NoQuirks);
    assert_eq!(
        parse_str(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#).quirks_mode,
        QuirksMode::Quirks
    );
    assert_eq!(
        parse_str(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#
        )
        .quirks_mode,
        QuirksMode::LimitedQuirks
    );
    assert_eq!(
        parse_str(r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "">"#).quirks_mode,
        QuirksMode::LimitedQuirks
    );
}

#[test]
fn test_quirks_mode_keeps_p_open_around_table() {
    assert_eq!(
        dump("<p><table>"),
        in_body(&["<p>", "  <table>"])
    );
    assert_eq!(
        dump("<!DOCTYPE html><p><table>"),
        lines(&["<!DOCTYPE html>", "<html>", "  <head>", "  <body>", "    <p>", "    <table>"])
    );
}

// ========== scripting flag ==========

#[test]
fn test_noscript_depends_on_scripting() {
    let markup = b"<body><noscript><p>x</p></noscript>";
    let scripted = parse_with_options(
        &markup[..],
        &ParserOptions {
            scripting: true,
            ..ParserOptions::default()
        },
    )
    .unwrap();
    assert_eq!(
        dump_tree(&scripted.tree, NodeId::ROOT),
        in_body(&["<noscript>", "  \"<p>x</p>\""])
    );

    let unscripted = parse_with_options(&markup[..], &ParserOptions::default()).unwrap();
    assert_eq!(
        dump_tree(&unscripted.tree, NodeId::ROOT),
        in_body(&["<noscript>", "  <p>", "    \"x\""])
    );
}

#[test]
fn test_script_contents_are_text() {
    assert_eq!(
        dump("<script>if (a < b) document.write('</p>')</script>"),
        lines(&[
            "<html>",
            "  <head>",
            "    <script>",
            "      \"if (a < b) document.write('</p>')\"",
            "  <body>",
        ])
    );
}

// ========== errors ==========

#[test]
fn test_error_flag() {
    assert!(!parse_str("<!DOCTYPE html><p>ok</p>").had_errors);
    assert!(parse_str("<!DOCTYPE html></div>").had_errors);
}

#[test]
fn test_issue_collection() {
    let options = ParserOptions {
        collect_issues: true,
        ..ParserOptions::default()
    };
    let document = parse_with_options(&b"<!DOCTYPE html><p a=1 a=2></div>"[..], &options).unwrap();
    assert!(document.had_errors);
    assert!(document.issues.len() >= 2);

    let quiet = parse_with_options(&b"<!DOCTYPE html><p a=1 a=2></div>"[..], &ParserOptions::default())
        .unwrap();
    assert!(quiet.had_errors);
    assert!(quiet.issues.is_empty());
}

// ========== fragments ==========

#[test]
fn test_fragment_in_div() {
    assert_eq!(
        dump_fragment("<p>a<p>b", &FragmentContext::html("div")),
        lines(&["<p>", "  \"a\"", "<p>", "  \"b\""])
    );
}

#[test]
fn test_fragment_in_table_row() {
    assert_eq!(
        dump_fragment("<td>x", &FragmentContext::html("tr")),
        lines(&["<td>", "  \"x\""])
    );
}

#[test]
fn test_fragment_in_rcdata_context() {
    assert_eq!(
        dump_fragment("<b>x</b>", &FragmentContext::html("title")),
        lines(&["\"<b>x</b>\""])
    );
}

#[test]
fn test_fragment_in_select() {
    assert_eq!(
        dump_fragment("<option>a<option>b", &FragmentContext::html("select")),
        lines(&["<option>", "  \"a\"", "<option>", "  \"b\""])
    );
}

#[test]
fn test_fragment_in_svg() {
    let context = FragmentContext {
        local_name: "g".to_string(),
        namespace: Namespace::Svg,
    };
    assert_eq!(dump_fragment("<rect/>", &context), lines(&["<svg rect>"]));
}

#[test]
fn test_fragment_html_tags_are_not_wrapped() {
    let fragment = parse_fragment("<html><body>x", &FragmentContext::html("div"));
    assert_eq!(dump_nodes(&fragment.tree, &fragment.nodes), lines(&["\"x\""]));
    assert!(fragment.had_errors);
}
