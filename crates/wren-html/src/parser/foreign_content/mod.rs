//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
//!
//! MathML and SVG subtrees inside HTML. Tag and attribute names get their
//! camel case back, namespaced attributes get a namespace, and a handful of
//! HTML tags break back out into HTML.

pub mod mathml;
pub mod svg;

use wren_dom::{Namespace, NodeId};

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use super::core::HTMLParser;
use crate::stream::CharSource;
use crate::tokenizer::{Attribute, Token};

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// Attribute name, prefix, local name, namespace.
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:lang", Some("xml"), "lang", Namespace::Xml),
    ("xml:space", Some("xml"), "space", Namespace::Xml),
    ("xmlns", None, "xmlns", Namespace::XmlNs),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::XmlNs),
];

/// HTML start tags that end foreign content.
const BREAKOUT_START_TAGS: &[&str] = &[
    "b", "big", "blockquote", "body", "br", "center", "code", "dd", "div", "dl", "dt", "em",
    "embed", "h1", "h2", "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing",
    "menu", "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong", "strike",
    "sub", "sup", "table", "tt", "u", "ul", "var",
];

/// Give `xlink:`, `xml:` and `xmlns` attributes their namespace and split
/// off the prefix.
pub fn adjust_foreign_attributes(attributes: &mut [Attribute]) {
    for attr in attributes {
        if let Some(&(_, prefix, local, namespace)) = FOREIGN_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(name, ..)| *name == attr.name)
        {
            attr.prefix = prefix.map(str::to_string);
            attr.name = local.to_string();
            attr.namespace = Some(namespace);
        }
    }
}

/// Whether `token` forces the parser out of foreign content. A `font` start
/// tag only does so when it carries `color`, `face` or `size`.
fn breaks_out_of_foreign_content(token: &Token) -> bool {
    match token {
        Token::StartTag { name, .. } if name == "font" => {
            ["color", "face", "size"]
                .iter()
                .any(|attr| token.attribute(attr).is_some())
        }
        Token::StartTag { name, .. } => BREAKOUT_START_TAGS.contains(&name.as_str()),
        Token::EndTag { name, .. } => name == "br" || name == "p",
        _ => false,
    }
}

impl<S: CharSource> HTMLParser<S> {
    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(super) fn process_foreign_content(&mut self, token: &Token) {
        if breaks_out_of_foreign_content(token) {
            self.parse_error(&format!("HTML {token} inside foreign content"));
            // "While the current node is not a MathML text integration point,
            // an HTML integration point, or an element in the HTML namespace,
            // pop elements from the stack of open elements."
            while let Some(node) = self.current_node() {
                if self.is_in_namespace(node, Namespace::Html)
                    || self.is_html_integration_point(node)
                    || self.is_mathml_text_integration_point(node)
                {
                    break;
                }
                let _ = self.pop_current_node();
            }
            // "Reprocess the token according to the rules given in the section
            // corresponding to the current insertion mode in HTML content."
            self.process_token(token, Some(self.insertion_mode));
            return;
        }

        match token {
            Token::Character { data: '\0' } => {
                self.parse_error("unexpected-null-character in foreign content");
                self.insert_character('\u{FFFD}');
            }
            Token::Character { data } => {
                self.insert_character(*data);
                if !token.is_whitespace() {
                    self.frameset_ok = false;
                }
            }
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in foreign content"),
            Token::StartTag { .. } => self.insert_foreign_start_tag(token),
            Token::EndTag { name, .. } => self.foreign_end_tag(token, name),
            Token::EndOfFile => self.process_token(token, Some(self.insertion_mode)),
        }
    }

    fn is_mathml_text_integration_point(&self, node: NodeId) -> bool {
        self.tree.as_element(node).is_some_and(|element| {
            element.namespace == Namespace::MathMl
                && mathml::is_text_integration_point(&element.local_name)
        })
    }

    /// "Any other start tag": insert a foreign element in the adjusted current
    /// node's namespace.
    fn insert_foreign_start_tag(&mut self, token: &Token) {
        let namespace = self
            .adjusted_current_node()
            .and_then(|node| self.tree.as_element(node))
            .map_or(Namespace::Html, |element| element.namespace);
        let self_closing = matches!(
            token,
            Token::StartTag {
                self_closing: true,
                ..
            }
        );
        let adjusted = adjust_foreign_start_tag(token, namespace);
        let _ = self.insert_foreign_element(&adjusted, namespace);

        // "If the token has its self-closing flag set, then ... pop the
        // current node off the stack of open elements and acknowledge the
        // token's self-closing flag."
        if self_closing {
            let _ = self.pop_current_node();
            self.acknowledge_self_closing_flag();
        }
    }

    /// "Any other end tag" in foreign content.
    fn foreign_end_tag(&mut self, token: &Token, name: &str) {
        let Some(mut index) = self.stack_of_open_elements.len().checked_sub(1) else {
            return;
        };

        // "If node's tag name, converted to ASCII lowercase, is not the same
        // as the tag name of the token, then this is a parse error."
        let lowercase_name_is = |parser: &Self, node: NodeId| {
            parser
                .tree
                .as_element(node)
                .is_some_and(|element| element.local_name.to_ascii_lowercase() == name)
        };
        if !lowercase_name_is(self, self.stack_of_open_elements[index]) {
            self.parse_error(&format!("unexpected end tag </{name}> in foreign content"));
        }

        loop {
            let node = self.stack_of_open_elements[index];
            // "If node is the topmost element in the stack of open elements,
            // then return. (fragment case)"
            if index == 0 {
                return;
            }
            // "If node's tag name, converted to ASCII lowercase, is the same as
            // the tag name of the token, pop elements from the stack of open
            // elements until node has been popped from the stack, and then
            // return."
            if lowercase_name_is(self, node) {
                self.pop_until_node(node);
                return;
            }
            // "Set node to the previous entry in the stack of open elements."
            index -= 1;
            // "If node is not an element in the HTML namespace, return to the
            // step labeled loop."
            // "Otherwise, process the token according to the rules given in
            // the section corresponding to the current insertion mode in HTML
            // content."
            if self.is_in_namespace(self.stack_of_open_elements[index], Namespace::Html) {
                self.process_token(token, Some(self.insertion_mode));
                return;
            }
        }
    }
}

/// Apply the MathML or SVG name fix-ups and the foreign attribute
/// adjustments to a start tag.
pub(super) fn adjust_foreign_start_tag(token: &Token, namespace: Namespace) -> Token {
    let mut adjusted = token.clone();
    if let Token::StartTag {
        name, attributes, ..
    } = &mut adjusted
    {
        match namespace {
            Namespace::MathMl => adjust_mathml_attributes(attributes),
            Namespace::Svg => {
                *name = adjust_svg_tag_name(name);
                adjust_svg_attributes(attributes);
            }
            _ => {}
        }
        adjust_foreign_attributes(attributes);
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xlink_href_gets_a_namespace() {
        let mut attrs = vec![
            Attribute::new("xlink:href", "#a"),
            Attribute::new("xmlns", "http://www.w3.org/2000/svg"),
            Attribute::new("href", "#b"),
        ];
        adjust_foreign_attributes(&mut attrs);
        assert_eq!(attrs[0].name, "href");
        assert_eq!(attrs[0].prefix.as_deref(), Some("xlink"));
        assert_eq!(attrs[0].namespace, Some(Namespace::XLink));
        assert_eq!(attrs[1].namespace, Some(Namespace::XmlNs));
        assert_eq!(attrs[1].prefix, None);
        assert_eq!(attrs[2].namespace, None);
    }

    #[test]
    fn font_breaks_out_only_with_presentational_attributes() {
        let plain = Token::start_tag("font");
        assert!(!breaks_out_of_foreign_content(&plain));

        let mut colored = Token::start_tag("font");
        colored.start_new_attribute();
        for c in "color".chars() {
            colored.append_to_current_attribute_name(c);
        }
        assert!(breaks_out_of_foreign_content(&colored));

        assert!(breaks_out_of_foreign_content(&Token::end_tag("p")));
        assert!(!breaks_out_of_foreign_content(&Token::end_tag("div")));
    }
}
