//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use wren_dom::{Namespace, NodeId, QuirksMode};

use super::core::{HTMLParser, InsertionMode};
use super::foreign_content::adjust_foreign_start_tag;
use super::open_elements::Scope;
use crate::stream::CharSource;
use crate::tokenizer::{Token, TokenizerState};

/// Start tags that close an open `p` and are then inserted normally.
const BLOCK_START_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main", "menu",
    "nav", "ol", "p", "search", "section", "summary", "ul",
];

/// End tags closed by "generate implied end tags, then pop until".
const BLOCK_END_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "button", "center", "details", "dialog",
    "dir", "div", "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup",
    "listing", "main", "menu", "nav", "ol", "pre", "search", "section", "summary", "ul",
];

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
const FORMATTING_TAGS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that may stay open at the end of the body without a parse
/// error.
const ALLOWED_OPEN_AT_END: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td",
    "tfoot", "th", "thead", "tr", "body", "html",
];

impl<S: CharSource> HTMLParser<S> {
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data: '\0' } => {
                self.parse_error("unexpected-null-character in body");
            }
            Token::Character { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(*data);
                if !token.is_whitespace() {
                    self.frameset_ok = false;
                }
            }
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in body"),
            Token::StartTag { name, .. } => self.in_body_start_tag(token, name),
            Token::EndTag { name, .. } => self.in_body_end_tag(token, name),
            Token::EndOfFile => self.in_body_end_of_file(token),
        }
    }

    fn in_body_end_of_file(&mut self, token: &Token) {
        // "If the stack of template insertion modes is not empty, then
        // process the token using the rules for the "in template" insertion
        // mode."
        if !self.template_insertion_modes.is_empty() {
            self.process_token(token, Some(InsertionMode::InTemplate));
            return;
        }
        self.report_unclosed_elements();
        self.stop_parsing();
    }

    /// "If there is a node in the stack of open elements that is not either
    /// a dd element, ... or the html element, then this is a parse error."
    fn report_unclosed_elements(&mut self) {
        let unclosed = self
            .stack_of_open_elements
            .iter()
            .any(|&node| !self.is_html_element_in(node, ALLOWED_OPEN_AT_END));
        if unclosed {
            self.parse_error("elements left open at end of body");
        }
    }

    #[allow(clippy::cognitive_complexity)]
    fn in_body_start_tag(&mut self, token: &Token, name: &str) {
        match name {
            "html" => {
                self.parse_error("unexpected <html> in body");
                if !self.stack_has("template")
                    && let Some(&html) = self.stack_of_open_elements.first()
                {
                    self.merge_attributes(html, token);
                }
            }
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "template" | "title" => {
                self.process_token(token, Some(InsertionMode::InHead));
            }
            "body" => {
                self.parse_error("unexpected <body> in body");
                let body = self.stack_of_open_elements.get(1).copied();
                if let Some(body) = body
                    && self.is_html_element_named(body, "body")
                    && !self.stack_has("template")
                {
                    self.frameset_ok = false;
                    self.merge_attributes(body, token);
                }
            }
            "frameset" => self.in_body_frameset(token),
            _ if BLOCK_START_TAGS.contains(&name) => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(token);
            }
            _ if HEADINGS.contains(&name) => {
                self.close_p_if_in_button_scope();
                if self.current_node_is_one_of(HEADINGS) {
                    self.parse_error(&format!("<{name}> nested in another heading"));
                    let _ = self.pop_current_node();
                }
                let _ = self.insert_html_element(token);
            }
            "pre" | "listing" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(token);
                self.ignore_next_line_feed = true;
                self.frameset_ok = false;
            }
            "form" => {
                let has_template = self.stack_has("template");
                if self.form_element_pointer.is_some() && !has_template {
                    self.parse_error("nested <form>");
                    return;
                }
                self.close_p_if_in_button_scope();
                let form = self.insert_html_element(token);
                if !has_template {
                    self.form_element_pointer = Some(form);
                }
            }
            "li" => self.in_body_list_item(token, &["li"]),
            "dd" | "dt" => self.in_body_list_item(token, &["dd", "dt"]),
            "plaintext" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(token);
                self.tokenizer.switch_to(TokenizerState::PLAINTEXT);
            }
            "button" => {
                if self.has_element_in_scope("button") {
                    self.parse_error("nested <button>");
                    self.generate_implied_end_tags(None);
                    self.pop_until_tag("button");
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
            }
            "a" => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list (or the start of the list if there is no marker on
                // the list), then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element
                // from the list of active formatting elements and the stack of
                // open elements if the adoption agency algorithm didn't
                // already remove it"
                if let Some(anchor) = self.active_formatting_element_named("a") {
                    self.parse_error("nested <a>");
                    if !self.run_adoption_agency(&Token::end_tag("a")) {
                        self.any_other_end_tag("a");
                    }
                    self.remove_from_active_formatting(anchor);
                    self.remove_open_element(anchor);
                }
                self.insert_formatting_element(token);
            }
            "nobr" => {
                self.reconstruct_active_formatting_elements();
                if self.has_element_in_scope("nobr") {
                    self.parse_error("nested <nobr>");
                    if !self.run_adoption_agency(&Token::end_tag("nobr")) {
                        self.any_other_end_tag("nobr");
                    }
                }
                self.insert_formatting_element(token);
            }
            _ if FORMATTING_TAGS.contains(&name) => self.insert_formatting_element(token),
            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.push_active_formatting_marker();
                self.frameset_ok = false;
            }
            "table" => {
                if self.quirks_mode != QuirksMode::Quirks {
                    self.close_p_if_in_button_scope();
                }
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InTable;
            }
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(token);
                self.frameset_ok = false;
            }
            "input" => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(token);
                let hidden = token
                    .attribute("type")
                    .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
            }
            "param" | "source" | "track" => self.insert_void_element(token),
            "hr" => {
                self.close_p_if_in_button_scope();
                self.insert_void_element(token);
                self.frameset_ok = false;
            }
            // "Parse error. Change the token's tag name to "img" and reprocess
            // it. (Don't ask.)"
            "image" => {
                self.parse_error("<image> treated as <img>");
                let mut renamed = token.clone();
                if let Token::StartTag { name, .. } = &mut renamed {
                    "img".clone_into(name);
                }
                self.process_token(&renamed, None);
            }
            "textarea" => {
                let _ = self.insert_html_element(token);
                self.ignore_next_line_feed = true;
                self.tokenizer.switch_to(TokenizerState::RCDATA);
                self.original_insertion_mode = Some(self.insertion_mode);
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::Text;
            }
            "xmp" => {
                self.close_p_if_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_generic_text_element(token, TokenizerState::RAWTEXT);
            }
            "iframe" => {
                self.frameset_ok = false;
                self.parse_generic_text_element(token, TokenizerState::RAWTEXT);
            }
            "noembed" | "noscript" if name == "noembed" || self.scripting => {
                self.parse_generic_text_element(token, TokenizerState::RAWTEXT);
            }
            "select" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.insertion_mode = if matches!(
                    self.insertion_mode,
                    InsertionMode::InTable
                        | InsertionMode::InCaption
                        | InsertionMode::InTableBody
                        | InsertionMode::InRow
                        | InsertionMode::InCell
                ) {
                    InsertionMode::InSelectInTable
                } else {
                    InsertionMode::InSelect
                };
            }
            "optgroup" | "option" => {
                if self.current_node_is("option") {
                    let _ = self.pop_current_node();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }
            "rb" | "rtc" => {
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is("ruby") {
                        self.parse_error(&format!("<{name}> outside <ruby>"));
                    }
                }
                let _ = self.insert_html_element(token);
            }
            "rp" | "rt" => {
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !self.current_node_is_one_of(&["rtc", "ruby"]) {
                        self.parse_error(&format!("<{name}> outside <ruby>"));
                    }
                }
                let _ = self.insert_html_element(token);
            }
            "math" => self.insert_foreign_root(token, Namespace::MathMl),
            "svg" => self.insert_foreign_root(token, Namespace::Svg),
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot" | "th"
            | "thead" | "tr" => {
                self.parse_error(&format!("unexpected <{name}> in body"));
            }
            // "Any other start tag": ordinary elements.
            _ => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }
        }
    }

    fn in_body_frameset(&mut self, token: &Token) {
        self.parse_error("unexpected <frameset> in body");
        let Some(body) = self.stack_of_open_elements.get(1).copied() else {
            return;
        };
        if !self.is_html_element_named(body, "body") || !self.frameset_ok {
            return;
        }
        // "Remove the second element on the stack of open elements from its
        // parent node, if it has one. Pop all the nodes from the bottom of
        // the stack of open elements, from the current node up to, but not
        // including, the root html element."
        self.tree.detach(body);
        self.stack_of_open_elements.truncate(1);
        let _ = self.insert_html_element(token);
        self.insertion_mode = InsertionMode::InFrameset;
    }

    /// The `li`, `dd` and `dt` start tags: close the open item of the same
    /// family first.
    fn in_body_list_item(&mut self, token: &Token, family: &[&str]) {
        self.frameset_ok = false;
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            if let Some(name) = self
                .html_local_name(node)
                .filter(|name| family.contains(name))
                .map(str::to_string)
            {
                self.generate_implied_end_tags(Some(&name));
                if !self.current_node_is(&name) {
                    self.parse_error(&format!("<{name}> closes other open elements"));
                }
                self.pop_until_tag(&name);
                break;
            }
            if self.is_special_element(node)
                && !self.is_html_element_in(node, &["address", "div", "p"])
            {
                break;
            }
        }
        self.close_p_if_in_button_scope();
        let _ = self.insert_html_element(token);
    }

    fn insert_formatting_element(&mut self, token: &Token) {
        self.reconstruct_active_formatting_elements();
        let element = self.insert_html_element(token);
        self.push_active_formatting_element(element, token);
    }

    /// `<math>` and `<svg>` in HTML content.
    fn insert_foreign_root(&mut self, token: &Token, namespace: Namespace) {
        self.reconstruct_active_formatting_elements();
        let adjusted = adjust_foreign_start_tag(token, namespace);
        let _ = self.insert_foreign_element(&adjusted, namespace);
        if matches!(
            token,
            Token::StartTag {
                self_closing: true,
                ..
            }
        ) {
            let _ = self.pop_current_node();
            self.acknowledge_self_closing_flag();
        }
    }

    fn in_body_end_tag(&mut self, token: &Token, name: &str) {
        match name {
            "template" => self.process_token(token, Some(InsertionMode::InHead)),
            "body" | "html" => {
                if !self.has_element_in_scope("body") {
                    self.parse_error(&format!("</{name}> without an open <body>"));
                    return;
                }
                self.report_unclosed_elements();
                self.insertion_mode = InsertionMode::AfterBody;
                if name == "html" {
                    self.process_token(token, None);
                }
            }
            _ if BLOCK_END_TAGS.contains(&name) => {
                if self.has_element_in_scope(name) {
                    self.close_element(name);
                } else {
                    self.parse_error(&format!("stray end tag </{name}>"));
                }
            }
            "form" => self.in_body_form_end_tag(),
            "p" => {
                if !self.has_element_in_button_scope("p") {
                    self.parse_error("</p> without an open <p>");
                    let _ = self.insert_html_element_named("p");
                }
                self.close_p_element();
            }
            "li" => {
                if self.has_element_in_list_item_scope("li") {
                    self.close_list_item("li");
                } else {
                    self.parse_error("stray end tag </li>");
                }
            }
            "dd" | "dt" => {
                if self.has_element_in_scope(name) {
                    self.close_list_item(name);
                } else {
                    self.parse_error(&format!("stray end tag </{name}>"));
                }
            }
            _ if HEADINGS.contains(&name) => {
                if !self.has_any_in_scope(Scope::Default, HEADINGS) {
                    self.parse_error(&format!("stray end tag </{name}>"));
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.parse_error(&format!("</{name}> closes a different heading"));
                }
                self.pop_until_one_of(HEADINGS);
            }
            _ if FORMATTING_TAGS.contains(&name) => {
                if !self.run_adoption_agency(token) {
                    self.any_other_end_tag(name);
                }
            }
            "applet" | "marquee" | "object" => {
                if self.has_element_in_scope(name) {
                    self.close_element(name);
                    self.clear_active_formatting_elements_to_last_marker();
                } else {
                    self.parse_error(&format!("stray end tag </{name}>"));
                }
            }
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br"
            // start tag token with no attributes, rather than the end tag
            // token that it actually is."
            "br" => {
                self.parse_error("</br> treated as <br>");
                self.process_token(&Token::start_tag("br"), None);
            }
            _ => self.any_other_end_tag(name),
        }
    }

    fn close_list_item(&mut self, name: &str) {
        self.generate_implied_end_tags(Some(name));
        if !self.current_node_is(name) {
            self.parse_error(&format!("</{name}> closes other open elements"));
        }
        self.pop_until_tag(name);
    }

    fn in_body_form_end_tag(&mut self) {
        if self.stack_has("template") {
            if !self.has_element_in_scope("form") {
                self.parse_error("stray end tag </form>");
                return;
            }
            self.close_element("form");
            return;
        }

        // "Let node be the element that the form element pointer is set to,
        // or null if it is not set to an element. Set the form element
        // pointer to null."
        let node = self.form_element_pointer.take();
        let Some(node) = node.filter(|&node| self.has_node_in_scope(node)) else {
            self.parse_error("stray end tag </form>");
            return;
        };
        self.generate_implied_end_tags(None);
        if self.current_node() != Some(node) {
            self.parse_error("</form> closes other open elements");
        }
        // "Remove node from the stack of open elements."
        self.remove_open_element(node);
    }

    /// "Any other end tag" in the "in body" insertion mode.
    pub(super) fn any_other_end_tag(&mut self, name: &str) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node: NodeId = self.stack_of_open_elements[index];
            if self.is_html_element_named(node, name) {
                self.generate_implied_end_tags(Some(name));
                if self.current_node() != Some(node) {
                    self.parse_error(&format!("</{name}> closes other open elements"));
                }
                self.pop_until_node(node);
                return;
            }
            if self.is_special_element(node) {
                self.parse_error(&format!("stray end tag </{name}>"));
                return;
            }
        }
    }
}
