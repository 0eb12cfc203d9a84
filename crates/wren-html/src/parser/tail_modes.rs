//! `select`, `template`, framesets and the modes after `</body>`.

use wren_dom::NodeId;

use super::core::{HTMLParser, InsertionMode};
use super::insertion::InsertionPoint;
use crate::stream::CharSource;
use crate::tokenizer::Token;

/// Start tags that close a `select` opened inside a table.
const TABLE_TAGS: &[&str] = &[
    "caption", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
];

impl<S: CharSource> HTMLParser<S> {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(super) fn handle_in_select_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data: '\0' } => {
                self.parse_error("unexpected-null-character in <select>");
            }
            Token::Character { data } => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in <select>"),
            Token::StartTag { name, .. } => match name.as_str() {
                "html" => self.process_token(token, Some(InsertionMode::InBody)),
                "option" => {
                    if self.current_node_is("option") {
                        let _ = self.pop_current_node();
                    }
                    let _ = self.insert_html_element(token);
                }
                "optgroup" | "hr" => {
                    if self.current_node_is("option") {
                        let _ = self.pop_current_node();
                    }
                    if self.current_node_is("optgroup") {
                        let _ = self.pop_current_node();
                    }
                    if name == "hr" {
                        self.insert_void_element(token);
                    } else {
                        let _ = self.insert_html_element(token);
                    }
                }
                "select" => {
                    self.parse_error("nested <select>");
                    let _ = self.close_select();
                }
                "input" | "keygen" | "textarea" => {
                    self.parse_error(&format!("<{name}> inside <select>"));
                    if self.close_select() {
                        self.process_token(token, None);
                    }
                }
                "script" | "template" => self.process_token(token, Some(InsertionMode::InHead)),
                _ => self.parse_error(&format!("unexpected <{name}> in <select>")),
            },
            Token::EndTag { name, .. } => match name.as_str() {
                "optgroup" => {
                    // "If the current node is an option element, and the node
                    // immediately before it in the stack of open elements is
                    // an optgroup element, then pop the current node from the
                    // stack of open elements."
                    let above_current = self
                        .stack_of_open_elements
                        .len()
                        .checked_sub(2)
                        .map(|index| self.stack_of_open_elements[index]);
                    let option_in_optgroup = self.current_node_is("option")
                        && above_current
                            .is_some_and(|node| self.is_html_element_named(node, "optgroup"));
                    if option_in_optgroup {
                        let _ = self.pop_current_node();
                    }
                    if self.current_node_is("optgroup") {
                        let _ = self.pop_current_node();
                    } else {
                        self.parse_error("stray end tag </optgroup>");
                    }
                }
                "option" => {
                    if self.current_node_is("option") {
                        let _ = self.pop_current_node();
                    } else {
                        self.parse_error("stray end tag </option>");
                    }
                }
                "select" => {
                    if !self.close_select() {
                        self.parse_error("stray end tag </select>");
                    }
                }
                "template" => self.process_token(token, Some(InsertionMode::InHead)),
                _ => self.parse_error(&format!("unexpected end tag </{name}> in <select>")),
            },
            Token::EndOfFile => self.process_token(token, Some(InsertionMode::InBody)),
        }
    }

    /// Pop through the open `select` and reset the insertion mode. False
    /// when no `select` is in select scope (the fragment case).
    fn close_select(&mut self) -> bool {
        if !self.has_element_in_select_scope("select") {
            return false;
        }
        self.pop_until_tag("select");
        self.reset_insertion_mode_appropriately();
        true
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(super) fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        match token {
            Token::StartTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                self.parse_error(&format!("<{name}> closes the open <select>"));
                self.pop_until_tag("select");
                self.reset_insertion_mode_appropriately();
                self.process_token(token, None);
            }
            Token::EndTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                self.parse_error(&format!("</{name}> inside <select>"));
                if !self.has_element_in_table_scope(name) {
                    return;
                }
                self.pop_until_tag("select");
                self.reset_insertion_mode_appropriately();
                self.process_token(token, None);
            }
            _ => self.process_token(token, Some(InsertionMode::InSelect)),
        }
    }

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(super) fn handle_in_template_mode(&mut self, token: &Token) {
        match token {
            Token::Character { .. } | Token::Comment { .. } | Token::Doctype { .. } => {
                self.process_token(token, Some(InsertionMode::InBody));
            }
            Token::StartTag { name, .. } => {
                let mode = match name.as_str() {
                    "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                    | "style" | "template" | "title" => {
                        self.process_token(token, Some(InsertionMode::InHead));
                        return;
                    }
                    "caption" | "colgroup" | "tbody" | "tfoot" | "thead" => InsertionMode::InTable,
                    "col" => InsertionMode::InColumnGroup,
                    "tr" => InsertionMode::InTableBody,
                    "td" | "th" => InsertionMode::InRow,
                    _ => InsertionMode::InBody,
                };
                // "Pop the current template insertion mode off the stack of
                // template insertion modes. Push mode onto the stack of
                // template insertion modes so that it is the new current
                // template insertion mode. Switch the insertion mode to mode,
                // and reprocess the token."
                let _ = self.template_insertion_modes.pop();
                self.template_insertion_modes.push(mode);
                self.reprocess_in(mode, token);
            }
            Token::EndTag { name, .. } if name == "template" => {
                self.process_token(token, Some(InsertionMode::InHead));
            }
            Token::EndTag { name, .. } => {
                self.parse_error(&format!("unexpected end tag </{name}> in <template>"));
            }
            Token::EndOfFile => {
                if !self.stack_has("template") {
                    self.stop_parsing();
                    return;
                }
                self.parse_error("end of file in <template>");
                self.close_template();
                self.process_token(token, None);
            }
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) {
        if token.is_whitespace() || token.is_start_tag("html") {
            self.process_token(token, Some(InsertionMode::InBody));
            return;
        }
        match token {
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let html = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment(data, Some(InsertionPoint::append_to(html)));
            }
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE after </body>"),
            Token::EndTag { name, .. } if name == "html" => {
                if self.context_element.is_some() {
                    self.parse_error("</html> in a fragment");
                } else {
                    self.insertion_mode = InsertionMode::AfterAfterBody;
                }
            }
            Token::EndOfFile => self.stop_parsing(),
            _ => {
                self.parse_error(&format!("{token} after </body>"));
                self.reprocess_in(InsertionMode::InBody, token);
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(super) fn handle_in_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in <frameset>"),
            Token::StartTag { name, .. } => match name.as_str() {
                "html" => self.process_token(token, Some(InsertionMode::InBody)),
                "frameset" => {
                    let _ = self.insert_html_element(token);
                }
                "frame" => self.insert_void_element(token),
                "noframes" => self.process_token(token, Some(InsertionMode::InHead)),
                _ => self.parse_error(&format!("unexpected <{name}> in <frameset>")),
            },
            Token::EndTag { name, .. } if name == "frameset" => {
                if self.stack_of_open_elements.len() <= 1 {
                    self.parse_error("</frameset> would close the root element");
                    return;
                }
                let _ = self.pop_current_node();
                if self.context_element.is_none() && !self.current_node_is("frameset") {
                    self.insertion_mode = InsertionMode::AfterFrameset;
                }
            }
            Token::EndOfFile => {
                if self.stack_of_open_elements.len() > 1 {
                    self.parse_error("end of file in <frameset>");
                }
                self.stop_parsing();
            }
            _ => self.parse_error(&format!("unexpected {token} in <frameset>")),
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(super) fn handle_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE after </frameset>"),
            Token::StartTag { name, .. } if name == "html" => {
                self.process_token(token, Some(InsertionMode::InBody));
            }
            Token::StartTag { name, .. } if name == "noframes" => {
                self.process_token(token, Some(InsertionMode::InHead));
            }
            Token::EndTag { name, .. } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterFrameset;
            }
            Token::EndOfFile => self.stop_parsing(),
            _ => self.parse_error(&format!("unexpected {token} after </frameset>")),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(super) fn handle_after_after_body_mode(&mut self, token: &Token) {
        let handled_as_in_body = token.is_whitespace()
            || token.is_start_tag("html")
            || matches!(token, Token::Doctype { .. });
        if handled_as_in_body {
            self.process_token(token, Some(InsertionMode::InBody));
            return;
        }
        match token {
            Token::Comment { data } => {
                self.insert_comment(data, Some(InsertionPoint::append_to(NodeId::ROOT)));
            }
            Token::EndOfFile => self.stop_parsing(),
            _ => {
                self.parse_error(&format!("{token} after </html>"));
                self.reprocess_in(InsertionMode::InBody, token);
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(super) fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        let handled_as_in_body = token.is_whitespace()
            || token.is_start_tag("html")
            || matches!(token, Token::Doctype { .. });
        if handled_as_in_body {
            self.process_token(token, Some(InsertionMode::InBody));
            return;
        }
        match token {
            Token::Comment { data } => {
                self.insert_comment(data, Some(InsertionPoint::append_to(NodeId::ROOT)));
            }
            Token::StartTag { name, .. } if name == "noframes" => {
                self.process_token(token, Some(InsertionMode::InHead));
            }
            Token::EndOfFile => self.stop_parsing(),
            _ => self.parse_error(&format!("unexpected {token} after </html>")),
        }
    }
}
