//! Insertion modes up to and including "after head", plus "text".

use wren_dom::{Namespace, NodeId, NodeType, QuirksMode};

use super::core::{HTMLParser, InsertionMode};
use super::insertion::InsertionPoint;
use super::quirks::quirks_mode_for_doctype;
use crate::stream::CharSource;
use crate::tokenizer::{Token, TokenizerState};

impl<S: CharSource> HTMLParser<S> {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(super) fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "Ignore the token."
            _ if token.is_whitespace() => {}
            Token::Comment { data } => {
                self.insert_comment(data, Some(InsertionPoint::append_to(NodeId::ROOT)));
            }
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                // "If the DOCTYPE token's name is not "html", or the token's
                // public identifier is not missing, or the token's system
                // identifier is neither missing nor "about:legacy-compat",
                // then there is a parse error."
                if name.as_deref() != Some("html")
                    || public_identifier.is_some()
                    || system_identifier
                        .as_deref()
                        .is_some_and(|id| id != "about:legacy-compat")
                {
                    self.parse_error("non-conforming DOCTYPE");
                }

                let doctype = self.tree.alloc(NodeType::DocumentType {
                    name: name.clone().unwrap_or_default(),
                    public_id: public_identifier.clone().unwrap_or_default(),
                    system_id: system_identifier.clone().unwrap_or_default(),
                });
                self.append_node(NodeId::ROOT, doctype);

                self.quirks_mode = quirks_mode_for_doctype(
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                    *force_quirks,
                );
                self.insertion_mode = InsertionMode::BeforeHtml;
            }
            // "If the document is not an iframe srcdoc document, then this is
            // a parse error; ... set the Document to quirks mode."
            _ => {
                self.parse_error("missing DOCTYPE");
                self.quirks_mode = QuirksMode::Quirks;
                self.reprocess_in(InsertionMode::BeforeHtml, token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(super) fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE before <html>"),
            Token::Comment { data } => {
                self.insert_comment(data, Some(InsertionPoint::append_to(NodeId::ROOT)));
            }
            _ if token.is_whitespace() => {}
            // "Create an element for the token in the HTML namespace, with the
            // Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            Token::StartTag { name, .. } if name == "html" => {
                self.insert_root_element(token);
                self.insertion_mode = InsertionMode::BeforeHead;
            }
            Token::EndTag { name, .. } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> before <html>"));
            }
            _ => {
                self.insert_root_element(&Token::start_tag("html"));
                self.reprocess_in(InsertionMode::BeforeHead, token);
            }
        }
    }

    fn insert_root_element(&mut self, token: &Token) {
        let html = self.create_element_for_token(token, Namespace::Html);
        self.append_node(NodeId::ROOT, html);
        self.stack_of_open_elements.push(html);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(super) fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            _ if token.is_whitespace() => {}
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE before <head>"),
            Token::StartTag { name, .. } if name == "html" => {
                self.process_token(token, Some(InsertionMode::InBody));
            }
            Token::StartTag { name, .. } if name == "head" => {
                let head = self.insert_html_element(token);
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
            }
            Token::EndTag { name, .. } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> before <head>"));
            }
            // "Insert an HTML element for a "head" start tag token with no
            // attributes. Set the head element pointer to the newly created
            // head element. Switch the insertion mode to "in head". Reprocess
            // the current token."
            _ => {
                let head = self.insert_html_element_named("head");
                self.head_element_pointer = Some(head);
                self.reprocess_in(InsertionMode::InHead, token);
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in <head>"),
            Token::StartTag { name, .. } => match name.as_str() {
                "html" => self.process_token(token, Some(InsertionMode::InBody)),
                "base" | "basefont" | "bgsound" | "link" => self.insert_void_element(token),
                "meta" => {
                    self.insert_void_element(token);
                    self.change_encoding_for_meta(token);
                }
                "title" => self.parse_generic_text_element(token, TokenizerState::RCDATA),
                "noscript" | "noframes" | "style" if name != "noscript" || self.scripting => {
                    self.parse_generic_text_element(token, TokenizerState::RAWTEXT);
                }
                "noscript" => {
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InHeadNoscript;
                }
                // Scripts are never executed, so "parser-inserted" and
                // "already started" bookkeeping is not needed.
                "script" => self.parse_generic_text_element(token, TokenizerState::ScriptData),
                "template" => {
                    let _ = self.insert_html_element(token);
                    self.push_active_formatting_marker();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InTemplate;
                    self.template_insertion_modes.push(InsertionMode::InTemplate);
                }
                "head" => self.parse_error("unexpected <head> in <head>"),
                _ => self.in_head_anything_else(token),
            },
            Token::EndTag { name, .. } => match name.as_str() {
                "head" => {
                    let _ = self.pop_current_node();
                    self.insertion_mode = InsertionMode::AfterHead;
                }
                "body" | "html" | "br" => self.in_head_anything_else(token),
                "template" => {
                    if self.stack_has("template") {
                        self.close_template();
                    } else {
                        self.parse_error("unexpected </template> with no open template");
                    }
                }
                _ => self.parse_error(&format!("unexpected end tag </{name}> in <head>")),
            },
            _ => self.in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack
    /// of open elements. Switch the insertion mode to "after head".
    /// Reprocess the token."
    fn in_head_anything_else(&mut self, token: &Token) {
        let _ = self.pop_current_node();
        self.reprocess_in(InsertionMode::AfterHead, token);
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(super) fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        let handled_as_in_head = token.is_whitespace()
            || matches!(token, Token::Comment { .. })
            || matches!(
                token,
                Token::StartTag { name, .. }
                    if matches!(
                        name.as_str(),
                        "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                    )
            );
        if handled_as_in_head {
            self.process_token(token, Some(InsertionMode::InHead));
            return;
        }

        match token {
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in <noscript>"),
            Token::StartTag { name, .. } if name == "html" => {
                self.process_token(token, Some(InsertionMode::InBody));
            }
            Token::EndTag { name, .. } if name == "noscript" => {
                let _ = self.pop_current_node();
                self.insertion_mode = InsertionMode::InHead;
            }
            Token::StartTag { name, .. } if name == "head" || name == "noscript" => {
                self.parse_error(&format!("unexpected <{name}> in <noscript>"));
            }
            Token::EndTag { name, .. } if name != "br" => {
                self.parse_error(&format!("unexpected end tag </{name}> in <noscript>"));
            }
            // "Parse error. Pop the current node (which will be a noscript
            // element) from the stack of open elements; the new current node
            // will be a head element. Switch the insertion mode to "in head".
            // Reprocess the token."
            _ => {
                self.parse_error(&format!("unexpected {token} in <noscript> in <head>"));
                let _ = self.pop_current_node();
                self.reprocess_in(InsertionMode::InHead, token);
            }
        }
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(super) fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE after <head>"),
            Token::StartTag { name, .. } => match name.as_str() {
                "html" => self.process_token(token, Some(InsertionMode::InBody)),
                "body" => {
                    let _ = self.insert_html_element(token);
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InBody;
                }
                "frameset" => {
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InFrameset;
                }
                // "Push the node pointed to by the head element pointer onto
                // the stack of open elements. Process the token using the
                // rules for the "in head" insertion mode. Remove the node
                // pointed to by the head element pointer from the stack of
                // open elements."
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => {
                    self.parse_error(&format!("<{name}> between </head> and <body>"));
                    let Some(head) = self.head_element_pointer else {
                        return;
                    };
                    self.stack_of_open_elements.push(head);
                    self.process_token(token, Some(InsertionMode::InHead));
                    self.remove_open_element(head);
                }
                "head" => self.parse_error("unexpected <head> after </head>"),
                _ => self.after_head_anything_else(token),
            },
            Token::EndTag { name, .. } => match name.as_str() {
                "template" => self.process_token(token, Some(InsertionMode::InHead)),
                "body" | "html" | "br" => self.after_head_anything_else(token),
                _ => self.parse_error(&format!("unexpected end tag </{name}> after </head>")),
            },
            _ => self.after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no
    /// attributes. Switch the insertion mode to "in body". Reprocess the
    /// current token."
    fn after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element_named("body");
        self.reprocess_in(InsertionMode::InBody, token);
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(super) fn handle_text_mode(&mut self, token: &Token) {
        let original = self
            .original_insertion_mode
            .unwrap_or(InsertionMode::InBody);
        match token {
            Token::Character { data } => self.insert_character(*data),
            // "Parse error. ... Pop the current node off the stack of open
            // elements. Switch the insertion mode to the original insertion
            // mode and reprocess the token."
            Token::EndOfFile => {
                self.parse_error("end of file in raw text element");
                let _ = self.pop_current_node();
                self.reprocess_in(original, token);
            }
            // Both `</script>` and every other end tag pop the element and
            // return to the original insertion mode.
            Token::EndTag { .. } => {
                let _ = self.pop_current_node();
                self.insertion_mode = original;
            }
            _ => {}
        }
    }
}
