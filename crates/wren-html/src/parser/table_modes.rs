//! Tables: [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
//! through [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell).
//!
//! Content that is not allowed directly inside table structure is foster
//! parented in front of the table.

use super::core::{HTMLParser, InsertionMode};
use super::open_elements::Scope;
use crate::stream::CharSource;
use crate::tokenizer::Token;

const TABLE_CONTEXT: &[&str] = &["table", "template"];
const TABLE_BODY_CONTEXT: &[&str] = &["tbody", "tfoot", "thead", "template"];
const TABLE_ROW_CONTEXT: &[&str] = &["tr", "template"];
const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];
const CELLS: &[&str] = &["td", "th"];

/// Start tags that end a caption or cell and are then reprocessed.
const TABLE_STRUCTURE_START_TAGS: &[&str] = &[
    "caption", "col", "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// "Space characters" in the sense of the in table text buffer.
const fn is_html_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\u{000C}' | '\r' | ' ')
}

impl<S: CharSource> HTMLParser<S> {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(super) fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            Token::Character { .. }
                if self.current_node_is_one_of(&[
                    "table", "tbody", "template", "tfoot", "thead", "tr",
                ]) =>
            {
                self.pending_table_character_tokens.clear();
                self.original_insertion_mode = Some(self.insertion_mode);
                self.reprocess_in(InsertionMode::InTableText, token);
            }
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in table"),
            Token::StartTag { name, .. } => self.in_table_start_tag(token, name),
            Token::EndTag { name, .. } => match name.as_str() {
                "table" => {
                    if self.has_element_in_table_scope("table") {
                        self.pop_until_tag("table");
                        self.reset_insertion_mode_appropriately();
                    } else {
                        self.parse_error("stray end tag </table>");
                    }
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => {
                    self.parse_error(&format!("stray end tag </{name}> in table"));
                }
                "template" => self.process_token(token, Some(InsertionMode::InHead)),
                _ => self.table_anything_else(token),
            },
            Token::EndOfFile => self.process_token(token, Some(InsertionMode::InBody)),
            Token::Character { .. } => self.table_anything_else(token),
        }
    }

    fn in_table_start_tag(&mut self, token: &Token, name: &str) {
        match name {
            "caption" => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                self.push_active_formatting_marker();
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InCaption;
            }
            "colgroup" => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InColumnGroup;
            }
            "col" => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element_named("colgroup");
                self.reprocess_in(InsertionMode::InColumnGroup, token);
            }
            "tbody" | "tfoot" | "thead" => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InTableBody;
            }
            "td" | "th" | "tr" => {
                self.clear_stack_back_to(TABLE_CONTEXT);
                let _ = self.insert_html_element_named("tbody");
                self.reprocess_in(InsertionMode::InTableBody, token);
            }
            "table" => {
                self.parse_error("<table> inside <table>");
                if self.has_element_in_table_scope("table") {
                    self.pop_until_tag("table");
                    self.reset_insertion_mode_appropriately();
                    self.process_token(token, None);
                }
            }
            "style" | "script" | "template" => {
                self.process_token(token, Some(InsertionMode::InHead));
            }
            "input"
                if token
                    .attribute("type")
                    .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden")) =>
            {
                self.parse_error("hidden <input> directly in table");
                self.insert_void_element(token);
            }
            "form" => {
                self.parse_error("<form> directly in table");
                if self.stack_has("template") || self.form_element_pointer.is_some() {
                    return;
                }
                let form = self.insert_html_element(token);
                self.form_element_pointer = Some(form);
                let _ = self.pop_current_node();
            }
            _ => self.table_anything_else(token),
        }
    }

    /// "Anything else" in table: process with the "in body" rules, with
    /// foster parenting enabled.
    fn table_anything_else(&mut self, token: &Token) {
        self.parse_error(&format!("{token} foster parented out of table"));
        self.foster_parenting = true;
        self.process_token(token, Some(InsertionMode::InBody));
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(super) fn handle_in_table_text_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data: '\0' } => {
                self.parse_error("unexpected-null-character in table text");
            }
            Token::Character { data } => self.pending_table_character_tokens.push(*data),
            _ => {
                self.flush_pending_table_characters();
                let mode = self.original_insertion_mode.take().unwrap_or(InsertionMode::InTable);
                self.reprocess_in(mode, token);
            }
        }
    }

    /// "If any of the tokens in the pending table character tokens list are
    /// character tokens that are not ASCII whitespace, then this is a parse
    /// error: reprocess the character tokens ... using the rules given in the
    /// 'anything else' entry in the 'in table' insertion mode."
    fn flush_pending_table_characters(&mut self) {
        let pending = std::mem::take(&mut self.pending_table_character_tokens);
        if pending.chars().all(is_html_whitespace) {
            for c in pending.chars() {
                self.insert_character(c);
            }
            return;
        }
        for data in pending.chars() {
            self.table_anything_else(&Token::Character { data });
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(super) fn handle_in_caption_mode(&mut self, token: &Token) {
        let ends_caption = match token {
            Token::StartTag { name, .. } => TABLE_STRUCTURE_START_TAGS.contains(&name.as_str()),
            Token::EndTag { name, .. } => name == "table",
            _ => false,
        };

        if token.is_end_tag("caption") || ends_caption {
            if !self.has_element_in_table_scope("caption") {
                self.parse_error(&format!("{token} without an open <caption>"));
                return;
            }
            self.generate_implied_end_tags(None);
            if !self.current_node_is("caption") {
                self.parse_error("</caption> closes other open elements");
            }
            self.pop_until_tag("caption");
            self.clear_active_formatting_elements_to_last_marker();
            self.insertion_mode = InsertionMode::InTable;
            if ends_caption {
                self.process_token(token, None);
            }
            return;
        }

        if let Token::EndTag { name, .. } = token
            && matches!(
                name.as_str(),
                "body"
                    | "col"
                    | "colgroup"
                    | "html"
                    | "tbody"
                    | "td"
                    | "tfoot"
                    | "th"
                    | "thead"
                    | "tr"
            )
        {
            self.parse_error(&format!("stray end tag </{name}> in caption"));
            return;
        }

        self.process_token(token, Some(InsertionMode::InBody));
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(super) fn handle_in_column_group_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if token.is_whitespace() => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data, None),
            Token::Doctype { .. } => self.parse_error("unexpected DOCTYPE in column group"),
            Token::StartTag { name, .. } if name == "html" => {
                self.process_token(token, Some(InsertionMode::InBody));
            }
            Token::StartTag { name, .. } if name == "col" => self.insert_void_element(token),
            Token::EndTag { name, .. } if name == "colgroup" => {
                if self.current_node_is("colgroup") {
                    let _ = self.pop_current_node();
                    self.insertion_mode = InsertionMode::InTable;
                } else {
                    self.parse_error("stray end tag </colgroup>");
                }
            }
            Token::EndTag { name, .. } if name == "col" => {
                self.parse_error("stray end tag </col>");
            }
            Token::StartTag { name, .. } | Token::EndTag { name, .. } if name == "template" => {
                self.process_token(token, Some(InsertionMode::InHead));
            }
            Token::EndOfFile => self.process_token(token, Some(InsertionMode::InBody)),
            _ => {
                if !self.current_node_is("colgroup") {
                    self.parse_error(&format!("{token} in column group"));
                    return;
                }
                let _ = self.pop_current_node();
                self.reprocess_in(InsertionMode::InTable, token);
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(super) fn handle_in_table_body_mode(&mut self, token: &Token) {
        let leaves_section = match token {
            Token::StartTag { name, .. } => matches!(
                name.as_str(),
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
            ),
            Token::EndTag { name, .. } => name == "table",
            _ => false,
        };
        match token {
            Token::StartTag { name, .. } if name == "tr" => {
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InRow;
            }
            Token::StartTag { name, .. } if CELLS.contains(&name.as_str()) => {
                self.parse_error(&format!("<{name}> without an open <tr>"));
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.insert_html_element_named("tr");
                self.reprocess_in(InsertionMode::InRow, token);
            }
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                if !self.has_element_in_table_scope(name) {
                    self.parse_error(&format!("stray end tag </{name}>"));
                    return;
                }
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.pop_current_node();
                self.insertion_mode = InsertionMode::InTable;
            }
            _ if leaves_section => self.leave_table_body(token),
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.parse_error(&format!("stray end tag </{name}> in table body"));
            }
            _ => self.process_token(token, Some(InsertionMode::InTable)),
        }
    }

    /// Close the open table section and reprocess `token` in table.
    fn leave_table_body(&mut self, token: &Token) {
        if !self.has_any_in_scope(Scope::Table, TABLE_SECTIONS) {
            self.parse_error(&format!("{token} without an open table section"));
            return;
        }
        self.clear_stack_back_to(TABLE_BODY_CONTEXT);
        let _ = self.pop_current_node();
        self.reprocess_in(InsertionMode::InTable, token);
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(super) fn handle_in_row_mode(&mut self, token: &Token) {
        let leaves_row = match token {
            Token::StartTag { name, .. } => matches!(
                name.as_str(),
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
            ),
            Token::EndTag { name, .. } => name == "table",
            _ => false,
        };
        match token {
            Token::StartTag { name, .. } if CELLS.contains(&name.as_str()) => {
                self.clear_stack_back_to(TABLE_ROW_CONTEXT);
                let _ = self.insert_html_element(token);
                self.insertion_mode = InsertionMode::InCell;
                self.push_active_formatting_marker();
            }
            Token::EndTag { name, .. } if name == "tr" => {
                if self.close_row() {
                    self.insertion_mode = InsertionMode::InTableBody;
                }
            }
            _ if leaves_row => {
                if self.close_row() {
                    self.reprocess_in(InsertionMode::InTableBody, token);
                }
            }
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                if !self.has_element_in_table_scope(name) {
                    self.parse_error(&format!("stray end tag </{name}>"));
                    return;
                }
                if self.close_row() {
                    self.reprocess_in(InsertionMode::InTableBody, token);
                }
            }
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.parse_error(&format!("stray end tag </{name}> in row"));
            }
            _ => self.process_token(token, Some(InsertionMode::InTable)),
        }
    }

    /// Pop the open `tr`. False, after reporting, when there is none in
    /// table scope.
    fn close_row(&mut self) -> bool {
        if !self.has_element_in_table_scope("tr") {
            self.parse_error("no open <tr> to close");
            return false;
        }
        self.clear_stack_back_to(TABLE_ROW_CONTEXT);
        let _ = self.pop_current_node();
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    pub(super) fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            Token::EndTag { name, .. } if CELLS.contains(&name.as_str()) => {
                if !self.has_element_in_table_scope(name) {
                    self.parse_error(&format!("stray end tag </{name}>"));
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.parse_error(&format!("</{name}> closes other open elements"));
                }
                self.pop_until_tag(name);
                self.clear_active_formatting_elements_to_last_marker();
                self.insertion_mode = InsertionMode::InRow;
            }
            Token::StartTag { name, .. }
                if TABLE_STRUCTURE_START_TAGS.contains(&name.as_str()) =>
            {
                if !self.has_any_in_scope(Scope::Table, CELLS) {
                    self.parse_error(&format!("<{name}> outside a cell"));
                    return;
                }
                self.close_cell();
                self.process_token(token, None);
            }
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.parse_error(&format!("stray end tag </{name}> in cell"));
            }
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if !self.has_element_in_table_scope(name) {
                    self.parse_error(&format!("stray end tag </{name}>"));
                    return;
                }
                self.close_cell();
                self.process_token(token, None);
            }
            _ => self.process_token(token, Some(InsertionMode::InBody)),
        }
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    fn close_cell(&mut self) {
        self.generate_implied_end_tags(None);
        if !self.current_node_is_one_of(CELLS) {
            self.parse_error("cell closed with other elements open");
        }
        self.pop_until_one_of(CELLS);
        self.clear_active_formatting_elements_to_last_marker();
        self.insertion_mode = InsertionMode::InRow;
    }
}

#[cfg(test)]
mod tests {
    use super::is_html_whitespace;

    #[test]
    fn table_text_whitespace_excludes_nbsp() {
        assert!(" \t\n\r\u{000C}".chars().all(is_html_whitespace));
        assert!(!is_html_whitespace('\u{00A0}'));
    }
}
