//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! - State transitions ("Switch to", "Reconsume in")
//! - Input handling ("Consume the next input character", lookahead)
//! - Token emission ("Emit the current token")
//! - End tag helpers for RCDATA, RAWTEXT and script data
//! - Attribute bookkeeping for duplicate detection

use wren_common::issue::{IssueStage, ParseIssue};

use super::core::HTMLTokenizer;
use super::state::TokenizerState;
use super::token::Token;
use crate::stream::CharSource;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl<S: CharSource> HTMLTokenizer<S> {
    /// "Switch to the X state"
    ///
    /// Also called by the tree builder after inserting `title`, `textarea`,
    /// `style`, `script`, `plaintext` and the other raw text elements.
    pub const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The current input character goes back onto the stream, so the next
    /// step consumes it again in the new state. At end of input there is
    /// nothing to put back: the stream keeps reporting EOF.
    pub(super) fn reconsume_in(&mut self, new_state: TokenizerState) {
        if let Some(c) = self.current_input_character {
            self.input.unread(c);
        }
        self.state = new_state;
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

impl<S: CharSource> HTMLTokenizer<S> {
    /// "Consume the next input character"
    pub(super) fn consume(&mut self) {
        self.current_input_character = self.input.read();
    }

    /// "If the next few characters are ..."
    ///
    /// On a match the characters are consumed; otherwise the stream is left
    /// where it was.
    pub(super) fn next_few_characters_are(&mut self, expected: &str, ignore_case: bool) -> bool {
        self.input.mark_to_end();
        for want in expected.chars() {
            let matched = self.input.read().is_some_and(|got| {
                if ignore_case {
                    got.eq_ignore_ascii_case(&want)
                } else {
                    got == want
                }
            });
            if !matched {
                self.input.set_mark_position(0);
                self.input.unmark();
                return false;
            }
        }
        self.input.unmark();
        true
    }

    /// [Infra § 4.6 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace),
    /// minus CR which never reaches the tokenizer.
    pub(super) const fn is_whitespace_char(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\x0C' | ' ')
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

impl<S: CharSource> HTMLTokenizer<S> {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records `code` (the error's name in the parse error table) and keeps
    /// going: every tokenizer error has a defined recovery.
    pub(super) fn parse_error(&mut self, code: &'static str) {
        let position = self.input.consumed();
        log::debug!(
            target: "wren_html::tokenizer",
            "{code} at character {position} in {} state",
            self.state
        );
        self.had_error = true;
        if let Some(issues) = self.issues.as_mut() {
            issues.push(ParseIssue {
                stage: IssueStage::Tokenizer,
                message: code.to_string(),
                position,
            });
        }
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl<S: CharSource> HTMLTokenizer<S> {
    /// "Emit the current token"
    pub(super) fn emit_current_token(&mut self) {
        if let Some(token) = self.current_token.take() {
            self.emit(token);
        }
    }

    pub(super) fn emit(&mut self, mut token: Token) {
        match &token {
            Token::StartTag { name, .. } => {
                let name = name.clone();
                self.drop_duplicate_attribute(&mut token);
                self.last_start_tag_name = Some(name);
            }
            Token::EndTag {
                attributes,
                self_closing,
                ..
            } => {
                // "When an end tag token is emitted with attributes, that is an
                // end-tag-with-attributes parse error."
                if !attributes.is_empty() {
                    self.parse_error("end-tag-with-attributes");
                }
                // "When an end tag token is emitted with its self-closing flag
                // set, that is an end-tag-with-trailing-solidus parse error."
                if *self_closing {
                    self.parse_error("end-tag-with-trailing-solidus");
                }
                self.drop_duplicate_attribute(&mut token);
            }
            Token::EndOfFile => self.eof_emitted = true,
            _ => {}
        }
        self.pending.push_back(token);
    }

    /// Emit a character token.
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.emit(Token::Character { data: c });
    }

    /// Emit one character token per character of `s`.
    pub(super) fn emit_characters(&mut self, s: &str) {
        for c in s.chars() {
            self.emit_character_token(c);
        }
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof_token(&mut self) {
        self.emit(Token::EndOfFile);
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-end-tag-token)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any. If no start tag has been emitted from this tokenizer,
    /// then no end tag token is appropriate."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        match (&self.current_token, &self.last_start_tag_name) {
            (Some(Token::EndTag { name, .. }), Some(last)) => name == last,
            _ => false,
        }
    }

    /// The shared "anything else" branch of the RCDATA, RAWTEXT and script
    /// data end tag name states:
    ///
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
    /// character token, and a character token for each of the characters in
    /// the temporary buffer (in the order they were added to the buffer).
    /// Reconsume in the X state."
    pub(super) fn abandon_end_tag(&mut self, text_state: TokenizerState) {
        self.current_token = None;
        self.emit_character_token('<');
        self.emit_character_token('/');
        let buffer = std::mem::take(&mut self.temporary_buffer);
        self.emit_characters(&buffer);
        self.reconsume_in(text_state);
    }

    /// Shared tail of the end tag name states for tab, LF, FF, space, `/`
    /// and `>`: act on an appropriate end tag, otherwise fall back to
    /// [`Self::abandon_end_tag`].
    pub(super) fn end_tag_name_boundary(&mut self, c: char, text_state: TokenizerState) {
        if !self.is_appropriate_end_tag_token() {
            self.abandon_end_tag(text_state);
            return;
        }
        match c {
            '/' => self.switch_to(TokenizerState::SelfClosingStartTag),
            '>' => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            _ => self.switch_to(TokenizerState::BeforeAttributeName),
        }
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl<S: CharSource> HTMLTokenizer<S> {
    /// "Start a new attribute in the current tag token."
    pub(super) fn start_new_attribute(&mut self) {
        if let Some(mut token) = self.current_token.take() {
            self.drop_duplicate_attribute(&mut token);
            token.start_new_attribute();
            self.current_token = Some(token);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state (and before
    /// emitting the tag token, if appropriate), the complete attribute's name
    /// must be compared to the other attributes on the same token; if there is
    /// already an attribute on the token with the exact same name, then this is
    /// a duplicate-attribute parse error and the new attribute must be removed
    /// from the token."
    ///
    /// The removal waits until the attribute is complete, so its value is
    /// still consumed into it rather than into the earlier attribute.
    pub(super) fn leave_attribute_name_state(&mut self) {
        let duplicate = self
            .current_token
            .as_ref()
            .is_some_and(Token::current_attribute_name_is_duplicate);
        if duplicate {
            self.parse_error("duplicate-attribute");
            self.drop_current_attribute = true;
        }
    }

    fn drop_duplicate_attribute(&mut self, token: &mut Token) {
        if std::mem::take(&mut self.drop_current_attribute) {
            token.remove_current_attribute();
        }
    }
}
