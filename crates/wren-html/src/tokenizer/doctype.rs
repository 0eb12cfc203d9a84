//! DOCTYPE states, § 13.2.5.53 through § 13.2.5.68.

use super::core::HTMLTokenizer;
use super::state::TokenizerState;
use super::token::Token;
use crate::stream::CharSource;

impl<S: CharSource> HTMLTokenizer<S> {
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPEName),
            // "This is an eof-in-doctype parse error. Create a new DOCTYPE token.
            // Set its force-quirks flag to on. Emit the current token. Emit an
            // end-of-file token."
            None => {
                self.current_token = Some(Token::new_doctype());
                self.eof_in_doctype();
            }
            Some(_) => {
                self.parse_error("missing-whitespace-before-doctype-name");
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.start_doctype_named('\u{FFFD}');
            }
            // "This is a missing-doctype-name parse error. Create a new DOCTYPE
            // token. Set its force-quirks flag to on. Switch to the data state.
            // Emit the current token."
            Some('>') => {
                self.parse_error("missing-doctype-name");
                let mut doctype = Token::new_doctype();
                doctype.set_force_quirks();
                self.switch_to(TokenizerState::Data);
                self.emit(doctype);
            }
            None => {
                self.current_token = Some(Token::new_doctype());
                self.eof_in_doctype();
            }
            Some(c) => self.start_doctype_named(c.to_ascii_lowercase()),
        }
    }

    fn start_doctype_named(&mut self, first: char) {
        let mut doctype = Token::new_doctype();
        doctype.append_to_doctype_name(first);
        self.current_token = Some(doctype);
        self.switch_to(TokenizerState::DOCTYPEName);
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.with_doctype(|t| t.append_to_doctype_name('\u{FFFD}'));
            }
            None => self.eof_in_doctype(),
            Some(c) => self.with_doctype(|t| t.append_to_doctype_name(c.to_ascii_lowercase())),
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) {
        let current = self.current_input_character;
        match current {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            // "If the six characters starting from the current input character are
            // an ASCII case-insensitive match for the word 'PUBLIC', then consume
            // those characters and switch to the after DOCTYPE public keyword
            // state."
            Some(c) if c.eq_ignore_ascii_case(&'p') && self.next_few_characters_are("UBLIC", true) => {
                self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
            }
            Some(c) if c.eq_ignore_ascii_case(&'s') && self.next_few_characters_are("YSTEM", true) => {
                self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
            }
            // "Otherwise, this is an invalid-character-sequence-after-doctype-name
            // parse error. Set the current DOCTYPE token's force-quirks flag to on.
            // Reconsume in the bogus DOCTYPE state."
            Some(_) => {
                self.parse_error("invalid-character-sequence-after-doctype-name");
                self.with_doctype(Token::set_force_quirks);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.57](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    /// and [§ 13.2.5.63](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    /// after DOCTYPE public/system keyword states.
    pub(super) fn handle_after_doctype_keyword_state(&mut self, public: bool) {
        let before_state = if public {
            TokenizerState::BeforeDOCTYPEPublicIdentifier
        } else {
            TokenizerState::BeforeDOCTYPESystemIdentifier
        };
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => self.switch_to(before_state),
            // "This is a missing-whitespace-after-doctype-public-keyword parse
            // error. Set the current DOCTYPE token's public identifier to the
            // empty string (not missing), then switch to the DOCTYPE public
            // identifier (double-quoted) state."
            Some(quote @ ('"' | '\'')) => {
                if public {
                    self.parse_error("missing-whitespace-after-doctype-public-keyword");
                } else {
                    self.parse_error("missing-whitespace-after-doctype-system-keyword");
                }
                self.open_doctype_identifier(quote, public);
            }
            _ => self.doctype_identifier_missing(public),
        }
    }

    /// [§ 13.2.5.58](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    /// and [§ 13.2.5.64](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_identifier_state(&mut self, public: bool) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some(quote @ ('"' | '\'')) => self.open_doctype_identifier(quote, public),
            _ => self.doctype_identifier_missing(public),
        }
    }

    /// Shared `>`, EOF and "anything else" branches of the keyword and
    /// before-identifier states.
    fn doctype_identifier_missing(&mut self, public: bool) {
        match self.current_input_character {
            // "This is a missing-doctype-public-identifier parse error. Set the
            // current DOCTYPE token's force-quirks flag to on. Switch to the data
            // state. Emit the current DOCTYPE token."
            Some('>') => {
                if public {
                    self.parse_error("missing-doctype-public-identifier");
                } else {
                    self.parse_error("missing-doctype-system-identifier");
                }
                self.with_doctype(Token::set_force_quirks);
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            // "This is a missing-quote-before-doctype-public-identifier parse
            // error. Set the current DOCTYPE token's force-quirks flag to on.
            // Reconsume in the bogus DOCTYPE state."
            Some(_) => {
                if public {
                    self.parse_error("missing-quote-before-doctype-public-identifier");
                } else {
                    self.parse_error("missing-quote-before-doctype-system-identifier");
                }
                self.with_doctype(Token::set_force_quirks);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    fn open_doctype_identifier(&mut self, quote: char, public: bool) {
        let next = match (public, quote) {
            (true, '"') => TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted,
            (true, _) => TokenizerState::DOCTYPEPublicIdentifierSingleQuoted,
            (false, '"') => TokenizerState::DOCTYPESystemIdentifierDoubleQuoted,
            (false, _) => TokenizerState::DOCTYPESystemIdentifierSingleQuoted,
        };
        if public {
            self.with_doctype(Token::set_public_identifier_empty);
        } else {
            self.with_doctype(Token::set_system_identifier_empty);
        }
        self.switch_to(next);
    }

    /// [§ 13.2.5.59 - 13.2.5.60](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// and [§ 13.2.5.65 - 13.2.5.66](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    /// quoted identifier states.
    pub(super) fn handle_doctype_identifier_quoted_state(&mut self, quote: char, public: bool) {
        match self.current_input_character {
            Some(c) if c == quote => {
                if public {
                    self.switch_to(TokenizerState::AfterDOCTYPEPublicIdentifier);
                } else {
                    self.switch_to(TokenizerState::AfterDOCTYPESystemIdentifier);
                }
            }
            Some('\0') => {
                self.parse_error("unexpected-null-character");
                self.append_to_doctype_identifier('\u{FFFD}', public);
            }
            // "This is an abrupt-doctype-public-identifier parse error. Set the
            // current DOCTYPE token's force-quirks flag to on. Switch to the data
            // state. Emit the current DOCTYPE token."
            Some('>') => {
                if public {
                    self.parse_error("abrupt-doctype-public-identifier");
                } else {
                    self.parse_error("abrupt-doctype-system-identifier");
                }
                self.with_doctype(Token::set_force_quirks);
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            Some(c) => self.append_to_doctype_identifier(c, public),
        }
    }

    fn append_to_doctype_identifier(&mut self, c: char, public: bool) {
        if public {
            self.with_doctype(|t| t.append_to_public_identifier(c));
        } else {
            self.with_doctype(|t| t.append_to_system_identifier(c));
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            Some('"' | '\'') => {
                self.parse_error("missing-whitespace-between-doctype-public-and-system-identifiers");
                self.handle_between_doctype_public_and_system_identifiers_state();
            }
            _ => self.handle_between_doctype_public_and_system_identifiers_state(),
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some(quote @ ('"' | '\'')) => self.open_doctype_identifier(quote, false),
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error("missing-quote-before-doctype-system-identifier");
                self.with_doctype(Token::set_force_quirks);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            // "This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does not
            // set the current DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.parse_error("unexpected-character-after-doctype-system-identifier");
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => self.parse_error("unexpected-null-character"),
            // "Emit the DOCTYPE token. Emit an end-of-file token."
            None => {
                self.emit_current_token();
                self.emit_eof_token();
            }
            Some(_) => {}
        }
    }

    /// "This is an eof-in-doctype parse error. Set the current DOCTYPE token's
    /// force-quirks flag to on. Emit the current DOCTYPE token. Emit an
    /// end-of-file token."
    fn eof_in_doctype(&mut self) {
        self.parse_error("eof-in-doctype");
        self.with_doctype(Token::set_force_quirks);
        self.emit_current_token();
        self.emit_eof_token();
    }

    fn with_doctype(&mut self, f: impl FnOnce(&mut Token)) {
        if let Some(token) = self.current_token.as_mut() {
            f(token);
        }
    }
}
