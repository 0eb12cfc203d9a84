//! Character reference states, § 13.2.5.72 through § 13.2.5.80.

use super::core::HTMLTokenizer;
use super::named_character_references::{any_entity_has_prefix, lookup_entity};
use super::state::TokenizerState;
use crate::encoding::is_noncharacter;
use crate::stream::CharSource;

/// [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Numeric references in the C1 range that name a windows-1252 character
/// are remapped to it.
const C1_REPLACEMENTS: [(u32, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Largest code the accumulator tracks; anything above is out of range anyway.
const CODE_CAP: u32 = 0x11_0000;

impl<S: CharSource> HTMLTokenizer<S> {
    /// "consumed as part of an attribute": the return state is one of the
    /// attribute value states.
    fn in_attribute(&self) -> bool {
        matches!(
            self.return_state,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// [§ 13.2.5.72](https://html.spec.whatwg.org/multipage/parsing.html#flush-code-points-consumed-as-a-character-reference)
    ///
    /// "When a state says to flush code points consumed as a character
    /// reference, it means that for each code point in the temporary buffer
    /// (in the order they were added to the buffer) user agent must append the
    /// code point from the buffer to the current attribute's value if the
    /// character reference was consumed as part of an attribute, or emit the
    /// code point as a character token otherwise."
    fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        if self.in_attribute() {
            if let Some(token) = self.current_token.as_mut() {
                token.append_str_to_current_attribute_value(&buffer);
            }
        } else {
            self.emit_characters(&buffer);
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026
        // AMPERSAND (&) character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');
        match self.current_input_character {
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Flush code points consumed as a character reference. Reconsume in
            // the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the named character references
    /// table."
    ///
    /// Reads ahead under a mark while the text read so far still prefixes some
    /// entity name, then rewinds to just past the longest full match.
    pub(super) fn handle_named_character_reference_state(&mut self) {
        self.input.mark_to_end();
        let mut name = String::new();
        let mut longest: Option<(usize, &'static str)> = None;
        while let Some(c) = self.input.read() {
            name.push(c);
            if !any_entity_has_prefix(&name) {
                break;
            }
            if let Some(replacement) = lookup_entity(&name) {
                longest = Some((name.len(), replacement));
            }
        }
        let matched_len = longest.map_or(0, |(len, _)| len);
        self.input.set_mark_position(matched_len);
        let next = self.input.peek();
        self.input.unmark();

        let Some((len, replacement)) = longest else {
            // "Otherwise - Flush code points consumed as a character reference.
            // Switch to the ambiguous ampersand state."
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(TokenizerState::AmbiguousAmpersand);
            return;
        };

        let matched = &name[..len];
        self.temporary_buffer.push_str(matched);
        let ends_with_semicolon = matched.ends_with(';');

        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;),
        // and the next input character is either a U+003D EQUALS SIGN character
        // (=) or an ASCII alphanumeric, then, for historical reasons, flush code
        // points consumed as a character reference and switch to the return
        // state."
        if self.in_attribute()
            && !ends_with_semicolon
            && next.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
        {
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(self.return_state);
            return;
        }

        // "If the last character matched is not a U+003B SEMICOLON character (;),
        // then this is a missing-semicolon-after-character-reference parse error."
        if !ends_with_semicolon {
            self.parse_error("missing-semicolon-after-character-reference");
        }
        // "Set the temporary buffer to the empty string. Append one or two
        // characters corresponding to the character reference name (as given by
        // the second column of the named character references table) to the
        // temporary buffer. Flush code points consumed as a character reference.
        // Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(replacement);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "If the character reference was consumed as part of an attribute,
            // then append the current input character to the current attribute's
            // value. Otherwise, emit the current input character as a character
            // token."
            Some(c) if c.is_ascii_alphanumeric() => {
                if self.in_attribute() {
                    self.append_to_attribute_value(c);
                } else {
                    self.emit_character_token(c);
                }
            }
            // "This is an unknown-named-character-reference parse error.
            // Reconsume in the return state."
            Some(';') => {
                self.parse_error("unknown-named-character-reference");
                self.reconsume_in(self.return_state);
            }
            _ => self.reconsume_in(self.return_state),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;
        match self.current_input_character {
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    /// and [§ 13.2.5.77](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    /// hexadecimal/decimal character reference start states.
    pub(super) fn handle_numeric_character_reference_start_state(&mut self, radix: u32) {
        match self.current_input_character {
            Some(c) if c.is_digit(radix) => {
                let digits_state = if radix == 16 {
                    TokenizerState::HexadecimalCharacterReference
                } else {
                    TokenizerState::DecimalCharacterReference
                };
                self.reconsume_in(digits_state);
            }
            // "This is an absence-of-digits-in-numeric-character-reference parse
            // error. Flush code points consumed as a character reference.
            // Reconsume in the return state."
            _ => {
                self.parse_error("absence-of-digits-in-numeric-character-reference");
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.78](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    /// and [§ 13.2.5.79](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_numeric_character_reference_digits_state(&mut self, radix: u32) {
        match self.current_input_character {
            Some(c) if c.is_digit(radix) => {
                let digit = c.to_digit(radix).unwrap_or(0);
                self.character_reference_code = self
                    .character_reference_code
                    .saturating_mul(radix)
                    .saturating_add(digit)
                    .min(CODE_CAP);
            }
            Some(';') => self.switch_to(TokenizerState::NumericCharacterReferenceEnd),
            // "This is a missing-semicolon-after-character-reference parse error.
            // Reconsume in the numeric character reference end state."
            _ => {
                self.parse_error("missing-semicolon-after-character-reference");
                self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// "Check the character reference code:"
    pub(super) fn handle_numeric_character_reference_end_state(&mut self) {
        let code = self.character_reference_code;
        let replacement = if code == 0 {
            self.parse_error("null-character-reference");
            '\u{FFFD}'
        } else if code > 0x10_FFFF {
            self.parse_error("character-reference-outside-unicode-range");
            '\u{FFFD}'
        } else if (0xD800..=0xDFFF).contains(&code) {
            self.parse_error("surrogate-character-reference");
            '\u{FFFD}'
        } else {
            let c = char::from_u32(code).unwrap_or('\u{FFFD}');
            if is_noncharacter(c) {
                self.parse_error("noncharacter-character-reference");
                c
            } else if code == 0x0D || (is_control(code) && !is_ascii_whitespace(code)) {
                self.parse_error("control-character-reference");
                C1_REPLACEMENTS
                    .iter()
                    .find(|(from, _)| *from == code)
                    .map_or(c, |&(_, to)| to)
            } else {
                c
            }
        };
        // "Set the temporary buffer to the empty string. Append a code point equal
        // to the character reference code to the temporary buffer. Flush code
        // points consumed as a character reference. Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push(replacement);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
    }
}

/// [Infra § 4.6 control](https://infra.spec.whatwg.org/#control): a C0
/// control or a code point in U+007F DELETE to U+009F.
const fn is_control(code: u32) -> bool {
    code <= 0x1F || (code >= 0x7F && code <= 0x9F)
}

const fn is_ascii_whitespace(code: u32) -> bool {
    matches!(code, 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

#[cfg(test)]
mod tests {
    use super::C1_REPLACEMENTS;

    #[test]
    fn c1_table_is_sorted_and_skips_unmapped_codes() {
        assert!(C1_REPLACEMENTS.windows(2).all(|w| w[0].0 < w[1].0));
        for unmapped in [0x81, 0x8D, 0x8F, 0x90, 0x9D] {
            assert!(C1_REPLACEMENTS.iter().all(|(code, _)| *code != unmapped));
        }
    }
}
