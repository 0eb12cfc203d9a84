//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)

use std::collections::VecDeque;
use std::io::Read;

use encoding_rs::Encoding;
use wren_common::issue::{IssueStage, ParseIssue};

use super::source::ByteSource;
use crate::error::ParseError;
use crate::stream::CharSource;

const CHUNK_SIZE: usize = 4096;

/// Newline normalization, BOM stripping and error flagging shared by every
/// character source.
#[derive(Debug, Default)]
pub struct Normalizer {
    started: bool,
    after_cr: bool,
    had_error: bool,
    position: usize,
    issues: Option<Vec<ParseIssue>>,
}

impl Normalizer {
    /// A normalizer that only keeps the sticky flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A normalizer that also records each offending character.
    #[must_use]
    pub fn collecting() -> Self {
        Self {
            issues: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Feed one decoded character. Returns what the tokenizer should see,
    /// or `None` when the character is swallowed.
    pub fn normalize(&mut self, c: char) -> Option<char> {
        let first = !self.started;
        self.started = true;

        // "One leading U+FEFF BYTE ORDER MARK character must be ignored if
        // any are present."
        if first && c == '\u{FEFF}' {
            return None;
        }

        // "normalize newlines by replacing every U+000D CR U+000A LF code
        // point pair with a single U+000A LF code point, and then replacing
        // every remaining U+000D CR code point with a U+000A LF code point."
        let after_cr = std::mem::replace(&mut self.after_cr, c == '\r');
        if c == '\n' && after_cr {
            return None;
        }
        self.position += 1;
        if c == '\r' {
            return Some('\n');
        }

        if is_control(c) {
            self.error(format!("control-character-in-input-stream U+{:04X}", u32::from(c)));
        } else if is_noncharacter(c) {
            self.error(format!("noncharacter-in-input-stream U+{:04X}", u32::from(c)));
        }
        Some(c)
    }

    /// Record a malformed byte sequence.
    pub fn malformed(&mut self, encoding: &'static Encoding) {
        self.error(format!("malformed {} byte sequence", encoding.name()));
    }

    fn error(&mut self, message: String) {
        log::debug!(target: "wren_html::decoder", "{message} at {}", self.position);
        self.had_error = true;
        if let Some(issues) = self.issues.as_mut() {
            issues.push(ParseIssue {
                stage: IssueStage::Decoder,
                message,
                position: self.position,
            });
        }
    }

    /// Sticky flag: true once any error was seen.
    #[must_use]
    pub const fn had_error(&self) -> bool {
        self.had_error
    }

    /// Drain the recorded issues.
    pub fn take_issues(&mut self) -> Vec<ParseIssue> {
        self.issues.as_mut().map(std::mem::take).unwrap_or_default()
    }
}

/// [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
/// "Any occurrences of surrogates are surrogate-in-input-stream parse errors."
/// Rust `char`s cannot hold surrogates; lone surrogates in UTF-16 input are
/// reported by the decoder as malformed sequences instead.
const fn is_control(c: char) -> bool {
    let c = c as u32;
    // C0 controls other than ASCII whitespace, plus DEL and the C1 range.
    (c < 0x20 && !matches!(c, 0x09 | 0x0A | 0x0C | 0x0D)) || (c >= 0x7F && c <= 0x9F)
}

/// [Infra § 4.6](https://infra.spec.whatwg.org/#noncharacter)
pub(crate) const fn is_noncharacter(c: char) -> bool {
    let c = c as u32;
    (c >= 0xFDD0 && c <= 0xFDEF) || (c & 0xFFFE) == 0xFFFE
}

/// Pulls bytes from a [`ByteSource`] and yields normalized characters.
///
/// Malformed byte sequences decode to U+FFFD and set the sticky error flag.
/// A read failure ends the character stream early; the driver collects it
/// with [`Decoder::take_io_error`].
pub struct Decoder<R> {
    source: ByteSource<R>,
    encoding: &'static Encoding,
    inner: encoding_rs::Decoder,
    pending: VecDeque<char>,
    normalizer: Normalizer,
    finished: bool,
    io_error: Option<ParseError>,
}

impl<R: Read> Decoder<R> {
    /// Decode `source` from its current position as `encoding`.
    pub fn new(source: ByteSource<R>, encoding: &'static Encoding, normalizer: Normalizer) -> Self {
        Self {
            source,
            encoding,
            // BOMs are left in the character stream; the normalizer drops
            // the first one regardless of which encoding produced it.
            inner: encoding.new_decoder_without_bom_handling(),
            pending: VecDeque::new(),
            normalizer,
            finished: false,
            io_error: None,
        }
    }

    /// The encoding being decoded.
    #[must_use]
    pub const fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Give back the byte source, e.g. to rewind it for a restart.
    pub fn into_source(self) -> ByteSource<R> {
        self.source
    }

    /// Mutable access to the byte source.
    pub fn source_mut(&mut self) -> &mut ByteSource<R> {
        &mut self.source
    }

    /// The read error that ended the stream early, if any.
    pub fn take_io_error(&mut self) -> Option<ParseError> {
        self.io_error.take()
    }

    fn refill(&mut self) {
        let mut bytes = [0u8; CHUNK_SIZE];
        let read = match self.source.read(&mut bytes) {
            Ok(read) => read,
            Err(err) => {
                self.io_error = Some(ParseError::Io(err));
                0
            }
        };
        let last = read == 0;
        let mut input = &bytes[..read];
        let mut decoded = String::new();
        loop {
            let needed = self
                .inner
                .max_utf8_buffer_length(input.len())
                .unwrap_or(CHUNK_SIZE * 3);
            decoded.reserve(needed);
            let (result, consumed, replaced) =
                self.inner.decode_to_string(input, &mut decoded, last);
            if replaced {
                self.normalizer.malformed(self.encoding);
            }
            input = &input[consumed..];
            if result == encoding_rs::CoderResult::InputEmpty {
                break;
            }
        }
        self.pending.extend(decoded.chars());
        if last {
            self.finished = true;
        }
    }
}

impl<R: Read> CharSource for Decoder<R> {
    fn next_char(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.pending.pop_front() {
                if let Some(c) = self.normalizer.normalize(c) {
                    return Some(c);
                }
                continue;
            }
            if self.finished {
                return None;
            }
            self.refill();
        }
    }

    fn had_error(&self) -> bool {
        self.normalizer.had_error()
    }

    fn take_issues(&mut self) -> Vec<ParseIssue> {
        self.normalizer.take_issues()
    }

    fn disable_buffering(&mut self) {
        self.source.disable_buffering();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8], encoding: &'static Encoding) -> (String, bool) {
        let mut decoder = Decoder::new(ByteSource::new(bytes), encoding, Normalizer::new());
        let mut out = String::new();
        while let Some(c) = decoder.next_char() {
            out.push(c);
        }
        (out, decoder.had_error())
    }

    #[test]
    fn newlines_are_normalized() {
        let (text, error) = decode(b"a\r\nb\rc\n\r", encoding_rs::UTF_8);
        assert_eq!(text, "a\nb\nc\n\n");
        assert!(!error);
    }

    #[test]
    fn one_leading_bom_is_stripped() {
        let (text, _) = decode(b"\xEF\xBB\xBF\xEF\xBB\xBFx", encoding_rs::UTF_8);
        assert_eq!(text, "\u{FEFF}x");
    }

    #[test]
    fn malformed_bytes_become_replacement_characters() {
        let (text, error) = decode(b"a\xFFb", encoding_rs::UTF_8);
        assert_eq!(text, "a\u{FFFD}b");
        assert!(error);
    }

    #[test]
    fn controls_and_noncharacters_set_the_flag() {
        assert!(decode(b"a\x01", encoding_rs::UTF_8).1);
        assert!(decode("\u{FDD0}".as_bytes(), encoding_rs::UTF_8).1);
        assert!(decode("\u{10FFFF}".as_bytes(), encoding_rs::UTF_8).1);
        assert!(!decode(b"tab\there\x0Cff", encoding_rs::UTF_8).1);
    }

    #[test]
    fn legacy_encodings_decode() {
        let (text, error) = decode(b"caf\xE9", encoding_rs::WINDOWS_1252);
        assert_eq!(text, "café");
        assert!(!error);
    }
}
