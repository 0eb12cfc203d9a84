//! [§ 13.2.3.2 Determining the character encoding](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding)
//!
//! Every function here is pure: it only looks at the byte prefix it is
//! given. Callers re-read the input from byte zero afterwards.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use super::{EncodingConfidence, ascii_compatible, fallback_for_locale};

/// Result of the UTF-8 well-formedness heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Validity {
    /// Contains multi-byte sequences and every one is well formed.
    Valid,
    /// Contains a byte sequence UTF-8 forbids.
    Invalid,
    /// Pure ASCII, or nothing decisive before the prefix ran out.
    Ambiguous,
}

/// Pick the encoding for a document.
///
/// In order, first match wins: byte order mark, transport label, `<meta>`
/// prescan, the UTF-8 heuristic, then the locale fallback. `at_eof` says
/// whether `prefix` holds the whole input.
#[must_use]
pub fn sniff(
    prefix: &[u8],
    at_eof: bool,
    transport_label: Option<&str>,
    locale: Option<&str>,
) -> EncodingConfidence {
    if let Some(encoding) = bom(prefix) {
        log::debug!(target: "wren_html::encoding", "byte order mark: {}", encoding.name());
        return EncodingConfidence::certain(encoding);
    }

    if let Some(label) = transport_label {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => {
                log::debug!(target: "wren_html::encoding", "transport label {label:?}: {}", encoding.name());
                return EncodingConfidence::certain(encoding);
            }
            None => {
                let _ = wren_common::warning::warn_once(
                    "Encoding",
                    &format!("ignoring unknown transport encoding label {label:?}"),
                );
            }
        }
    }

    if let Some(encoding) = prescan(prefix) {
        log::debug!(target: "wren_html::encoding", "meta prescan: {}", encoding.name());
        return EncodingConfidence::certain(encoding);
    }

    if classify_utf8(prefix, at_eof) == Utf8Validity::Valid {
        log::debug!(target: "wren_html::encoding", "prefix is well-formed UTF-8");
        return EncodingConfidence::tentative(UTF_8);
    }

    let fallback = fallback_for_locale(locale);
    log::debug!(target: "wren_html::encoding", "falling back to {}", fallback.name());
    EncodingConfidence::tentative(fallback)
}

/// [Encoding § 6 BOM sniff](https://encoding.spec.whatwg.org/#bom-sniff)
#[must_use]
pub fn bom(prefix: &[u8]) -> Option<&'static Encoding> {
    match prefix {
        [0xEF, 0xBB, 0xBF, ..] => Some(UTF_8),
        [0xFE, 0xFF, ..] => Some(UTF_16BE),
        [0xFF, 0xFE, ..] => Some(UTF_16LE),
        _ => None,
    }
}

const fn is_space(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

enum Attr {
    Found(Vec<u8>, Vec<u8>),
    /// Reached `>`: the tag has no more attributes.
    End,
    /// Ran off the end of the prefix.
    Eof,
}

/// [§ 13.2.3.2 Prescan a byte stream to determine its encoding](https://html.spec.whatwg.org/multipage/parsing.html#prescan-a-byte-stream-to-determine-its-encoding)
#[must_use]
pub fn prescan(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut scanner = Prescanner { bytes, position: 0 };
    scanner.run()
}

struct Prescanner<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl Prescanner<'_> {
    fn rest(&self) -> &[u8] {
        self.bytes.get(self.position..).unwrap_or_default()
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn starts_with_ignore_case(&self, pattern: &[u8]) -> bool {
        let rest = self.rest();
        rest.len() >= pattern.len() && rest[..pattern.len()].eq_ignore_ascii_case(pattern)
    }

    /// Move to just past the next `needle`. False if there is none.
    fn skip_past(&mut self, needle: &[u8], from: usize) -> bool {
        let start = self.position + from;
        let found = self
            .bytes
            .get(start..)
            .and_then(|hay| hay.windows(needle.len()).position(|w| w == needle));
        match found {
            Some(offset) => {
                self.position = start + offset + needle.len();
                true
            }
            None => false,
        }
    }

    fn run(&mut self) -> Option<&'static Encoding> {
        while self.position < self.bytes.len() {
            // "A sequence of bytes starting with: 0x3C 0x21 0x2D 0x2D (`<!--`)"
            if self.rest().starts_with(b"<!--") {
                // "Advance the position pointer so that it points at the first
                // 0x3E byte which is preceded by two 0x2D bytes ... and comes
                // after the 0x3C byte that was found."
                if !self.skip_past(b"-->", 2) {
                    return None;
                }
                continue;
            }

            // "A sequence of bytes starting with: 0x3C, 0x4D or 0x6D, 0x45 or
            // 0x65, 0x54 or 0x74, 0x41 or 0x61, and one of 0x09, 0x0A, 0x0C,
            // 0x0D, 0x20, 0x2F (case-insensitive ASCII '<meta' followed by a
            // space or slash)"
            if self.starts_with_ignore_case(b"<meta")
                && self
                    .bytes
                    .get(self.position + 5)
                    .is_some_and(|&b| is_space(b) || b == b'/')
            {
                self.position += 6;
                match self.meta() {
                    Some(Some(encoding)) => return Some(encoding),
                    Some(None) => {}
                    None => return None,
                }
                self.position += 1;
                continue;
            }

            let rest = self.rest();
            // "A sequence of bytes starting with a 0x3C byte (<), optionally a
            // 0x2F byte (/), and finally a byte in the range 0x41-0x5A or
            // 0x61-0x7A (A-Z or a-z)"
            let tag_open = match rest {
                [b'<', b'/', c, ..] | [b'<', c, ..] if c.is_ascii_alphabetic() => true,
                _ => false,
            };
            if tag_open {
                // "Advance the position pointer so that it points at the next
                // 0x09, 0x0A, 0x0C, 0x0D, 0x20, or 0x3E byte."
                while let Some(b) = self.current() {
                    if is_space(b) || b == b'>' {
                        break;
                    }
                    self.position += 1;
                }
                // "Repeatedly get an attribute until no further attributes
                // can be found, then jump to the step below labeled next byte."
                loop {
                    match self.get_attribute() {
                        Attr::Found(..) => {}
                        Attr::End => break,
                        Attr::Eof => return None,
                    }
                }
                self.position += 1;
                continue;
            }

            let rest = self.rest();
            // "A sequence of bytes starting with: 0x3C 0x21 (`<!`)
            //  A sequence of bytes starting with: 0x3C 0x2F (`</`)
            //  A sequence of bytes starting with: 0x3C 0x3F (`<?`)"
            if rest.starts_with(b"<!") || rest.starts_with(b"</") || rest.starts_with(b"<?") {
                if !self.skip_past(b">", 0) {
                    return None;
                }
                continue;
            }

            // "Any other byte: Do nothing with that byte."
            self.position += 1;
        }
        None
    }

    /// The `<meta` branch. `None` aborts the prescan, `Some(None)` means this
    /// tag settled nothing.
    fn meta(&mut self) -> Option<Option<&'static Encoding>> {
        let mut seen: Vec<Vec<u8>> = Vec::new();
        let mut got_pragma = false;
        let mut need_pragma: Option<bool> = None;
        let mut charset: Option<&'static Encoding> = None;

        loop {
            let (name, value) = match self.get_attribute() {
                Attr::Found(name, value) => (name, value),
                Attr::End => break,
                Attr::Eof => return None,
            };
            // "If the attribute's name is already in attribute list, then
            // return to the step labeled attributes."
            if seen.contains(&name) {
                continue;
            }
            match name.as_slice() {
                b"http-equiv" => {
                    if value == b"content-type" {
                        got_pragma = true;
                    }
                }
                b"content" => {
                    if charset.is_none()
                        && let Some(encoding) = extract_charset_from_content(&value)
                    {
                        charset = Some(encoding);
                        need_pragma = Some(true);
                    }
                }
                b"charset" => {
                    charset = Encoding::for_label(&value);
                    need_pragma = Some(false);
                }
                _ => {}
            }
            seen.push(name);
        }

        // "Processing: If need pragma is null, then jump to the step below
        // labeled next byte."
        let Some(need_pragma) = need_pragma else {
            return Some(None);
        };
        if need_pragma && !got_pragma {
            return Some(None);
        }
        Some(charset.map(ascii_compatible))
    }

    /// [§ 13.2.3.2 Get an attribute](https://html.spec.whatwg.org/multipage/parsing.html#concept-get-attributes-when-sniffing)
    fn get_attribute(&mut self) -> Attr {
        // "If the byte at position is one of 0x09, 0x0A, 0x0C, 0x0D, 0x20, or
        // 0x2F then advance position to the next byte and redo this step."
        while let Some(b) = self.current() {
            if !(is_space(b) || b == b'/') {
                break;
            }
            self.position += 1;
        }
        let Some(first) = self.current() else {
            return Attr::Eof;
        };
        if first == b'>' {
            return Attr::End;
        }

        let mut name = Vec::new();
        let value = Vec::new();

        // Attribute name.
        loop {
            let Some(b) = self.current() else {
                return Attr::Eof;
            };
            match b {
                b'=' if !name.is_empty() => {
                    self.position += 1;
                    return self.attribute_value(name);
                }
                _ if is_space(b) => break,
                b'/' | b'>' => return Attr::Found(name, value),
                _ => name.push(b.to_ascii_lowercase()),
            }
            self.position += 1;
        }

        // "Spaces: If the byte at position is one of 0x09, 0x0A, 0x0C, 0x0D,
        // or 0x20 then advance position to the next byte, then, repeat this
        // step."
        while self.current().is_some_and(is_space) {
            self.position += 1;
        }
        match self.current() {
            None => Attr::Eof,
            Some(b'=') => {
                self.position += 1;
                self.attribute_value(name)
            }
            Some(_) => Attr::Found(name, value),
        }
    }

    fn attribute_value(&mut self, name: Vec<u8>) -> Attr {
        let mut value = Vec::new();
        while self.current().is_some_and(is_space) {
            self.position += 1;
        }
        let Some(first) = self.current() else {
            return Attr::Eof;
        };
        match first {
            b'"' | b'\'' => {
                // "Quote loop"
                loop {
                    self.position += 1;
                    let Some(b) = self.current() else {
                        return Attr::Eof;
                    };
                    if b == first {
                        self.position += 1;
                        return Attr::Found(name, value);
                    }
                    value.push(b.to_ascii_lowercase());
                }
            }
            b'>' => return Attr::Found(name, value),
            _ => {
                value.push(first.to_ascii_lowercase());
                self.position += 1;
            }
        }
        loop {
            let Some(b) = self.current() else {
                return Attr::Eof;
            };
            if is_space(b) || b == b'>' {
                return Attr::Found(name, value);
            }
            value.push(b.to_ascii_lowercase());
            self.position += 1;
        }
    }
}

/// [§ 2.5.5 Extracting character encodings from meta elements](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#algorithm-for-extracting-a-character-encoding-from-a-meta-element)
#[must_use]
pub fn extract_charset_from_content(content: &[u8]) -> Option<&'static Encoding> {
    let mut position = 0;
    loop {
        // "Loop: Find the first seven characters in s after position that are
        // an ASCII case-insensitive match for the word "charset"."
        let offset = content
            .get(position..)?
            .windows(7)
            .position(|w| w.eq_ignore_ascii_case(b"charset"))?;
        position += offset + 7;

        // "Skip any ASCII whitespace that immediately follow the word "charset""
        while content.get(position).copied().is_some_and(is_space) {
            position += 1;
        }

        // "If the next character is not a U+003D (=), then move position to
        // point just before that next character, and jump back to the step
        // labeled loop."
        if content.get(position) != Some(&b'=') {
            continue;
        }
        position += 1;
        while content.get(position).copied().is_some_and(is_space) {
            position += 1;
        }

        let rest = &content[position..];
        return match rest.first() {
            Some(&quote @ (b'"' | b'\'')) => {
                // "If the next character is a U+0022 (") or U+0027 (') and
                // there is a later matching character, return the result of
                // getting an encoding from the substring between them."
                let end = rest[1..].iter().position(|&b| b == quote)?;
                Encoding::for_label(&rest[1..=end])
            }
            Some(_) => {
                let end = rest
                    .iter()
                    .position(|&b| is_space(b) || b == b';')
                    .unwrap_or(rest.len());
                Encoding::for_label(&rest[..end])
            }
            None => None,
        };
    }
}

/// Classify `prefix` as UTF-8.
///
/// Trailing bytes are checked against the legal ranges of the UTF-8 table,
/// so overlong forms (`E0 80`), surrogates (`ED A0`) and values above
/// U+10FFFF (`F4 90`) count as invalid. A multi-byte sequence cut off by the
/// end of the prefix is ignored, unless `at_eof` says the input really ends
/// there.
#[must_use]
pub fn classify_utf8(prefix: &[u8], at_eof: bool) -> Utf8Validity {
    let mut saw_multibyte = false;
    let mut i = 0;
    while i < prefix.len() {
        let lead = prefix[i];
        if lead < 0x80 {
            i += 1;
            continue;
        }
        // (number of continuation bytes, legal range for the first one)
        let (count, lower, upper) = match lead {
            0xC2..=0xDF => (1, 0x80, 0xBF),
            0xE0 => (2, 0xA0, 0xBF),
            0xE1..=0xEC | 0xEE..=0xEF => (2, 0x80, 0xBF),
            0xED => (2, 0x80, 0x9F),
            0xF0 => (3, 0x90, 0xBF),
            0xF1..=0xF3 => (3, 0x80, 0xBF),
            0xF4 => (3, 0x80, 0x8F),
            _ => return Utf8Validity::Invalid,
        };
        for k in 1..=count {
            let Some(&byte) = prefix.get(i + k) else {
                if at_eof {
                    return Utf8Validity::Invalid;
                }
                // Truncated by the prefix limit.
                return if saw_multibyte {
                    Utf8Validity::Valid
                } else {
                    Utf8Validity::Ambiguous
                };
            };
            let (lo, hi) = if k == 1 { (lower, upper) } else { (0x80, 0xBF) };
            if !(lo..=hi).contains(&byte) {
                return Utf8Validity::Invalid;
            }
        }
        saw_multibyte = true;
        i += count + 1;
    }
    if saw_multibyte {
        Utf8Validity::Valid
    } else {
        Utf8Validity::Ambiguous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Confidence;
    use encoding_rs::{SHIFT_JIS, WINDOWS_1251, WINDOWS_1252};

    #[test]
    fn bom_wins_over_everything() {
        let sniffed = sniff(b"\xFF\xFE<\x00", true, Some("shift_jis"), None);
        assert_eq!(sniffed.encoding, UTF_16LE);
        assert_eq!(sniffed.confidence, Confidence::Certain);
    }

    #[test]
    fn transport_label_beats_meta() {
        let sniffed = sniff(b"<meta charset=koi8-r>", true, Some(" Shift_JIS "), None);
        assert_eq!(sniffed.encoding, SHIFT_JIS);
    }

    #[test]
    fn meta_charset_attribute() {
        assert_eq!(prescan(b"<!DOCTYPE html><meta charset=\"windows-1251\">"), Some(WINDOWS_1251));
        assert_eq!(prescan(b"<META CHARSET='Shift_JIS'>"), Some(SHIFT_JIS));
    }

    #[test]
    fn meta_http_equiv_needs_the_pragma() {
        assert_eq!(
            prescan(b"<meta http-equiv=Content-Type content='text/html; charset=windows-1251'>"),
            Some(WINDOWS_1251)
        );
        assert_eq!(prescan(b"<meta content='text/html; charset=windows-1251'>"), None);
    }

    #[test]
    fn meta_inside_comment_is_skipped() {
        assert_eq!(prescan(b"<!-- <meta charset=windows-1251> --><p>"), None);
        assert_eq!(prescan(b"<!--><meta charset=windows-1251>"), Some(WINDOWS_1251));
    }

    #[test]
    fn meta_attribute_inside_other_tag_is_skipped() {
        assert_eq!(prescan(b"<div title='<meta charset=windows-1251>'>"), None);
    }

    #[test]
    fn utf16_meta_becomes_utf8() {
        assert_eq!(prescan(b"<meta charset=utf-16le>"), Some(UTF_8));
    }

    #[test]
    fn content_extraction() {
        assert_eq!(
            extract_charset_from_content(b"text/html; charset = \"koi8-r\""),
            Encoding::for_label(b"koi8-r")
        );
        assert_eq!(extract_charset_from_content(b"charsetcharset=utf-8;x"), Some(UTF_8));
        assert_eq!(extract_charset_from_content(b"charset='utf-8"), None);
        assert_eq!(extract_charset_from_content(b"text/html"), None);
    }

    #[test]
    fn utf8_heuristic() {
        assert_eq!(classify_utf8(b"plain ascii", true), Utf8Validity::Ambiguous);
        assert_eq!(classify_utf8("caf\u{e9}".as_bytes(), true), Utf8Validity::Valid);
        assert_eq!(classify_utf8(b"caf\xE9", true), Utf8Validity::Invalid);
        assert_eq!(classify_utf8(b"\xE0\x80\x80", true), Utf8Validity::Invalid);
        assert_eq!(classify_utf8(b"\xED\xA0\x80", true), Utf8Validity::Invalid);
        assert_eq!(classify_utf8(b"\xF4\x90\x80\x80", true), Utf8Validity::Invalid);
    }

    #[test]
    fn truncated_sequence_depends_on_end_of_input() {
        // Cut off by the prefix limit: the rest may follow.
        assert_eq!(classify_utf8(b"ab\xE2\x82", false), Utf8Validity::Ambiguous);
        assert_eq!(classify_utf8(b"<p>\xC3\xA9 caf\xE9", false), Utf8Validity::Valid);
        // The input really ends there.
        assert_eq!(classify_utf8(b"ab\xE2\x82", true), Utf8Validity::Invalid);
        assert_eq!(classify_utf8(b"<p>\xC3\xA9 caf\xE9", true), Utf8Validity::Invalid);
    }

    #[test]
    fn fallbacks() {
        let sniffed = sniff("<p>caf\u{e9}".as_bytes(), true, None, None);
        assert_eq!(sniffed.encoding, UTF_8);
        assert_eq!(sniffed.confidence, Confidence::Tentative);

        assert_eq!(sniff(b"<p>hi", true, None, None).encoding, WINDOWS_1252);
        assert_eq!(sniff(b"<p>hi", true, None, Some("ru")).encoding, WINDOWS_1251);
    }
}
