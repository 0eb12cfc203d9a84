//! Integration tests for encoding sniffing, decoding and restarts.

use std::io::{self, Read};

use wren_dom::Document;
use wren_html::encoding::sniffer::{self, Utf8Validity};
use wren_html::{Confidence, ParseError, ParserOptions, parse, parse_str, parse_with_options};

fn parse_as(bytes: &[u8], options: &ParserOptions) -> Document {
    parse_with_options(bytes, options).unwrap()
}

fn body_text(document: &Document) -> String {
    document.tree.text_content(document.body().unwrap())
}

// ========== sniffing ==========

#[test]
fn test_bom_wins_over_everything() {
    let result = sniffer::sniff(b"\xEF\xBB\xBF<meta charset=koi8-r>", true, Some("shift_jis"), Some("ru"));
    assert_eq!(result.encoding, encoding_rs::UTF_8);
    assert_eq!(result.confidence, Confidence::Certain);
}

#[test]
fn test_transport_label_beats_meta() {
    let result = sniffer::sniff(b"<meta charset=koi8-r>", true, Some("ISO-8859-2"), None);
    assert_eq!(result.encoding, encoding_rs::ISO_8859_2);
    assert_eq!(result.confidence, Confidence::Certain);
}

#[test]
fn test_unknown_transport_label_is_ignored() {
    let result = sniffer::sniff(b"<meta charset=koi8-r>", true, Some("x-klingon"), None);
    assert_eq!(result.encoding, encoding_rs::KOI8_R);
}

#[test]
fn test_meta_prescan_forms() {
    assert_eq!(sniffer::prescan(b"<meta charset=\"shift_jis\">"), Some(encoding_rs::SHIFT_JIS));
    assert_eq!(
        sniffer::prescan(b"<!-- <meta charset=big5> --><meta http-equiv=Content-Type content='text/html; charset=koi8-r'>"),
        Some(encoding_rs::KOI8_R)
    );
    // http-equiv without content, and content without http-equiv, decide nothing.
    assert_eq!(sniffer::prescan(b"<meta content='text/html; charset=koi8-r'>"), None);
    assert_eq!(sniffer::prescan(b"<p>no declaration</p>"), None);
}

#[test]
fn test_meta_prescan_maps_utf16_to_utf8() {
    assert_eq!(sniffer::prescan(b"<meta charset=utf-16le>"), Some(encoding_rs::UTF_8));
}

#[test]
fn test_utf8_heuristic() {
    assert_eq!(sniffer::classify_utf8(b"plain ascii", true), Utf8Validity::Ambiguous);
    assert_eq!(sniffer::classify_utf8("caf\u{e9}".as_bytes(), true), Utf8Validity::Valid);
    assert_eq!(sniffer::classify_utf8(b"caf\xE9!", true), Utf8Validity::Invalid);
    // Overlong form and encoded surrogate.
    assert_eq!(sniffer::classify_utf8(b"\xE0\x80\x80", true), Utf8Validity::Invalid);
    assert_eq!(sniffer::classify_utf8(b"\xED\xA0\x80", true), Utf8Validity::Invalid);

    let tentative = sniffer::sniff("\u{e9}".as_bytes(), true, None, None);
    assert_eq!(tentative.encoding, encoding_rs::UTF_8);
    assert_eq!(tentative.confidence, Confidence::Tentative);
}

#[test]
fn test_locale_fallback() {
    let result = sniffer::sniff(b"\xE0", true, None, Some("ru"));
    assert_eq!(result.encoding, encoding_rs::WINDOWS_1251);
    assert_eq!(result.confidence, Confidence::Tentative);
    assert_eq!(sniffer::sniff(b"\xE0", true, None, None).encoding, encoding_rs::WINDOWS_1252);
}

// ========== decoding whole documents ==========

#[test]
fn test_ascii_document_defaults_to_windows_1252() {
    let document = parse(b"<p>hello");
    assert_eq!(document.character_set, "windows-1252");
    assert_eq!(body_text(&document), "hello");
}

#[test]
fn test_str_input_reports_utf8() {
    let document = parse_str("<p>caf\u{e9}");
    assert_eq!(document.character_set, "utf-8");
    assert_eq!(body_text(&document), "caf\u{e9}");
}

#[test]
fn test_utf8_bom_is_stripped() {
    let document = parse(b"\xEF\xBB\xBF<p>x");
    assert_eq!(document.character_set, "utf-8");
    assert_eq!(body_text(&document), "x");
}

#[test]
fn test_utf16le_bom() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "<p>\u{3042}".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let document = parse(&bytes);
    assert_eq!(document.character_set, "utf-16le");
    assert_eq!(body_text(&document), "\u{3042}");
}

#[test]
fn test_transport_encoding_option() {
    let options = ParserOptions {
        transport_encoding: Some("shift_jis".to_string()),
        ..ParserOptions::default()
    };
    let document = parse_as(b"<p>\x82\xA0", &options);
    assert_eq!(document.character_set, "shift_jis");
    assert_eq!(body_text(&document), "\u{3042}");
}

#[test]
fn test_meta_prescan_decides_the_document() {
    let document = parse(b"<meta charset=koi8-r><p>\xC1");
    assert_eq!(document.character_set, "koi8-r");
    assert_eq!(body_text(&document), "\u{430}");
}

#[test]
fn test_locale_option() {
    let options = ParserOptions {
        locale: Some("ru".to_string()),
        ..ParserOptions::default()
    };
    let document = parse_as(b"<p>\xE0", &options);
    assert_eq!(document.character_set, "windows-1251");
    assert_eq!(body_text(&document), "\u{430}");
}

#[test]
fn test_malformed_bytes_become_replacement_characters() {
    let options = ParserOptions {
        transport_encoding: Some("utf-8".to_string()),
        ..ParserOptions::default()
    };
    let document = parse_as(b"<!DOCTYPE html><p>a\xFFb", &options);
    assert_eq!(body_text(&document), "a\u{FFFD}b");
    assert!(document.had_errors);
}

#[test]
fn test_truncated_sequence_at_end_of_document_is_not_utf8() {
    let document = parse(b"<p>\xC3\xA9 caf\xE9");
    assert_eq!(document.character_set, "windows-1252");
    assert_eq!(body_text(&document), "\u{c3}\u{a9} caf\u{e9}");
}

#[test]
fn test_sequence_cut_by_prescan_limit_is_still_utf8() {
    let options = ParserOptions {
        prescan_limit: 6,
        ..ParserOptions::default()
    };
    let document = parse_as(b"<p>\xC3\xA9\xC3\xA9", &options);
    assert_eq!(document.character_set, "utf-8");
    assert_eq!(body_text(&document), "\u{e9}\u{e9}");
}

#[test]
fn test_newlines_are_normalized_in_decoded_input() {
    let document = parse(b"<!DOCTYPE html><pre>\r\na\r\nb\rc</pre>");
    assert_eq!(body_text(&document), "a\nb\nc");
}

// ========== changing the encoding while parsing ==========

/// A short prescan window so the `<meta>` is only seen by the tree builder.
fn late_meta_options() -> ParserOptions {
    ParserOptions {
        prescan_limit: 16,
        ..ParserOptions::default()
    }
}

#[test]
fn test_late_meta_restarts_the_parse() {
    let mut bytes = b"<p>\xC3\xA9</p>".to_vec();
    bytes.extend_from_slice(&[b' '; 64]);
    bytes.extend_from_slice(b"<meta charset=iso-8859-1><p>end");

    let document = parse_as(&bytes, &late_meta_options());
    // iso-8859-1 is an alias of windows-1252.
    assert_eq!(document.character_set, "windows-1252");
    assert_eq!(body_text(&document).trim_end_matches("end").trim(), "\u{c3}\u{a9}");
}

#[test]
fn test_late_meta_with_same_encoding_does_not_restart() {
    let mut bytes = b"<p>\xC3\xA9</p>".to_vec();
    bytes.extend_from_slice(&[b' '; 64]);
    bytes.extend_from_slice(b"<meta charset=utf-8>");

    let document = parse_as(&bytes, &late_meta_options());
    assert_eq!(document.character_set, "utf-8");
    assert!(body_text(&document).starts_with('\u{e9}'));
}

#[test]
fn test_meta_is_ignored_once_certain() {
    let options = ParserOptions {
        transport_encoding: Some("windows-1252".to_string()),
        ..late_meta_options()
    };
    let mut bytes = b"<p>\xE9</p>".to_vec();
    bytes.extend_from_slice(&[b' '; 64]);
    bytes.extend_from_slice(b"<meta charset=koi8-r>");

    let document = parse_as(&bytes, &options);
    assert_eq!(document.character_set, "windows-1252");
    assert!(body_text(&document).starts_with('\u{e9}'));
}

// ========== I/O ==========

/// A reader that fails after handing out `good` bytes.
struct FailingReader {
    good: Vec<u8>,
    position: usize,
}

impl Read for FailingReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.good.len() {
            return Err(io::Error::other("disk on fire"));
        }
        let count = out.len().min(self.good.len() - self.position);
        out[..count].copy_from_slice(&self.good[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

#[test]
fn test_read_errors_are_reported() {
    let reader = FailingReader {
        good: b"<p>partial".to_vec(),
        position: 0,
    };
    let result = parse_with_options(reader, &ParserOptions::default());
    assert!(matches!(result, Err(ParseError::Io(_))));
}
