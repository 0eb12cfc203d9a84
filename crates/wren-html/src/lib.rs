//! WHATWG HTML parsing for the Wren parser.
//!
//! # Scope
//!
//! This crate implements the whole pipeline from bytes to a node tree:
//!
//! - **Encoding sniffing** ([WHATWG § 13.2.3.2](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding))
//!   - BOM, transport label, `<meta>` prescan, UTF-8 heuristic, locale fallback
//!   - Changing the encoding while parsing, with one restart from byte zero
//!
//! - **Input stream preprocessing** ([WHATWG § 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream))
//!   - Newline normalization, BOM stripping, control and noncharacter errors
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - All eighty states, named and numeric character references
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All twenty-three insertion modes
//!   - Foster parenting, the adoption agency algorithm, foreign content
//!   - Fragment parsing ([WHATWG § 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!
//! # Not Implemented
//!
//! - Script execution: `<script>` contents are kept as text, and
//!   `document.write` has no entry point.
//!
//! ```
//! let document = wren_html::parse(b"<!DOCTYPE html><title>Hi</title><p>One<p>Two");
//! let body = document.body().unwrap();
//! assert_eq!(document.tree.children(body).len(), 2);
//! assert_eq!(document.character_set, "windows-1252");
//! ```

use std::io::Read;

use wren_dom::Document;

/// Encoding sniffing, byte buffering and decoding.
pub mod encoding;
/// Fatal parse errors.
pub mod error;
/// Parser configuration.
pub mod options;
/// HTML parser and tree construction.
pub mod parser;
/// Text and JSON dumps of a node tree.
pub mod serialize;
/// The markable character stream.
pub mod stream;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use encoding::{Confidence, EncodingConfidence};
pub use error::{ParseError, Result};
pub use options::ParserOptions;
pub use parser::{Fragment, FragmentContext, HTMLParser, InsertionMode};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

use encoding::{ByteSource, Decoder, Normalizer, sniffer};
use stream::{MarkableStream, StrSource};

/// Parse a complete document from bytes with default options.
///
/// Never fails: markup errors are recovered from, and an internal failure
/// still returns the tree built up to that point with `had_errors` set.
#[must_use]
pub fn parse(bytes: &[u8]) -> Document {
    match drive(bytes, &ParserOptions::default()) {
        Ok((document, None)) => document,
        Ok((document, Some(err))) => {
            log::error!(target: "wren_html", "parse stopped early: {err}");
            document
        }
        Err(err) => {
            log::error!(target: "wren_html", "parse failed: {err}");
            let mut document = Document::new();
            document.had_errors = true;
            document
        }
    }
}

/// Parse a complete document from a reader.
///
/// # Errors
///
/// Fails on read errors, when an encoding restart finds the input can no
/// longer be rewound, or on an internal invariant violation. Malformed
/// markup never fails.
pub fn parse_with_options<R: Read>(reader: R, options: &ParserOptions) -> Result<Document> {
    match drive(reader, options)? {
        (_, Some(err)) => Err(err),
        (document, None) => Ok(document),
    }
}

/// Parse a document that is already text. The encoding confidence is
/// irrelevant and the character set is reported as `utf-8`.
#[must_use]
pub fn parse_str(input: &str) -> Document {
    let tokenizer = HTMLTokenizer::new(input.to_string());
    let (document, fatal) = HTMLParser::new(tokenizer).run_to_end();
    if let Some(err) = fatal {
        log::error!(target: "wren_html", "parse stopped early: {err}");
    }
    document
}

/// Parse `input` as the contents of `context`, with default options.
#[must_use]
pub fn parse_fragment(input: &str, context: &FragmentContext) -> Fragment {
    parse_fragment_with_options(input, context, &ParserOptions::default())
}

/// Parse `input` as the contents of `context`. Only `scripting` and
/// `collect_issues` apply: fragments are never bytes.
#[must_use]
pub fn parse_fragment_with_options(
    input: &str,
    context: &FragmentContext,
    options: &ParserOptions,
) -> Fragment {
    let source = if options.collect_issues {
        StrSource::with_normalizer(input, Normalizer::collecting())
    } else {
        StrSource::new(input)
    };
    let tokenizer = HTMLTokenizer::from_stream(MarkableStream::new(source), options.collect_issues);
    let (fragment, fatal) = HTMLParser::for_fragment(tokenizer, context, options.scripting)
        .with_issue_collection(options.collect_issues)
        .finish_fragment();
    if let Some(err) = fatal {
        log::error!(target: "wren_html", "fragment parse stopped early: {err}");
    }
    fragment
}

/// Sniff, decode and parse, restarting once if a `<meta>` declaration
/// overturns a tentative encoding. The outer error means no document could
/// be built; the inner one is a fatal error after which the partial tree is
/// still available.
fn drive<R: Read>(reader: R, options: &ParserOptions) -> Result<(Document, Option<ParseError>)> {
    let mut source = ByteSource::new(reader);
    // One byte past the limit tells whether the prefix is the whole input.
    let limit = options.prescan_limit;
    let window = source.prefix(limit.saturating_add(1))?;
    let at_eof = window.len() <= limit;
    let prefix = &window[..window.len().min(limit)];
    let mut encoding = sniffer::sniff(
        prefix,
        at_eof,
        options.transport_encoding.as_deref(),
        options.locale.as_deref(),
    );

    loop {
        if encoding.confidence == Confidence::Certain {
            source.disable_buffering();
        }
        log::debug!(
            target: "wren_html::encoding",
            "decoding as {} ({})",
            encoding.encoding.name(),
            encoding.confidence
        );

        let normalizer = if options.collect_issues {
            Normalizer::collecting()
        } else {
            Normalizer::new()
        };
        let decoder = Decoder::new(source, encoding.encoding, normalizer);
        let tokenizer =
            HTMLTokenizer::from_stream(MarkableStream::new(decoder), options.collect_issues);
        let mut parser = HTMLParser::new(tokenizer)
            .with_scripting(options.scripting)
            .with_issue_collection(options.collect_issues)
            .with_encoding(encoding);
        parser.run_until_stopped();

        if let Some(err) = parser
            .tokenizer_mut()
            .stream_mut()
            .source_mut()
            .take_io_error()
        {
            return Err(err);
        }

        let Some(restart) = parser.encoding_restart() else {
            return Ok(parser.finish());
        };

        // "If the encoding is changed ... navigate to the document again,
        // with historyHandling set to "replace" ... using the same source
        // bytes": everything built so far is dropped.
        log::debug!(
            target: "wren_html::encoding",
            "restarting as {}",
            restart.name()
        );
        source = parser
            .into_tokenizer()
            .into_stream()
            .into_source()
            .into_source();
        source.rewind()?;
        encoding = EncodingConfidence::certain(restart);
    }
}
