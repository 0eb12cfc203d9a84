//! Bytes to characters.
//!
//! [§ 13.2.3 The input byte stream](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream)
//!
//! - [`sniffer`] picks an encoding and a confidence from a byte prefix.
//! - [`ByteSource`] buffers the raw bytes so a parse can be restarted.
//! - [`Decoder`] turns bytes into normalized characters.

mod decoder;
mod locale;
pub mod sniffer;
mod source;

pub use decoder::{Decoder, Normalizer};
pub(crate) use decoder::is_noncharacter;
pub use locale::fallback_for_locale;
pub use source::ByteSource;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252, X_USER_DEFINED};
use strum_macros::Display;

/// [§ 13.2.3.1](https://html.spec.whatwg.org/multipage/parsing.html#concept-encoding-confidence)
///
/// "The confidence is either tentative, certain, or irrelevant."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Confidence {
    /// Input was already Unicode, so there is nothing to decide.
    Irrelevant,
    /// A guess that a `<meta>` declaration may still overturn.
    Tentative,
    /// Fixed for the rest of the parse.
    Certain,
}

/// The encoding in use and how much it is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingConfidence {
    /// The chosen encoding.
    pub encoding: &'static Encoding,
    /// How it was chosen.
    pub confidence: Confidence,
}

/// What the tree builder should do about a `<meta>` encoding declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingChange {
    /// Nothing changes.
    Keep,
    /// Same encoding; the confidence becomes certain.
    Confirm,
    /// Throw the parse away and start again from byte zero.
    Restart(&'static Encoding),
}

impl EncodingConfidence {
    /// Certain `encoding`.
    #[must_use]
    pub const fn certain(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            confidence: Confidence::Certain,
        }
    }

    /// Tentative `encoding`.
    #[must_use]
    pub const fn tentative(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            confidence: Confidence::Tentative,
        }
    }

    /// UTF-8 with irrelevant confidence, for input that was never bytes.
    #[must_use]
    pub const fn irrelevant() -> Self {
        Self {
            encoding: UTF_8,
            confidence: Confidence::Irrelevant,
        }
    }

    /// The label reported as the document's character set.
    #[must_use]
    pub fn label(&self) -> String {
        self.encoding.name().to_ascii_lowercase()
    }

    /// [§ 13.2.3.4 Changing the encoding while parsing](https://html.spec.whatwg.org/multipage/parsing.html#changing-the-encoding-while-parsing)
    #[must_use]
    pub fn change_to(&self, requested: &'static Encoding) -> EncodingChange {
        // Only a tentative guess can be overturned.
        if self.confidence != Confidence::Tentative {
            return EncodingChange::Keep;
        }

        // "If the encoding that is already being used to interpret the input
        // stream is UTF-16BE/LE, then set the confidence to certain and
        // return."
        if is_utf16(self.encoding) {
            return EncodingChange::Confirm;
        }

        // "If the new encoding is UTF-16BE/LE, then change it to UTF-8."
        // "If the new encoding is x-user-defined, then change it to
        // windows-1252."
        let requested = ascii_compatible(requested);

        // "If the new encoding is identical or equivalent to the encoding
        // that is already being used to interpret the input stream, then set
        // the confidence to certain and return."
        if requested == self.encoding {
            return EncodingChange::Confirm;
        }

        EncodingChange::Restart(requested)
    }
}

pub(crate) fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == UTF_16BE || encoding == UTF_16LE
}

/// Map the two encodings a `<meta>` declaration may not switch to onto the
/// ones it switches to instead.
pub(crate) fn ascii_compatible(encoding: &'static Encoding) -> &'static Encoding {
    if is_utf16(encoding) {
        UTF_8
    } else if encoding == X_USER_DEFINED {
        WINDOWS_1252
    } else {
        encoding
    }
}

/// [Encoding § 4.2 Get an encoding](https://encoding.spec.whatwg.org/#concept-encoding-get)
#[must_use]
pub fn resolve_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.as_bytes())
}
