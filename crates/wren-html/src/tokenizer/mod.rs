//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard: all eighty states, including script
//! data escaping, DOCTYPE identifiers, CDATA sections and both kinds of
//! character reference.

/// Character reference states per § 13.2.5.72 - § 13.2.5.80.
mod character_reference;
/// Comment states.
mod comment;
/// HTML tokenizer state machine implementation.
mod core;
/// DOCTYPE states.
mod doctype;
/// Helper methods for tokenizer state transitions.
mod helpers;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// Script data states.
mod script;
/// The tokenizer state enum.
pub mod state;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::HTMLTokenizer;
pub use state::TokenizerState;
pub use token::{Attribute, Token};
