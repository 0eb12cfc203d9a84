//! Errors that stop a parse.
//!
//! Malformed HTML is never one of these: the tokenizer and tree builder
//! recover from every grammar error and only set the document's error flag.
//! What remains is I/O on the byte source and broken internal invariants.

use std::io;

use thiserror::Error;
use wren_dom::DomError;

/// A fatal parse failure.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading from the byte source failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// An encoding change needed to re-read the input after buffering was
    /// already disabled.
    #[error("cannot rewind the byte source: buffering was disabled at offset {0}")]
    Unrewindable(usize),

    /// The tree builder asked for a tree mutation the node tree rejected.
    #[error("tree mutation rejected: {0}")]
    Dom(#[from] DomError),

    /// An internal invariant did not hold.
    #[error("parser invariant violated: {0}")]
    Invariant(&'static str),
}

/// Result alias for fallible parser entry points.
pub type Result<T> = std::result::Result<T, ParseError>;
