//! HTML parser module for tree construction.

/// The adoption agency algorithm for misnested formatting elements.
mod adoption_agency;
/// "In body" insertion mode.
mod body_mode;
/// Parser state, the dispatcher and the driving loop.
mod core;
/// MathML and SVG content.
pub mod foreign_content;
/// Fragment parsing.
mod fragment;
/// Insertion modes before `<body>` plus "text".
mod head_modes;
/// Creating and inserting nodes.
mod insertion;
/// The stack of open elements and the list of active formatting elements.
mod open_elements;
/// DOCTYPE-driven quirks mode selection.
pub mod quirks;
/// Table insertion modes.
mod table_modes;
/// Select, template, frameset and after-body insertion modes.
mod tail_modes;

pub use self::core::{ActiveFormattingElement, HTMLParser, InsertionMode};
pub use fragment::{Fragment, FragmentContext};
pub use quirks::quirks_mode_for_doctype;
