//! Common utilities for the Wren parser crates.
//!
//! - **Warnings** - deduplicated `log` output for unsupported input
//! - **Issues** - the record type for recoverable parse errors

pub mod issue;
pub mod warning;
