//! Deduplicated warnings.
//!
//! Used for input the parser accepts but cannot act on, such as an unknown
//! `<meta charset>` label. Each distinct message is logged once per process
//! at `warn` level under the `wren` target.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Log `message` once for `component`.
///
/// Returns `true` if this call emitted the warning.
///
/// # Example
/// ```
/// use wren_common::warning::warn_once;
///
/// let first = warn_once("Encoding", "unknown label 'x-klingon'");
/// let second = warn_once("Encoding", "unknown label 'x-klingon'");
/// assert!(first && !second);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let fresh = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if fresh {
        log::warn!(target: "wren", "[{component}] {message}");
    }
    fresh
}

/// Forget every recorded warning.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleared_warnings_fire_again() {
        assert!(warn_once("Test", "cleared warnings fire again"));
        assert!(!warn_once("Test", "cleared warnings fire again"));
        clear_warnings();
        assert!(warn_once("Test", "cleared warnings fire again"));
    }
}
