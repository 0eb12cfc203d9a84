//! Integration tests for named character reference lookup.

use wren_html::tokenizer::named_character_references::{
    NAMED_CHARACTER_REFERENCES, any_entity_has_prefix, lookup_entity,
};

#[test]
fn test_table_is_complete_and_sorted() {
    assert_eq!(NAMED_CHARACTER_REFERENCES.len(), 2231);
    assert!(
        NAMED_CHARACTER_REFERENCES
            .windows(2)
            .all(|pair| pair[0].0.as_bytes() < pair[1].0.as_bytes())
    );
}

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("gt;"), Some(">"));
    assert_eq!(lookup_entity("quot;"), Some("\""));
    assert_eq!(lookup_entity("nbsp;"), Some("\u{00A0}"));
    assert_eq!(lookup_entity("AElig;"), Some("\u{00C6}"));
    assert_eq!(lookup_entity("zwnj;"), Some("\u{200C}"));
}

#[test]
fn test_lookup_legacy_entities() {
    // Legacy entities without semicolon
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("not"), Some("\u{00AC}"));
    assert_eq!(lookup_entity("copy"), Some("\u{00A9}"));
    // Only the legacy ones exist without a semicolon.
    assert_eq!(lookup_entity("notin"), None);
}

#[test]
fn test_lookup_two_code_point_entity() {
    assert_eq!(lookup_entity("NotEqualTilde;"), Some("\u{2242}\u{0338}"));
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity;"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_prefix_matching() {
    assert!(any_entity_has_prefix("a")); // amp, apos, alpha, etc.
    assert!(any_entity_has_prefix("am")); // amp
    assert!(any_entity_has_prefix("amp")); // amp, amp;
    assert!(any_entity_has_prefix("amp;")); // amp;
    assert!(any_entity_has_prefix("noti")); // notin;
    assert!(!any_entity_has_prefix("ampx")); // nothing
    assert!(!any_entity_has_prefix("xyz")); // nothing
}
