//! Integration tests for the HTML tokenizer.

use wren_html::tokenizer::TokenizerState;
use wren_html::{HTMLTokenizer, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input.to_string());
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Tokenize starting in `state`, as the tree builder does for `<title>` and
/// friends.
fn tokenize_in(input: &str, state: TokenizerState, last_start_tag: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input.to_string());
    tokenizer.switch_to(state);
    tokenizer.set_last_start_tag(last_start_tag);
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Collapse runs of character tokens so assertions read naturally.
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hi!");
    assert_eq!(tokens.len(), 4); // 3 chars + EOF
    assert!(matches!(tokens[0], Token::Character { data: 'H' }));
    assert!(matches!(tokens[2], Token::Character { data: '!' }));
    assert!(matches!(tokens[3], Token::EndOfFile));
}

#[test]
fn test_empty_input_is_just_eof() {
    let tokens = tokenize("");
    assert_eq!(tokens, vec![Token::EndOfFile]);
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" 'http://www.w3.org/TR/html4/strict.dtd'>"#,
    );
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(
                public_identifier.as_deref(),
                Some("-//W3C//DTD HTML 4.01//EN")
            );
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_missing_name_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE>");
    match &tokens[0] {
        Token::Doctype {
            name, force_quirks, ..
        } => {
            assert_eq!(name, &None);
            assert!(force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_eof_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE html PUBLIC \"foo");
    match &tokens[0] {
        Token::Doctype {
            public_identifier,
            force_quirks,
            ..
        } => {
            assert_eq!(public_identifier.as_deref(), Some("foo"));
            assert!(force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_tag_names_are_lowercased() {
    let tokens = tokenize("<DiV></SPAN>");
    assert!(tokens[0].is_start_tag("div"));
    assert!(tokens[1].is_end_tag("span"));
}

#[test]
fn test_attributes_in_all_quoting_styles() {
    let tokens = tokenize(r#"<input type="text" NAME='user' value=x disabled>"#);
    match &tokens[0] {
        Token::StartTag {
            name, attributes, ..
        } => {
            assert_eq!(name, "input");
            let pairs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|attr| (attr.name.as_str(), attr.value.as_str()))
                .collect();
            assert_eq!(
                pairs,
                vec![
                    ("type", "text"),
                    ("name", "user"),
                    ("value", "x"),
                    ("disabled", "")
                ]
            );
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize("<p id=a ID=b class=c>");
    assert_eq!(tokens[0].attributes().len(), 2);
    assert_eq!(tokens[0].attribute("id"), Some("a"));
    assert_eq!(tokens[0].attribute("class"), Some("c"));
}

#[test]
fn test_self_closing_flag() {
    let tokens = tokenize("<br/><img />");
    assert!(matches!(
        &tokens[0],
        Token::StartTag { name, self_closing: true, .. } if name == "br"
    ));
    assert!(matches!(
        &tokens[1],
        Token::StartTag { name, self_closing: true, .. } if name == "img"
    ));
}

#[test]
fn test_comments() {
    let tokens = tokenize("<!-- hello --><!---->");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == " hello "));
    assert!(matches!(&tokens[1], Token::Comment { data } if data.is_empty()));
}

#[test]
fn test_bogus_comments() {
    // `<?` and `</` followed by a non-letter both become bogus comments.
    let tokens = tokenize("<?xml version=\"1.0\"?></ 1>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == "?xml version=\"1.0\"?"));
    assert!(matches!(&tokens[1], Token::Comment { data } if data == " 1"));
}

#[test]
fn test_abrupt_comment_and_nested_dashes() {
    let tokens = tokenize("<!-->x<!--a--!>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data.is_empty()));
    assert!(matches!(tokens[1], Token::Character { data: 'x' }));
    assert!(matches!(&tokens[2], Token::Comment { data } if data == "a"));
}

#[test]
fn test_less_than_not_followed_by_tag() {
    assert_eq!(text_of(&tokenize("a < b <3")), "a < b <3");
}

#[test]
fn test_eof_in_tag_drops_tag() {
    let tokens = tokenize("x<div class=");
    assert_eq!(tokens, vec![Token::Character { data: 'x' }, Token::EndOfFile]);
}

#[test]
fn test_named_character_references() {
    assert_eq!(text_of(&tokenize("&lt;&amp;&gt; &copy; &NotEqualTilde;")), "<&> \u{A9} \u{2242}\u{338}");
}

#[test]
fn test_legacy_reference_without_semicolon() {
    assert_eq!(text_of(&tokenize("&notit;")), "\u{AC}it;");
    assert_eq!(text_of(&tokenize("&notin;")), "\u{2209}");
}

#[test]
fn test_unknown_reference_is_kept_verbatim() {
    assert_eq!(text_of(&tokenize("&bogus; & &#")), "&bogus; & &#");
}

#[test]
fn test_reference_in_attribute_followed_by_alphanumeric() {
    // Legacy references in attributes are not expanded before `=` or an
    // alphanumeric.
    let tokens = tokenize("<a href='?a=1&copy=2&amp;b'>");
    assert_eq!(tokens[0].attribute("href"), Some("?a=1&copy=2&b"));
}

#[test]
fn test_ambiguous_ampersand_in_attribute() {
    let tokens = tokenize("<a title='&notit;' alt='&notit=5' id='&not;'>");
    assert_eq!(tokens[0].attribute("title"), Some("&notit;"));
    assert_eq!(tokens[0].attribute("alt"), Some("&notit=5"));
    assert_eq!(tokens[0].attribute("id"), Some("\u{AC}"));
}

#[test]
fn test_numeric_character_references() {
    assert_eq!(text_of(&tokenize("&#65;&#x42;&#X63;")), "ABc");
}

#[test]
fn test_numeric_reference_replacements() {
    // NULL, surrogates and out-of-range values become U+FFFD.
    assert_eq!(text_of(&tokenize("&#0;")), "\u{FFFD}");
    assert_eq!(text_of(&tokenize("&#xD800;")), "\u{FFFD}");
    assert_eq!(text_of(&tokenize("&#x110000;")), "\u{FFFD}");
    // C1 controls are remapped through windows-1252.
    assert_eq!(text_of(&tokenize("&#x80;&#150;")), "\u{20AC}\u{2013}");
}

#[test]
fn test_crlf_is_normalized() {
    assert_eq!(text_of(&tokenize("a\r\nb\rc")), "a\nb\nc");
}

#[test]
fn test_null_in_data_is_passed_through() {
    // The tree builder drops it; the tokenizer only reports an error.
    assert_eq!(text_of(&tokenize("a\0b")), "a\0b");
}

#[test]
fn test_rcdata_ignores_tags_until_appropriate_end_tag() {
    let tokens = tokenize_in("a <b>&amp;</x></title>", TokenizerState::RCDATA, "title");
    assert_eq!(text_of(&tokens), "a <b>&</x>");
    assert!(tokens.iter().any(|token| token.is_end_tag("title")));
}

#[test]
fn test_rawtext_does_not_expand_references() {
    let tokens = tokenize_in("&amp;<i></style>", TokenizerState::RAWTEXT, "style");
    assert_eq!(text_of(&tokens), "&amp;<i>");
    assert!(tokens.iter().any(|token| token.is_end_tag("style")));
}

#[test]
fn test_script_data_escaped_end_tag() {
    let tokens = tokenize_in(
        "<!--<script>x</script>--></script>",
        TokenizerState::ScriptData,
        "script",
    );
    // The inner `</script>` is inside a double-escaped section.
    assert_eq!(text_of(&tokens), "<!--<script>x</script>-->");
    let end_tags = tokens.iter().filter(|token| token.is_end_tag("script")).count();
    assert_eq!(end_tags, 1);
}

#[test]
fn test_plaintext_never_ends() {
    let tokens = tokenize_in("</plaintext><b>", TokenizerState::PLAINTEXT, "plaintext");
    assert_eq!(text_of(&tokens), "</plaintext><b>");
}

#[test]
fn test_cdata_only_when_allowed() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == "[CDATA[x]]"));

    let mut tokenizer = HTMLTokenizer::new("<![CDATA[<x>]]>".to_string());
    tokenizer.set_allow_cdata(true);
    tokenizer.run();
    assert_eq!(text_of(&tokenizer.into_tokens()), "<x>");
}

#[test]
fn test_errors_are_flagged() {
    let mut tokenizer = HTMLTokenizer::new("<p a=1 a=2>".to_string());
    tokenizer.run();
    assert!(tokenizer.had_error());

    let mut clean = HTMLTokenizer::new("<p a=1>".to_string());
    clean.run();
    assert!(!clean.had_error());
}

#[test]
fn test_next_token_repeats_eof() {
    let mut tokenizer = HTMLTokenizer::new("x".to_string());
    assert_eq!(tokenizer.next_token(), Token::Character { data: 'x' });
    assert_eq!(tokenizer.next_token(), Token::EndOfFile);
    assert_eq!(tokenizer.next_token(), Token::EndOfFile);
}
