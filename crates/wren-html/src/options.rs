//! Parser configuration.

/// Knobs for a single parse.
///
/// ```
/// use wren_html::ParserOptions;
///
/// let options = ParserOptions {
///     transport_encoding: Some("shift_jis".to_string()),
///     ..ParserOptions::default()
/// };
/// assert_eq!(options.prescan_limit, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Encoding label declared by the transport layer (e.g. an HTTP
    /// `Content-Type` charset). Wins over everything but a BOM.
    pub transport_encoding: Option<String>,
    /// Locale used to pick a fallback encoding when nothing else decides,
    /// e.g. `"ru"` or `"zh-TW"`.
    pub locale: Option<String>,
    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    /// Whether `<noscript>` content is treated as raw text.
    pub scripting: bool,
    /// Record every recoverable error in `Document::issues`.
    pub collect_issues: bool,
    /// How many bytes the `<meta>` prescan and UTF-8 heuristic look at.
    pub prescan_limit: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            transport_encoding: None,
            locale: None,
            scripting: false,
            collect_issues: false,
            prescan_limit: 1024,
        }
    }
}
