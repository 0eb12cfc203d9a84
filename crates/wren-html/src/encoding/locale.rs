//! [§ 13.2.3.3 The locale fallback table](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding)
//!
//! "The default may also be based on the user's locale", using the table of
//! suggested defaults for each locale.

use encoding_rs::{
    BIG5, EUC_KR, Encoding, GB18030, ISO_8859_2, ISO_8859_7, SHIFT_JIS, WINDOWS_874, WINDOWS_1250,
    WINDOWS_1251, WINDOWS_1252, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_1258,
};

/// Locale (full tag or primary subtag, lowercase) to default encoding.
/// Locales not listed fall back to windows-1252.
fn lookup(tag: &str) -> Option<&'static Encoding> {
    let encoding = match tag {
        "ar" | "fa" => WINDOWS_1256,
        "ba" | "be" | "bg" | "kk" | "ky" | "mk" | "ru" | "sr" | "tt" | "uk" => WINDOWS_1251,
        "cs" | "hr" | "ro" | "sk" => WINDOWS_1250,
        "el" => ISO_8859_7,
        "et" | "lt" | "lv" => WINDOWS_1257,
        "he" => WINDOWS_1255,
        "hu" | "pl" | "sl" => ISO_8859_2,
        "ja" => SHIFT_JIS,
        "ko" => EUC_KR,
        "ku" | "tr" => WINDOWS_1254,
        "th" => WINDOWS_874,
        "vi" => WINDOWS_1258,
        "zh-cn" => GB18030,
        "zh-tw" => BIG5,
        _ => return None,
    };
    Some(encoding)
}

/// Pick the fallback encoding for `locale`, e.g. `"ru"` or `"zh_TW"`.
///
/// The full tag is tried first, then its primary subtag.
#[must_use]
pub fn fallback_for_locale(locale: Option<&str>) -> &'static Encoding {
    let Some(locale) = locale else {
        return WINDOWS_1252;
    };
    let tag = locale.trim().replace('_', "-").to_ascii_lowercase();
    let primary = tag.split('-').next().unwrap_or_default();

    lookup(&tag)
        .or_else(|| lookup(primary))
        .unwrap_or(WINDOWS_1252)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_tag_beats_primary_subtag() {
        assert_eq!(fallback_for_locale(Some("zh-TW")), BIG5);
        assert_eq!(fallback_for_locale(Some("zh_CN")), GB18030);
        assert_eq!(fallback_for_locale(Some("zh")), WINDOWS_1252);
    }

    #[test]
    fn primary_subtag_and_default() {
        assert_eq!(fallback_for_locale(Some("ru-RU")), WINDOWS_1251);
        assert_eq!(fallback_for_locale(Some("ja")), SHIFT_JIS);
        assert_eq!(fallback_for_locale(Some("en-US")), WINDOWS_1252);
        assert_eq!(fallback_for_locale(None), WINDOWS_1252);
        assert_eq!(fallback_for_locale(Some("pl")), ISO_8859_2);
    }
}
