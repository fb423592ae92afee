//! Small string helpers shared by content tooling.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{CoreError, Result};

/// Placeholder that stands in for `&` while text passes through XML-unsafe channels.
pub const AMPERSAND_PLACEHOLDER: &str = "~VsntAmp~";

/// Attribute that marks an inline tag whose counterpart was lost.
const INLINE_TAG_MARKER: &str = " TGID=\"";

static BASE64_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9+/]*={0,3}$").expect("BUG: invalid BASE64_RE regex literal")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\A(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)\z",
    )
    .expect("BUG: invalid EMAIL_RE regex literal")
});

/// Text before the first `ch`; empty when `ch` comes first, `source` when absent.
#[must_use]
pub fn before(source: &str, ch: char) -> &str {
    source.find(ch).map_or(source, |i| &source[..i])
}

/// Text after the first `ch`; `source` when `ch` is absent or last.
#[must_use]
pub fn after(source: &str, ch: char) -> &str {
    match source.find(ch) {
        Some(i) if i + ch.len_utf8() < source.len() => &source[i + ch.len_utf8()..],
        _ => source,
    }
}

/// Replace every `&` with [`AMPERSAND_PLACEHOLDER`].
#[must_use]
pub fn encode_ampersands(text: &str) -> String {
    text.replace('&', AMPERSAND_PLACEHOLDER)
}

/// Turn every [`AMPERSAND_PLACEHOLDER`] back into `&`.
#[must_use]
pub fn decode_ampersands(text: &str) -> String {
    text.replace(AMPERSAND_PLACEHOLDER, "&")
}

/// Split `text` into chunks of at most `max_len` characters.
///
/// # Errors
///
/// Returns [`CoreError::InvalidArgument`] when `max_len` is zero.
pub fn chop(text: &str, max_len: usize) -> Result<Vec<&str>> {
    if max_len == 0 {
        return Err(CoreError::InvalidArgument(
            "chunk length must be greater than zero".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    for (count, (idx, _)) in text.char_indices().enumerate() {
        if count > 0 && count % max_len == 0 {
            chunks.push(&text[start..idx]);
            start = idx;
        }
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }

    Ok(chunks)
}

/// At most the first `max_len` characters of `text`.
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> &str {
    text.char_indices()
        .nth(max_len)
        .map_or(text, |(i, _)| &text[..i])
}

/// Whether `text` (trimmed) looks like standard base64.
#[must_use]
pub fn is_base64(text: &str) -> bool {
    let text = text.trim();
    text.len() % 4 == 0 && BASE64_RE.is_match(text)
}

/// Standard base64 with padding.
#[must_use]
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode base64 text; anything that is not valid base64 comes back as its UTF-8 bytes.
#[must_use]
pub fn base64_decode(text: &str) -> Vec<u8> {
    if is_base64(text) {
        if let Ok(bytes) = STANDARD.decode(text.trim()) {
            return bytes;
        }
    }
    text.as_bytes().to_vec()
}

/// Remove inline tags left behind without their partner.
///
/// Each tag carrying a ` TGID="` attribute is cut out from its `<` to its
/// `>`. Scanning stops at the first marker that has no enclosing tag.
#[must_use]
pub fn strip_orphaned_inline_tags(text: &str) -> String {
    let mut result = text.to_string();

    while let Some(attr) = result.find(INLINE_TAG_MARKER) {
        let Some(start) = result[..attr].rfind('<') else {
            break;
        };
        let Some(len) = result[attr..].find('>') else {
            break;
        };
        result.replace_range(start..=attr + len, "");
    }

    result
}

/// Replace `$KEY$` placeholders, with `DATETIME`, `DATE` and `TIME` filled
/// from the current UTC time unless supplied.
#[must_use]
pub fn replace_tokens<I, K, V>(content: &str, values: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    replace_tokens_at(content, values, Utc::now())
}

/// [`replace_tokens`] with an explicit clock.
#[must_use]
pub fn replace_tokens_at<I, K, V>(content: &str, values: I, now: DateTime<Utc>) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut tokens: BTreeMap<String, String> = values
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_uppercase(), v.as_ref().to_string()))
        .collect();

    tokens
        .entry("DATETIME".to_string())
        .or_insert_with(|| now.format("%Y-%m-%d %H:%M:%S").to_string());
    tokens
        .entry("DATE".to_string())
        .or_insert_with(|| now.format("%Y-%m-%d").to_string());
    tokens
        .entry("TIME".to_string())
        .or_insert_with(|| now.format("%H:%M").to_string());

    tokens.iter().fold(content.to_string(), |acc, (key, value)| {
        acc.replace(&format!("${key}$"), value)
    })
}

/// Whether `address` is a syntactically valid e-mail address.
#[must_use]
pub fn is_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// `None` for empty or whitespace-only text.
#[must_use]
pub fn empty_to_none(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn before_and_after() {
        assert_eq!(before("key=value", '='), "key");
        assert_eq!(before("=value", '='), "");
        assert_eq!(before("novalue", '='), "novalue");
        assert_eq!(after("key=value", '='), "value");
        assert_eq!(after("key=", '='), "key=");
        assert_eq!(after("novalue", '='), "novalue");
    }

    #[test]
    fn ampersands_round_trip() {
        let encoded = encode_ampersands("R&D & QA");
        assert_eq!(encoded, "R~VsntAmp~D ~VsntAmp~ QA");
        assert_eq!(decode_ampersands(&encoded), "R&D & QA");
    }

    #[test]
    fn chop_by_size() {
        let text = "abcabcabcabcabca";
        let cases = [
            (1, 16),
            (2, 8),
            (3, 6),
            (5, 4),
            (7, 3),
            (8, 2),
            (9, 2),
            (16, 1),
            (17, 1),
            (512, 1),
        ];
        for (size, expected) in cases {
            assert_eq!(chop(text, size).expect("chop").len(), expected, "size {size}");
        }
        assert!(chop("", 512).expect("chop").is_empty());
        assert!(chop(text, 0).is_err());
        assert_eq!(chop("abcde", 2).expect("chop"), vec!["ab", "cd", "e"]);
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("01234567890", 5).len(), 5);
        assert_eq!(truncate("01234567890", 11), "01234567890");
        assert_eq!(truncate("héllo", 2), "hé");
    }

    #[test]
    fn base64_detection_and_fallback() {
        assert!(is_base64("aGVsbG8="));
        assert!(!is_base64("hello"));
        assert_eq!(base64_encode(b"hello"), "aGVsbG8=");
        assert_eq!(base64_decode("aGVsbG8="), b"hello");
        assert_eq!(base64_decode("not base64!"), b"not base64!");
    }

    #[test]
    fn strips_orphaned_tags() {
        let text = r#"Hello <ph TGID="12">world</ph> and <b TGID="7"/>more"#;
        assert_eq!(strip_orphaned_inline_tags(text), "Hello world</ph> and more");
        let unclosed = r#"Open <ph TGID="1" never closes"#;
        assert_eq!(strip_orphaned_inline_tags(unclosed), unclosed);
    }

    #[test]
    fn replaces_tokens_with_date_defaults() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 0)
            .single()
            .expect("valid date");
        let out = replace_tokens_at(
            "$NAME$ exported on $DATE$ at $TIME$",
            [("name", "Guide")],
            now,
        );
        assert_eq!(out, "Guide exported on 2024-03-09 at 14:05");

        let overridden = replace_tokens_at("$DATE$", [("DATE", "tomorrow")], now);
        assert_eq!(overridden, "tomorrow");
    }

    #[test]
    fn email_detection() {
        assert!(is_email("writer@example.com"));
        assert!(is_email("First.Last+tag@Sub.Example.org"));
        assert!(!is_email("writer@"));
        assert!(!is_email("no at sign"));
    }

    #[test]
    fn blank_is_none() {
        assert_eq!(empty_to_none("  "), None);
        assert_eq!(empty_to_none("x"), Some("x"));
    }
}
