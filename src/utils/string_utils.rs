//! UTF-8-safe string helpers
//!
//! Page text and diffs routinely carry multi-byte characters (box-drawing
//! symbols, emoji, currency signs), so every truncation here works on
//! character boundaries and never panics.

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// # Examples
/// ```
/// # use webwatcher::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("€€€", 2), "€€");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Collapse every run of whitespace (including newlines) into a single space
/// and trim both ends.
///
/// ```
/// # use webwatcher::utils::string_utils::collapse_whitespace;
/// assert_eq!(collapse_whitespace("  Price:\n\t$10  "), "Price: $10");
/// ```
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stand-in for a secret in `Debug` output: shows whether the value is set,
/// never the value itself.
///
/// ```
/// # use webwatcher::utils::string_utils::redact;
/// assert_eq!(format!("{:?}", redact(Some("hunter2"))), r#"Some("<redacted>")"#);
/// assert_eq!(format!("{:?}", redact(None)), "None");
/// ```
#[must_use]
pub fn redact(secret: Option<&str>) -> Option<&'static str> {
    secret.map(|_| "<redacted>")
}
