//! Utility functions for text cleanup, truncation and HTML escaping.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace normalization and length capping for scraped headlines
//! - Character-safe truncation with an ellipsis marker
//! - Escaping of text interpolated into the HTML digest
//! - Short previews of long strings for log lines

use itertools::Itertools;

/// Marker appended to any text that was cut short.
pub const ELLIPSIS: &str = "...";

/// Maximum headline length, in characters, before truncation.
pub const MAX_TITLE_CHARS: usize = 200;

/// Truncate `text` to `max` characters, appending [`ELLIPSIS`] if anything was cut.
///
/// Lengths are counted in Unicode scalar values so multi-byte characters are
/// never split.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
/// assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
/// ```
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Collapse every run of whitespace to a single space and cap the result at
/// [`MAX_TITLE_CHARS`] characters.
///
/// Cleaning is idempotent: an already-cleaned string comes back unchanged.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().join(" ");
    truncate_with_ellipsis(&collapsed, MAX_TITLE_CHARS)
}

/// Escape the characters that are significant in HTML text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
        assert_eq!(truncate_with_ellipsis("abc", 3), "abc");
        assert_eq!(truncate_with_ellipsis("", 3), "");
    }

    #[test]
    fn test_truncate_with_ellipsis_counts_chars() {
        let s = "é".repeat(10);
        assert_eq!(truncate_with_ellipsis(&s, 4), format!("{}...", "é".repeat(4)));
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(
            clean_text("  Apple\n\tunveils   new\u{a0}chip  "),
            "Apple unveils new chip"
        );
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_clean_text_truncates_long_titles() {
        let raw = format!("{} {}", "x".repeat(150), "y".repeat(150));
        let cleaned = clean_text(&raw);
        assert_eq!(cleaned.chars().count(), MAX_TITLE_CHARS + ELLIPSIS.len());
        assert!(cleaned.ends_with("..."));
        assert_eq!(&cleaned[..150], "x".repeat(150));
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let samples = [
            "Short title".to_string(),
            " spaced \n  out ".to_string(),
            "w ".repeat(180),
            "z".repeat(400),
        ];
        for raw in samples {
            let once = clean_text(&raw);
            assert_eq!(clean_text(&once), once);
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
