//! Pattern based title and link extraction.
//!
//! The markup is never parsed: both extractors run a regular expression over
//! the raw text, so an `href="..."` anywhere in the page counts as a link.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)<title[^<>]*>(.+)</title>").expect("hardcoded regex pattern is valid")
});

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).expect("hardcoded regex pattern is valid"));

/// First text enclosed by a `<title>` pair on a single line.
pub fn extract_title(html: &str) -> Option<String> {
    TITLE_PATTERN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Every double-quoted `href` value, in document order.
pub fn extract_links(html: &str) -> Vec<String> {
    LINK_PATTERN
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Resolve `href` against `base`.
///
/// Falls back to `href` unchanged when either side cannot be parsed; the
/// fetcher then reports it as a malformed scheme.
pub fn resolve(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base_url| base_url.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>Example Domain</title></head></html>";
        assert_eq!(extract_title(html), Some("Example Domain".to_string()));
    }

    #[test]
    fn test_extract_title_with_attributes() {
        let html = r#"<title data-rh="true" lang="en">Docs</title>"#;
        assert_eq!(extract_title(html), Some("Docs".to_string()));
    }

    #[test]
    fn test_extract_title_missing() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
        assert_eq!(extract_title("<title></title>"), None);
    }

    #[test]
    fn test_extract_title_must_close_on_same_line() {
        let html = "<title>\nSplit\n</title>";
        assert_eq!(extract_title(html), None);
    }

    #[test]
    fn test_extract_title_picks_first_line_match() {
        let html = "<title>First</title>\n<title>Second</title>";
        assert_eq!(extract_title(html), Some("First".to_string()));
    }

    #[test]
    fn test_extract_links_document_order() {
        let html = r#"
            <link rel="stylesheet" href="/style.css">
            <a href="/a">A</a>
            <a class="x" href="http://other.test/b">B</a>
        "#;
        assert_eq!(
            extract_links(html),
            vec!["/style.css", "/a", "http://other.test/b"]
        );
    }

    #[test]
    fn test_extract_links_ignores_single_quotes_and_empty() {
        let html = r#"<a href='/single'>x</a><a href="">y</a><a href="/ok">z</a>"#;
        assert_eq!(extract_links(html), vec!["/ok"]);
    }

    #[test]
    fn test_extract_links_none() {
        assert!(extract_links("<p>plain text</p>").is_empty());
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve("http://example.test/", "/a"), "http://example.test/a");
        assert_eq!(
            resolve("http://example.test/docs/index.html", "guide.html"),
            "http://example.test/docs/guide.html"
        );
        assert_eq!(
            resolve("https://example.test/docs/", "../up"),
            "https://example.test/up"
        );
    }

    #[test]
    fn test_resolve_absolute_unchanged() {
        assert_eq!(
            resolve("http://example.test/", "http://other.test/b"),
            "http://other.test/b"
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve("https://example.test/", "//cdn.test/lib.js"),
            "https://cdn.test/lib.js"
        );
    }

    #[test]
    fn test_resolve_keeps_other_schemes() {
        assert_eq!(
            resolve("http://example.test/", "mailto:someone@example.test"),
            "mailto:someone@example.test"
        );
    }

    #[test]
    fn test_resolve_unparseable_base_returns_href() {
        assert_eq!(resolve("not a url", "/a"), "/a");
    }
}
