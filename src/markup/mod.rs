//! Markup handling
//!
//! Parsing fetched article markup into translation blocks and side data, and
//! serializing parsed elements back into markup.

pub mod document;
pub mod segmenter;
pub mod serialize;

pub use document::{absolutize_urls, parse_article, ParsedArticle, ReferenceMap};
pub use segmenter::segment;

use scraper::Html;

/// Text content of a markup fragment, whitespace-trimmed.
pub fn plain_text(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}

/// First `limit` characters of `text`, with `...` appended when cut.
pub fn snippet(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(
            plain_text("<p> Light <b>and</b> water &amp; air </p>"),
            "Light and water & air"
        );
    }

    #[test]
    fn test_snippet_truncates_by_characters() {
        assert_eq!(snippet("short", 60), "short");
        let long = "光".repeat(61);
        let cut = snippet(&long, 60);
        assert_eq!(cut.chars().count(), 63);
        assert!(cut.ends_with("光..."));
        assert_eq!(snippet(&"a".repeat(60), 60), "a".repeat(60));
    }
}
