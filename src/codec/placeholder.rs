//! Placeholder tokens carried through translation.
//!
//! Tokens use angle-bracket characters outside the markup alphabet so that
//! they survive markup escaping and are not confused with real tags.

use crate::markup::serialize::{escape_attr, unescape};
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static ELEMENT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"⟨elem:(\d+)⟩").expect("valid element placeholder pattern"));

pub(crate) static LINK_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)⟨wp_link title="([^"]*)" ja="([^"]*)"⟩(.*?)⟨/wp_link⟩"#)
        .expect("valid link placeholder pattern")
});

/// `⟨elem:i⟩`
pub fn element_token(index: usize) -> String {
    format!("⟨elem:{}⟩", index)
}

/// `⟨wp_link title="T" ja="G"⟩label⟨/wp_link⟩`
///
/// `label` is already escaped markup text.
pub fn link_token(title: &str, guess: &str, label: &str) -> String {
    format!(
        "⟨wp_link title=\"{}\" ja=\"{}\"⟩{}⟨/wp_link⟩",
        escape_attr(title),
        escape_attr(guess),
        label
    )
}

/// A link placeholder found in translated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlaceholder {
    /// Byte range of the whole token in the text
    pub start: usize,
    pub end: usize,
    /// Source-language title
    pub title: String,
    /// Translator's proposed target-language title
    pub guess: String,
    /// Translated label, as markup text
    pub label: String,
}

/// Every link placeholder in `text`, in order.
pub fn find_links(text: &str) -> Vec<LinkPlaceholder> {
    LINK_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(LinkPlaceholder {
                start: whole.start(),
                end: whole.end(),
                title: unescape(&caps[1]),
                guess: unescape(&caps[2]),
                label: caps[3].to_string(),
            })
        })
        .collect()
}
