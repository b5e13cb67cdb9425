//! Encode side of the vault codec.

use crate::codec::placeholder::{element_token, link_token};
use crate::markup::serialize::{
    end_tag, escape_text, outer_html, start_tag, write_children, ElementRewriter,
};
use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

/// Tags preserved verbatim regardless of attributes.
const OPAQUE_TAGS: [&str; 6] = ["style", "link", "meta", "script", "noscript", "math"];

/// Ordered verbatim fragments addressed by `⟨elem:i⟩`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vault(Vec<String>);

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and return its index.
    pub fn push(&mut self, fragment: String) -> usize {
        self.0.push(fragment);
        self.0.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Vault {
    fn from(entries: Vec<String>) -> Self {
        Self(entries)
    }
}

/// Root tags of an encoded block, used to rewrap decoded inner content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shell {
    pub start: String,
    /// Empty for void elements
    pub end: String,
}

/// Result of encoding one block.
///
/// Text and vault travel together; decode must use the vault produced by the
/// same encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoded {
    pub text: String,
    pub vault: Vault,
    /// `None` when the whole block is opaque or has no root element
    pub shell: Option<Shell>,
}

impl Encoded {
    /// Wrap decoded inner content back into the block's root element.
    pub fn wrap(&self, decoded: &str) -> String {
        match &self.shell {
            Some(shell) => format!("{}{}{}", shell.start, decoded, shell.end),
            None => decoded.to_string(),
        }
    }
}

/// Whether an element is preserved verbatim.
pub fn is_opaque(element: ElementRef<'_>) -> bool {
    let value = element.value();
    value.attr("typeof").is_some() || OPAQUE_TAGS.contains(&value.name())
}

/// Whether an element is a cross-article link.
pub fn is_wiki_link(element: ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "a"
        && value
            .attr("rel")
            .map(|rel| {
                rel.split_ascii_whitespace().any(|token| {
                    token.eq_ignore_ascii_case("mw:WikiLink") || token.eq_ignore_ascii_case("wikilink")
                })
            })
            .unwrap_or(false)
}

/// Target title of a link: `href` without `./`, percent-decoded, else `title`.
pub fn link_title(element: ElementRef<'_>) -> Option<String> {
    let value = element.value();
    let from_href = value
        .attr("href")
        .map(|href| href.strip_prefix("./").unwrap_or(href))
        .filter(|href| !href.is_empty())
        .map(|href| percent_decode_str(href).decode_utf8_lossy().into_owned());
    from_href
        .or_else(|| value.attr("title").map(str::to_string))
        .filter(|title| !title.trim().is_empty())
}

struct VaultWriter {
    vault: Vault,
}

impl ElementRewriter for VaultWriter {
    fn rewrite(&mut self, element: ElementRef<'_>, out: &mut String) -> bool {
        if is_opaque(element) {
            let index = self.vault.push(outer_html(element));
            out.push_str(&element_token(index));
            return true;
        }
        if is_wiki_link(element) {
            if let Some(title) = link_title(element) {
                let label = escape_text(&element.text().collect::<String>());
                out.push_str(&link_token(&title, &title, &label));
                return true;
            }
        }
        false
    }
}

/// Encode one block's markup.
pub fn encode(markup: &str) -> Encoded {
    let fragment = Html::parse_fragment(markup);
    let container = fragment.root_element();
    let mut writer = VaultWriter {
        vault: Vault::new(),
    };

    let Some(root) = container.children().find_map(ElementRef::wrap) else {
        let mut text = String::new();
        write_children(container, &mut text, &mut writer);
        return Encoded {
            text: text.trim().to_string(),
            vault: writer.vault,
            shell: None,
        };
    };

    if is_opaque(root) {
        let index = writer.vault.push(outer_html(root));
        return Encoded {
            text: element_token(index),
            vault: writer.vault,
            shell: None,
        };
    }

    let mut text = String::new();
    write_children(root, &mut text, &mut writer);
    let shell = Shell {
        start: start_tag(root.value()),
        end: end_tag(root.value()).unwrap_or_default(),
    };
    Encoded {
        text: text.trim().to_string(),
        vault: writer.vault,
        shell: Some(shell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_link_becomes_placeholder() {
        let encoded = encode(
            r#"<p>See <a rel="wikilink" href="./Climate_change">environmental shifts</a>.</p>"#,
        );
        assert_eq!(
            encoded.text,
            "See ⟨wp_link title=\"Climate_change\" ja=\"Climate_change\"⟩environmental shifts⟨/wp_link⟩."
        );
        assert!(encoded.vault.is_empty());
        assert_eq!(encoded.wrap("X"), "<p>X</p>");
    }

    #[test]
    fn test_opaque_root_is_vaulted_whole() {
        let markup = r#"<span typeof="ref">[1]</span>"#;
        let encoded = encode(markup);
        assert_eq!(encoded.text, "⟨elem:0⟩");
        assert_eq!(encoded.vault.get(0), Some(markup));
        assert_eq!(encoded.wrap("⟨elem:0⟩"), "⟨elem:0⟩");
    }

    #[test]
    fn test_opaque_children_are_not_descended() {
        let encoded = encode(
            r#"<p>A<sup typeof="mw:Extension/ref"><a rel="mw:WikiLink" href="./X">x</a></sup> and <math>x^2</math>.</p>"#,
        );
        assert_eq!(encoded.text, "A⟨elem:0⟩ and ⟨elem:1⟩.");
        assert_eq!(encoded.vault.len(), 2);
        assert!(encoded.vault.get(0).unwrap().contains("href=\"./X\""));
    }

    #[test]
    fn test_link_title_is_percent_decoded_and_falls_back() {
        let encoded = encode(
            r#"<p><a rel="mw:WikiLink" href="./Caf%C3%A9_culture">cafés</a> <a rel="mw:WikiLink" title="Tea">tea</a></p>"#,
        );
        assert!(encoded.text.contains("title=\"Café_culture\""));
        assert!(encoded.text.contains("title=\"Tea\" ja=\"Tea\"⟩tea"));
    }

    #[test]
    fn test_repeated_encode_is_stable() {
        let markup = r#"<p>x<span typeof="mw:Transclusion">a</span>y<style>.z{}</style></p>"#;
        let first = encode(markup);
        let second = encode(markup);
        assert_eq!(first, second);
        assert_eq!(first.text, "x⟨elem:0⟩y⟨elem:1⟩");
    }

    #[test]
    fn test_plain_anchor_is_left_alone() {
        let encoded = encode(r#"<p><a href="https://example.org">ext</a></p>"#);
        assert_eq!(encoded.text, r#"<a href="https://example.org">ext</a>"#);
    }
}
