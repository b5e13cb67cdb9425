//! Core types shared by the segmenter, codec, orchestrator, and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use unicode_normalization::UnicodeNormalization;

/// Characters left literal when a title is used as a URL component.
const TITLE_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Normalized article title used as the storage identity of an article.
pub type ArticleId = String;

/// Block id, unique within one article.
pub type BlockId = String;

/// Normalize a display title into an article id.
///
/// Trims, applies NFC, and collapses every whitespace run into a single `_`.
/// Returns `None` for titles that are empty after trimming.
pub fn normalize_title(title: &str) -> Option<ArticleId> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return None;
    }
    let composed: String = trimmed.nfc().collect();
    let id = composed.split_whitespace().collect::<Vec<_>>().join("_");
    Some(id)
}

/// Percent-encode a title for use as a single URL path component.
pub fn encode_title(title: &str) -> String {
    utf8_percent_encode(title, TITLE_COMPONENT).to_string()
}

/// One independently translatable unit of article content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationBlock {
    pub id: BlockId,
    /// Upper-case tag name of the block's root element (`P`, `STYLE`, ...)
    pub tag_name: String,
    /// Original serialized outer markup
    pub html: String,
    /// Preserved fragments from the latest encode of this block
    #[serde(default)]
    pub vault: Vec<String>,
}

impl TranslationBlock {
    /// Tags that carry no translatable content and are taken over verbatim.
    pub const NON_CONTENT_TAGS: [&'static str; 4] = ["STYLE", "LINK", "META", "NOSCRIPT"];

    pub fn new(id: BlockId, tag_name: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id,
            tag_name: tag_name.into(),
            html: html.into(),
            vault: Vec::new(),
        }
    }

    /// Whether the block bypasses the codec entirely.
    pub fn is_non_content(&self) -> bool {
        Self::NON_CONTENT_TAGS
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(&self.tag_name))
    }
}

/// Entry of the most-recently-used article list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub id: ArticleId,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

/// Insert or refresh an article in the MRU list, keeping it sorted newest first.
pub fn upsert_article(list: &mut Vec<ArticleMetadata>, entry: ArticleMetadata) {
    list.retain(|existing| existing.id != entry.id);
    list.push(entry);
    list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
