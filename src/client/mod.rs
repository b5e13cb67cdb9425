//! Outbound collaborators
//!
//! Traits for everything the session and codec call out to, plus the HTTP
//! implementations talking to the encyclopedia and the translation model.

pub mod model;
pub mod prompt;
pub mod wiki;

pub use model::ModelTranslator;
pub use wiki::WikiClient;

use crate::error::ClientError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which wiki a langlink lookup starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkDirection {
    /// Look up the target-language counterpart of a source-language title
    SourceToTarget,
    /// Look up the source-language counterpart of a target-language title
    TargetToSource,
}

/// Article markup as returned by the encyclopedia.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedArticle {
    pub title: String,
    pub html: String,
}

/// Translates plain text carrying inert placeholders.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, ClientError>;
}

/// Cross-language link lookup.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Counterpart title in the other language, `None` when there is none.
    async fn lang_link(
        &self,
        title: &str,
        direction: LinkDirection,
    ) -> Result<Option<String>, ClientError>;
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_article(&self, title: &str) -> Result<FetchedArticle, ClientError>;
}

/// Converts reassembled article markup into wikitext.
#[async_trait]
pub trait ArticleSerializer: Send + Sync {
    async fn serialize_article(&self, html: &str, title: &str) -> Result<String, ClientError>;
}

#[async_trait]
pub trait TitleSuggester: Send + Sync {
    /// Matching titles; empty on any failure.
    async fn suggest_titles(&self, query: &str) -> Vec<String>;
}
