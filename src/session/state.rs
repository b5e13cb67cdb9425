//! Persistent article state: the bindings behind one session.

use crate::error::{ApiError, StorageError};
use crate::markup::ReferenceMap;
use crate::store::KeyValueStore;
use crate::sync::{BindingRegistry, KeySource, PersistentState};
use crate::types::{upsert_article, ArticleId, ArticleMetadata, BlockId, TranslationBlock};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

pub const KEY_LAST_ACTIVE_TITLE: &str = "lastActiveTitle";
pub const KEY_SAVED_ARTICLES: &str = "savedArticlesList";
pub const SUFFIX_BLOCKS: &str = "blocks";
pub const SUFFIX_TRANSLATIONS: &str = "translations";
pub const SUFFIX_BODY_CLASS: &str = "body-class";
pub const SUFFIX_STYLES: &str = "article-styles";
pub const SUFFIX_REFERENCES: &str = "reference-map";

/// Every per-article key suffix.
pub const ARTICLE_SUFFIXES: [&str; 5] = [
    SUFFIX_BLOCKS,
    SUFFIX_TRANSLATIONS,
    SUFFIX_BODY_CLASS,
    SUFFIX_STYLES,
    SUFFIX_REFERENCES,
];

/// Block id to finalized translated markup.
pub type TranslatedContent = BTreeMap<BlockId, String>;

/// Handles to all persistent session values.
///
/// Article-scoped values follow the active article id; the title and the
/// saved-article list use fixed keys.
#[derive(Clone)]
pub struct ArticleState {
    scope: watch::Receiver<Option<ArticleId>>,
    store: Arc<dyn KeyValueStore>,
    pub active_title: PersistentState<String>,
    pub saved_articles: PersistentState<Vec<ArticleMetadata>>,
    pub blocks: PersistentState<Vec<TranslationBlock>>,
    pub translations: PersistentState<TranslatedContent>,
    pub body_class: PersistentState<String>,
    pub styles: PersistentState<Vec<String>>,
    pub references: PersistentState<ReferenceMap>,
}

impl ArticleState {
    /// Bind every value through `registry`, scoping article values to `scope`.
    pub fn bind(
        registry: &BindingRegistry,
        scope: watch::Receiver<Option<ArticleId>>,
    ) -> Result<Self, ApiError> {
        let scoped = |suffix: &str| KeySource::scoped(scope.clone(), suffix);
        Ok(Self {
            active_title: registry.bind(
                "active_title",
                KeySource::fixed(KEY_LAST_ACTIVE_TITLE),
                String::new(),
            )?,
            saved_articles: registry.bind(
                "saved_articles",
                KeySource::fixed(KEY_SAVED_ARTICLES),
                Vec::new(),
            )?,
            blocks: registry.bind("blocks", scoped(SUFFIX_BLOCKS), Vec::new())?,
            translations: registry.bind(
                "translations",
                scoped(SUFFIX_TRANSLATIONS),
                TranslatedContent::new(),
            )?,
            body_class: registry.bind("body_class", scoped(SUFFIX_BODY_CLASS), String::new())?,
            styles: registry.bind("article_styles", scoped(SUFFIX_STYLES), Vec::new())?,
            references: registry.bind(
                "reference_map",
                scoped(SUFFIX_REFERENCES),
                ReferenceMap::new(),
            )?,
            scope,
            store: registry.store(),
        })
    }

    /// Id of the active article, if any.
    pub fn active_id(&self) -> Option<ArticleId> {
        self.scope.borrow().clone()
    }

    /// Wait until every article-scoped value has loaded for the current id.
    pub async fn scoped_ready(&self) -> Result<(), ApiError> {
        self.blocks.ready().await?;
        self.translations.ready().await?;
        self.body_class.ready().await?;
        self.styles.ready().await?;
        self.references.ready().await
    }

    /// Move the active article to the front of the saved list.
    pub fn touch(&self, id: &str, title: &str) {
        let entry = ArticleMetadata {
            id: id.to_string(),
            title: title.to_string(),
            updated_at: Utc::now(),
        };
        self.saved_articles
            .update(|list| upsert_article(list, entry));
    }

    /// Block by id in the active article.
    pub fn block(&self, block_id: &str) -> Option<TranslationBlock> {
        self.blocks
            .read(|blocks| blocks.iter().find(|b| b.id == block_id).cloned())
    }

    pub fn is_translated(&self, block_id: &str) -> bool {
        self.translations.read(|t| t.contains_key(block_id))
    }

    /// Record a finished block translation for an article that is no longer
    /// active.
    ///
    /// The scoped bindings already follow the new article, so the stored
    /// `translations` and `blocks` values of `article_id` are rewritten
    /// directly.
    pub async fn store_translation(
        &self,
        article_id: &str,
        block_id: &str,
        markup: String,
        vault: Vec<String>,
    ) -> Result<(), ApiError> {
        let key = format!("{}:{}", article_id, SUFFIX_TRANSLATIONS);
        self.update_stored(&key, |translations: &mut TranslatedContent| {
            translations.insert(block_id.to_string(), markup);
        })
        .await?;

        let key = format!("{}:{}", article_id, SUFFIX_BLOCKS);
        self.update_stored(&key, |blocks: &mut Vec<TranslationBlock>| {
            if let Some(stored) = blocks.iter_mut().find(|b| b.id == block_id) {
                stored.vault = vault;
            }
        })
        .await
    }

    async fn update_stored<T>(&self, key: &str, apply: impl FnOnce(&mut T)) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let serialization = |e: serde_json::Error| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        };
        let mut value = match self.store.get(key).await? {
            Some(raw) => serde_json::from_value::<T>(raw).map_err(serialization)?,
            None => T::default(),
        };
        apply(&mut value);
        let raw = serde_json::to_value(&value).map_err(serialization)?;
        self.store.set(key, raw).await?;
        Ok(())
    }
}
