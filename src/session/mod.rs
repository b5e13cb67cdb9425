//! Article session
//!
//! Ties the persistent article state, the binding registry, and the
//! translation orchestrator together, and exposes the operations a front end
//! drives: fetching an article, translating blocks, generating wikitext, and
//! managing the saved-article list.

pub mod state;

pub use state::{ArticleState, TranslatedContent};

use crate::client::{ArticleSerializer, ArticleSource, LinkResolver, Translator};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::markup::parse_article;
use crate::orchestrator::{TranslateAllReport, TranslateOutcome, TranslationOrchestrator};
use crate::store::KeyValueStore;
use crate::sync::BindingRegistry;
use crate::types::{normalize_title, ArticleId, ArticleMetadata};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Outcome of a guarded session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<T> {
    Done(T),
    /// Nothing to do (empty title, no blocks)
    Skipped,
    /// The same operation is already running
    AlreadyRunning,
}

/// Clears an in-progress flag when dropped.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One translator's working session over the local store.
pub struct ArticleSession {
    config: AppConfig,
    store: Arc<dyn KeyValueStore>,
    registry: BindingRegistry,
    scope: watch::Sender<Option<ArticleId>>,
    state: ArticleState,
    orchestrator: TranslationOrchestrator,
    input_title: RwLock<String>,
    wikitext: RwLock<Option<String>>,
    fetching: AtomicBool,
    serializing: AtomicBool,
}

impl ArticleSession {
    /// Bind all session state and restore the last active article.
    pub async fn open(store: Arc<dyn KeyValueStore>, config: AppConfig) -> Result<Self, ApiError> {
        let registry = BindingRegistry::new(Arc::clone(&store), config.sync.debounce());
        let (scope, scope_rx) = watch::channel(None);
        let state = ArticleState::bind(&registry, scope_rx)?;

        state.active_title.ready().await?;
        state.saved_articles.ready().await?;
        let title = state.active_title.get();
        let id = normalize_title(&title);
        scope.send_replace(id.clone());
        state.scoped_ready().await?;
        info!(title = %title, article_id = ?id, "Session opened");

        let orchestrator = TranslationOrchestrator::new(config.wiki.source_lang.clone());
        Ok(Self {
            input_title: RwLock::new(title),
            config,
            store,
            registry,
            scope,
            state,
            orchestrator,
            wikitext: RwLock::new(None),
            fetching: AtomicBool::new(false),
            serializing: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> &ArticleState {
        &self.state
    }

    pub fn orchestrator(&self) -> &TranslationOrchestrator {
        &self.orchestrator
    }

    pub fn set_input_title(&self, title: impl Into<String>) {
        *self.input_title.write() = title.into();
    }

    pub fn input_title(&self) -> String {
        self.input_title.read().clone()
    }

    /// Display title of the active article (empty when none).
    pub fn active_title(&self) -> String {
        self.state.active_title.get()
    }

    pub fn active_id(&self) -> Option<ArticleId> {
        self.state.active_id()
    }

    pub fn saved_articles(&self) -> Vec<ArticleMetadata> {
        self.state.saved_articles.get()
    }

    /// Last generated wikitext, cleared whenever the article is re-fetched.
    pub fn wikitext(&self) -> Option<String> {
        self.wikitext.read().clone()
    }

    /// Make `title` the active article and wait for its state to load.
    ///
    /// Pending saves of the previous article are written first so the key
    /// switch cannot drop them.
    async fn activate(&self, title: &str) -> Result<Option<ArticleId>, ApiError> {
        let id = normalize_title(title);
        if id != self.state.active_id() {
            self.registry.flush_all().await;
        }
        self.state.active_title.set(title.trim().to_string());
        self.scope.send_replace(id.clone());
        self.state.scoped_ready().await?;
        Ok(id)
    }

    fn clear_article_state(&self) {
        self.state.blocks.set(Vec::new());
        self.state.styles.set(Vec::new());
        self.state.body_class.set(String::new());
        self.state.references.set(Default::default());
        self.wikitext.write().take();
    }

    /// Fetch the input title, segment it, and make it the active article.
    pub async fn fetch_article(
        &self,
        source: &dyn ArticleSource,
    ) -> Result<RunOutcome<usize>, ApiError> {
        let title = self.input_title().trim().to_string();
        if title.is_empty() {
            return Ok(RunOutcome::Skipped);
        }
        let Some(_running) = FlagGuard::acquire(&self.fetching) else {
            return Ok(RunOutcome::AlreadyRunning);
        };

        let id = self
            .activate(&title)
            .await?
            .ok_or_else(|| ApiError::InvalidInput("Title is required".to_string()))?;
        self.clear_article_state();

        let fetched = match source.fetch_article(&title).await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(title = %title, error = %e, "Failed to fetch article");
                return Err(e.into());
            }
        };
        let parsed = parse_article(&fetched.html, &self.config.wiki.source_origin());
        let count = parsed.blocks.len();

        self.state.blocks.set(parsed.blocks);
        self.state.styles.set(parsed.styles);
        self.state.body_class.set(parsed.body_class);
        self.state.references.set(parsed.references);
        self.state.touch(&id, &title);
        info!(title = %title, blocks = count, "Article fetched");
        Ok(RunOutcome::Done(count))
    }

    /// Activate a saved article by id.
    pub async fn open_saved(&self, id: &str) -> Result<ArticleMetadata, ApiError> {
        let entry = self
            .saved_articles()
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ApiError::ArticleNotFound(id.to_string()))?;
        self.set_input_title(entry.title.clone());
        self.activate(&entry.title).await?;
        self.wikitext.write().take();
        Ok(entry)
    }

    pub async fn translate_block(
        &self,
        translator: &dyn Translator,
        resolver: &dyn LinkResolver,
        block_id: &str,
    ) -> Result<TranslateOutcome, ApiError> {
        self.orchestrator
            .translate(&self.state, translator, resolver, block_id)
            .await
    }

    pub async fn translate_all(
        &self,
        translator: &dyn Translator,
        resolver: &dyn LinkResolver,
    ) -> TranslateAllReport {
        self.orchestrator
            .translate_all(&self.state, translator, resolver)
            .await
    }

    /// Article markup with translated blocks in place of their originals.
    pub fn assembled_markup(&self) -> String {
        let translations = self.state.translations.get();
        self.state.blocks.read(|blocks| {
            blocks
                .iter()
                .map(|block| {
                    translations
                        .get(&block.id)
                        .map(String::as_str)
                        .unwrap_or(block.html.as_str())
                })
                .collect()
        })
    }

    /// Serialize the assembled article into wikitext.
    pub async fn generate_wikitext(
        &self,
        serializer: &dyn ArticleSerializer,
    ) -> Result<RunOutcome<String>, ApiError> {
        if self.state.blocks.read(Vec::is_empty) {
            return Ok(RunOutcome::Skipped);
        }
        let Some(_running) = FlagGuard::acquire(&self.serializing) else {
            return Ok(RunOutcome::AlreadyRunning);
        };
        self.wikitext.write().take();

        let title = self.active_title();
        let markup = self.assembled_markup();
        let wikitext = match serializer.serialize_article(&markup, &title).await {
            Ok(wikitext) => wikitext,
            Err(e) => {
                error!(title = %title, error = %e, "Serialization failed");
                return Err(e.into());
            }
        };

        *self.wikitext.write() = Some(wikitext.clone());
        if let Some(id) = self.active_id() {
            self.state.touch(&id, &title);
        }
        Ok(RunOutcome::Done(wikitext))
    }

    /// Drop all translated content of the active article and the selection.
    pub fn reset_translation(&self) {
        self.state.translations.set(TranslatedContent::new());
        self.orchestrator.clear_selection();
    }

    /// Remove a saved article and everything stored for it.
    pub async fn forget_article(&self, id: &str) -> Result<(), ApiError> {
        let removed = self.state.saved_articles.update_if(|list| {
            let before = list.len();
            list.retain(|entry| entry.id != id);
            list.len() != before
        });
        let active = self.active_id().as_deref() == Some(id);
        if !removed && !active {
            return Err(ApiError::ArticleNotFound(id.to_string()));
        }

        if active {
            self.set_input_title(String::new());
            self.activate("").await?;
            self.wikitext.write().take();
        }

        for suffix in state::ARTICLE_SUFFIXES {
            let key = format!("{}:{}", id, suffix);
            if let Err(e) = self.store.remove(&key).await {
                warn!(key = %key, error = %e, "Failed to remove article data");
                return Err(e.into());
            }
        }
        self.state.saved_articles.flush().await?;
        info!(article_id = %id, "Article forgotten");
        Ok(())
    }

    /// Write every pending change now.
    pub async fn flush(&self) {
        self.registry.flush_all().await;
    }

    /// Flush and stop every binding.
    pub async fn shutdown(&self) {
        self.registry.shutdown_all().await;
    }
}
