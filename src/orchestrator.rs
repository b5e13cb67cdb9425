//! Translation Orchestrator
//!
//! Drives one block at a time through encode, translation, and decode, and
//! writes the finalized markup into the article's translated content. At most
//! one block is in flight; requests for other blocks meanwhile are `Busy`
//! no-ops. A result that arrives after the active article changed is still
//! applied, to the article it was requested for.

use crate::client::{LinkResolver, Translator};
use crate::codec::{decode, encode};
use crate::error::ApiError;
use crate::markup::{plain_text, snippet};
use crate::session::ArticleState;
use crate::types::{ArticleId, BlockId, TranslationBlock};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Characters of block text shown for the current selection.
pub const SNIPPET_CHARS: usize = 60;

/// Progress of the block currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockPhase {
    Encoding,
    AwaitingTranslation,
    Decoding,
}

/// Block currently being translated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InFlight {
    pub block_id: BlockId,
    pub article_id: ArticleId,
    pub phase: BlockPhase,
}

/// Most recently selected block, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub block_id: BlockId,
    pub snippet: String,
}

/// Result of a translate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateOutcome {
    /// Translated and stored
    Translated,
    /// Non-content block copied over verbatim
    Bypassed,
    /// Already has translated content
    AlreadyTranslated,
    /// This block is already in flight
    InProgress,
    /// Another block is in flight
    Busy { in_flight: BlockId },
    /// Translated and stored for an article that stopped being active
    /// while the request was in flight
    StoredForInactive { article_id: ArticleId },
}

/// Per-block results of [`TranslationOrchestrator::translate_all`].
#[derive(Debug, Default)]
pub struct TranslateAllReport {
    pub translated: Vec<BlockId>,
    pub bypassed: Vec<BlockId>,
    pub skipped: Vec<BlockId>,
    pub failed: Vec<(BlockId, ApiError)>,
}

/// Releases the in-flight slot however the request ends.
struct SlotGuard<'a> {
    slot: &'a Mutex<Option<InFlight>>,
}

impl SlotGuard<'_> {
    fn advance(&self, phase: BlockPhase) {
        if let Some(in_flight) = self.slot.lock().as_mut() {
            in_flight.phase = phase;
        }
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

pub struct TranslationOrchestrator {
    source_lang: String,
    in_flight: Mutex<Option<InFlight>>,
    selection: Mutex<Option<Selection>>,
}

impl TranslationOrchestrator {
    pub fn new(source_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            in_flight: Mutex::new(None),
            selection: Mutex::new(None),
        }
    }

    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight.lock().clone()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection.lock().clone()
    }

    pub fn clear_selection(&self) {
        self.selection.lock().take();
    }

    /// Translate one block of the active article.
    pub async fn translate(
        &self,
        state: &ArticleState,
        translator: &dyn Translator,
        resolver: &dyn LinkResolver,
        block_id: &str,
    ) -> Result<TranslateOutcome, ApiError> {
        let article_id = state
            .active_id()
            .ok_or_else(|| ApiError::InvalidInput("No active article".to_string()))?;
        let block = state
            .block(block_id)
            .ok_or_else(|| ApiError::BlockNotFound(block_id.to_string()))?;
        self.select(&block);

        if state.is_translated(block_id) {
            return Ok(TranslateOutcome::AlreadyTranslated);
        }

        if block.is_non_content() {
            state
                .translations
                .update(|t| {
                    t.insert(block.id.clone(), block.html.clone());
                });
            debug!(block_id = %block.id, tag = %block.tag_name, "Copied non-content block");
            return Ok(TranslateOutcome::Bypassed);
        }

        let guard = {
            let mut slot = self.in_flight.lock();
            if let Some(current) = slot.as_ref() {
                return Ok(if current.block_id == block.id {
                    TranslateOutcome::InProgress
                } else {
                    TranslateOutcome::Busy {
                        in_flight: current.block_id.clone(),
                    }
                });
            }
            *slot = Some(InFlight {
                block_id: block.id.clone(),
                article_id: article_id.clone(),
                phase: BlockPhase::Encoding,
            });
            SlotGuard {
                slot: &self.in_flight,
            }
        };

        let title = state.active_title.get();
        let encoded = encode(&block.html);
        guard.advance(BlockPhase::AwaitingTranslation);

        let translated = match translator.translate(&encoded.text).await {
            Ok(translated) => translated,
            Err(e) => {
                error!(block_id = %block.id, title = %title, error = %e, "Translation failed");
                return Err(e.into());
            }
        };

        guard.advance(BlockPhase::Decoding);
        let decoded = decode(&translated, &encoded.vault, resolver, &self.source_lang).await;
        let finalized = encoded.wrap(&decoded);
        let vault = encoded.vault.into_inner();

        if state.active_id().as_deref() != Some(article_id.as_str()) {
            if let Err(e) = state
                .store_translation(&article_id, &block.id, finalized, vault)
                .await
            {
                error!(
                    block_id = %block.id,
                    title = %title,
                    error = %e,
                    "Failed to store translation"
                );
                return Err(e);
            }
            state.touch(&article_id, &title);
            info!(
                block_id = %block.id,
                title = %title,
                "Active article changed during translation, stored result for it"
            );
            return Ok(TranslateOutcome::StoredForInactive { article_id });
        }

        state.blocks.update_if(|blocks| {
            match blocks.iter_mut().find(|b| b.id == block.id) {
                Some(stored) if stored.vault != vault => {
                    stored.vault = vault;
                    true
                }
                _ => false,
            }
        });
        state.translations.update(|t| {
            t.insert(block.id.clone(), finalized);
        });
        state.touch(&article_id, &title);
        info!(block_id = %block.id, title = %title, "Block translated");
        drop(guard);
        Ok(TranslateOutcome::Translated)
    }

    /// Translate every pending block in order, collecting failures.
    pub async fn translate_all(
        &self,
        state: &ArticleState,
        translator: &dyn Translator,
        resolver: &dyn LinkResolver,
    ) -> TranslateAllReport {
        let mut report = TranslateAllReport::default();
        let article_id = state.active_id();
        let ids: Vec<BlockId> = state
            .blocks
            .read(|blocks| blocks.iter().map(|b| b.id.clone()).collect());

        for id in ids {
            if state.active_id() != article_id {
                debug!(block_id = %id, "Active article changed, stopping batch translation");
                break;
            }
            if state.is_translated(&id) {
                continue;
            }
            match self.translate(state, translator, resolver, &id).await {
                Ok(TranslateOutcome::Translated) => report.translated.push(id),
                Ok(TranslateOutcome::Bypassed) => report.bypassed.push(id),
                Ok(TranslateOutcome::StoredForInactive { .. }) => {
                    report.translated.push(id);
                    break;
                }
                Ok(_) => report.skipped.push(id),
                Err(e) => {
                    warn!(block_id = %id, error = %e, "Block failed during batch translation");
                    report.failed.push((id, e));
                }
            }
        }
        report
    }

    fn select(&self, block: &TranslationBlock) {
        let text = plain_text(&block.html);
        *self.selection.lock() = Some(Selection {
            block_id: block.id.clone(),
            snippet: snippet(&text, SNIPPET_CHARS),
        });
    }
}
