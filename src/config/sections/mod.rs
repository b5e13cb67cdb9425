//! Configuration sections.

pub mod storage;
pub mod translator;
pub mod wiki;

pub use storage::StorageConfig;
pub use translator::{TranslatorConfig, API_KEY_ENV};
pub use wiki::WikiConfig;

use crate::sync::DEFAULT_DEBOUNCE_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// `[sync]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Quiet period after the last change before a value is written
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_ms == 0 {
            return Err("Debounce must be at least 1 ms".to_string());
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
