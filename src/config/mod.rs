//! Configuration
//!
//! `AppConfig` is assembled with the `config` crate from, lowest precedence
//! first: built-in defaults, `$XDG_CONFIG_HOME/wikitrans/config.toml`, an
//! explicit `--config` file, and `WIKITRANS__SECTION__KEY` environment
//! variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sections;
pub mod sources;

pub use facade::ConfigLoader;
pub use sections::{StorageConfig, SyncConfig, TranslatorConfig, WikiConfig, API_KEY_ENV};

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub wiki: WikiConfig,

    #[serde(default)]
    pub translator: TranslatorConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate every section, reporting the first failure.
    pub fn validate(&self) -> Result<(), ApiError> {
        let checks = [
            ("wiki", self.wiki.validate()),
            ("translator", self.translator.validate()),
            ("storage", self.storage.validate()),
            ("sync", self.sync.validate()),
        ];
        for (section, result) in checks {
            if let Err(message) = result {
                return Err(ApiError::ConfigError(format!("[{}] {}", section, message)));
            }
        }
        Ok(())
    }
}
