//! ConfigLoader facade delegating to the merge service.

use super::merge::MergeService;
use super::AppConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from files and environment.
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ApiError> {
        let config = MergeService::load(explicit)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from defaults and environment only.
    pub fn load_from_env() -> Result<AppConfig, ApiError> {
        let config = MergeService::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn default() -> AppConfig {
        AppConfig::default()
    }
}
