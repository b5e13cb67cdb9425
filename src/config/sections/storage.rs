//! Store location and key namespace.

use crate::config::paths::xdg_root;
use crate::error::ApiError;
use crate::store::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// `[storage]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; `None` resolves under the XDG data home
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl StorageConfig {
    /// Resolve the database directory.
    pub fn resolve_path(&self) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(xdg_root::app_data_dir()?.join("store")),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.namespace.trim().is_empty() {
            return Err("Storage namespace cannot be empty".to_string());
        }
        if self.namespace.contains(':') {
            return Err(format!(
                "Storage namespace may not contain ':' (got '{}')",
                self.namespace
            ));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            namespace: default_namespace(),
        }
    }
}
