//! Sled-backed durable store.

use crate::error::StorageError;
use crate::store::{namespaced, KeyValueStore, DEFAULT_NAMESPACE};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Durable key-value store on a sled database. Values are stored as JSON bytes.
pub struct SledStore {
    db: sled::Db,
    namespace: String,
}

impl SledStore {
    /// Open (or create) the database at `path`.
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        Self::with_namespace(path, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(path: &Path, namespace: impl Into<String>) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)?;
        Ok(Self {
            db,
            namespace: namespace.into(),
        })
    }

    /// Flush dirty buffers to disk.
    pub async fn flush(&self) -> Result<(), StorageError> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let physical = namespaced(&self.namespace, key);
        match self.db.get(physical.as_bytes())? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StorageError::Serialization {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let physical = namespaced(&self.namespace, key);
        let bytes = serde_json::to_vec(&value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.db.insert(physical.as_bytes(), bytes)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let physical = namespaced(&self.namespace, key);
        self.db.remove(physical.as_bytes())?;
        Ok(())
    }
}
