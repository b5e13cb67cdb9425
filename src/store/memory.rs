//! In-memory store for ephemeral sessions and tests.

use crate::error::StorageError;
use crate::store::{namespaced, KeyValueStore, DEFAULT_NAMESPACE};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

pub struct MemoryStore {
    namespace: String,
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Synchronous read used by tests and diagnostics.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .get(&namespaced(&self.namespace, key))
            .cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries
            .write()
            .insert(namespaced(&self.namespace, key), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(&namespaced(&self.namespace, key));
        Ok(())
    }
}
