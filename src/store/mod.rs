//! Key-Value Store
//!
//! Asynchronous get/set/remove over JSON values. Every implementation scopes its
//! keys under a fixed application namespace so several tools can share one
//! backend without collisions.

pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use async_trait::async_trait;
use serde_json::Value;

pub use memory::MemoryStore;
pub use persistence::SledStore;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "wikipedia-translation-helper";

/// Key-value store interface consumed by the sync engine and the session.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Build the physical key for a logical key under `namespace`.
pub(crate) fn namespaced(namespace: &str, key: &str) -> String {
    format!("{}:{}", namespace, key)
}
