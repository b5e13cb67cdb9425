//! Binding registry
//!
//! Maps a stable binding identity (binding name plus key-source description) to
//! its live handle, so binding the same logical state twice yields the existing
//! handle instead of a second set of watchers.

use crate::error::ApiError;
use crate::store::KeyValueStore;
use crate::sync::binding::PersistentState;
use crate::sync::key::KeySource;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Type-erased view of a binding used for registry-wide operations.
#[async_trait]
trait RegisteredBinding: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    async fn flush(&self) -> Result<(), ApiError>;
    async fn shutdown(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl<T> RegisteredBinding for PersistentState<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn flush(&self) -> Result<(), ApiError> {
        PersistentState::flush(self).await
    }

    async fn shutdown(&self) -> Result<(), ApiError> {
        PersistentState::shutdown(self).await
    }
}

/// Registry of persistent bindings sharing one store.
pub struct BindingRegistry {
    store: Arc<dyn KeyValueStore>,
    debounce: Duration,
    bindings: RwLock<HashMap<String, Arc<dyn RegisteredBinding>>>,
}

impl BindingRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Identity under which a binding is registered.
    pub fn identity(name: &str, key: &KeySource) -> String {
        format!("{}@{}", name, key.describe())
    }

    /// Bind `name` to `key`, or return the existing binding with that identity.
    ///
    /// Must be called within a tokio runtime.
    pub fn bind<T>(
        &self,
        name: &str,
        key: KeySource,
        default: T,
    ) -> Result<PersistentState<T>, ApiError>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let identity = Self::identity(name, &key);
        {
            let bindings = self.bindings.read();
            if let Some(existing) = bindings.get(&identity) {
                return Self::downcast(&identity, existing.as_ref());
            }
        }

        let mut bindings = self.bindings.write();
        if let Some(existing) = bindings.get(&identity) {
            return Self::downcast(&identity, existing.as_ref());
        }

        let state = PersistentState::spawn(
            name,
            key,
            default,
            Arc::clone(&self.store),
            self.debounce,
        );
        bindings.insert(identity.clone(), Arc::new(state.clone()));
        debug!(identity = %identity, "Registered persistent binding");
        Ok(state)
    }

    fn downcast<T>(
        identity: &str,
        existing: &dyn RegisteredBinding,
    ) -> Result<PersistentState<T>, ApiError>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        existing
            .as_any()
            .downcast_ref::<PersistentState<T>>()
            .cloned()
            .ok_or_else(|| ApiError::BindingTypeMismatch {
                identity: identity.to_string(),
            })
    }

    /// Store shared by every binding.
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Registered identities, sorted.
    pub fn identities(&self) -> Vec<String> {
        let mut identities: Vec<String> = self.bindings.read().keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Flush every binding, logging the ones that have stopped.
    pub async fn flush_all(&self) {
        for (identity, binding) in self.snapshot() {
            if let Err(e) = binding.flush().await {
                warn!(identity = %identity, error = %e, "Failed to flush binding");
            }
        }
    }

    /// Flush and stop every binding, then forget them.
    pub async fn shutdown_all(&self) {
        for (identity, binding) in self.snapshot() {
            if let Err(e) = binding.shutdown().await {
                warn!(identity = %identity, error = %e, "Failed to shut down binding");
            }
        }
        self.bindings.write().clear();
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn RegisteredBinding>)> {
        self.bindings
            .read()
            .iter()
            .map(|(identity, binding)| (identity.clone(), Arc::clone(binding)))
            .collect()
    }
}
