//! Persistent binding: one value mirrored to the store under a changing key.
//!
//! Each binding owns a single task that serializes its loads, debounced saves,
//! and flushes. The task is the only writer of loaded values and consumes the
//! change notification a load produces, so a freshly loaded value is never
//! mistaken for an edit that must be saved.

use crate::error::ApiError;
use crate::store::KeyValueStore;
use crate::sync::key::KeySource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, warn};

/// Lifecycle phase of a binding task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Task spawned, initial load not yet started
    Starting,
    /// Reading the current key; saves are suppressed
    Loading,
    /// Loaded and nothing pending
    Idle,
    /// A save is scheduled
    Debouncing,
    /// Writing a snapshot
    Saving,
    Stopped,
}

/// Observable status of a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub key: Option<String>,
    pub phase: SyncPhase,
}

enum Command {
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a value kept in sync with the store.
///
/// Cloning is cheap; every clone refers to the same binding. The binding task
/// stops once all handles are dropped, after writing any pending save.
pub struct PersistentState<T> {
    inner: Arc<Shared<T>>,
}

struct Shared<T> {
    name: String,
    key: KeySource,
    value: Arc<watch::Sender<T>>,
    status: watch::Receiver<SyncStatus>,
    commands: mpsc::UnboundedSender<Command>,
}

impl<T> Clone for PersistentState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for PersistentState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentState")
            .field("name", &self.inner.name)
            .field("status", &*self.inner.status.borrow())
            .finish()
    }
}

impl<T> PersistentState<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Spawn the binding task. Must be called within a tokio runtime.
    pub(crate) fn spawn(
        name: impl Into<String>,
        key: KeySource,
        default: T,
        store: Arc<dyn KeyValueStore>,
        debounce: Duration,
    ) -> Self {
        let name = name.into();
        let (value_tx, value_rx) = watch::channel(default.clone());
        let value = Arc::new(value_tx);
        let (status_tx, status_rx) = watch::channel(SyncStatus {
            key: key.current(),
            phase: SyncPhase::Starting,
        });
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = BindingTask {
            name: name.clone(),
            key: key.clone(),
            store,
            default,
            debounce,
            value: Arc::clone(&value),
            observed: value_rx,
            status: status_tx,
            commands: command_rx,
        };
        tokio::spawn(task.run());

        Self {
            inner: Arc::new(Shared {
                name,
                key,
                value,
                status: status_rx,
                commands: command_tx,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current persistence key.
    pub fn key(&self) -> Option<String> {
        self.inner.key.current()
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status.borrow().clone()
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Run `f` against the current value without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        self.inner.value.send_replace(value);
    }

    /// Mutate the value in place; always counts as a change.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.inner.value.send_modify(f);
    }

    /// Mutate the value in place; counts as a change only when `f` returns true.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.inner.value.send_if_modified(f)
    }

    /// Wait until the value for the current key has been loaded.
    pub async fn ready(&self) -> Result<(), ApiError> {
        let mut status = self.inner.status.clone();
        loop {
            {
                let current = status.borrow_and_update();
                match current.phase {
                    SyncPhase::Stopped => {
                        return Err(ApiError::BindingClosed(self.inner.name.clone()))
                    }
                    SyncPhase::Starting | SyncPhase::Loading => {}
                    _ if current.key == self.inner.key.current() => return Ok(()),
                    _ => {}
                }
            }
            if status.changed().await.is_err() {
                return Err(ApiError::BindingClosed(self.inner.name.clone()));
            }
        }
    }

    /// Write any pending save now and wait for it.
    pub async fn flush(&self) -> Result<(), ApiError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.inner
            .commands
            .send(Command::Flush(ack_tx))
            .map_err(|_| ApiError::BindingClosed(self.inner.name.clone()))?;
        ack_rx
            .await
            .map_err(|_| ApiError::BindingClosed(self.inner.name.clone()))
    }

    /// Flush and stop the binding task.
    pub async fn shutdown(&self) -> Result<(), ApiError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.inner
            .commands
            .send(Command::Shutdown(ack_tx))
            .map_err(|_| ApiError::BindingClosed(self.inner.name.clone()))?;
        ack_rx
            .await
            .map_err(|_| ApiError::BindingClosed(self.inner.name.clone()))
    }
}

struct BindingTask<T> {
    name: String,
    key: KeySource,
    store: Arc<dyn KeyValueStore>,
    default: T,
    debounce: Duration,
    value: Arc<watch::Sender<T>>,
    observed: watch::Receiver<T>,
    status: watch::Sender<SyncStatus>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<T> BindingTask<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn run(mut self) {
        let mut key = self.key.current();
        let mut key_open = true;
        let mut deadline: Option<Instant> = None;

        self.load(&key).await;

        loop {
            let wake_at = deadline.unwrap_or_else(Instant::now);
            tokio::select! {
                changed = self.key.changed(), if key_open => {
                    if changed.is_err() {
                        key_open = false;
                        continue;
                    }
                    let next = self.key.current();
                    if next == key {
                        continue;
                    }
                    if deadline.take().is_some() {
                        debug!(
                            binding = %self.name,
                            previous_key = ?key,
                            next_key = ?next,
                            "Discarding pending save superseded by key change"
                        );
                    }
                    key = next;
                    self.load(&key).await;
                }
                changed = self.observed.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.observed.borrow_and_update();
                    if key.is_none() {
                        continue;
                    }
                    deadline = Some(Instant::now() + self.debounce);
                    self.set_status(&key, SyncPhase::Debouncing);
                }
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    deadline = None;
                    self.save(&key).await;
                }
                command = self.commands.recv() => {
                    // A change may be queued behind the command.
                    let unseen = self.observed.has_changed().unwrap_or(false);
                    if unseen {
                        self.observed.borrow_and_update();
                    }
                    if deadline.take().is_some() || (unseen && key.is_some()) {
                        self.save(&key).await;
                    }
                    match command {
                        Some(Command::Flush(ack)) => {
                            let _ = ack.send(());
                        }
                        Some(Command::Shutdown(ack)) => {
                            self.set_status(&key, SyncPhase::Stopped);
                            let _ = ack.send(());
                            return;
                        }
                        None => break,
                    }
                }
            }
        }

        self.set_status(&key, SyncPhase::Stopped);
        debug!(binding = %self.name, "Binding stopped");
    }

    async fn load(&mut self, key: &Option<String>) {
        let Some(storage_key) = key else {
            self.apply(self.default.clone());
            self.set_status(key, SyncPhase::Idle);
            return;
        };

        self.set_status(key, SyncPhase::Loading);
        match self.store.get(storage_key).await {
            Ok(Some(raw)) => match serde_json::from_value::<T>(raw) {
                Ok(loaded) => {
                    self.apply(loaded);
                    debug!(binding = %self.name, key = %storage_key, "Loaded persistent state");
                }
                Err(e) => {
                    warn!(
                        binding = %self.name,
                        key = %storage_key,
                        error = %e,
                        "Stored value could not be decoded, keeping in-memory value"
                    );
                }
            },
            Ok(None) => {
                self.apply(self.default.clone());
                debug!(binding = %self.name, key = %storage_key, "No stored value, reset to default");
            }
            Err(e) => {
                error!(
                    binding = %self.name,
                    key = %storage_key,
                    error = %e,
                    "Failed to load persistent state"
                );
            }
        }
        // Edits made while loading lose to the load.
        self.observed.borrow_and_update();
        self.set_status(key, SyncPhase::Idle);
    }

    async fn save(&mut self, key: &Option<String>) {
        let Some(storage_key) = key else {
            return;
        };
        let snapshot = serde_json::to_value(&*self.observed.borrow());
        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(
                    binding = %self.name,
                    key = %storage_key,
                    error = %e,
                    "Failed to serialize persistent state"
                );
                self.set_status(key, SyncPhase::Idle);
                return;
            }
        };

        self.set_status(key, SyncPhase::Saving);
        match self.store.set(storage_key, snapshot).await {
            Ok(()) => debug!(binding = %self.name, key = %storage_key, "Saved persistent state"),
            Err(e) => error!(
                binding = %self.name,
                key = %storage_key,
                error = %e,
                "Failed to save persistent state"
            ),
        }
        self.set_status(key, SyncPhase::Idle);
    }

    fn apply(&mut self, value: T) {
        self.value.send_replace(value);
        self.observed.borrow_and_update();
    }

    fn set_status(&self, key: &Option<String>, phase: SyncPhase) {
        self.status.send_replace(SyncStatus {
            key: key.clone(),
            phase,
        });
    }
}
