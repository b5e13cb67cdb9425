//! Persistent Sync Engine
//!
//! Keeps in-memory values mirrored to a [`KeyValueStore`](crate::store::KeyValueStore)
//! under keys that change over the value's lifetime.
//!
//! - Loads on setup and on every key change; "no key" resets to the default.
//! - Saves are debounced and suppressed while loading or without a key.
//! - A key change discards the previous key's pending save; the load wins.

pub mod binding;
pub mod key;
pub mod registry;

pub use binding::{PersistentState, SyncPhase, SyncStatus};
pub use key::KeySource;
pub use registry::BindingRegistry;

/// Default debounce window between the last change and the write.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
