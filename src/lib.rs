//! wikitrans: structure-preserving article translation
//!
//! Fetches an encyclopedia article, splits it into translation blocks, hides
//! markup and links from the translation model behind placeholders, restores
//! them afterwards with cross-language link resolution, and keeps the whole
//! session persisted in a local key-value store.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod markup;
pub mod orchestrator;
pub mod session;
pub mod store;
pub mod sync;
pub mod tooling;
pub mod types;

pub use codec::{decode, encode, Encoded, LinkResolution, Vault};
pub use config::{AppConfig, ConfigLoader};
pub use error::{ApiError, ClientError, StorageError};
pub use orchestrator::{TranslateAllReport, TranslateOutcome, TranslationOrchestrator};
pub use session::{ArticleSession, RunOutcome};
pub use store::{KeyValueStore, MemoryStore, SledStore};
pub use types::{ArticleId, ArticleMetadata, BlockId, TranslationBlock};
