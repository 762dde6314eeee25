//! Persistence gateway - the load/save contract for store snapshots.
//!
//! The core only depends on [`SnapshotGateway`]. Implementations shipped here:
//!
//! - [`JsonFileGateway`]: one JSON file on disk, replaced atomically on save
//! - [`MemoryGateway`]: serialized snapshot kept in memory, with switchable save failures
//! - [`QueuedGateway`]: hands saves to a tokio task that applies them in order
//!
//! A snapshot is the serde form of [`Store`]. Load errors are recovered by
//! [`StoreManager`](crate::state::StoreManager) (fall back to defaults); save
//! errors are reported on the mutation result and never undo the mutation.

pub mod file;
pub mod memory;
pub mod queued;

pub use file::JsonFileGateway;
pub use memory::MemoryGateway;
pub use queued::QueuedGateway;

use crate::models::Store;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving a snapshot
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Snapshot storage unavailable: {0}")]
    Unavailable(String),
}

/// Load/save contract for the whole store.
///
/// `load` returns `Ok(None)` when nothing has been saved yet.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotGateway: Send + Sync {
    fn load(&self) -> Result<Option<Store>, PersistenceError>;

    fn save(&self, store: &Store) -> Result<(), PersistenceError>;
}

/// Serialize a store to snapshot JSON
pub fn encode_snapshot(store: &Store) -> Result<String, PersistenceError> {
    serde_json::to_string_pretty(store).map_err(PersistenceError::Serialize)
}

/// Parse snapshot JSON back into a store
pub fn decode_snapshot(json: &str) -> Result<Store, PersistenceError> {
    serde_json::from_str(json).map_err(PersistenceError::Corrupt)
}
