//! # Durable checkpoint persistence.
//!
//! Inputs record resumable progress as key→value checkpoints behind the
//! [`Checkpointer`] trait. Two backends exist:
//!
//! - [`KvStoreCheckpointer`] — documents in the host's key-value store,
//!   reached over the management API (survives host migrations).
//! - [`FileCheckpointer`] — one JSON file per key under the host-assigned
//!   checkpoint directory (no network dependency).
//!
//! The engine selects a backend exactly once per invocation from
//! [`InputSettings::use_kvstore_checkpoint`](crate::InputSettings) and
//! memoizes the handle; there is no backend switching mid-run.
//!
//! Failures stay backend-specific: [`CheckpointError`] wraps each backend's
//! own error type without flattening them into a common kind, so callers
//! that care must match on the backend they configured.

mod file;
mod kvstore;

pub use file::{FileCheckpointError, FileCheckpointer};
pub use kvstore::{KvStoreCheckpointer, KvStoreError, OWNER_ANY};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Wrapper preserving backend-specific checkpoint failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CheckpointError {
    /// Failure in the document-store backend.
    #[error("kvstore checkpoint failure: {0}")]
    KvStore(#[from] KvStoreError),

    /// Failure in the file backend.
    #[error("file checkpoint failure: {0}")]
    File(#[from] FileCheckpointError),
}

/// Uniform capability surface over one checkpoint backend.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Stable backend name for logs.
    fn name(&self) -> &'static str;

    /// Fetches the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, CheckpointError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn save(&self, key: &str, value: Value) -> Result<(), CheckpointError>;

    /// Removes the value stored under `key`. Deleting an absent key is a
    /// backend-specific error.
    async fn delete(&self, key: &str) -> Result<(), CheckpointError>;
}
