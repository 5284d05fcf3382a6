//! File-per-key checkpoint backend.
//!
//! Stores each checkpoint as one JSON file inside the host-assigned
//! checkpoint directory. Writes go through a sibling temp file and a rename
//! so a crash mid-write never leaves a torn checkpoint behind.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::{CheckpointError, Checkpointer};

/// Errors raised by the file backend.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FileCheckpointError {
    /// Underlying filesystem operation failed (including deleting an
    /// absent key).
    #[error("checkpoint io failure: {0}")]
    Io(#[from] std::io::Error),

    /// A stored checkpoint file does not contain valid JSON.
    #[error("malformed checkpoint file: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Checkpoint backend writing one file per key.
#[derive(Debug, Clone)]
pub struct FileCheckpointer {
    dir: PathBuf,
}

impl FileCheckpointer {
    /// Creates a backend rooted at `dir`. The directory is created on the
    /// first `save`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(encode_key(key))
    }
}

/// Percent-encodes a checkpoint key into a safe file name.
fn encode_key(key: &str) -> String {
    url::form_urlencoded::byte_serialize(key.as_bytes()).collect()
}

#[async_trait]
impl Checkpointer for FileCheckpointer {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CheckpointError> {
        let raw = match tokio::fs::read(self.key_path(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FileCheckpointError::from(e).into()),
        };
        let value = serde_json::from_slice(&raw).map_err(FileCheckpointError::from)?;
        Ok(Some(value))
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), CheckpointError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(FileCheckpointError::from)?;

        let path = self.key_path(key);
        let tmp = self.dir.join(format!("{}.new", encode_key(key)));
        let raw = serde_json::to_vec(&value).map_err(FileCheckpointError::from)?;

        tokio::fs::write(&tmp, raw)
            .await
            .map_err(FileCheckpointError::from)?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(FileCheckpointError::from)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CheckpointError> {
        tokio::fs::remove_file(self.key_path(key))
            .await
            .map_err(FileCheckpointError::from)?;
        Ok(())
    }
}
