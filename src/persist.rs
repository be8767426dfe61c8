//! File-backed key-value persistence for small JSON blobs.
//!
//! SYSTEM CONTEXT
//! ==============
//! The conversation store mirrors chat history to disk the way a browser
//! client mirrors it into localStorage: one value per key, rewritten whole
//! on every save. Keys map to `<key>.json` files under one directory, which
//! is created lazily on the first write.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage io failed: {0}")]
    Io(#[from] io::Error),

    #[error("storage encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A directory of JSON blobs, one file per key.
#[derive(Debug, Clone)]
pub struct KvStore {
    dir: PathBuf,
}

impl KvStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load and decode the value stored under `key`. A missing file reads as
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the file exists but cannot be read or
    /// decoded.
    pub async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistError::Io(e)),
        }
    }

    /// Encode `value` and rewrite the file under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if encoding fails or the file cannot be
    /// written.
    pub async fn save_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), PersistError> {
        let raw = serde_json::to_string(value)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), raw).await?;
        Ok(())
    }

    /// Delete the value under `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the file exists but cannot be removed.
    pub async fn remove(&self, key: &str) -> Result<(), PersistError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::Io(e)),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(test)]
#[path = "persist_test.rs"]
mod tests;
