//! # Local Persistence
//!
//! `LocalStore` keeps small JSON documents (the cart, the signed-in customer) under stable
//! keys in one directory, so they survive a restart.
//!
//! Writes go to a temporary file that is then renamed over the target, so a crash mid-write
//! leaves either the old document or the new one, never half of each.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Key under which the cart is persisted.
pub const CART_KEY: &str = "cart";
/// Key under which the signed-in customer is persisted.
pub const AUTH_KEY: &str = "auth";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not encode or decode {key}: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Directory-backed key/value store of JSON documents.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Opens (and creates if needed) the store directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StorageError::Io {
                key: root.display().to_string(),
                source,
            })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Reads the document under `key`; `Ok(None)` if nothing was ever saved.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let bytes = match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };
        let value = serde_json::from_slice(&bytes).map_err(|source| StorageError::Serde {
            key: key.to_string(),
            source,
        })?;
        debug!(key, bytes = bytes.len(), "Loaded");
        Ok(Some(value))
    }

    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serde {
            key: key.to_string(),
            source,
        })?;
        let io = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        let target = self.path_for(key);
        let staging = self.root.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&staging, &bytes).await.map_err(io)?;
        tokio::fs::rename(&staging, &target).await.map_err(io)?;
        debug!(key, bytes = bytes.len(), "Saved");
        Ok(())
    }

    /// Deletes the document under `key`. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}
