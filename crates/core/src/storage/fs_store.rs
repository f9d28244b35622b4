//! File system blob store implementation.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::config::StorageConfig;
use super::error::StorageError;
use super::traits::BlobStore;

/// Blob store backed by a local directory, served over HTTP by the host
/// application.
pub struct FsBlobStore {
    config: StorageConfig,
}

impl FsBlobStore {
    /// Creates a new file system store with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Resolves a key to a path under the root, rejecting keys that would
    /// escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey { key: key.to_string() });
        }

        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            !matches!(c, Component::Normal(_))
        });
        if escapes {
            return Err(StorageError::InvalidKey { key: key.to_string() });
        }

        Ok(self.config.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::RootUnavailable {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(&path, bytes).await.map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            source: e,
        })?;

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            key
        )
    }

    async fn validate(&self) -> Result<(), StorageError> {
        if self.config.public_base_url.is_empty() {
            return Err(StorageError::NotConfigured(
                "public_base_url is required".to_string(),
            ));
        }

        fs::create_dir_all(&self.config.root)
            .await
            .map_err(|e| StorageError::RootUnavailable {
                path: self.config.root.clone(),
                source: e,
            })?;

        Ok(())
    }
}
