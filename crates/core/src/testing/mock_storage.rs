//! Mock blob store for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{BlobStore, StorageError};

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub size_bytes: usize,
}

/// Mock implementation of the [`BlobStore`] trait. Keeps uploads in
/// memory and mints `mock://` URLs.
pub struct MockBlobStore {
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    next_error: Arc<RwLock<Option<StorageError>>>,
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the next upload to fail.
    pub async fn fail_next_upload(&self, error: StorageError) {
        *self.next_error.write().await = Some(error);
    }

    /// All recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Number of uploads performed.
    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        self.uploads.write().await.push(RecordedUpload {
            key: key.to_string(),
            size_bytes: bytes.len(),
        });
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("mock://store/{}", key)
    }

    async fn validate(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
