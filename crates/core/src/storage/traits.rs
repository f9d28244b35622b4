//! Trait definition for the blob store.

use async_trait::async_trait;

use super::error::StorageError;

/// A store for uploaded artifacts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Durably stores `bytes` under `key` and returns the public URL of
    /// the stored artifact. The URL must resolve as soon as this call
    /// returns.
    async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Returns the public URL a key would be served under, without
    /// touching the store.
    fn public_url(&self, key: &str) -> String;

    /// Validates that the store is properly configured and writable.
    async fn validate(&self) -> Result<(), StorageError>;
}
