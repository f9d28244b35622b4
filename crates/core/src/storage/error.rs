//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while storing artifacts.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key would resolve outside the storage root or is malformed.
    #[error("invalid storage key: {key}")]
    InvalidKey { key: String },

    /// The storage root does not exist and could not be created.
    #[error("failed to prepare storage root: {path}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the artifact.
    #[error("failed to write artifact {key}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The store is missing required configuration.
    #[error("storage not configured: {0}")]
    NotConfigured(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
