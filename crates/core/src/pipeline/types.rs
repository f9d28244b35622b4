//! Types for the upload pipeline surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// An incoming photo upload.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Declared content type (e.g. "image/jpeg").
    pub content_type: String,
}

impl PhotoUpload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }
}

/// Immediate result of a submission.
///
/// `job_id` is `None` when the original was stored but the transformation
/// could not be started (degraded mode); the caller always has a usable
/// artifact either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub original_url: String,
    pub job_id: Option<String>,
}

/// Errors returned synchronously from `submit`.
///
/// Everything that can go wrong after `submit` returns surfaces through
/// `TransformationFailed` events instead, never here.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The upload was rejected before any side effect.
    #[error("invalid upload: {reason}")]
    InvalidInput { reason: String },

    /// Storing the original failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
