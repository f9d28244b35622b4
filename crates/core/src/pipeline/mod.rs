//! Upload coordination.
//!
//! [`AgingPipeline`] is the orchestrator the rest of the application talks
//! to: it validates and stores the upload, returns a usable original
//! immediately, and drives the slow aging transformation in the background
//! via one detached poller task per job.

mod config;
mod coordinator;
mod types;

pub use config::UploadConfig;
pub use coordinator::AgingPipeline;
pub use types::{PhotoUpload, SubmitReceipt, UploadError};
