//! Persistence of transformation state on the caller's artifact record.
//!
//! The pipeline owns exactly four fields of the record — `original_url`,
//! `result_url`, `transformation_status`, `job_id` — and writes terminal
//! outcomes through a guarded update so a superseded job can never
//! overwrite a newer job's result.

mod sqlite_store;
mod store;
mod sync;

pub use sqlite_store::SqliteRecordStore;
pub use store::{ArtifactRecord, RecordError, RecordStore, TransformationUpdate, UpdateOutcome};
pub use sync::StatusSync;
