//! Record storage trait and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aging::{Job, JobState};

/// Error type for record operations.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Record not found.
    #[error("record not found for owner: {0}")]
    NotFound(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

/// The caller's persisted artifact record, restricted to the fields the
/// pipeline is allowed to touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub owner_id: String,
    pub original_url: String,
    /// Set iff the latest job succeeded.
    pub result_url: Option<String>,
    /// Mirrors the latest job's state; absent until a job has started.
    pub transformation_status: Option<JobState>,
    /// The job the status fields belong to.
    pub job_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// The narrow write the pipeline performs on a record.
///
/// A dedicated value type rather than a partial record: holding one of
/// these is proof the write cannot touch anything but the transformation
/// fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationUpdate {
    pub job_id: String,
    pub status: JobState,
    /// Written only when `status == Succeeded`.
    pub result_url: Option<String>,
}

impl TransformationUpdate {
    /// The claiming update written when a job starts.
    pub fn started(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Processing,
            result_url: None,
        }
    }

    /// The terminal update for a finished job.
    pub fn terminal(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            status: job.state,
            result_url: if job.state == JobState::Succeeded {
                job.result_url.clone()
            } else {
                None
            },
        }
    }
}

/// Outcome of a guarded transformation write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The write was applied.
    Applied,
    /// The record's job id no longer matches; the write was dropped.
    Stale,
}

/// Trait for record storage backends.
pub trait RecordStore: Send + Sync {
    /// Create the record if missing and set its original URL.
    fn upsert_original(&self, owner_id: &str, original_url: &str) -> Result<(), RecordError>;

    /// Claim the record for a newly started job: sets `job_id`, marks the
    /// status `processing` and clears any previous result. Unguarded; the
    /// newest upload always wins.
    fn begin_transformation(
        &self,
        owner_id: &str,
        update: &TransformationUpdate,
    ) -> Result<(), RecordError>;

    /// Apply a terminal update, guarded by `job_id` equality. A mismatch
    /// means the job was superseded and the write is dropped.
    fn apply_transformation(
        &self,
        owner_id: &str,
        update: &TransformationUpdate,
    ) -> Result<UpdateOutcome, RecordError>;

    /// Fetch a record by owner.
    fn get(&self, owner_id: &str) -> Result<Option<ArtifactRecord>, RecordError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_update_carries_result_only_on_success() {
        let mut job = Job::started("job-1", "owner-1", "http://store/o/a.jpg");
        job.state = JobState::Succeeded;
        job.result_url = Some("http://store/o/aged.jpg".to_string());

        let update = TransformationUpdate::terminal(&job);
        assert_eq!(update.status, JobState::Succeeded);
        assert_eq!(update.result_url.as_deref(), Some("http://store/o/aged.jpg"));

        job.state = JobState::Failed;
        let update = TransformationUpdate::terminal(&job);
        assert_eq!(update.status, JobState::Failed);
        assert!(update.result_url.is_none());
    }

    #[test]
    fn test_started_update_clears_result() {
        let update = TransformationUpdate::started("job-2");
        assert_eq!(update.status, JobState::Processing);
        assert!(update.result_url.is_none());
    }
}
