//! Best-effort persistence of job state transitions.

use std::sync::Arc;

use tracing::{debug, warn};

use super::store::{RecordStore, TransformationUpdate, UpdateOutcome};
use crate::aging::Job;

/// Writes job-state transitions into the owner's artifact record.
///
/// Persistence is best-effort relative to event emission: failures are
/// logged and never propagate, so they cannot mask or delay the in-memory
/// notification consumers rely on.
#[derive(Clone)]
pub struct StatusSync {
    store: Arc<dyn RecordStore>,
}

impl StatusSync {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Claim the owner's record for a newly started job.
    pub fn begin(&self, owner_id: &str, job_id: &str) {
        if let Err(e) = self
            .store
            .begin_transformation(owner_id, &TransformationUpdate::started(job_id))
        {
            warn!(
                "failed to claim record for owner {} (job {}): {}",
                owner_id, job_id, e
            );
        }
    }

    /// Persist a terminal job state. Stale writes (the record was claimed
    /// by a newer job) are dropped by the store.
    pub fn persist(&self, owner_id: &str, job: &Job) {
        let update = TransformationUpdate::terminal(job);
        match self.store.apply_transformation(owner_id, &update) {
            Ok(UpdateOutcome::Applied) => {
                debug!(
                    "persisted job {} for owner {} as {}",
                    job.job_id, owner_id, job.state
                );
            }
            Ok(UpdateOutcome::Stale) => {
                debug!(
                    "dropped stale persistence write for job {} (owner {} moved on)",
                    job.job_id, owner_id
                );
            }
            Err(e) => {
                warn!(
                    "failed to persist job {} for owner {}: {}",
                    job.job_id, owner_id, e
                );
            }
        }
    }
}
