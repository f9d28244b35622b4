//! Pipeline coordinator implementation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::aging::{AgingApi, AgingParams, Job, JobState};
use crate::events::{EventBus, PipelineEvent};
use crate::metrics;
use crate::poller::{JobPoller, PollerConfig, StatusMap};
use crate::record::{RecordStore, StatusSync};
use crate::storage::BlobStore;

use super::config::UploadConfig;
use super::types::{PhotoUpload, SubmitReceipt, UploadError};

/// Content types accepted for upload.
const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// The aging pipeline orchestrator.
///
/// One instance per process; every collaborator is held behind a trait so
/// the whole pipeline runs against mocks in tests.
pub struct AgingPipeline {
    upload_config: UploadConfig,
    params: AgingParams,
    storage: Arc<dyn BlobStore>,
    client: Arc<dyn AgingApi>,
    records: Arc<dyn RecordStore>,
    sync: StatusSync,
    events: Arc<EventBus>,
    statuses: StatusMap,
    poller: JobPoller,
    shutdown_tx: broadcast::Sender<()>,
}

impl AgingPipeline {
    /// Create a new pipeline.
    pub fn new(
        upload_config: UploadConfig,
        poller_config: PollerConfig,
        params: AgingParams,
        storage: Arc<dyn BlobStore>,
        client: Arc<dyn AgingApi>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let events = Arc::new(EventBus::default());
        let statuses: StatusMap = Arc::new(RwLock::new(HashMap::new()));
        let sync = StatusSync::new(Arc::clone(&records));

        let poller = JobPoller::new(
            poller_config,
            Arc::clone(&client),
            sync.clone(),
            Arc::clone(&events),
            Arc::clone(&statuses),
            shutdown_tx.clone(),
        );

        Self {
            upload_config,
            params,
            storage,
            client,
            records,
            sync,
            events,
            statuses,
            poller,
            shutdown_tx,
        }
    }

    /// Validate and store an upload, then start the aging transformation
    /// in the background.
    ///
    /// Returns as soon as the original is durably stored; never waits for
    /// the transformation. A failure to start the transformation does not
    /// fail the submission: the receipt then carries `job_id: None` and
    /// the caller still has a usable original.
    pub async fn submit(
        &self,
        upload: PhotoUpload,
        owner_id: &str,
    ) -> Result<SubmitReceipt, UploadError> {
        // Fail fast, before any network or disk I/O.
        if let Err(reason) = validate_upload(&upload, owner_id, self.upload_config.max_upload_bytes)
        {
            metrics::UPLOADS.with_label_values(&["invalid"]).inc();
            return Err(UploadError::InvalidInput { reason });
        }

        let key = object_key(owner_id, &upload.content_type);
        let original_url = match self.storage.upload(&key, &upload.bytes).await {
            Ok(url) => url,
            Err(e) => {
                metrics::UPLOADS.with_label_values(&["storage_error"]).inc();
                return Err(e.into());
            }
        };
        metrics::UPLOADS.with_label_values(&["accepted"]).inc();

        if let Err(e) = self.records.upsert_original(owner_id, &original_url) {
            warn!("failed to record original for owner {}: {}", owner_id, e);
        }

        let job_id = match self.client.create_job(&original_url, &self.params).await {
            Ok(job_id) => {
                metrics::JOBS_STARTED.inc();
                info!("started aging job {} for owner {}", job_id, owner_id);

                self.statuses
                    .write()
                    .await
                    .insert(job_id.clone(), JobState::Processing);
                self.sync.begin(owner_id, &job_id);

                self.poller
                    .spawn(Job::started(&job_id, owner_id, &original_url));

                Some(job_id)
            }
            Err(e) => {
                warn!(
                    "aging unavailable for owner {}, returning original only: {}",
                    owner_id, e
                );
                metrics::DEGRADED_SUBMITS.inc();
                None
            }
        };

        Ok(SubmitReceipt {
            original_url,
            job_id,
        })
    }

    /// Subscribe to pipeline events. Drop the receiver to detach.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Point-in-time state of a job, if it is still tracked.
    pub async fn job_status(&self, job_id: &str) -> Option<JobState> {
        self.statuses.read().await.get(job_id).copied()
    }

    /// Request cancellation of a job. Advisory: the poller keeps running
    /// until it observes a terminal state or its deadline fires.
    pub async fn cancel(&self, job_id: &str) {
        info!("cancel requested for job {}", job_id);
        self.client.cancel_job(job_id).await;
    }

    /// The poller, for callers that need to await a job directly instead
    /// of observing events.
    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Stop all background pollers. In-flight jobs are abandoned without
    /// terminal events; the pipeline makes no durability promise across
    /// restarts.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Check content type and size. Pure; no side effects on rejection.
fn validate_upload(upload: &PhotoUpload, owner_id: &str, max_bytes: u64) -> Result<(), String> {
    if owner_id.is_empty() || owner_id.contains('/') || owner_id.contains("..") {
        return Err(format!("invalid owner id: {:?}", owner_id));
    }

    if !ACCEPTED_CONTENT_TYPES.contains(&upload.content_type.as_str()) {
        return Err(format!(
            "unsupported content type {:?}, expected one of {:?}",
            upload.content_type, ACCEPTED_CONTENT_TYPES
        ));
    }

    if upload.bytes.is_empty() {
        return Err("empty upload".to_string());
    }

    if upload.bytes.len() as u64 > max_bytes {
        return Err(format!(
            "file size {} exceeds limit of {} bytes",
            upload.bytes.len(),
            max_bytes
        ));
    }

    Ok(())
}

/// Storage key for an original: owner-namespaced, timestamped.
fn object_key(owner_id: &str, content_type: &str) -> String {
    let ext = match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    };
    format!("{}/original_{}.{}", owner_id, Utc::now().timestamp_millis(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> PhotoUpload {
        PhotoUpload::new(vec![0u8; len], content_type)
    }

    #[test]
    fn test_validate_accepts_images_under_limit() {
        for ct in ["image/jpeg", "image/png", "image/webp"] {
            assert!(validate_upload(&upload(ct, 1024), "owner-1", 5 * 1024 * 1024).is_ok());
        }
    }

    #[test]
    fn test_validate_rejects_unsupported_type() {
        let result = validate_upload(&upload("application/pdf", 1024), "owner-1", 5 * 1024 * 1024);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_oversize() {
        let result = validate_upload(&upload("image/jpeg", 6 * 1024 * 1024), "owner-1", 5 * 1024 * 1024);
        assert!(result.unwrap_err().contains("exceeds limit"));
    }

    #[test]
    fn test_validate_rejects_bad_owner_ids() {
        for owner in ["", "a/b", ".."] {
            assert!(validate_upload(&upload("image/jpeg", 10), owner, 1024).is_err());
        }
    }

    #[test]
    fn test_object_key_shape() {
        let key = object_key("owner-1", "image/png");
        assert!(key.starts_with("owner-1/original_"));
        assert!(key.ends_with(".png"));
    }
}
