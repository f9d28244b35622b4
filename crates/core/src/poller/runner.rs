//! Job poller implementation.
//!
//! Drives one job from `processing` to a terminal state:
//! - poll the aging API on an interval
//! - retry transient transport failures against a bounded budget
//! - enforce the global per-job deadline
//! - on a terminal state: persist, emit exactly one event, retire

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::aging::{AgingApi, Job, JobState};
use crate::events::{EventBus, PipelineEvent};
use crate::metrics;
use crate::record::StatusSync;

use super::config::PollerConfig;
use super::types::PollerError;

/// Last-known job states, shared with the pipeline for status inspection.
/// Never used for control flow beyond the per-job terminal check-and-set.
pub type StatusMap = Arc<RwLock<HashMap<String, JobState>>>;

/// Polls transformation jobs until they reach a terminal state.
#[derive(Clone)]
pub struct JobPoller {
    config: PollerConfig,
    client: Arc<dyn AgingApi>,
    sync: StatusSync,
    events: Arc<EventBus>,
    statuses: StatusMap,
    shutdown_tx: broadcast::Sender<()>,
}

impl JobPoller {
    pub fn new(
        config: PollerConfig,
        client: Arc<dyn AgingApi>,
        sync: StatusSync,
        events: Arc<EventBus>,
        statuses: StatusMap,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        Self {
            config,
            client,
            sync,
            events,
            statuses,
            shutdown_tx,
        }
    }

    /// Spawn a detached task that drives `job` to a terminal state.
    ///
    /// Fire-and-forget: outcomes surface through the event bus and the
    /// record store, never to the spawning caller.
    pub fn spawn(&self, job: Job) {
        let poller = self.clone();
        tokio::spawn(async move {
            match poller.run(job).await {
                Ok(state) => {
                    debug!("poller finished with state {}", state);
                }
                Err(PollerError::ShuttingDown) => {}
                Err(e) => {
                    warn!("poller ended with error: {}", e);
                }
            }
        });
    }

    /// Poll `job` until it reaches a terminal state.
    ///
    /// Returns the terminal state, or [`PollerError::Timeout`] when the
    /// global deadline passed first. In the timeout case the job has
    /// already been persisted and emitted as timed out before the error
    /// is returned; the error exists so awaiting callers get a
    /// distinguishable signal.
    pub async fn run(&self, mut job: Job) -> Result<JobState, PollerError> {
        let started = Instant::now();
        let deadline = started + Duration::from_secs(self.config.max_poll_duration_secs);
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut retries_remaining = self.config.max_transient_retries;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            // A concurrent poller for the same job may have finished it.
            {
                let statuses = self.statuses.read().await;
                if let Some(state) = statuses.get(&job.job_id) {
                    if state.is_terminal() {
                        debug!("job {} already terminal, poller exiting", job.job_id);
                        return Ok(*state);
                    }
                }
            }

            if Instant::now() >= deadline {
                job.error = Some(format!(
                    "no terminal state within {}s",
                    self.config.max_poll_duration_secs
                ));
                self.finish(&mut job, JobState::TimedOut).await;
                return Err(PollerError::Timeout {
                    job_id: job.job_id.clone(),
                    elapsed_secs: started.elapsed().as_secs(),
                });
            }

            match self.client.get_job(&job.job_id).await {
                Ok(snapshot) if snapshot.state.is_terminal() => {
                    let final_state = match snapshot.state {
                        // Success without output is not success.
                        JobState::Succeeded if snapshot.result_url.is_none() => {
                            job.error =
                                Some("upstream reported success without a result".to_string());
                            JobState::Failed
                        }
                        JobState::Succeeded => {
                            job.result_url = snapshot.result_url;
                            JobState::Succeeded
                        }
                        other => {
                            job.error = snapshot.error;
                            other
                        }
                    };
                    self.finish(&mut job, final_state).await;
                    return Ok(final_state);
                }
                Ok(_) => {
                    debug!("job {} still processing", job.job_id);
                }
                Err(e) if e.is_transient() && retries_remaining > 0 => {
                    retries_remaining -= 1;
                    metrics::POLL_TRANSIENT_RETRIES.inc();
                    debug!(
                        "transient poll failure for job {} ({} retries left): {}",
                        job.job_id, retries_remaining, e
                    );
                }
                Err(e) => {
                    job.error = Some(e.to_string());
                    self.finish(&mut job, JobState::Failed).await;
                    return Ok(JobState::Failed);
                }
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("poller for job {} stopping on shutdown", job.job_id);
                    return Err(PollerError::ShuttingDown);
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Transition a job to a terminal state: check-and-set the shared
    /// status, persist, emit, then schedule retirement.
    ///
    /// Idempotent; the first caller to mark the job terminal wins, any
    /// other does nothing.
    async fn finish(&self, job: &mut Job, state: JobState) {
        {
            let mut statuses = self.statuses.write().await;
            match statuses.get(&job.job_id) {
                Some(existing) if existing.is_terminal() => {
                    debug!(
                        "job {} already finished as {}, skipping transition to {}",
                        job.job_id, existing, state
                    );
                    return;
                }
                _ => {
                    statuses.insert(job.job_id.clone(), state);
                }
            }
        }

        job.state = state;
        job.ended_at = Some(Utc::now());

        info!("job {} for owner {} finished: {}", job.job_id, job.owner_id, state);

        // Persistence is best-effort; emission is the primary signal and
        // must happen regardless.
        self.sync.persist(&job.owner_id, job);

        let event = match state {
            JobState::Succeeded => PipelineEvent::TransformationComplete {
                job_id: job.job_id.clone(),
                source_url: job.source_url.clone(),
                // A Succeeded final state always carries a result here.
                result_url: job.result_url.clone().unwrap_or_default(),
            },
            _ => PipelineEvent::TransformationFailed {
                job_id: job.job_id.clone(),
                source_url: job.source_url.clone(),
                fallback_url: job.source_url.clone(),
                error: job.error.clone().or_else(|| match state {
                    JobState::Canceled => Some("canceled upstream".to_string()),
                    _ => None,
                }),
            },
        };
        self.events.emit(event);

        metrics::JOBS_FINISHED.with_label_values(&[state.as_str()]).inc();
        metrics::JOB_DURATION
            .with_label_values(&[state.as_str()])
            .observe((Utc::now() - job.started_at).num_milliseconds().max(0) as f64 / 1000.0);

        self.schedule_retirement(job.job_id.clone());
    }

    /// Drop the job from in-memory tracking once consumers have had a
    /// window to observe its terminal state.
    fn schedule_retirement(&self, job_id: String) {
        let statuses = Arc::clone(&self.statuses);
        let delay = Duration::from_millis(self.config.retire_after_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            statuses.write().await.remove(&job_id);
            debug!("retired job {}", job_id);
        });
    }
}
