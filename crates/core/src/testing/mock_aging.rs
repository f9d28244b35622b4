//! Mock aging API for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::aging::{AgingApi, AgingError, AgingParams, JobState, JobStatusSnapshot};

/// A recorded job creation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCreate {
    pub job_id: String,
    pub source_url: String,
    pub target_age: u32,
}

/// Mock implementation of the [`AgingApi`] trait.
///
/// Provides controllable behavior for testing:
/// - job ids assigned from a counter (`job-1`, `job-2`, ...)
/// - per-job scripted status sequences
/// - next-operation error injection
/// - recorded creates and cancels for assertions
pub struct MockAgingApi {
    counter: AtomicU64,
    creates: Arc<RwLock<Vec<RecordedCreate>>>,
    cancels: Arc<RwLock<Vec<String>>>,
    /// Scripted `get_job` outcomes per job id, consumed front to back.
    scripts: Arc<RwLock<HashMap<String, VecDeque<Result<JobStatusSnapshot, AgingError>>>>>,
    /// Returned when a job's script is exhausted or absent.
    default_status: Arc<RwLock<JobStatusSnapshot>>,
    next_create_error: Arc<RwLock<Option<AgingError>>>,
    create_delay: Arc<RwLock<Duration>>,
}

impl Default for MockAgingApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAgingApi {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            creates: Arc::new(RwLock::new(Vec::new())),
            cancels: Arc::new(RwLock::new(Vec::new())),
            scripts: Arc::new(RwLock::new(HashMap::new())),
            default_status: Arc::new(RwLock::new(JobStatusSnapshot {
                state: JobState::Processing,
                result_url: None,
                error: None,
            })),
            next_create_error: Arc::new(RwLock::new(None)),
            create_delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// The job id the next `create_job` call will return.
    pub fn next_job_id(&self) -> String {
        format!("job-{}", self.counter.load(Ordering::SeqCst) + 1)
    }

    /// Script the `get_job` outcomes for a job, consumed in order.
    pub async fn enqueue_statuses(
        &self,
        job_id: &str,
        outcomes: Vec<Result<JobStatusSnapshot, AgingError>>,
    ) {
        let mut scripts = self.scripts.write().await;
        scripts
            .entry(job_id.to_string())
            .or_default()
            .extend(outcomes);
    }

    /// Set the status returned once a job's script is exhausted.
    pub async fn set_default_status(&self, status: JobStatusSnapshot) {
        *self.default_status.write().await = status;
    }

    /// Configure the next `create_job` call to fail.
    pub async fn fail_next_create(&self, error: AgingError) {
        *self.next_create_error.write().await = Some(error);
    }

    /// Simulate a slow create call.
    pub async fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.write().await = delay;
    }

    /// All recorded job creations.
    pub async fn recorded_creates(&self) -> Vec<RecordedCreate> {
        self.creates.read().await.clone()
    }

    /// Job ids cancellation was requested for.
    pub async fn recorded_cancels(&self) -> Vec<String> {
        self.cancels.read().await.clone()
    }

    /// Shorthand: a processing snapshot.
    pub fn processing() -> JobStatusSnapshot {
        JobStatusSnapshot {
            state: JobState::Processing,
            result_url: None,
            error: None,
        }
    }

    /// Shorthand: a succeeded snapshot with the given result.
    pub fn succeeded(result_url: &str) -> JobStatusSnapshot {
        JobStatusSnapshot {
            state: JobState::Succeeded,
            result_url: Some(result_url.to_string()),
            error: None,
        }
    }

    /// Shorthand: a failed snapshot with the given error.
    pub fn failed(error: &str) -> JobStatusSnapshot {
        JobStatusSnapshot {
            state: JobState::Failed,
            result_url: None,
            error: Some(error.to_string()),
        }
    }

    /// Shorthand: a canceled snapshot.
    pub fn canceled() -> JobStatusSnapshot {
        JobStatusSnapshot {
            state: JobState::Canceled,
            result_url: None,
            error: None,
        }
    }
}

#[async_trait]
impl AgingApi for MockAgingApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_job(
        &self,
        source_url: &str,
        params: &AgingParams,
    ) -> Result<String, AgingError> {
        let delay = *self.create_delay.read().await;
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_create_error.write().await.take() {
            return Err(error);
        }

        let job_id = format!("job-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1);
        self.creates.write().await.push(RecordedCreate {
            job_id: job_id.clone(),
            source_url: source_url.to_string(),
            target_age: params.target_age,
        });
        Ok(job_id)
    }

    async fn get_job(&self, job_id: &str) -> Result<JobStatusSnapshot, AgingError> {
        {
            let mut scripts = self.scripts.write().await;
            if let Some(queue) = scripts.get_mut(job_id) {
                if let Some(outcome) = queue.pop_front() {
                    return outcome;
                }
            }
        }
        Ok(self.default_status.read().await.clone())
    }

    async fn cancel_job(&self, job_id: &str) {
        self.cancels.write().await.push(job_id.to_string());
    }
}
