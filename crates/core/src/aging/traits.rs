//! Trait definition for the aging API client.

use async_trait::async_trait;

use super::error::AgingError;
use super::types::{AgingParams, JobStatusSnapshot};

/// A client for the external aging API.
///
/// Implementations are stateless mappings over one remote call each.
/// Retry and backoff are deliberately NOT implemented here; the poller
/// owns that policy, which keeps implementations trivially mockable.
#[async_trait]
pub trait AgingApi: Send + Sync {
    /// Returns the name of this client implementation.
    fn name(&self) -> &str;

    /// Requests a new transformation of the artifact at `source_url`.
    /// Returns the upstream-assigned job id.
    async fn create_job(&self, source_url: &str, params: &AgingParams) -> Result<String, AgingError>;

    /// Fetches the current status of a job.
    async fn get_job(&self, job_id: &str) -> Result<JobStatusSnapshot, AgingError>;

    /// Requests cancellation of a job. Advisory: errors are swallowed and
    /// logged, the upstream is not guaranteed to honor the request.
    async fn cancel_job(&self, job_id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aging::JobState;

    struct StaticApi;

    #[async_trait]
    impl AgingApi for StaticApi {
        fn name(&self) -> &str {
            "static"
        }

        async fn create_job(
            &self,
            _source_url: &str,
            _params: &AgingParams,
        ) -> Result<String, AgingError> {
            Ok("job-42".to_string())
        }

        async fn get_job(&self, _job_id: &str) -> Result<JobStatusSnapshot, AgingError> {
            Ok(JobStatusSnapshot {
                state: JobState::Succeeded,
                result_url: Some("http://results/42.jpg".to_string()),
                error: None,
            })
        }

        async fn cancel_job(&self, _job_id: &str) {}
    }

    #[tokio::test]
    async fn test_trait_object_usage() {
        let api: Box<dyn AgingApi> = Box::new(StaticApi);
        let job_id = api.create_job("http://store/a.jpg", &AgingParams::default()).await.unwrap();
        assert_eq!(job_id, "job-42");

        let status = api.get_job(&job_id).await.unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert!(status.result_url.is_some());
    }
}
