//! HTTP client for the hosted aging API.
//!
//! The upstream exposes a small job-oriented REST surface:
//! `POST /jobs` to create, `GET /jobs/{id}` to poll, `DELETE /jobs/{id}`
//! to request cancellation. Authentication is a bearer API key held by
//! the server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::AgingApiConfig;
use super::error::AgingError;
use super::traits::AgingApi;
use super::types::{AgingParams, JobState, JobStatusSnapshot};

/// Production aging API client.
pub struct HttpAgingClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpAgingClient {
    /// Create a new client from configuration.
    pub fn new(config: AgingApiConfig) -> Result<Self, AgingError> {
        if config.api_key.is_empty() {
            return Err(AgingError::NotConfigured(
                "aging API key is required".to_string(),
            ));
        }
        if config.base_url.is_empty() {
            return Err(AgingError::NotConfigured(
                "aging API base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }
}

#[async_trait]
impl AgingApi for HttpAgingClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn create_job(
        &self,
        source_url: &str,
        params: &AgingParams,
    ) -> Result<String, AgingError> {
        let url = format!("{}/jobs", self.base_url);

        debug!("aging create: source_url='{}'", source_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CreateJobRequest {
                source_url,
                target_age: params.target_age,
            })
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            return Err(AgingError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgingError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: CreateJobResponse = response.json().await.map_err(|e| {
            AgingError::Parse(format!("failed to parse create response: {}", e))
        })?;

        if created.job_id.is_empty() {
            return Err(AgingError::Parse("create response missing job id".to_string()));
        }

        Ok(created.job_id)
    }

    async fn get_job(&self, job_id: &str) -> Result<JobStatusSnapshot, AgingError> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);

        debug!("aging get: job_id='{}'", job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            return Err(AgingError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgingError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let job: JobResponse = response.json().await.map_err(|e| {
            AgingError::Parse(format!("failed to parse job response: {}", e))
        })?;

        job.try_into()
    }

    async fn cancel_job(&self, job_id: &str) {
        let url = format!("{}/jobs/{}", self.base_url, job_id);

        debug!("aging cancel: job_id='{}'", job_id);

        match self.client.delete(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    "aging cancel for job {} returned HTTP {}",
                    job_id,
                    response.status()
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!("aging cancel for job {} failed: {}", job_id, e);
            }
        }
    }
}

// ============================================================================
// Upstream API request/response types (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct CreateJobRequest<'a> {
    source_url: &'a str,
    target_age: u32,
}

#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    status: String,
    #[serde(default)]
    result_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<JobResponse> for JobStatusSnapshot {
    type Error = AgingError;

    fn try_from(r: JobResponse) -> Result<Self, AgingError> {
        let state = match r.status.as_str() {
            // The upstream distinguishes queued from processing; the
            // pipeline does not.
            "queued" | "processing" => JobState::Processing,
            "succeeded" => JobState::Succeeded,
            "failed" => JobState::Failed,
            "canceled" => JobState::Canceled,
            other => {
                return Err(AgingError::Parse(format!(
                    "unknown upstream job status: {}",
                    other
                )))
            }
        };

        Ok(JobStatusSnapshot {
            state,
            result_url: r.result_url.filter(|u| !u.is_empty()),
            error: r.error,
        })
    }
}
