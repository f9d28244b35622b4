//! Types shared by the aging client and the rest of the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of one transformation job.
///
/// `Processing` is the initial state; all others are terminal. Within one
/// job the state moves from `Processing` to exactly one terminal state and
/// never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Processing,
    Succeeded,
    Failed,
    TimedOut,
    Canceled,
}

impl JobState {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Processing)
    }

    /// Stable lowercase name, used for record persistence and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Processing => "processing",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::TimedOut => "timed_out",
            JobState::Canceled => "canceled",
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(JobState::Processing),
            "succeeded" => Ok(JobState::Succeeded),
            "failed" => Ok(JobState::Failed),
            "timed_out" => Ok(JobState::TimedOut),
            "canceled" => Ok(JobState::Canceled),
            other => Err(format!("unknown job state: {}", other)),
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a job as reported by the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusSnapshot {
    pub state: JobState,
    /// Present only when the upstream reports success.
    pub result_url: Option<String>,
    /// Upstream-provided failure detail, if any.
    pub error: Option<String>,
}

/// Parameters for a transformation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingParams {
    /// Target apparent age for the aged portrait.
    #[serde(default = "default_target_age")]
    pub target_age: u32,
}

fn default_target_age() -> u32 {
    70
}

impl Default for AgingParams {
    fn default() -> Self {
        Self {
            target_age: default_target_age(),
        }
    }
}

/// One transformation attempt, tracked by the poller from creation to a
/// terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Identifier assigned by the upstream API, unique per attempt.
    pub job_id: String,
    /// Record this upload belongs to.
    pub owner_id: String,
    /// Durable URL of the stored original. Immutable once set.
    pub source_url: String,
    pub state: JobState,
    /// Set iff `state == Succeeded`.
    pub result_url: Option<String>,
    /// Set when the job failed or timed out.
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a freshly started job in the `Processing` state.
    pub fn started(job_id: impl Into<String>, owner_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            owner_id: owner_id.into(),
            source_url: source_url.into(),
            state: JobState::Processing,
            result_url: None,
            error: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Processing.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::TimedOut.is_terminal());
        assert!(JobState::Canceled.is_terminal());
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            JobState::Processing,
            JobState::Succeeded,
            JobState::Failed,
            JobState::TimedOut,
            JobState::Canceled,
        ] {
            let parsed: JobState = state.as_str().parse().unwrap();
            assert_eq!(parsed, state);
        }
        assert!("done".parse::<JobState>().is_err());
    }

    #[test]
    fn test_started_job() {
        let job = Job::started("job-1", "owner-1", "http://store/owner-1/original_1.jpg");
        assert_eq!(job.state, JobState::Processing);
        assert!(job.result_url.is_none());
        assert!(job.ended_at.is_none());
    }

    #[test]
    fn test_default_params() {
        let params = AgingParams::default();
        assert_eq!(params.target_age, 70);
    }
}
