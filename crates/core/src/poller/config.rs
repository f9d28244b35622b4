//! Poller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the job poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Pause between status polls (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Global bound on one job's polling lifetime (seconds). A job with
    /// no terminal state by then is timed out.
    #[serde(default = "default_max_poll_duration")]
    pub max_poll_duration_secs: u64,

    /// Transient poll-call failures tolerated before the job is failed.
    #[serde(default = "default_max_transient_retries")]
    pub max_transient_retries: u32,

    /// How long a finished job stays visible to status lookups before it
    /// is dropped from in-memory tracking (milliseconds).
    #[serde(default = "default_retire_after")]
    pub retire_after_ms: u64,
}

fn default_poll_interval() -> u64 {
    2000 // 2 seconds
}

fn default_max_poll_duration() -> u64 {
    30
}

fn default_max_transient_retries() -> u32 {
    3
}

fn default_retire_after() -> u64 {
    60_000 // 1 minute
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            max_poll_duration_secs: default_max_poll_duration(),
            max_transient_retries: default_max_transient_retries(),
            retire_after_ms: default_retire_after(),
        }
    }
}
