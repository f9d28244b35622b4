//! Types for the job poller.

use thiserror::Error;

/// Errors surfaced to callers that await a poller directly.
///
/// Fire-and-forget callers never see these; they observe terminal
/// outcomes through the event bus instead.
#[derive(Debug, Error)]
pub enum PollerError {
    /// The global polling deadline passed without a terminal state.
    /// The job has already been persisted and emitted as timed out.
    #[error("job {job_id} did not reach a terminal state within {elapsed_secs}s")]
    Timeout { job_id: String, elapsed_secs: u64 },

    /// The pipeline is shutting down; polling stopped without a terminal
    /// state.
    #[error("polling stopped by shutdown")]
    ShuttingDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = PollerError::Timeout {
            job_id: "job-7".to_string(),
            elapsed_secs: 30,
        };
        assert_eq!(
            err.to_string(),
            "job job-7 did not reach a terminal state within 30s"
        );
    }
}
