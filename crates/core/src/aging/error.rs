//! Error types for the aging API client.

use thiserror::Error;

/// Errors produced by aging API calls.
#[derive(Debug, Error)]
pub enum AgingError {
    /// Client is missing required configuration.
    #[error("aging API not configured: {0}")]
    NotConfigured(String),

    /// The upstream rejected the request outright.
    #[error("aging API error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Upstream throttling. Retryable.
    #[error("aging API rate limit exceeded")]
    RateLimited,

    /// Network-level failure of the call itself. Retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be interpreted.
    #[error("failed to parse aging API response: {0}")]
    Parse(String),
}

impl AgingError {
    /// Whether a retry of the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AgingError::RateLimited | AgingError::Transport(_))
    }
}

impl From<reqwest::Error> for AgingError {
    fn from(e: reqwest::Error) -> Self {
        AgingError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AgingError::RateLimited.is_transient());
        assert!(AgingError::Transport("connection reset".into()).is_transient());
        assert!(!AgingError::Upstream {
            status: 400,
            message: "bad source url".into()
        }
        .is_transient());
        assert!(!AgingError::Parse("truncated body".into()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = AgingError::Upstream {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "aging API error (HTTP 502): bad gateway");
    }
}
