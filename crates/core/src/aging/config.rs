//! Aging API client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the external aging API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingApiConfig {
    /// Base URL of the aging service (e.g. "https://api.agify.example/v1").
    pub base_url: String,
    /// Server-held API key. Never exposed to pipeline callers.
    pub api_key: String,
    /// Per-request transport timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Default transformation parameters.
    #[serde(default)]
    pub params: super::AgingParams,
}

fn default_timeout() -> u64 {
    10
}
