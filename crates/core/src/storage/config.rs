//! Storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the blob store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory artifacts are written under.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Public base URL under which the root is served
    /// (e.g. "http://localhost:8080/media").
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_public_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_base_url: default_public_base_url(),
        }
    }
}
