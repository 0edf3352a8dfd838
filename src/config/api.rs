//! HTTP API client configuration

use serde::{Deserialize, Serialize};

/// Where the monitoring server's HTTP API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without trailing slash (e.g. "http://localhost:8000")
    pub base_url: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 10,
        }
    }
}
