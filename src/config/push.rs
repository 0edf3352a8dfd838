//! Push channel configuration

use serde::{Deserialize, Serialize};

/// Push channel endpoint and reconnect behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// WebSocket URL of the metrics stream (e.g. "ws://localhost:8000/")
    pub url: String,
    /// How long `announce` waits for the first reply before closing
    pub announce_timeout_seconds: u64,
    /// Reconnect policy for dropped connections
    pub reconnect: ReconnectConfig,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/".to_string(),
            announce_timeout_seconds: 3,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Bounded exponential backoff settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// When false a dropped connection stays closed
    pub enabled: bool,
    /// Delay before the first retry
    pub initial_backoff_ms: u64,
    /// Upper bound for any single delay
    pub max_backoff_ms: u64,
    /// Growth factor applied after each failed attempt
    pub multiplier: f64,
    /// Consecutive failures before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            multiplier: 2.0,
            max_attempts: 5,
        }
    }
}
