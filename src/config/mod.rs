//! Configuration module for Watchtower
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`WATCHTOWER_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use watchtower::config::WatchtowerConfig;
//!
//! let config = WatchtowerConfig::default();
//! assert_eq!(config.api.base_url, "http://localhost:8000");
//!
//! let toml = r#"
//! [dashboard]
//! window_capacity = 50
//! "#;
//! let config: WatchtowerConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.dashboard.window_capacity, 50);
//! ```

pub mod api;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod push;
pub mod session;

pub use api::ApiConfig;
pub use dashboard::{AggregateMode, DashboardConfig};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use push::{PushConfig, ReconnectConfig};
pub use session::SessionConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the Watchtower client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WatchtowerConfig {
    /// HTTP API of the monitoring server
    pub api: ApiConfig,
    /// Live metrics push channel
    pub push: PushConfig,
    /// Local identity storage
    pub session: SessionConfig,
    /// Service detail view settings
    pub dashboard: DashboardConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl WatchtowerConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("WATCHTOWER_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(url) = std::env::var("WATCHTOWER_PUSH_URL") {
            self.push.url = url;
        }
        if let Ok(path) = std::env::var("WATCHTOWER_SESSION") {
            self.session.path = path.into();
        }
        if let Ok(level) = std::env::var("WATCHTOWER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("WATCHTOWER_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        match reqwest::Url::parse(&self.api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::invalid(
                    "api.base_url",
                    format!("unsupported scheme '{}'", url.scheme()),
                ))
            }
            Err(e) => return Err(ConfigError::invalid("api.base_url", e.to_string())),
        }

        match reqwest::Url::parse(&self.push.url) {
            Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
            Ok(url) => {
                return Err(ConfigError::invalid(
                    "push.url",
                    format!("expected ws:// or wss://, got '{}'", url.scheme()),
                ))
            }
            Err(e) => return Err(ConfigError::invalid("push.url", e.to_string())),
        }

        if self.dashboard.window_capacity == 0 {
            return Err(ConfigError::invalid(
                "dashboard.window_capacity",
                "capacity must be at least 1",
            ));
        }

        let reconnect = &self.push.reconnect;
        if reconnect.max_backoff_ms < reconnect.initial_backoff_ms {
            return Err(ConfigError::invalid(
                "push.reconnect.max_backoff_ms",
                "must not be smaller than initial_backoff_ms",
            ));
        }
        if !(reconnect.multiplier >= 1.0) {
            return Err(ConfigError::invalid(
                "push.reconnect.multiplier",
                "must be >= 1.0",
            ));
        }

        Ok(())
    }
}
