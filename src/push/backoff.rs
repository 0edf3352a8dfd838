//! Bounded exponential backoff for push-channel reconnects.

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use std::time::Duration;

use crate::config::ReconnectConfig;

/// Reconnect schedule. Each call to [`delays`](Self::delays) starts a fresh
/// run of at most `max_attempts` delays.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    builder: ExponentialBuilder,
    max_attempts: usize,
}

impl BackoffPolicy {
    pub fn new(initial: Duration, max: Duration, multiplier: f32, max_attempts: usize) -> Self {
        let builder = ExponentialBuilder::default()
            .with_min_delay(initial)
            .with_max_delay(max.max(initial))
            .with_factor(multiplier.max(1.0))
            .with_max_times(max_attempts);
        Self {
            builder,
            max_attempts,
        }
    }

    /// Never retry.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 1.0, 0)
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self::new(
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            config.multiplier as f32,
            config.max_attempts as usize,
        )
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// A fresh delay schedule; yields `None` once the budget is spent.
    pub fn delays(&self) -> ExponentialBackoff {
        self.builder.build()
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}
