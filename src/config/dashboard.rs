//! Live dashboard configuration

use serde::{Deserialize, Serialize};

/// How endpoint totals combine across push messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregateMode {
    /// Table reflects only the most recent message
    #[default]
    Latest,
    /// Each message's totals are added to the running table
    Cumulative,
}

/// Settings for the service detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Maximum points kept per chart series
    pub window_capacity: usize,
    pub aggregate: AggregateMode,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_capacity: 20,
            aggregate: AggregateMode::Latest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.window_capacity, 20);
        assert_eq!(config.aggregate, AggregateMode::Latest);
    }

    #[test]
    fn test_aggregate_mode_toml() {
        let config: DashboardConfig = toml::from_str(r#"aggregate = "cumulative""#).unwrap();
        assert_eq!(config.aggregate, AggregateMode::Cumulative);
        assert_eq!(config.window_capacity, 20);
    }
}
