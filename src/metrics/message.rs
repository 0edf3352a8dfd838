//! Push message wire format.
//!
//! Frames look like
//! `{"time": 12, "metrics": {"other": [...], "requests": [...], "errors": [...]}}`
//! or, when the server could not scrape the target, `{"error": "..."}`.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::IngestError;

/// One decoded push frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PushMessage {
    /// Server-side event-loop seconds; informational only
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub metrics: Option<MetricsPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PushMessage {
    pub fn parse(frame: &str) -> Result<Self, IngestError> {
        serde_json::from_str(frame).map_err(|e| IngestError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricsPayload {
    /// Gauges and anything not classified as a request or error counter
    #[serde(default)]
    pub other: Option<Vec<GaugeSample>>,
    #[serde(default)]
    pub requests: Option<Vec<EndpointSample>>,
    #[serde(default)]
    pub errors: Option<Vec<EndpointSample>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GaugeSample {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndpointSample {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    pub value: f64,
}

impl EndpointSample {
    pub fn new(endpoint: Option<&str>, value: f64) -> Self {
        Self {
            endpoint: endpoint.map(str::to_string),
            method: None,
            value,
        }
    }
}

/// Which chart a gauge sample feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    ActiveUsers,
    MemoryUsage,
}

impl SeriesKind {
    fn needle(self) -> &'static str {
        match self {
            SeriesKind::ActiveUsers => "active",
            SeriesKind::MemoryUsage => "memory",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SeriesKind::ActiveUsers => "Active Users",
            SeriesKind::MemoryUsage => "Memory Usage (MB)",
        }
    }

    /// First sample whose name contains this kind's keyword, ignoring case.
    pub fn select(self, samples: &[GaugeSample]) -> Option<&GaugeSample> {
        let needle = self.needle();
        samples
            .iter()
            .find(|s| s.name.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge(name: &str, value: f64) -> GaugeSample {
        GaugeSample {
            name: name.to_string(),
            value,
            labels: BTreeMap::new(),
        }
    }

    #[test]
    fn test_parse_full_frame() {
        let frame = r#"{
            "time": 1234,
            "metrics": {
                "requests": [{"endpoint": "/health", "method": "GET", "value": 10.0}],
                "errors": [{"endpoint": "/health", "value": 1.0}],
                "other": [{"name": "active_users", "labels": {}, "value": 55.0}]
            }
        }"#;

        let msg = PushMessage::parse(frame).unwrap();
        let metrics = msg.metrics.unwrap();
        assert_eq!(msg.time, Some(1234));
        assert_eq!(metrics.requests.unwrap()[0].method.as_deref(), Some("GET"));
        assert_eq!(metrics.other.unwrap()[0].value, 55.0);
    }

    #[test]
    fn test_parse_null_endpoint() {
        let msg = PushMessage::parse(
            r#"{"metrics": {"requests": [{"endpoint": null, "value": 2}]}}"#,
        )
        .unwrap();
        let requests = msg.metrics.unwrap().requests.unwrap();
        assert!(requests[0].endpoint.is_none());
    }

    #[test]
    fn test_parse_error_frame() {
        let msg = PushMessage::parse(r#"{"error": "connection refused"}"#).unwrap();
        assert_eq!(msg.error.as_deref(), Some("connection refused"));
        assert!(msg.metrics.is_none());
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        assert!(matches!(
            PushMessage::parse("not json"),
            Err(IngestError::Malformed(_))
        ));
        assert!(matches!(
            PushMessage::parse(r#"{"metrics": {"other": "nope"}}"#),
            Err(IngestError::Malformed(_))
        ));
    }

    #[test]
    fn test_select_is_case_insensitive_first_match() {
        let samples = vec![
            gauge("process_cpu_seconds", 1.0),
            gauge("ACTIVE_USERS", 40.0),
            gauge("inactive_sessions", 3.0),
            gauge("memory_usage_mb", 120.5),
        ];

        assert_eq!(SeriesKind::ActiveUsers.select(&samples).unwrap().value, 40.0);
        assert_eq!(SeriesKind::MemoryUsage.select(&samples).unwrap().value, 120.5);
    }

    #[test]
    fn test_select_no_match() {
        let samples = vec![gauge("process_cpu_seconds", 1.0)];
        assert!(SeriesKind::ActiveUsers.select(&samples).is_none());
        assert!(SeriesKind::MemoryUsage.select(&[]).is_none());
    }
}
