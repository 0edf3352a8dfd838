//! Folding push frames into chart series and the endpoint table.

use chrono::Local;
use serde::Serialize;

use super::aggregate::EndpointTable;
use super::message::{PushMessage, SeriesKind};
use super::window::RollingWindow;
use super::IngestError;
use crate::config::{AggregateMode, DashboardConfig};

/// Time format used for chart x-axis labels.
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Local wall-clock time the frame was received
    pub time: String,
    pub value: f64,
}

/// What a single frame did to the live state.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Metrics frame applied. The table is always rebuilt (or merged).
    Applied { active_users: bool, memory_usage: bool },
    /// Server reported it could not scrape the target; state untouched
    ServerError(String),
    /// Valid JSON without metrics; state untouched
    Ignored,
}

/// Derived state of the service detail view.
#[derive(Debug, Clone)]
pub struct LiveMetrics {
    active_users: RollingWindow<ChartPoint>,
    memory_usage: RollingWindow<ChartPoint>,
    endpoints: EndpointTable,
    mode: AggregateMode,
    frames_applied: u64,
}

impl LiveMetrics {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            active_users: RollingWindow::new(config.window_capacity),
            memory_usage: RollingWindow::new(config.window_capacity),
            endpoints: EndpointTable::new(),
            mode: config.aggregate,
            frames_applied: 0,
        }
    }

    /// Parses and applies a raw frame, timestamped now.
    ///
    /// Malformed frames are logged and leave every series unchanged.
    pub fn ingest_frame(&mut self, frame: &str) -> Result<IngestOutcome, IngestError> {
        let message = match PushMessage::parse(frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, frame_len = frame.len(), "Dropping malformed push frame");
                return Err(e);
            }
        };
        let now = Local::now().format(TIME_FORMAT).to_string();
        Ok(self.apply(&message, &now))
    }

    /// Applies an already-decoded message using `time` as the point label.
    pub fn apply(&mut self, message: &PushMessage, time: &str) -> IngestOutcome {
        if let Some(error) = &message.error {
            tracing::warn!(error = %error, "Server could not collect metrics");
            return IngestOutcome::ServerError(error.clone());
        }
        let Some(metrics) = &message.metrics else {
            tracing::debug!("Push frame without metrics, ignoring");
            return IngestOutcome::Ignored;
        };

        let mut active_users = false;
        let mut memory_usage = false;
        if let Some(other) = &metrics.other {
            if let Some(sample) = SeriesKind::ActiveUsers.select(other) {
                self.active_users.push(ChartPoint {
                    time: time.to_string(),
                    value: sample.value,
                });
                active_users = true;
            }
            if let Some(sample) = SeriesKind::MemoryUsage.select(other) {
                self.memory_usage.push(ChartPoint {
                    time: time.to_string(),
                    value: sample.value,
                });
                memory_usage = true;
            }
        }

        let fresh = EndpointTable::from_samples(
            metrics.requests.as_deref().unwrap_or_default(),
            metrics.errors.as_deref().unwrap_or_default(),
        );
        match self.mode {
            AggregateMode::Latest => self.endpoints = fresh,
            AggregateMode::Cumulative => self.endpoints.merge(&fresh),
        }

        self.frames_applied += 1;
        tracing::trace!(
            active_users,
            memory_usage,
            endpoints = self.endpoints.len(),
            "Applied push frame"
        );
        IngestOutcome::Applied {
            active_users,
            memory_usage,
        }
    }

    pub fn series(&self, kind: SeriesKind) -> &RollingWindow<ChartPoint> {
        match kind {
            SeriesKind::ActiveUsers => &self.active_users,
            SeriesKind::MemoryUsage => &self.memory_usage,
        }
    }

    pub fn active_users(&self) -> &RollingWindow<ChartPoint> {
        &self.active_users
    }

    pub fn memory_usage(&self) -> &RollingWindow<ChartPoint> {
        &self.memory_usage
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn mode(&self) -> AggregateMode {
        self.mode
    }

    /// Number of metrics frames applied so far.
    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }

    /// Drops all series and the table, keeping capacity and mode.
    pub fn reset(&mut self) {
        self.active_users.clear();
        self.memory_usage.clear();
        self.endpoints = EndpointTable::new();
        self.frames_applied = 0;
    }

    /// Serializable view for JSON output.
    pub fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            active_users: self.active_users.to_vec(),
            memory_usage: self.memory_usage.to_vec(),
            endpoints: self.endpoints.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSnapshot {
    pub active_users: Vec<ChartPoint>,
    pub memory_usage: Vec<ChartPoint>,
    pub endpoints: EndpointTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn live() -> LiveMetrics {
        LiveMetrics::new(&DashboardConfig::default())
    }

    fn frame(value: serde_json::Value) -> String {
        value.to_string()
    }

    #[test]
    fn test_active_users_point_added() {
        let mut live = live();
        let outcome = live
            .ingest_frame(&frame(json!({
                "metrics": {"other": [{"name": "Active_Users", "value": 42}]}
            })))
            .unwrap();

        assert_eq!(
            outcome,
            IngestOutcome::Applied {
                active_users: true,
                memory_usage: false
            }
        );
        assert_eq!(live.active_users().len(), 1);
        assert_eq!(live.active_users().latest().unwrap().value, 42.0);
        assert!(live.memory_usage().is_empty());
    }

    #[test]
    fn test_point_timestamp_is_local_time() {
        let mut live = live();
        live.ingest_frame(&frame(json!({
            "metrics": {"other": [{"name": "memory_usage_mb", "value": 12.5}]}
        })))
        .unwrap();

        let time = &live.memory_usage().latest().unwrap().time;
        assert!(chrono::NaiveTime::parse_from_str(time, TIME_FORMAT).is_ok());
    }

    #[test]
    fn test_one_point_per_kind_per_message() {
        let mut live = live();
        live.ingest_frame(&frame(json!({
            "metrics": {"other": [
                {"name": "active_users", "value": 1},
                {"name": "active_sessions", "value": 2},
                {"name": "memory_usage_mb", "value": 3},
                {"name": "memory_rss", "value": 4}
            ]}
        })))
        .unwrap();

        assert_eq!(live.active_users().to_vec()[0].value, 1.0);
        assert_eq!(live.memory_usage().to_vec()[0].value, 3.0);
        assert_eq!(live.active_users().len(), 1);
        assert_eq!(live.memory_usage().len(), 1);
    }

    #[test]
    fn test_window_capped_at_twenty() {
        let mut live = live();
        for i in 0..25 {
            live.apply(
                &PushMessage::parse(&frame(json!({
                    "metrics": {"other": [{"name": "active_users", "value": i}]}
                })))
                .unwrap(),
                &format!("t{}", i),
            );
        }

        let points = live.active_users().to_vec();
        assert_eq!(points.len(), 20);
        assert_eq!(points[0].time, "t5");
        assert_eq!(points[19].time, "t24");
    }

    #[test]
    fn test_missing_other_leaves_charts_unchanged() {
        let mut live = live();
        live.ingest_frame(&frame(json!({
            "metrics": {"other": [{"name": "active_users", "value": 5}, {"name": "memory", "value": 6}]}
        })))
        .unwrap();
        let before = (live.active_users().clone(), live.memory_usage().clone());

        let outcome = live
            .ingest_frame(&frame(json!({
                "metrics": {"requests": [{"endpoint": "/a", "value": 1}]}
            })))
            .unwrap();

        assert_eq!(
            outcome,
            IngestOutcome::Applied {
                active_users: false,
                memory_usage: false
            }
        );
        assert_eq!(live.active_users(), &before.0);
        assert_eq!(live.memory_usage(), &before.1);
        assert_eq!(live.endpoints().get("/a").unwrap().request_count, 1.0);
    }

    #[test]
    fn test_table_recomputed_fresh_each_message() {
        let mut live = live();
        live.ingest_frame(&frame(json!({
            "metrics": {
                "requests": [{"endpoint": "/old", "value": 100}],
                "errors": [{"endpoint": "/a", "value": 9}]
            }
        })))
        .unwrap();

        live.ingest_frame(&frame(json!({
            "metrics": {
                "requests": [{"endpoint": "/a", "value": 3}],
                "errors": [{"endpoint": "/a", "value": 1}, {"endpoint": "/b", "value": 2}]
            }
        })))
        .unwrap();

        assert_eq!(
            serde_json::to_value(live.endpoints()).unwrap(),
            json!([
                {"endpoint": "/a", "requestCount": 3.0, "errorCount": 1.0},
                {"endpoint": "/b", "requestCount": 0.0, "errorCount": 2.0}
            ])
        );
    }

    #[test]
    fn test_cumulative_mode_merges() {
        let config = DashboardConfig {
            aggregate: AggregateMode::Cumulative,
            ..DashboardConfig::default()
        };
        let mut live = LiveMetrics::new(&config);
        let msg = frame(json!({"metrics": {"requests": [{"endpoint": "/a", "value": 3}]}}));
        live.ingest_frame(&msg).unwrap();
        live.ingest_frame(&msg).unwrap();

        assert_eq!(live.endpoints().get("/a").unwrap().request_count, 6.0);
    }

    #[test]
    fn test_malformed_frame_leaves_state_unchanged() {
        let mut live = live();
        live.ingest_frame(&frame(json!({
            "metrics": {
                "other": [{"name": "active_users", "value": 5}],
                "requests": [{"endpoint": "/a", "value": 1}]
            }
        })))
        .unwrap();
        let before = live.snapshot();

        let result = live.ingest_frame("{\"metrics\": ");
        assert!(matches!(result, Err(IngestError::Malformed(_))));
        assert_eq!(live.snapshot(), before);
        assert_eq!(live.frames_applied(), 1);
    }

    #[test]
    fn test_server_error_frame_leaves_state_unchanged() {
        let mut live = live();
        live.ingest_frame(&frame(json!({
            "metrics": {"requests": [{"endpoint": "/a", "value": 1}]}
        })))
        .unwrap();
        let before = live.snapshot();

        let outcome = live
            .ingest_frame(r#"{"error": "All connection attempts failed"}"#)
            .unwrap();
        assert_eq!(
            outcome,
            IngestOutcome::ServerError("All connection attempts failed".to_string())
        );
        assert_eq!(live.snapshot(), before);
    }

    #[test]
    fn test_frame_without_metrics_ignored() {
        let mut live = live();
        assert_eq!(
            live.ingest_frame(r#"{"time": 3}"#).unwrap(),
            IngestOutcome::Ignored
        );
        assert_eq!(live.frames_applied(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut live = live();
        live.ingest_frame(&frame(json!({
            "metrics": {"other": [{"name": "active_users", "value": 5}], "requests": [{"endpoint": "/a", "value": 1}]}
        })))
        .unwrap();

        live.reset();
        assert!(live.active_users().is_empty());
        assert!(live.endpoints().is_empty());
        assert_eq!(live.active_users().capacity(), 20);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Every matching message adds exactly one point; the series
            /// holds the most recent 20 in arrival order.
            #[test]
            fn prop_active_series_holds_latest_twenty(values in proptest::collection::vec(0u32..10_000, 1..60)) {
                let mut live = live();
                for (i, v) in values.iter().enumerate() {
                    let before = live.active_users().len();
                    let msg = PushMessage::parse(&frame(json!({
                        "metrics": {"other": [{"name": "active_users", "value": v}]}
                    }))).unwrap();
                    live.apply(&msg, &i.to_string());
                    prop_assert_eq!(live.active_users().len(), (before + 1).min(20));
                }

                let kept: Vec<f64> = live.active_users().iter().map(|p| p.value).collect();
                let start = values.len().saturating_sub(20);
                let expected: Vec<f64> = values[start..].iter().map(|v| *v as f64).collect();
                prop_assert_eq!(kept, expected);
            }
        }
    }
}
