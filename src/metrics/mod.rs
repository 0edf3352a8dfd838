//! Live metrics ingestion.
//!
//! Push frames are decoded into [`PushMessage`]s and folded into
//! [`LiveMetrics`]: two rolling chart series (active users, memory usage)
//! and an endpoint summary table.
//!
//! ```
//! use watchtower::config::DashboardConfig;
//! use watchtower::metrics::LiveMetrics;
//!
//! let mut live = LiveMetrics::new(&DashboardConfig::default());
//! live.ingest_frame(r#"{"metrics": {"other": [{"name": "active_users", "value": 7}]}}"#)
//!     .unwrap();
//! assert_eq!(live.active_users().len(), 1);
//! ```

pub mod aggregate;
mod error;
pub mod live;
pub mod message;
pub mod window;

pub use aggregate::{EndpointRow, EndpointTable, UNKNOWN_ENDPOINT};
pub use error::IngestError;
pub use live::{ChartPoint, IngestOutcome, LiveMetrics, LiveSnapshot};
pub use message::{EndpointSample, GaugeSample, MetricsPayload, PushMessage, SeriesKind};
pub use window::RollingWindow;
