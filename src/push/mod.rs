//! Push channel: the WebSocket stream of live metrics.
//!
//! One connection is opened per monitored target. The first frame sent is
//! the target's metrics URL; every inbound frame is a JSON metrics payload
//! handed to [`crate::metrics::LiveMetrics`].

mod announce;
mod backoff;
mod channel;
mod error;
mod state;
mod tls;

pub use announce::{announce, spawn_announce};
pub use backoff::BackoffPolicy;
pub use channel::{PushChannel, PushEvent};
pub use error::PushError;
pub use state::ConnectionState;
