//! Connection state machine for the push channel.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Lifecycle of one push-channel connection.
///
/// `Connecting -> Open -> (Retrying -> Connecting)* -> Closed`.
/// `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Open,
    Retrying {
        /// 1-based count of consecutive failures
        attempt: u32,
        #[serde(with = "millis")]
        delay: Duration,
    },
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Retrying { attempt, delay } => {
                write!(f, "retrying (attempt {}, in {}ms)", attempt, delay.as_millis())
            }
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Open.to_string(), "open");
        let retrying = ConnectionState::Retrying {
            attempt: 2,
            delay: Duration::from_millis(1500),
        };
        assert_eq!(retrying.to_string(), "retrying (attempt 2, in 1500ms)");
    }

    #[test]
    fn test_serialize_tagged() {
        let retrying = ConnectionState::Retrying {
            attempt: 1,
            delay: Duration::from_millis(500),
        };
        assert_eq!(
            serde_json::to_value(retrying).unwrap(),
            serde_json::json!({"state": "retrying", "attempt": 1, "delay": 500})
        );
        assert_eq!(
            serde_json::to_value(ConnectionState::Closed).unwrap(),
            serde_json::json!({"state": "closed"})
        );
    }
}
