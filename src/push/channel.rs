//! Long-lived push-channel connection for one monitored target.

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::backoff::BackoffPolicy;
use super::state::ConnectionState;
use super::tls;
use crate::config::PushConfig;

/// Buffered events between the socket task and the consumer.
const EVENT_BUFFER: usize = 64;

/// Something the consumer of a [`PushChannel`] should know about.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    State(ConnectionState),
    /// Raw inbound text frame
    Frame(String),
}

/// Handle to a background WebSocket connection.
///
/// The connection sends the target URL as its first frame and then forwards
/// every inbound text frame. Dropping the handle (or calling [`close`]) tears
/// the connection down.
///
/// [`close`]: PushChannel::close
pub struct PushChannel {
    target: String,
    events: mpsc::Receiver<PushEvent>,
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PushChannel {
    /// Open a channel for `target` using the configured URL and reconnect policy.
    pub fn open(config: &PushConfig, target: impl Into<String>) -> Self {
        Self::open_with_token(config, target, CancellationToken::new())
    }

    /// Like [`open`](Self::open), tied to an externally owned token.
    pub fn open_with_token(
        config: &PushConfig,
        target: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        let target = target.into();
        let (event_tx, events) = mpsc::channel(EVENT_BUFFER);
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);

        let worker = Worker {
            url: config.url.clone(),
            target: target.clone(),
            policy: BackoffPolicy::from_config(&config.reconnect),
            events: event_tx,
            state: state_tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            target,
            events,
            state,
            cancel,
            task: Some(task),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Next event, or `None` once the connection is closed for good.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.events.recv().await
    }

    /// Next inbound frame, skipping state changes.
    pub async fn next_frame(&mut self) -> Option<String> {
        while let Some(event) = self.events.recv().await {
            if let PushEvent::Frame(frame) = event {
                return Some(frame);
            }
        }
        None
    }

    /// Close the connection and wait for the socket task to finish.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Push channel task ended abnormally");
            }
        }
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for PushChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushChannel")
            .field("target", &self.target)
            .field("state", &self.state())
            .finish()
    }
}

/// How one connection attempt ended.
enum SessionEnd {
    Cancelled,
    Dropped { opened: bool },
}

struct Worker {
    url: String,
    target: String,
    policy: BackoffPolicy,
    events: mpsc::Sender<PushEvent>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl Worker {
    async fn run(self) {
        let mut delays = self.policy.delays();
        let mut attempt = 0u32;

        loop {
            self.transition(ConnectionState::Connecting);
            match self.connect_once().await {
                SessionEnd::Cancelled => break,
                SessionEnd::Dropped { opened } => {
                    if opened {
                        delays = self.policy.delays();
                        attempt = 0;
                    }
                    attempt += 1;

                    let Some(delay) = delays.next() else {
                        if self.policy.max_attempts() > 0 {
                            tracing::warn!(
                                url = %self.url,
                                attempts = attempt - 1,
                                "Push channel reconnect budget exhausted"
                            );
                        }
                        break;
                    };
                    self.transition(ConnectionState::Retrying { attempt, delay });
                    tokio::select! {
                        _ = self.cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        self.transition(ConnectionState::Closed);
        tracing::info!(service_url = %self.target, "Push channel closed");
    }

    /// Publishes a state change. Never blocks; a full buffer drops the event
    /// but the watch value is always current.
    fn transition(&self, state: ConnectionState) {
        tracing::debug!(url = %self.url, %state, "Push channel state");
        self.state.send_replace(state);
        let _ = self.events.try_send(PushEvent::State(state));
    }

    /// Forwards a frame, returning false when the consumer is gone.
    async fn forward(&self, frame: String) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(PushEvent::Frame(frame)) => sent.is_ok(),
        }
    }

    async fn connect_once(&self) -> SessionEnd {
        tls::ensure_crypto_provider();
        let mut ws = tokio::select! {
            _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
            result = tokio_tungstenite::connect_async(self.url.as_str()) => match result {
                Ok((ws, _response)) => ws,
                Err(e) => {
                    tracing::warn!(url = %self.url, error = %e, "Push channel connect failed");
                    return SessionEnd::Dropped { opened: false };
                }
            },
        };

        // The first outbound frame tells the server which target to scrape.
        if let Err(e) = ws.send(Message::text(self.target.clone())).await {
            tracing::warn!(url = %self.url, error = %e, "Push channel handshake failed");
            return SessionEnd::Dropped { opened: false };
        }
        self.transition(ConnectionState::Open);
        tracing::info!(url = %self.url, service_url = %self.target, "Push channel open");

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = ws.close(None).await;
                    return SessionEnd::Cancelled;
                }
                next = ws.next() => next,
            };

            match next {
                Some(Ok(Message::Text(text))) => {
                    if !self.forward(text.as_str().to_owned()).await {
                        let _ = ws.close(None).await;
                        return SessionEnd::Cancelled;
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = ws.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(url = %self.url, ?frame, "Push channel closed by server");
                    return SessionEnd::Dropped { opened: true };
                }
                Some(Ok(_)) => {
                    // Binary and pong frames carry nothing for us
                }
                Some(Err(e)) => {
                    tracing::warn!(url = %self.url, error = %e, "Push channel error");
                    return SessionEnd::Dropped { opened: true };
                }
                None => return SessionEnd::Dropped { opened: true },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconnectConfig;
    use std::time::Duration;

    fn unreachable_config(reconnect: ReconnectConfig) -> PushConfig {
        PushConfig {
            // Nothing listens on port 9 in the test environment
            url: "ws://127.0.0.1:9/".to_string(),
            announce_timeout_seconds: 1,
            reconnect,
        }
    }

    #[tokio::test]
    async fn test_no_reconnect_closes_after_first_failure() {
        let config = unreachable_config(ReconnectConfig {
            enabled: false,
            ..ReconnectConfig::default()
        });
        let mut channel = PushChannel::open(&config, "http://10.0.0.1:7000/metrics/");

        let mut states = Vec::new();
        while let Some(event) = channel.recv().await {
            if let PushEvent::State(state) = event {
                states.push(state);
            }
        }

        assert_eq!(
            states,
            vec![ConnectionState::Connecting, ConnectionState::Closed]
        );
        assert!(channel.state().is_closed());
    }

    #[tokio::test]
    async fn test_bounded_retries_then_closed() {
        let config = unreachable_config(ReconnectConfig {
            enabled: true,
            initial_backoff_ms: 10,
            max_backoff_ms: 20,
            multiplier: 2.0,
            max_attempts: 2,
        });
        let mut channel = PushChannel::open(&config, "http://10.0.0.1:7000/metrics/");

        let mut retries = Vec::new();
        while let Some(event) = channel.recv().await {
            if let PushEvent::State(ConnectionState::Retrying { attempt, delay }) = event {
                retries.push((attempt, delay));
            }
        }

        assert_eq!(
            retries,
            vec![
                (1, Duration::from_millis(10)),
                (2, Duration::from_millis(20))
            ]
        );
        assert_eq!(channel.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_successful_open_restarts_schedule() {
        // Three sessions that open and are then closed by the server, after
        // which the port is gone and connects fail
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for _ in 0..3 {
                let (stream, _) = listener.accept().await.unwrap();
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                let _ = ws.next().await;
                let _ = ws.close(None).await;
            }
        });

        let config = PushConfig {
            url: format!("ws://{}/", addr),
            announce_timeout_seconds: 1,
            reconnect: ReconnectConfig {
                enabled: true,
                initial_backoff_ms: 10,
                max_backoff_ms: 40,
                multiplier: 2.0,
                max_attempts: 1,
            },
        };
        let mut channel = PushChannel::open(&config, "http://10.0.0.1:7000/metrics/");

        let mut retries = Vec::new();
        let drain = async {
            while let Some(event) = channel.recv().await {
                if let PushEvent::State(ConnectionState::Retrying { attempt, delay }) = event {
                    retries.push((attempt, delay));
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(10), drain)
            .await
            .expect("channel should give up once the server is gone");

        // A budget of one retry survives three drops because each open resets it
        assert_eq!(retries, vec![(1, Duration::from_millis(10)); 3]);
        assert_eq!(channel.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_close_during_backoff_is_prompt() {
        let config = unreachable_config(ReconnectConfig {
            enabled: true,
            initial_backoff_ms: 60_000,
            max_backoff_ms: 60_000,
            multiplier: 1.0,
            max_attempts: 10,
        });
        let channel = PushChannel::open(&config, "http://10.0.0.1:7000/metrics/");
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(Duration::from_secs(2), channel.close())
            .await
            .expect("close should not wait for the backoff delay");
    }
}
