//! Shared test utilities for Watchtower integration tests.
//!
//! Provides builders for identities and service records, HTTP clients
//! pointed at mock servers, and a scripted push-channel server.

#![allow(dead_code)]

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use watchtower::api::{HttpMonitorClient, MonitorApi};
use watchtower::config::{ApiConfig, PushConfig, ReconnectConfig};
use watchtower::session::{Identity, Session};

// =============================================================================
// Identity and Session
// =============================================================================

pub fn make_identity() -> Identity {
    Identity {
        username: "u".to_string(),
        email: "e@x.com".to_string(),
        userid: "42".to_string(),
    }
}

/// In-memory session already logged in as [`make_identity`].
pub fn logged_in_session() -> Session {
    let mut session = Session::in_memory();
    session
        .login(make_identity())
        .expect("in-memory login cannot fail");
    session
}

// =============================================================================
// Service Records
// =============================================================================

/// Service JSON as the server returns it.
pub fn service_json(id: u64, name: &str, url: &str, status: &str) -> Value {
    json!({
        "id": id,
        "service_name": name,
        "url": url,
        "status": status,
        "metrics": ["ACTIVE_USERS", "MEMORY_USAGE"]
    })
}

// =============================================================================
// HTTP API
// =============================================================================

pub fn api_for(base_url: &str) -> Arc<dyn MonitorApi> {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    Arc::new(HttpMonitorClient::new(&config).expect("valid test base URL"))
}

// =============================================================================
// Push Channel
// =============================================================================

/// Push config for `url` with reconnects off, so a server close is final.
pub fn push_config(url: &str) -> PushConfig {
    PushConfig {
        url: url.to_string(),
        announce_timeout_seconds: 2,
        reconnect: ReconnectConfig {
            enabled: false,
            ..ReconnectConfig::default()
        },
    }
}

struct PushScript {
    frames: Vec<String>,
    close_after: bool,
    handshakes: mpsc::UnboundedSender<String>,
}

/// A running push server bound to an ephemeral port.
pub struct MockPushServer {
    pub url: String,
    /// Receives the first text frame of every connection
    pub handshakes: mpsc::UnboundedReceiver<String>,
}

/// Serve `frames` to every client after its handshake frame. With
/// `close_after` the server closes the socket once all frames are sent,
/// otherwise it holds the connection until the client leaves.
pub async fn start_push_server(frames: Vec<String>, close_after: bool) -> MockPushServer {
    let (tx, rx) = mpsc::unbounded_channel();
    let script = Arc::new(PushScript {
        frames,
        close_after,
        handshakes: tx,
    });

    let app = Router::new().route("/", get(ws_handler)).with_state(script);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind push server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    MockPushServer {
        url: format!("ws://{}/", addr),
        handshakes: rx,
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(script): State<Arc<PushScript>>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, script))
}

async fn serve_socket(mut socket: WebSocket, script: Arc<PushScript>) {
    let target = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => break text,
            Some(Ok(_)) => continue,
            _ => return,
        }
    };
    let _ = script.handshakes.send(target);

    for frame in &script.frames {
        if socket.send(Message::Text(frame.clone())).await.is_err() {
            return;
        }
    }

    if script.close_after {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    while let Some(Ok(message)) = socket.recv().await {
        if matches!(message, Message::Close(_)) {
            break;
        }
    }
}

/// A metrics frame carrying both chart gauges and one endpoint.
pub fn metrics_frame(active: f64, memory: f64, requests: f64, errors: f64) -> String {
    json!({
        "time": 1,
        "metrics": {
            "other": [
                {"name": "active_users", "value": active, "labels": {}},
                {"name": "memory_usage_bytes", "value": memory, "labels": {}}
            ],
            "requests": [{"endpoint": "/checkout", "method": "POST", "value": requests}],
            "errors": [{"endpoint": "/checkout", "method": "POST", "value": errors}]
        }
    })
    .to_string()
}
