//! One-shot "announce" connection used after registering a service.

use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{tls, PushError};
use crate::config::PushConfig;

/// Connect, send `target` as the handshake, wait briefly for the first
/// reply, then close.
pub async fn announce(config: &PushConfig, target: &str) -> Result<Option<String>, PushError> {
    let secs = config.announce_timeout_seconds;
    let timeout = Duration::from_secs(secs);
    tls::ensure_crypto_provider();

    let (mut ws, _response) =
        tokio::time::timeout(timeout, tokio_tungstenite::connect_async(config.url.as_str()))
            .await
            .map_err(|_| PushError::Timeout(secs))?
            .map_err(|e| PushError::Connect {
                url: config.url.clone(),
                message: e.to_string(),
            })?;

    ws.send(Message::text(target.to_string()))
        .await
        .map_err(|e| PushError::Handshake(e.to_string()))?;

    let reply = match tokio::time::timeout(timeout, first_text(&mut ws)).await {
        Ok(reply) => reply?,
        Err(_) => None,
    };
    let _ = ws.close(None).await;

    Ok(reply)
}

/// Fire-and-forget [`announce`]; the outcome is only logged.
pub fn spawn_announce(config: PushConfig, target: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        match announce(&config, &target).await {
            Ok(Some(reply)) => {
                tracing::info!(service_url = %target, reply_len = reply.len(), "Announced target")
            }
            Ok(None) => tracing::info!(service_url = %target, "Announced target, no reply"),
            Err(e) => tracing::warn!(service_url = %target, error = %e, "Announce failed"),
        }
    })
}

async fn first_text(
    ws: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
) -> Result<Option<String>, PushError> {
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => return Ok(Some(text.as_str().to_owned())),
            Ok(Message::Close(_)) => return Ok(None),
            Ok(_) => continue,
            Err(e) => return Err(PushError::Protocol(e.to_string())),
        }
    }
    Ok(None)
}
