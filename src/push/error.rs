//! Push channel error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    /// Could not establish the WebSocket connection.
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    /// Connected, but the handshake frame could not be sent.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Error while reading or writing frames.
    #[error("push channel protocol error: {0}")]
    Protocol(String),

    #[error("timed out after {0}s")]
    Timeout(u64),
}
