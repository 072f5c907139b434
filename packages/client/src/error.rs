//! Error types for the console client.

use thiserror::Error;

/// Client-specific errors
///
/// Every variant is terminal for the session: nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The WebSocket handshake with the endpoint failed
    #[error("Connect error: {0}")]
    Connect(String),

    /// A message could not be sent while the session was open
    #[error("Send error: {0}")]
    Send(String),

    /// The receive side failed (e.g. the peer reset the connection)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The terminal could not be read
    #[error("Input error: {0}")]
    Input(String),
}
