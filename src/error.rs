//! Error taxonomy for debug IPC calls.
//!
//! Every variant is fatal to the in-flight call; nothing is retried.

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, IpcError>;

/// Failures surfaced by the transport and the scene decoder.
#[derive(Debug, Error)]
pub enum IpcError {
    /// The socket could not be opened.
    #[error("cannot connect to {path}: {reason}")]
    Connection { path: String, reason: String },

    /// The peer closed the stream (or the read timed out) before a full
    /// frame arrived.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    /// Invalid length prefix, oversized frame, or undecodable JSON.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The decoded JSON is not a well-formed scene node.
    #[error("malformed scene payload: {0}")]
    MalformedPayload(String),

    /// The compositor answered with an `{"error": ...}` object.
    #[error("compositor returned an error: {0}")]
    Remote(String),

    /// Any other I/O failure on an established connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IpcError {
    pub(crate) fn connection(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connection {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for IpcError {
    fn from(e: serde_json::Error) -> Self {
        Self::Protocol(format!("invalid JSON: {e}"))
    }
}
