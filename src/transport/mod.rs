//! Transport layer for client ↔ compositor communication.
//!
//! Provides the `Transport` trait and length-prefixed JSON framing functions.
//! Frames are `[4-byte little-endian length][UTF-8 JSON payload]`, one request
//! frame followed by exactly one response frame.

pub mod protocol;
pub mod unix_socket;

pub use protocol::{Method, Request, Response};
pub use unix_socket::UnixSocketTransport;

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::error::{IpcError, Result};

/// Size of the length prefix.
pub const HEADER_LEN: usize = 4;

/// Largest request payload the compositor will accept. Bigger frames make it
/// drop the client.
pub const MAX_REQUEST_SIZE: u32 = (1 << 20) - HEADER_LEN as u32;

/// Maximum response size (64 MB). Safety valve against a corrupt prefix.
pub const MAX_RESPONSE_SIZE: u32 = 64 * 1024 * 1024;

/// Abstraction over a request/response channel to the compositor.
///
/// `call` takes `&mut self`, so a second request cannot be issued while one
/// is still waiting for its reply.
#[async_trait]
pub trait Transport: Send {
    /// Send a request and wait for the response.
    async fn call(&mut self, req: &Request) -> Result<Response>;

    /// Close the connection.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Encode a payload as a single frame.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(payload.len())
        .map_err(|_| IpcError::Protocol(format!("message too large: {} bytes", payload.len())))?;
    if len == 0 {
        return Err(IpcError::Protocol("refusing to send an empty frame".into()));
    }
    if len > MAX_REQUEST_SIZE {
        return Err(IpcError::Protocol(format!(
            "message exceeds max size: {len} > {MAX_REQUEST_SIZE}"
        )));
    }

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Write a length-prefixed message to a writer.
///
/// Prefix and payload go out in one `write_all`, which loops over partial
/// writes.
pub async fn send_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let frame = encode_frame(payload)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    trace!(len = payload.len(), "Sent frame");
    Ok(())
}

/// Read exactly `n` bytes.
///
/// A zero-length read means the peer closed the stream. When `timeout` is set
/// it bounds each underlying read, and expiry is reported as a closed
/// connection.
pub async fn read_exact<R: AsyncRead + Unpin>(
    reader: &mut R,
    n: usize,
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    let mut filled = 0;

    while filled < n {
        let read = reader.read(&mut buf[filled..]);
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, read).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(?limit, filled, expected = n, "Read timed out");
                    return Err(IpcError::ConnectionClosed {
                        expected: n,
                        received: filled,
                    });
                }
            },
            None => read.await,
        };

        match result {
            Ok(0) => {
                return Err(IpcError::ConnectionClosed {
                    expected: n,
                    received: filled,
                })
            }
            Ok(count) => filled += count,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(buf)
}

/// Read a length-prefixed message from a reader.
///
/// Returns the raw payload bytes. A zero length prefix is a protocol
/// violation, and so is anything over `MAX_RESPONSE_SIZE`.
pub async fn recv_message<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    let header = read_exact(reader, HEADER_LEN, timeout).await?;
    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);

    if len == 0 {
        return Err(IpcError::Protocol("empty frame".into()));
    }
    if len > MAX_RESPONSE_SIZE {
        return Err(IpcError::Protocol(format!(
            "message exceeds max size: {len} > {MAX_RESPONSE_SIZE}"
        )));
    }

    trace!(len, "Receiving frame");
    read_exact(reader, len as usize, timeout).await
}

/// Read one frame and parse it as JSON.
pub async fn read_message<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Option<Duration>,
) -> Result<Response> {
    let payload = recv_message(reader, timeout).await?;
    Ok(serde_json::from_slice(&payload)?)
}

/// Send one request over `stream` and wait for its response.
pub async fn exchange<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
    req: &Request,
    timeout: Option<Duration>,
) -> Result<Response> {
    let bytes = serde_json::to_vec(req)?;
    send_message(stream, &bytes).await?;
    debug!(method = %req.method, len = bytes.len(), "Request sent, awaiting response");
    read_message(stream, timeout).await
}
