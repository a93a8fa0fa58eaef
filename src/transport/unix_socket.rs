//! Unix domain socket transport to the compositor's debug IPC.
//!
//! Owns one stream connection for its whole lifetime. The stream is closed
//! when the transport is dropped, so every exit path releases it.

use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tracing::{debug, instrument};

use super::protocol::{Request, Response};
use super::{exchange, Transport};
use crate::error::{IpcError, Result};

/// Transport over a connected `UnixStream`.
#[derive(Debug)]
pub struct UnixSocketTransport {
    stream: UnixStream,
    path: String,
    read_timeout: Option<Duration>,
}

impl UnixSocketTransport {
    /// Connect to the socket at `path`.
    ///
    /// Fails with `IpcError::Connection` if the path is missing, is not a
    /// socket, or nobody is listening on it.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| IpcError::connection(&shown, format!("no such socket ({e})")))?;
        if !meta.file_type().is_socket() {
            return Err(IpcError::connection(&shown, "not a socket"));
        }

        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| IpcError::connection(&shown, e))?;

        debug!(path = %shown, "Connected to debug IPC socket");

        Ok(Self {
            stream,
            path: shown,
            read_timeout: None,
        })
    }

    /// Bound every socket read by `timeout`.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Path this transport is connected to.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl Transport for UnixSocketTransport {
    #[instrument(skip(self, req), fields(path = %self.path, method = %req.method))]
    async fn call(&mut self, req: &Request) -> Result<Response> {
        let resp = exchange(&mut self.stream, req, self.read_timeout).await?;
        debug!("Response received");
        Ok(resp)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        debug!(path = %self.path, "Connection closed");
        Ok(())
    }
}
