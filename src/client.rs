//! Typed debug operations on top of a [`Transport`].
//!
//! Each method issues exactly one request and waits for its reply before
//! returning, so calls on one client never overlap.

use tracing::{debug, info};

use crate::error::Result;
use crate::scene::SceneNode;
use crate::transport::protocol::{check_remote_error, Request, Response};
use crate::transport::Transport;

/// Client for the compositor's debug methods.
pub struct DebugClient<T: Transport> {
    transport: T,
    namespace: String,
}

impl<T: Transport> DebugClient<T> {
    pub fn new(transport: T, namespace: impl Into<String>) -> Self {
        Self {
            transport,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Send a request and fail on an `{"error": ...}` reply.
    pub async fn call_ack(&mut self, req: &Request) -> Result<Response> {
        let resp = self.transport.call(req).await?;
        let resp = check_remote_error(resp)?;
        debug!(method = %req.method, response = %resp, "Acknowledged");
        Ok(resp)
    }

    /// Only log lines matching `filter` (a regex) are shown.
    pub async fn set_debug_filter(&mut self, filter: &str) -> Result<Response> {
        info!(filter, "Starting debug log");
        let req = Request::set_debug_filter(&self.namespace, filter);
        self.call_ack(&req).await
    }

    pub async fn stop_log(&mut self) -> Result<Response> {
        info!("Stopping debug log");
        let req = Request::stop_log(&self.namespace);
        self.call_ack(&req).await
    }

    pub async fn set_grid_size(&mut self, width: i64, height: i64) -> Result<Response> {
        info!(width, height, "Setting workspace grid size");
        let req = Request::set_grid_size(&self.namespace, width, height);
        self.call_ack(&req).await
    }

    /// Fetch and decode the scene graph.
    pub async fn dump_scene(&mut self) -> Result<SceneNode> {
        let req = Request::dump_scene(&self.namespace);
        let resp = self.transport.call(&req).await?;
        let root = SceneNode::from_value(resp)?;
        debug!(nodes = root.node_count(), "Scene graph received");
        Ok(root)
    }

    /// Shut the connection down.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.shutdown().await
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
