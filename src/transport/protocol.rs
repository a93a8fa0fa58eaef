//! Request and response types for the compositor debug channel.
//!
//! Requests are `{"method": "<ns>/<category>/<action>", "data": {...}}`.
//! Responses have no common envelope; their shape depends on the method.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{IpcError, Result};

/// Method namespace used by the stock debugging plugins.
pub const DEFAULT_NAMESPACE: &str = "ammen99";

/// Remote operations understood by the debug plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Set the log line filter and start streaming logs to the overlay.
    Filter,
    /// Restore default logging and remove the overlay.
    StopLog,
    /// Resize the workspace grid of the active output.
    SetGridSize,
    /// Dump the whole scene graph.
    SceneDump,
}

impl Method {
    /// The `<category>/<action>` part of the method name.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Filter => "debug/filter",
            Self::StopLog => "debug/stop_log",
            Self::SetGridSize => "ipc/set_grid_size",
            Self::SceneDump => "debug/scenedump",
        }
    }

    /// Full method name under `namespace`.
    pub fn qualified(self, namespace: &str) -> String {
        format!("{namespace}/{}", self.suffix())
    }
}

/// A single request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Request {
    pub fn new(namespace: &str, method: Method, data: Map<String, Value>) -> Self {
        Self {
            method: method.qualified(namespace),
            data,
        }
    }

    pub fn set_debug_filter(namespace: &str, filter: &str) -> Self {
        Self::new(namespace, Method::Filter, object(json!({ "filter": filter })))
    }

    pub fn stop_log(namespace: &str) -> Self {
        Self::new(namespace, Method::StopLog, Map::new())
    }

    pub fn set_grid_size(namespace: &str, width: i64, height: i64) -> Self {
        Self::new(
            namespace,
            Method::SetGridSize,
            object(json!({ "width": width, "height": height })),
        )
    }

    pub fn dump_scene(namespace: &str) -> Self {
        Self::new(namespace, Method::SceneDump, Map::new())
    }
}

/// Decoded response payload.
pub type Response = Value;

/// Turn an `{"error": "..."}` reply into [`IpcError::Remote`].
///
/// Any other value is passed through untouched.
pub fn check_remote_error(response: Response) -> Result<Response> {
    match response.get("error").and_then(Value::as_str) {
        Some(message) => Err(IpcError::Remote(message.to_string())),
        None => Ok(response),
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
