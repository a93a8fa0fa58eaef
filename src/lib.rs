//! wf-debug-ipc library
//!
//! Client side of a Wayland compositor's private debug IPC socket:
//! - Length-prefixed JSON framing and the request/response transport
//! - Typed debug operations (log filter, grid size, scene dump)
//! - Scene graph model and its annotated tree rendering

pub mod client;
pub mod config;
pub mod error;
pub mod scene;
pub mod transport;

pub use client::DebugClient;
pub use error::{IpcError, Result};
