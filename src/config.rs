//! Runtime configuration.
//!
//! The socket path normally comes from the `WAYFIRE_SOCKET` environment
//! variable exported by the compositor. Command line flags take priority over
//! the environment, which takes priority over built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::transport::protocol::DEFAULT_NAMESPACE;

pub const SOCKET_ENV: &str = "WAYFIRE_SOCKET";
pub const NAMESPACE_ENV: &str = "WFDBG_NAMESPACE";
pub const TIMEOUT_ENV: &str = "WFDBG_TIMEOUT";
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Let the terminal decide; `NO_COLOR` disables.
    #[default]
    Auto,
    Always,
    Never,
}

/// Values given on the command line. `None` falls through to the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub socket: Option<PathBuf>,
    pub namespace: Option<String>,
    pub timeout_secs: Option<f64>,
    pub color: Option<ColorMode>,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Path of the compositor's debug IPC socket.
    pub socket_path: PathBuf,

    /// Method namespace, the first component of every method name.
    pub namespace: String,

    /// Per-read timeout; `None` blocks until the peer answers or hangs up.
    pub read_timeout: Option<Duration>,

    pub color: ColorMode,
}

impl Config {
    /// Resolve from the process environment.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self> {
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` for environment values.
    pub fn resolve(
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let socket_path = overrides
            .socket
            .or_else(|| lookup(SOCKET_ENV).filter(|s| !s.is_empty()).map(PathBuf::from))
            .with_context(|| {
                format!("{SOCKET_ENV} not set - is the compositor's IPC plugin enabled? (or pass --socket)")
            })?;

        let namespace = overrides
            .namespace
            .or_else(|| lookup(NAMESPACE_ENV).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => lookup(TIMEOUT_ENV)
                .map(|v| {
                    v.trim()
                        .parse::<f64>()
                        .with_context(|| format!("Failed to parse {TIMEOUT_ENV}={v:?}"))
                })
                .transpose()?,
        };
        let read_timeout = timeout_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("Invalid timeout: {secs}s"))
            })
            .transpose()?
            .filter(|d| !d.is_zero());

        let color = match overrides.color.unwrap_or_default() {
            ColorMode::Auto if lookup(NO_COLOR_ENV).is_some_and(|v| !v.is_empty()) => {
                ColorMode::Never
            }
            mode => mode,
        };

        Ok(Self {
            socket_path,
            namespace,
            read_timeout,
            color,
        })
    }

    /// Install the color choice process-wide.
    pub fn apply_color(&self) {
        match self.color {
            ColorMode::Auto => colored::control::unset_override(),
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
        }
    }
}
