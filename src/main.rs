//! wfdbg
//!
//! Issues one request on the compositor's debug IPC socket and prints the
//! result. The socket path is taken from `WAYFIRE_SOCKET` unless `--socket`
//! is given.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use wf_debug_ipc::config::{ColorMode, Config, ConfigOverrides};
use wf_debug_ipc::scene::render::SceneRenderer;
use wf_debug_ipc::transport::{Transport, UnixSocketTransport};
use wf_debug_ipc::DebugClient;

#[derive(Parser, Debug)]
#[command(name = "wfdbg")]
#[command(about = "Talk to the compositor's debug IPC socket")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Socket path (defaults to $WAYFIRE_SOCKET)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Method namespace (defaults to $WFDBG_NAMESPACE or "ammen99")
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Give up if the compositor is silent for this many seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Colorize output
    #[arg(long, global = true, value_enum)]
    color: Option<ColorMode>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the scene graph as an annotated tree
    DumpScenegraph {
        /// Print the decoded tree as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Start streaming compositor logs that match FILTER
    StartLog { filter: String },
    /// Stop streaming compositor logs
    StopLog,
    /// Resize the workspace grid of the active output
    SetGrid { width: i64, height: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stderr so stdout only carries the dump
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env(ConfigOverrides {
        socket: args.socket,
        namespace: args.namespace,
        timeout_secs: args.timeout,
        color: args.color,
    })
    .context("Failed to load configuration")?;
    config.apply_color();

    info!(socket = %config.socket_path.display(), namespace = %config.namespace, "Connecting");

    let transport = UnixSocketTransport::connect(&config.socket_path)
        .await
        .context("Failed to open debug IPC socket")?
        .with_read_timeout(config.read_timeout);
    let mut client = DebugClient::new(transport, config.namespace.clone());

    let result = run(&mut client, args.command).await;

    if let Err(e) = client.close().await {
        warn!(error = %e, "Error closing connection");
    }

    result
}

async fn run<T: Transport>(client: &mut DebugClient<T>, command: Command) -> Result<()> {
    match command {
        Command::DumpScenegraph { json } => {
            let root = client
                .dump_scene()
                .await
                .context("Failed to dump scene graph")?;

            let mut stdout = std::io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut stdout, &root)?;
                writeln!(stdout)?;
            } else {
                SceneRenderer::new()
                    .render(&root, &mut stdout)
                    .context("Failed to write scene graph")?;
            }
        }
        Command::StartLog { filter } => {
            let resp = client
                .set_debug_filter(&filter)
                .await
                .context("Failed to set debug filter")?;
            debug!(response = %resp, "Log filter set");
        }
        Command::StopLog => {
            let resp = client.stop_log().await.context("Failed to stop log")?;
            debug!(response = %resp, "Log stopped");
        }
        Command::SetGrid { width, height } => {
            let resp = client
                .set_grid_size(width, height)
                .await
                .context("Failed to set grid size")?;
            debug!(response = %resp, "Grid size set");
        }
    }

    Ok(())
}
