//! Smart parking admin gateway.
//!
//! ```text
//!     Dashboard            ┌───────────────────────────────────────────┐
//!     ─────────────────────┼─▶ request id ─▶ auth ─▶ forward handler ──┼──▶ External
//!     {M} /api/proxy/a/b?q │                            │               │    parking API
//!     ◀────────────────────┼── no-cache headers ◀───────┘               │    {base}/a/b?q
//!                          │                                           │
//!                          │  config (TOML + env) ─ watcher ─ live swap │
//!                          │  tracing ─ prometheus metrics (optional)   │
//!                          └───────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use parking_gateway::config::{self, ConfigWatcher};
use parking_gateway::observability::{logging, metrics};
use parking_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "parking-gateway")]
#[command(about = "Forwarding gateway for the parking administration dashboard", long_about = None)]
struct Args {
    /// TOML configuration file. Watched for changes when given.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::default_config()?,
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("parking-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        mount_prefix = %config.upstream.mount_prefix,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the server's lifetime.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
