//! Integration hub server.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────────┐
//!                       │                  INTEGRATION HUB                   │
//!                       │                                                    │
//!   routes.json ────────┼─▶ manifest ──▶ registry engine ──▶ axum host       │
//!                       │                   │                   │            │
//!                       │                   ▼                   │            │
//!                       │         resolver (cached modules)     │            │
//!                       │                   │                   │            │
//!                       │                   ▼                   ▼            │
//!                       │          features (built-in)     http server       │
//!                       │                                        │           │
//!   Client Request ─────┼─▶ correlation ─▶ trace ─▶ timeout ─▶ exchange log  │
//!                       │                                        │           │
//!   Client Response ◀───┼──────── X-Correlation-ID ◀─────── handler group    │
//!                       │                                                    │
//!                       │  Cross-cutting: config, observability, lifecycle   │
//!                       └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use integration_hub::config::{self, HubConfig};
use integration_hub::features::builtin_catalog;
use integration_hub::http::HubServer;
use integration_hub::lifecycle::{bootstrap, signals, Shutdown};
use integration_hub::observability::{logging, metrics, TracingLogger};

#[derive(Parser)]
#[command(name = "integration-hub")]
#[command(about = "Manifest-driven integration hub", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, env = "HUB_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config: HubConfig = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::loader::default_config()?,
    };

    logging::init_logging(config.effective_log_level())?;

    tracing::info!("integration-hub v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        bind_address = %config.listener.bind_address,
        manifest = %config.manifest.path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let logger = TracingLogger::new(env!("CARGO_PKG_NAME"));
    let startup = bootstrap(&config, builtin_catalog(), logger);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HubServer::new(config, startup.router);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
