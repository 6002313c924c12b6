//! Percept gateway (v1)
//!
//! Read-only JSON API over a Solana RPC provider and the Dune analytics
//! APIs, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::api ─────▶ blockchain ──▶ Solana RPC provider
//!                     (middleware)     http::reports ─▶ analytics  ──▶ Dune query / Echo APIs
//!                                      http::status
//!     Client Response
//!     ◀────────────── http::response (errors → status + {"error": ...})
//!
//!     Cross-cutting: config, observability (logging, metrics), lifecycle (shutdown)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use percept_gateway::config::load_config;
use percept_gateway::lifecycle::{shutdown_on_signal, Shutdown};
use percept_gateway::observability::{logging, metrics};
use percept_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "percept-gateway")]
#[command(about = "Solana data and analytics gateway", long_about = None)]
struct Args {
    /// TOML configuration file (falls back to PERCEPT_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = args
        .config
        .or_else(|| std::env::var_os("PERCEPT_CONFIG").map(PathBuf::from));

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.observability);
    tracing::info!("percept-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_timeout_ms = config.rpc.timeout_ms,
        analytics_enabled = config.analytics.dune_api_key.as_deref().is_some_and(|k| !k.is_empty()),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to install metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move { shutdown_on_signal(&shutdown).await });

    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
