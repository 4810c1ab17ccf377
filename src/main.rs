//! asset-server
//!
//! Static asset server built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                  ASSET SERVER                    │
//!                      │                                                  │
//!   Client Request     │  ┌─────────┐   ┌───────────┐   ┌────────────┐    │
//!   ───────────────────┼─▶│  http   │──▶│ security  │──▶│  handler   │    │
//!                      │  │ server  │   │  headers  │   │            │    │
//!                      │  └─────────┘   └───────────┘   └─────┬──────┘    │
//!                      │                                      │           │
//!                      │                                      ▼           │
//!                      │                 ┌──────────┐   ┌────────────┐    │
//!                      │                 │ fallback │◀──│  resolver  │◀───┼─── root dir
//!                      │                 │  policy  │   └────────────┘    │
//!                      │                 └────┬─────┘                     │
//!                      │                      ▼                           │
//!   Client Response    │               ┌────────────┐   ┌────────────┐    │
//!   ◀──────────────────┼───────────────│   shaper   │◀──│ body + pool│    │
//!                      │               └────────────┘   └────────────┘    │
//!                      │                                                  │
//!                      │  config · observability · lifecycle (signals)    │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use asset_server::config::validation::validate_config;
use asset_server::config::{Args, ServeConfig};
use asset_server::lifecycle::{signals, Shutdown};
use asset_server::observability::init_logging;
use asset_server::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;

    init_logging(&config.observability);

    tracing::info!("asset-server v{} starting", env!("CARGO_PKG_VERSION"));

    let bind_address = validate_config(&config)?;
    let serve = ServeConfig::from_files_config(&config.files)?;

    tracing::info!(
        bind_address = %bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        gzip = config.compression.gzip,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, serve, shutdown.clone())?;

    // Bind TCP listener
    let listener = TcpListener::bind(bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(
        shutdown,
        Duration::from_secs(config.lifecycle.graceful_secs),
    ));

    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
