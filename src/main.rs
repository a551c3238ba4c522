//! Shalom API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server (request ID, tracing)
//!                        │
//!                        ▼
//!                 ┌──────────────────────── pipeline ───────────────────────┐
//!                 │ origin-policy → timing → docs → static-assets → decorate │
//!                 └────────────────────────────┬─────────────────────────────┘
//!                                              ▼
//!                         route table (first match wins)
//!                   /health, /health/db, /health/redis │ /api/auth/*
//!                          │                          │
//!                          ▼                          ▼
//!                  database + cache handles     auth delegate ──▶ auth service
//!
//!     Any failure ──▶ error normalizer ──▶ 404 / 400 / 500 envelope
//! ```

use std::path::PathBuf;

use clap::Parser;

use shalom_api::config;
use shalom_api::lifecycle::{self, Shutdown};
use shalom_api::observability;

#[derive(Parser)]
#[command(name = "shalom-api")]
#[command(about = "Shalom platform API server", long_about = None)]
struct Cli {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    observability::init_logging(&config.observability)?;
    tracing::info!("shalom-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        origins = ?config.cors.origins,
        auth_prefix = %config.auth.prefix,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let app = lifecycle::start(&config, &shutdown).await?;

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        lifecycle::wait_for_termination().await;
        signal_shutdown.trigger();
    });

    app.run(&shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
