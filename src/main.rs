//! Gym Visit Aggregator
//!
//! Polls the per-location visit-count endpoints, validates the batch, appends
//! it to the visits table and returns it sorted by count.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                 VISIT AGGREGATOR                  │
//!   Trigger            │  ┌────────┐   ┌────────────┐   ┌──────────────┐  │
//!   (HTTP / schedule) ─┼─▶│  http  │──▶│ aggregator │──▶│   fetcher    │──┼──▶ upstream
//!                      │  │ server │   │            │   │  (fan-out)   │  │    <loc>.json × N
//!                      │  └────────┘   │            │   └──────────────┘  │
//!                      │               │            │   ┌──────────────┐  │
//!                      │               │            │──▶│    schema    │  │
//!                      │               │            │   └──────────────┘  │
//!                      │               │            │   ┌──────────────┐  │
//!   Sorted records  ◀──┼───────────────│            │──▶│    store     │──┼──▶ visits table
//!                      │               └────────────┘   └──────────────┘  │
//!                      │  config · observability · lifecycle               │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use visit_aggregator::config::{self, AggregatorConfig};
use visit_aggregator::lifecycle::Shutdown;
use visit_aggregator::observability::{logging, metrics};
use visit_aggregator::HttpServer;

#[derive(Parser)]
#[command(name = "visit-aggregator")]
#[command(about = "Collects gym visit counts and stores them", long_about = None)]
struct Args {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "VISITS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config: AggregatorConfig = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default()?,
    };

    logging::init_tracing(&config.observability);

    tracing::info!("visit-aggregator v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        table = %config.store.table,
        schedule_enabled = config.schedule.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Already checked by validation; a failure here only disables metrics.
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
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
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(shutdown.trigger_on_signal());

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
