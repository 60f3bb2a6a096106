//! zipstream
//!
//! Downloads a list of remote files and answers with a single zip archive
//! that is written while the client is still reading it.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────┐
//!                      │                     ZIPSTREAM                     │
//!                      │                                                   │
//!   GET/POST /zip      │  ┌────────┐   ┌──────────┐   ┌────────────────┐   │
//!   ───────────────────┼─▶│  http  │──▶│ validate │──▶│    archive     │   │
//!                      │  │ decode │   │          │   │    streamer    │   │
//!                      │  └────────┘   └──────────┘   └───────┬────────┘   │
//!                      │                                      │ GET, one   │
//!                      │                                      ▼ at a time  │ ◀── source
//!   application/zip    │  ┌────────┐   ┌──────────┐   ┌────────────────┐   │     files
//!   ◀──────────────────┼──│response│◀──│  duplex  │◀──│   zip writer   │   │
//!                      │  │  body  │   │   pipe   │   │    entries     │   │
//!                      │  └────────┘   └──────────┘   └────────────────┘   │
//!                      │                                                   │
//!                      │   config · observability · lifecycle (signals)    │
//!                      └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use zipstream::config::loader::{load_config, ConfigError};
use zipstream::config::validation::validate_config;
use zipstream::config::ServiceConfig;
use zipstream::http::{bind, HttpServer};
use zipstream::lifecycle::{signals, Shutdown};
use zipstream::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "zipstream")]
#[command(about = "Serve remote files as one streamed zip archive", long_about = None)]
struct Cli {
    /// Network address to listen on (overrides the config file).
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(addr) = cli.addr {
        config.listener.bind_address = addr;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!("zipstream v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        fetch_timeout_secs = config.fetch.timeout_secs,
        skip_on_failure = config.archive.skip_on_failure,
        grace_period_secs = config.shutdown.grace_period_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
