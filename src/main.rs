//! JSON broker service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────┐
//!     ────────────────────┼─▶ timeout → request id → trace               │
//!                         │        │                                     │
//!                         │        ▼                                     │
//!                         │  StrictJson (content type, ceiling, decode)  │
//!                         │        │                                     │
//!                         │        ▼                                     │
//!                         │  broker handler                              │
//!                         │        │                                     │
//!     Client Response     │        ▼                                     │
//!     ◀───────────────────┼── JsonResponse envelope                      │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use json_comms::config::loader::load_config;
use json_comms::observability::init_logging;
use json_comms::{HttpServer, ServiceConfig, Shutdown};

#[derive(Parser)]
#[command(name = "json-comms")]
#[command(about = "JSON broker service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("json-comms v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_json_size = config.json.json_limit(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
