//! AQL Builder API Server
//!
//! REST API server for building and validating AQL queries.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use aql_builder::config::Config;
use aql_builder::{logging, serve, AppState};

#[derive(Parser)]
#[command(name = "aql-builder-api")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP API and browser form for the AQL builder")]
struct Args {
    /// Config file (default: standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Port, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    logging::init(&config.logging, "tower_http=debug").context("Failed to initialize logging")?;

    tracing::info!("AQL Builder API Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        default_table = %config.builder.default_table,
        default_order = %config.builder.default_order,
        "Draft defaults"
    );

    let state = AppState::from_config(&config);
    tracing::info!("Starting server on {}", config.api.addr());

    serve(state, &config.api).await.context("API server failed")?;

    tracing::info!("AQL Builder API Server stopped");
    Ok(())
}
