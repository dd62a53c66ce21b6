//! AQL Builder
//!
//! Interactive terminal query builder.

use anyhow::Context;
use clap::Parser;
use std::io;
use std::path::PathBuf;

use aql_builder::config::Config;
use aql_builder::logging;
use aql_builder::query::Table;
use aql_builder::Session;

#[derive(Parser)]
#[command(name = "aql-builder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive IBM QRadar AQL query builder")]
struct Args {
    /// Config file (default: standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Table new drafts start from (events, flows)
    #[arg(short, long)]
    table: Option<Table>,

    /// Keep previous screens instead of clearing the terminal
    #[arg(long)]
    no_clear: bool,

    /// Never call external clipboard tools
    #[arg(long)]
    no_clipboard: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(table) = args.table {
        config.builder.default_table = table;
    }
    if args.no_clear {
        config.builder.clear_screen = false;
    }
    if args.no_clipboard {
        config.builder.clipboard = false;
    }

    // Menus own stdout; diagnostics stay on stderr
    logging::init(&config.logging, "").context("Failed to initialize logging")?;
    tracing::debug!(
        table = %config.builder.default_table,
        clipboard = config.builder.clipboard,
        "Starting AQL Builder v{}",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock(), config.builder);
    session.run().context("Terminal session failed")?;

    tracing::debug!("Session ended");
    Ok(())
}
