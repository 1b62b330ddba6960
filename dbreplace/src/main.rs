//! Bulk literal find-and-replace for MySQL.
//!
//! Connects to one database, rewrites every text column of every table, and
//! logs a per-table summary and a final total.
//!
//! # Security Guarantees
//! - No credentials stored or logged
//! - All replacement values are bound as statement parameters

use clap::Parser;
use dbreplace::{Cli, run};
use dbreplace_core::{Result, init_logging, report::error_chain};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet)?;

    run(&cli).await.map_err(|e| {
        error!("{}", error_chain(&e));
        e
    })?;

    Ok(())
}
