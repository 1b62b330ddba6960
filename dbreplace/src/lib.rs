//! Library module for dbreplace
//!
//! Holds the CLI definition and the run driver so both can be tested without
//! spawning the binary. `main.rs` only parses, sets up logging and calls
//! [`run`].

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use dbreplace_core::{
    ConnectionConfig, Credentials, DEFAULT_MYSQL_PORT, DbReplaceError, IdentityStrategy,
    ReplaceConfig, Result,
};
use std::path::PathBuf;
use std::time::Duration;

/// CLI argument structure
#[derive(Parser)]
#[command(name = "dbreplace")]
#[command(about = "Literal find-and-replace across every text column of a MySQL database")]
#[command(version)]
#[command(long_about = "
dbreplace - bulk literal find-and-replace for MySQL

Scans every table of the target database, replaces every occurrence of the
search literal in CHAR, VARCHAR and TEXT columns, and writes each changed row
back with its own UPDATE statement.

WARNING:
- Changes are applied immediately, row by row, without a transaction
- There is no dry run; back up the database first
- The search is literal and case-sensitive, not a pattern

EXAMPLES:
  dbreplace --user app --database shop --search old.site.com --replace new.site.com
  dbreplace --user app --prompt-password --database shop --search '[tmp]' -v
  dbreplace --user app --database shop --search foo --replace bar --report run.json
")]
pub struct Cli {
    /// Database host
    #[arg(long, env = "MYSQL_HOST", default_value = "localhost")]
    pub host: String,

    /// Database port
    #[arg(long, env = "MYSQL_TCP_PORT", default_value_t = DEFAULT_MYSQL_PORT)]
    pub port: u16,

    /// Database user
    #[arg(long, env = "MYSQL_USER", value_parser = NonEmptyStringValueParser::new())]
    pub user: String,

    /// Database password
    #[arg(
        long,
        env = "MYSQL_PWD",
        hide_env_values = true,
        help = "Database password (prefer MYSQL_PWD or --prompt-password)"
    )]
    pub password: Option<String>,

    /// Read the password from the terminal
    #[arg(long, conflicts_with = "password")]
    pub prompt_password: bool,

    /// Target database (schema) name
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub database: String,

    /// Literal to find
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub search: String,

    /// Literal to substitute; empty deletes occurrences
    #[arg(long, default_value = "")]
    pub replace: String,

    /// How UPDATE statements identify the scanned row
    #[arg(
        long,
        default_value = "full-row",
        help = "Row identity for updates: full-row or primary-key"
    )]
    pub identity: IdentityStrategy,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub connect_timeout: u64,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v per-table detail, -vv statements)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

impl Cli {
    /// Connection settings from the CLI, without credentials.
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.host.clone(), self.database.clone())
            .with_port(self.port)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
    }

    /// Replacement settings from the CLI.
    ///
    /// # Errors
    /// Returns a configuration error when the search literal is empty.
    pub fn replace_config(&self) -> Result<ReplaceConfig> {
        Ok(ReplaceConfig::new(self.search.clone(), self.replace.clone())?
            .with_verbose(self.verbose > 0)
            .with_identity(self.identity))
    }

    /// Credentials from the CLI, prompting on the terminal when asked to.
    ///
    /// # Errors
    /// Returns a configuration error if the password prompt fails.
    pub fn credentials(&self) -> Result<Credentials> {
        let password = if self.prompt_password {
            let password = rpassword::prompt_password("Enter database password: ").map_err(|e| {
                DbReplaceError::configuration(format!("Failed to read password: {e}"))
            })?;
            Some(password)
        } else {
            self.password.clone()
        };
        Ok(Credentials::new(self.user.clone(), password))
    }
}

/// Runs a full replace against the database described by `cli`.
///
/// The connection pool is closed before the report is written, whether or
/// not the run succeeded.
///
/// # Errors
/// Returns setup failures (configuration, connection, table listing), the
/// fatal untargetable-row error, and report write failures.
#[cfg(feature = "mysql")]
pub async fn run(cli: &Cli) -> Result<dbreplace_core::RunReport> {
    use dbreplace_core::{MySqlTarget, run_replace};
    use tracing::info;

    let connection = cli.connection_config();
    connection.validate()?;
    let replace = cli.replace_config()?;

    info!("Target: {}", connection);
    info!("Replacing '{}' with '{}'", replace.search(), replace.replace());

    let target = {
        let credentials = cli.credentials()?;
        MySqlTarget::connect(connection, &credentials).await?
    };

    let outcome = run_replace(&target, &target.config().database, &replace).await;
    target.close().await;
    let report = outcome?;

    if let Some(path) = &cli.report {
        report.write_json(path).await?;
        info!("Report written to {}", path.display());
    }

    Ok(report)
}
