//! MySQL connection pool creation.
//!
//! # Security Features
//! - Connection settings are validated before anything touches the network
//! - The password is passed to the driver as a discrete option, never
//!   embedded in a URL that could end up in an error message
//! - Statement logging is disabled so bound values stay out of the logs

use super::MySqlTarget;
use crate::Result;
use crate::config::ConnectionConfig;
use crate::error::DbReplaceError;
use crate::security::Credentials;
use sqlx::ConnectOptions;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

impl MySqlTarget {
    /// Opens a connection pool to the configured database.
    ///
    /// The first connection is established eagerly, so unreachable servers
    /// and rejected credentials surface here rather than mid-run.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid, and
    /// [`DbReplaceError::Connection`] if the server cannot be reached or
    /// rejects the credentials.
    pub async fn connect(config: ConnectionConfig, credentials: &Credentials) -> Result<Self> {
        config.validate()?;

        let pool = create_mysql_connection_pool(&config, credentials).await?;
        tracing::info!("Connected to {}", config);

        Ok(Self { pool, config })
    }
}

/// Builds driver connect options from discrete settings.
pub(super) fn connect_options(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(credentials.username())
        .database(&config.database);
    if let Some(password) = credentials.password() {
        options = options.password(password);
    }
    options.disable_statement_logging()
}

async fn create_mysql_connection_pool(
    config: &ConnectionConfig,
    credentials: &Credentials,
) -> Result<MySqlPool> {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .connect_with(connect_options(config, credentials))
        .await
        .map_err(|e| DbReplaceError::connection_failed(format!("Failed to connect to {config}"), e))
}
