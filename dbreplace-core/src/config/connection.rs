//! Database connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default MySQL server port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Configuration for the database connection.
///
/// # Security
/// This struct intentionally does NOT store passwords or usernames.
/// Credentials are handled by [`crate::security::Credentials`] and never
/// logged or serialized.
///
/// # Example
/// ```rust
/// use dbreplace_core::config::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost", "shop").with_port(3307);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "localhost:3307/shop");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Target database (schema) name
    pub database: String,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Connections held by the handle: one for the scan cursor, one for updates
    pub max_connections: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_MYSQL_PORT,
            database: String::new(),
            connect_timeout: Duration::from_secs(30),
            max_connections: 2,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.database)
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with defaults for everything but the
    /// host and database.
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set the connect timeout.
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::DbReplaceError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(crate::error::DbReplaceError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.database.is_empty() {
            return Err(crate::error::DbReplaceError::configuration(
                "database cannot be empty",
            ));
        }

        if self.database.len() > 64 {
            return Err(crate::error::DbReplaceError::configuration(
                "database name too long: maximum 64 characters",
            ));
        }

        // The scan cursor holds one connection while updates run on another.
        if self.max_connections < 2 {
            return Err(crate::error::DbReplaceError::configuration(
                "max_connections must be at least 2",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::DbReplaceError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
