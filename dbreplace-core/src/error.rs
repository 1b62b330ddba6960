//! Error types with credential-free messages.
//!
//! Errors are split into three classes that drive how a run proceeds:
//! setup failures stop the process before any mutation, per-table failures
//! are logged and the table is abandoned, and an untargetable row stops the
//! whole run.

use thiserror::Error;

/// Main error type for dbreplace operations.
///
/// # Security
/// Messages never include passwords or connection strings. The connection
/// target is only ever rendered through `ConnectionConfig`'s `Display`.
#[derive(Debug, Error)]
pub enum DbReplaceError {
    /// Database connection failed (credentials sanitized)
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Listing the tables of the target database failed
    #[error("Failed to list tables")]
    TableListing {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Reading the column metadata of a table failed
    #[error("Failed to describe table '{table}'")]
    Introspection {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The full-table scan failed or was interrupted
    #[error("Failed to scan table '{table}'")]
    Scan {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Executing a row UPDATE failed
    #[error("Failed to update row in table '{table}'")]
    Update {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A changed row has no non-null column to build an identity predicate from
    #[error("No valid WHERE clause could be built for a row in table '{table}'")]
    UntargetableRow { table: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with `DbReplaceError`
pub type Result<T> = std::result::Result<T, DbReplaceError>;

impl DbReplaceError {
    /// Creates a connection error with sanitized context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a table listing error
    pub fn table_listing<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TableListing {
            source: Box::new(error),
        }
    }

    /// Creates an introspection error for `table`
    pub fn introspection<E>(table: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Introspection {
            table: table.into(),
            source: Box::new(error),
        }
    }

    /// Creates a scan error for `table`
    pub fn scan<E>(table: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Scan {
            table: table.into(),
            source: Box::new(error),
        }
    }

    /// Creates an update error for `table`
    pub fn update<E>(table: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Update {
            table: table.into(),
            source: Box::new(error),
        }
    }

    /// Creates an untargetable row error for `table`
    pub fn untargetable_row(table: impl Into<String>) -> Self {
        Self::UntargetableRow {
            table: table.into(),
        }
    }

    /// Returns true when the error must stop the whole run rather than
    /// only the table being processed.
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Introspection { .. } | Self::Scan { .. } | Self::Update { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = DbReplaceError::configuration("search literal must not be empty");
        assert!(error.to_string().contains("search literal must not be empty"));

        let error = DbReplaceError::untargetable_row("users");
        assert!(error.to_string().contains("'users'"));
    }

    #[test]
    fn test_per_table_errors_are_not_fatal() {
        let io = || std::io::Error::other("boom");

        assert!(!DbReplaceError::introspection("t", io()).is_fatal());
        assert!(!DbReplaceError::scan("t", io()).is_fatal());
        assert!(!DbReplaceError::update("t", io()).is_fatal());
    }

    #[test]
    fn test_setup_and_row_errors_are_fatal() {
        let io = || std::io::Error::other("boom");

        assert!(DbReplaceError::connection_failed("connect", io()).is_fatal());
        assert!(DbReplaceError::table_listing(io()).is_fatal());
        assert!(DbReplaceError::configuration("bad").is_fatal());
        assert!(DbReplaceError::untargetable_row("t").is_fatal());
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error as _;

        let error = DbReplaceError::scan("orders", std::io::Error::other("connection reset"));
        let source = error.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection reset"));
    }
}
