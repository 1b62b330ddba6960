//! MySQL replace target backed by a sqlx connection pool.
//!
//! # Module Structure
//! - `connection`: pool creation from discrete connection settings
//! - `values`: decoding of text-protocol row values into [`ColumnValue`]s
//!
//! # Security Guarantees
//! - Credentials are only handed to the driver, never stored or logged
//! - Replacement text and identity values are always bound as parameters
//! - Identifiers are backtick-quoted

mod connection;
mod values;


pub use values::{ValueKind, value_kind};

use super::{ReplaceTarget, RowVisitor};
use crate::Result;
use crate::config::ConnectionConfig;
use crate::engine::{RowUpdate, quote_identifier};
use crate::error::DbReplaceError;
use crate::models::{ColumnDescriptor, ColumnValue, ScannedRow};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySqlArguments, MySqlPool};
use sqlx::query::Query;
use sqlx::{MySql, Row};
use std::sync::Arc;

/// MySQL database that the replace engine rewrites in place.
pub struct MySqlTarget {
    pool: MySqlPool,
    config: ConnectionConfig,
}

impl std::fmt::Debug for MySqlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlTarget")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

impl MySqlTarget {
    /// Connection settings the target was opened with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ReplaceTarget for MySqlTarget {
    async fn list_tables(&self) -> Result<Vec<String>> {
        // Cast to CHAR to avoid VARBINARY type issues in MySQL 8.0+
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let tables: Vec<String> = sqlx::query_scalar(query)
            .fetch_all(&self.pool)
            .await
            .map_err(DbReplaceError::table_listing)?;

        tracing::debug!("Found {} tables in {}", tables.len(), self.config);
        Ok(tables)
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR) AS COLUMN_NAME,
                CAST(COLUMN_TYPE AS CHAR) AS COLUMN_TYPE,
                CAST(IS_NULLABLE AS CHAR) AS IS_NULLABLE,
                CAST(COLUMN_KEY AS CHAR) AS COLUMN_KEY,
                CAST(COLUMN_DEFAULT AS CHAR) AS COLUMN_DEFAULT,
                CAST(EXTRA AS CHAR) AS EXTRA
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let rows = sqlx::query(query)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbReplaceError::introspection(table, e))?;

        // Every table has at least one column; no rows means it is gone.
        if rows.is_empty() {
            return Err(DbReplaceError::introspection(
                table,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("table '{table}' not found"),
                ),
            ));
        }

        rows.iter()
            .map(|row| -> Result<ColumnDescriptor> {
                let field = |name: &str| -> Result<String> {
                    row.try_get(name)
                        .map_err(|e| DbReplaceError::introspection(table, e))
                };
                let is_nullable = field("IS_NULLABLE")?;
                let default_value: Option<String> = row
                    .try_get("COLUMN_DEFAULT")
                    .map_err(|e| DbReplaceError::introspection(table, e))?;

                Ok(ColumnDescriptor {
                    name: field("COLUMN_NAME")?,
                    data_type: field("COLUMN_TYPE")?,
                    is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
                    key: field("COLUMN_KEY")?,
                    default_value,
                    extra: field("EXTRA")?,
                })
            })
            .collect()
    }

    async fn scan_table(&self, table: &str, visitor: &mut dyn RowVisitor) -> Result<u64> {
        // The cursor holds this connection until the scan ends; updates
        // issued by the visitor go through the pool's other connection.
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DbReplaceError::scan(table, e))?;

        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        // Text protocol, so scalars arrive as the server prints them.
        let mut rows = sqlx::raw_sql(&sql).fetch(&mut *conn);

        let mut columns: Option<Arc<[String]>> = None;
        let mut count = 0u64;
        while let Some(row) = rows
            .try_next()
            .await
            .map_err(|e| DbReplaceError::scan(table, e))?
        {
            let columns = columns.get_or_insert_with(|| values::column_names(&row));
            let decoded = values::decode_row(&row).map_err(|e| DbReplaceError::scan(table, e))?;
            visitor
                .visit(ScannedRow::new(Arc::clone(columns), decoded)?)
                .await?;
            count = count.saturating_add(1);
        }

        Ok(count)
    }

    async fn execute_update(&self, update: &RowUpdate) -> Result<u64> {
        let sql = update.to_sql();
        let mut query = sqlx::query(&sql);
        for (_, value) in update.assignments() {
            query = query.bind(value.as_str());
        }
        for (_, value) in update.predicates() {
            query = bind_value(query, value);
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| DbReplaceError::update(update.table(), e))?;
        Ok(result.rows_affected())
    }
}

/// Binds an identity value with the wire type it was scanned as.
fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q ColumnValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        ColumnValue::Text(s) | ColumnValue::Other(s) => query.bind(s.as_str()),
        ColumnValue::Bytes(b) => query.bind(b.as_slice()),
        // RowUpdate never carries NULL predicates.
        ColumnValue::Null => query.bind(None::<&str>),
    }
}
