//! Run accounting.
//!
//! The table rewriter returns a [`TableReport`] by value and the run
//! aggregates them into a [`RunReport`]; there is no shared counter.

use crate::error::{DbReplaceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of processing one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    /// Table name
    pub table: String,
    /// Classified text columns, in schema order
    pub text_columns: Vec<String>,
    /// Rows read from the scan
    pub rows_scanned: u64,
    /// UPDATE statements issued
    pub rows_updated: u64,
    /// Column-level changes; one per changed column value, not per occurrence
    pub replacements: u64,
    /// Updates the server reported as matching no row
    pub rows_unmatched: u64,
}

impl TableReport {
    /// Creates an empty report for `table`.
    pub fn new(table: impl Into<String>, text_columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            text_columns,
            ..Default::default()
        }
    }

    /// True when the table had no text columns and was never scanned.
    pub const fn was_skipped(&self) -> bool {
        self.text_columns.is_empty()
    }
}

/// A table abandoned because of a per-table error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFailure {
    /// Table name
    pub table: String,
    /// Error message, credentials never included
    pub error: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Database the run targeted
    pub database: String,
    /// Literal searched for
    pub search: String,
    /// Literal substituted
    pub replace: String,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run end time, set by [`RunReport::finish`]
    pub finished_at: Option<DateTime<Utc>>,
    /// Per-table results, in processing order
    pub tables: Vec<TableReport>,
    /// Tables that failed and were skipped
    pub failures: Vec<TableFailure>,
}

impl RunReport {
    /// Starts a report for a run against `database`.
    pub fn start(
        database: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            search: search.into(),
            replace: replace.into(),
            started_at: Utc::now(),
            finished_at: None,
            tables: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Records a processed table.
    pub fn push(&mut self, table: TableReport) {
        self.tables.push(table);
    }

    /// Records a table that failed with `error`.
    pub fn record_failure(&mut self, table: impl Into<String>, error: &DbReplaceError) {
        self.failures.push(TableFailure {
            table: table.into(),
            error: error_chain(error),
        });
    }

    /// Stamps the end time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Total column-level replacements across all tables.
    pub fn total_replacements(&self) -> u64 {
        self.tables
            .iter()
            .fold(0, |acc, t| acc.saturating_add(t.replacements))
    }

    /// Total UPDATE statements issued across all tables.
    pub fn total_rows_updated(&self) -> u64 {
        self.tables
            .iter()
            .fold(0, |acc, t| acc.saturating_add(t.rows_updated))
    }

    /// Writes the report as pretty JSON to `path`.
    ///
    /// # Errors
    /// Returns an error if serialization or the file write fails.
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            DbReplaceError::Serialization {
                context: "run report".to_string(),
                source: e,
            }
        })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| DbReplaceError::Io {
                context: format!("Failed to write report to {}", path.display()),
                source: e,
            })
    }
}

/// Renders an error with its source chain, `outer: inner: ...`.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
