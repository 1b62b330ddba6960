//! Database target traits for the replace engine.
//!
//! The engine only talks to a database through [`ReplaceTarget`], so it can
//! run against MySQL or against the in-memory target used by the unit tests.
//!
//! # Module Structure
//! - `mysql`: sqlx-backed MySQL target (feature `mysql`)

use crate::Result;
use crate::engine::RowUpdate;
use crate::models::{ColumnDescriptor, ScannedRow};
use async_trait::async_trait;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(test)]
pub(crate) mod memory;

/// Receives the rows of a table scan one at a time.
///
/// Returning an error stops the scan and propagates the error unchanged to
/// the caller of [`ReplaceTarget::scan_table`].
#[async_trait]
pub trait RowVisitor: Send {
    /// Processes one scanned row.
    async fn visit(&mut self, row: ScannedRow) -> Result<()>;
}

/// A database the replace engine can rewrite.
///
/// # Object Safety
/// This trait is object-safe; the engine works with `&dyn ReplaceTarget`.
#[async_trait]
pub trait ReplaceTarget: Send + Sync {
    /// Lists every table in the target database.
    ///
    /// # Errors
    /// Returns [`crate::DbReplaceError::TableListing`] on failure.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Reads the column metadata of `table`, in schema order.
    ///
    /// # Errors
    /// Returns [`crate::DbReplaceError::Introspection`] on failure.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Streams every row of `table` into `visitor`, returning the number of
    /// rows read.
    ///
    /// Rows are handed over as they arrive from the cursor; the table is
    /// never materialised.
    ///
    /// # Errors
    /// Returns [`crate::DbReplaceError::Scan`] when the scan fails, or the
    /// visitor's own error.
    async fn scan_table(&self, table: &str, visitor: &mut dyn RowVisitor) -> Result<u64>;

    /// Executes one UPDATE as its own statement, returning the number of
    /// rows the server reports as affected.
    ///
    /// # Errors
    /// Returns [`crate::DbReplaceError::Update`] on failure.
    async fn execute_update(&self, update: &RowUpdate) -> Result<u64>;
}
