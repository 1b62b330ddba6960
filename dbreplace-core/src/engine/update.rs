//! UPDATE statement planning.
//!
//! A [`RowUpdate`] holds parameter values, never interpolated SQL, so the
//! replacement text cannot inject anything into the statement.

use super::ColumnChange;
use crate::config::IdentityStrategy;
use crate::error::{DbReplaceError, Result};
use crate::models::{ColumnValue, ScannedRow};

/// Quotes a MySQL identifier with backticks, doubling embedded backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Builds the identity predicates for a row.
///
/// `FullRow` yields an equality predicate for every non-null original value
/// in scan order. `PrimaryKey` yields only the key columns when the table
/// has a key and every key value in the row is non-null; otherwise it falls
/// back to `FullRow`.
pub fn identity_predicates(
    row: &ScannedRow,
    strategy: IdentityStrategy,
    key_columns: &[String],
) -> Vec<(String, ColumnValue)> {
    if strategy == IdentityStrategy::PrimaryKey && !key_columns.is_empty() {
        let key_values: Option<Vec<_>> = key_columns
            .iter()
            .map(|key| {
                row.get(key)
                    .filter(|v| !v.is_null())
                    .map(|v| (key.clone(), v.clone()))
            })
            .collect();
        if let Some(predicates) = key_values {
            return predicates;
        }
        tracing::trace!("Primary key incomplete in scanned row, using full-row identity");
    }

    row.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

/// A planned single-row UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    table: String,
    assignments: Vec<(String, String)>,
    predicates: Vec<(String, ColumnValue)>,
}

impl RowUpdate {
    /// Plans the UPDATE for `changes` found in `row`.
    ///
    /// # Errors
    /// Returns [`DbReplaceError::UntargetableRow`] when no identity predicate
    /// can be built, i.e. every column of the row is NULL.
    pub fn plan(
        table: &str,
        changes: &[ColumnChange],
        row: &ScannedRow,
        strategy: IdentityStrategy,
        key_columns: &[String],
    ) -> Result<Self> {
        let predicates = identity_predicates(row, strategy, key_columns);
        Self::new(
            table,
            changes
                .iter()
                .map(|c| (c.column.clone(), c.replaced.clone()))
                .collect(),
            predicates,
        )
    }

    /// Creates an update from explicit assignments and predicates.
    ///
    /// # Errors
    /// Returns [`DbReplaceError::UntargetableRow`] when `predicates` is empty,
    /// and a configuration error when `assignments` is empty or a predicate
    /// value is NULL.
    pub fn new(
        table: &str,
        assignments: Vec<(String, String)>,
        predicates: Vec<(String, ColumnValue)>,
    ) -> Result<Self> {
        if assignments.is_empty() {
            return Err(DbReplaceError::configuration(format!(
                "update for table '{table}' has no assignments"
            )));
        }
        if predicates.is_empty() {
            return Err(DbReplaceError::untargetable_row(table));
        }
        if predicates.iter().any(|(_, v)| v.is_null()) {
            return Err(DbReplaceError::configuration(format!(
                "update for table '{table}' compares a column against NULL"
            )));
        }
        Ok(Self {
            table: table.to_string(),
            assignments,
            predicates,
        })
    }

    /// Target table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// (column, new value) pairs for the SET clause, in bind order.
    pub fn assignments(&self) -> &[(String, String)] {
        &self.assignments
    }

    /// (column, original value) pairs for the WHERE clause, in bind order.
    pub fn predicates(&self) -> &[(String, ColumnValue)] {
        &self.predicates
    }

    /// Renders the parameterised statement. Assignment values bind first,
    /// then predicate values.
    ///
    /// # Example
    /// ```rust
    /// use dbreplace_core::engine::RowUpdate;
    /// use dbreplace_core::models::ColumnValue;
    ///
    /// let update = RowUpdate::new(
    ///     "users",
    ///     vec![("bio".into(), "new".into())],
    ///     vec![("id".into(), ColumnValue::Other("1".into()))],
    /// )?;
    /// assert_eq!(update.to_sql(), "UPDATE `users` SET `bio` = ? WHERE `id` = ?");
    /// # Ok::<(), dbreplace_core::DbReplaceError>(())
    /// ```
    pub fn to_sql(&self) -> String {
        let set = self
            .assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", quote_identifier(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let filter = self
            .predicates
            .iter()
            .map(|(column, _)| format!("{} = ?", quote_identifier(column)))
            .collect::<Vec<_>>()
            .join(" AND ");
        format!(
            "UPDATE {} SET {} WHERE {}",
            quote_identifier(&self.table),
            set,
            filter
        )
    }
}
