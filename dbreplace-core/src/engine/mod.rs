//! Replace-and-update engine.
//!
//! # Module Structure
//! - `update`: UPDATE statement planning with identity predicates
//! - `rewriter`: per-table scan visitor that issues updates
//! - `run`: run orchestration across every table
//!
//! `replace_literal` and `plan_changes` are pure: they decide what changes in a
//! row without touching the database.

mod rewriter;
mod run;
mod update;


pub use rewriter::{TableRewriter, process_table};
pub use run::run_replace;
pub use update::{RowUpdate, identity_predicates, quote_identifier};

use crate::models::{ColumnValue, ScannedRow};
use std::borrow::Cow;

/// A single column whose value changes under replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChange {
    /// Column name
    pub column: String,
    /// Rendered original value
    pub original: String,
    /// Value after replacement
    pub replaced: String,
}

/// Replaces every non-overlapping occurrence of `search` with `replace`.
///
/// Occurrences are found left to right and the scan resumes after each
/// replacement, so `replace` is never re-scanned. An empty `search` leaves
/// the input unchanged.
///
/// # Example
/// ```rust
/// use dbreplace_core::engine::replace_literal;
///
/// assert_eq!(replace_literal("aaa", "aa", "b"), "ba");
/// assert_eq!(replace_literal("a.b.c", ".", ""), "abc");
/// ```
pub fn replace_literal(value: &str, search: &str, replace: &str) -> String {
    if search.is_empty() {
        return value.to_string();
    }
    value.replace(search, replace)
}

/// Computes the column changes for one row.
///
/// Each classified text column is looked up in the row by name. Columns
/// missing from the scan or holding NULL are skipped. A column appears in
/// the result only when its value actually changes.
pub fn plan_changes(
    row: &ScannedRow,
    text_columns: &[String],
    search: &str,
    replace: &str,
) -> Vec<ColumnChange> {
    text_columns
        .iter()
        .filter_map(|column| {
            let original = row.get(column)?.render()?;
            let replaced = replace_literal(&original, search, replace);
            (replaced != *original).then(|| ColumnChange {
                column: column.clone(),
                original: original.into_owned(),
                replaced,
            })
        })
        .collect()
}

/// Text columns of `row` that hold a value without any occurrence of
/// `search`, paired with the rendered value.
pub fn unmatched_columns<'r>(
    row: &'r ScannedRow,
    text_columns: &'r [String],
    search: &str,
) -> Vec<(&'r str, Cow<'r, str>)> {
    text_columns
        .iter()
        .filter_map(|column| {
            let value = row.get(column).and_then(ColumnValue::render)?;
            (!value.contains(search)).then_some((column.as_str(), value))
        })
        .collect()
}
