//! In-memory [`ReplaceTarget`] for engine tests.
//!
//! Tables hold rows of [`ColumnValue`]s. Updates are applied with the same
//! equality semantics a SQL engine uses for `col = ?`, so duplicate rows
//! are all matched together.

#![allow(clippy::unwrap_used)]

use super::{ReplaceTarget, RowVisitor};
use crate::Result;
use crate::engine::RowUpdate;
use crate::error::DbReplaceError;
use crate::models::{ColumnDescriptor, ColumnValue, ScannedRow};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub(crate) struct MemoryTable {
    pub(crate) name: String,
    pub(crate) columns: Vec<ColumnDescriptor>,
    pub(crate) rows: Vec<Vec<ColumnValue>>,
}

impl MemoryTable {
    pub(crate) fn new(name: &str, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub(crate) fn row(mut self, values: Vec<ColumnValue>) -> Self {
        self.rows.push(values);
        self
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }
}

#[derive(Debug, Default)]
struct State {
    tables: Vec<MemoryTable>,
    scans: Vec<String>,
    updates: Vec<RowUpdate>,
    applied: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryTarget {
    state: Mutex<State>,
    fail_listing: bool,
    fail_describe: HashSet<String>,
    fail_scan: HashSet<String>,
    fail_update: HashMap<String, usize>,
}

impl MemoryTarget {
    pub(crate) fn new(tables: Vec<MemoryTable>) -> Self {
        Self {
            state: Mutex::new(State {
                tables,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub(crate) fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub(crate) fn failing_describe(mut self, table: &str) -> Self {
        self.fail_describe.insert(table.to_string());
        self
    }

    pub(crate) fn failing_scan(mut self, table: &str) -> Self {
        self.fail_scan.insert(table.to_string());
        self
    }

    /// Fails every update to `table` once `after` updates to it have been
    /// applied.
    pub(crate) fn failing_update(mut self, table: &str, after: usize) -> Self {
        self.fail_update.insert(table.to_string(), after);
        self
    }

    pub(crate) fn scans(&self) -> Vec<String> {
        self.state.lock().unwrap().scans.clone()
    }

    pub(crate) fn updates(&self) -> Vec<RowUpdate> {
        self.state.lock().unwrap().updates.clone()
    }

    pub(crate) fn rows(&self, table: &str) -> Vec<Vec<ColumnValue>> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    fn snapshot(&self, table: &str) -> Option<MemoryTable> {
        let state = self.state.lock().unwrap();
        state.tables.iter().find(|t| t.name == table).cloned()
    }
}

fn not_found(table: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("Table '{table}' doesn't exist"),
    )
}

#[async_trait]
impl ReplaceTarget for MemoryTarget {
    async fn list_tables(&self) -> Result<Vec<String>> {
        if self.fail_listing {
            return Err(DbReplaceError::table_listing(std::io::Error::other(
                "access denied",
            )));
        }
        let state = self.state.lock().unwrap();
        Ok(state.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        if self.fail_describe.contains(table) {
            return Err(DbReplaceError::introspection(
                table,
                std::io::Error::other("permission denied"),
            ));
        }
        self.snapshot(table)
            .map(|t| t.columns)
            .ok_or_else(|| DbReplaceError::introspection(table, not_found(table)))
    }

    async fn scan_table(&self, table: &str, visitor: &mut dyn RowVisitor) -> Result<u64> {
        self.state.lock().unwrap().scans.push(table.to_string());
        if self.fail_scan.contains(table) {
            return Err(DbReplaceError::scan(
                table,
                std::io::Error::other("lost connection"),
            ));
        }

        // Rows are read from a snapshot, like a consistent-read cursor.
        let snapshot = self
            .snapshot(table)
            .ok_or_else(|| DbReplaceError::scan(table, not_found(table)))?;
        let columns: Arc<[String]> = snapshot.columns.iter().map(|c| c.name.clone()).collect();

        let mut count = 0u64;
        for values in snapshot.rows {
            visitor
                .visit(ScannedRow::new(Arc::clone(&columns), values)?)
                .await?;
            count = count.saturating_add(1);
        }
        Ok(count)
    }

    async fn execute_update(&self, update: &RowUpdate) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.updates.push(update.clone());

        let applied = state.applied.get(update.table()).copied().unwrap_or(0);
        if self
            .fail_update
            .get(update.table())
            .is_some_and(|after| applied >= *after)
        {
            return Err(DbReplaceError::update(
                update.table(),
                std::io::Error::other("lock wait timeout exceeded"),
            ));
        }
        let count = state.applied.entry(update.table().to_string()).or_default();
        *count = count.saturating_add(1);

        let table = state
            .tables
            .iter_mut()
            .find(|t| t.name == update.table())
            .ok_or_else(|| DbReplaceError::update(update.table(), not_found(update.table())))?;

        let predicates: Vec<(usize, &ColumnValue)> = update
            .predicates()
            .iter()
            .map(|(column, value)| table.position(column).map(|i| (i, value)))
            .collect::<Option<_>>()
            .ok_or_else(|| {
                DbReplaceError::update(update.table(), std::io::Error::other("unknown column"))
            })?;
        let assignments: Vec<(usize, &String)> = update
            .assignments()
            .iter()
            .map(|(column, value)| table.position(column).map(|i| (i, value)))
            .collect::<Option<_>>()
            .ok_or_else(|| {
                DbReplaceError::update(update.table(), std::io::Error::other("unknown column"))
            })?;

        let mut affected = 0u64;
        for row in &mut table.rows {
            if predicates.iter().all(|(i, value)| row[*i] == **value) {
                for (i, value) in &assignments {
                    row[*i] = ColumnValue::Text((*value).clone());
                }
                affected = affected.saturating_add(1);
            }
        }
        Ok(affected)
    }
}
