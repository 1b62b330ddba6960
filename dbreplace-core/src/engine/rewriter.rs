//! Per-table rewriting: classify, scan, replace, update.

use super::{RowUpdate, plan_changes, unmatched_columns};
use crate::Result;
use crate::adapters::{ReplaceTarget, RowVisitor};
use crate::classify;
use crate::config::ReplaceConfig;
use crate::models::ScannedRow;
use crate::report::TableReport;
use async_trait::async_trait;
use tracing::{debug, trace, warn};

/// Rows per table whose non-matching columns are logged at DEBUG.
const NO_MATCH_SAMPLE_ROWS: u64 = 3;

/// Scan visitor that applies the replacement to each row of one table.
///
/// Each changed row gets exactly one UPDATE, executed before the next row
/// is read. Unchanged rows issue nothing.
pub struct TableRewriter<'a> {
    target: &'a dyn ReplaceTarget,
    config: &'a ReplaceConfig,
    key_columns: Vec<String>,
    report: TableReport,
}

impl<'a> TableRewriter<'a> {
    /// Creates a rewriter for `table`.
    pub fn new(
        target: &'a dyn ReplaceTarget,
        config: &'a ReplaceConfig,
        table: &str,
        text_columns: Vec<String>,
        key_columns: Vec<String>,
    ) -> Self {
        Self {
            target,
            config,
            key_columns,
            report: TableReport::new(table, text_columns),
        }
    }

    /// Consumes the rewriter and returns the accumulated report.
    pub fn finish(self) -> TableReport {
        self.report
    }
}

#[async_trait]
impl<'a> RowVisitor for TableRewriter<'a> {
    async fn visit(&mut self, row: ScannedRow) -> Result<()> {
        self.report.rows_scanned = self.report.rows_scanned.saturating_add(1);

        if self.report.rows_scanned <= NO_MATCH_SAMPLE_ROWS {
            for (column, value) in
                unmatched_columns(&row, &self.report.text_columns, self.config.search())
            {
                debug!(
                    "    No match in column {}: '{}' (searching for: '{}')",
                    column,
                    value,
                    self.config.search()
                );
            }
        }

        let changes = plan_changes(
            &row,
            &self.report.text_columns,
            self.config.search(),
            self.config.replace(),
        );
        if changes.is_empty() {
            return Ok(());
        }

        for change in &changes {
            debug!(
                "    Found match in column {}: '{}' -> '{}'",
                change.column, change.original, change.replaced
            );
        }

        let update = RowUpdate::plan(
            &self.report.table,
            &changes,
            &row,
            self.config.identity,
            &self.key_columns,
        )?;
        trace!("    {}", update.to_sql());

        let affected = self.target.execute_update(&update).await?;
        if affected == 0 {
            warn!(
                "Update in table {} matched no row; it may have changed during the scan",
                self.report.table
            );
            self.report.rows_unmatched = self.report.rows_unmatched.saturating_add(1);
        }

        self.report.rows_updated = self.report.rows_updated.saturating_add(1);
        // One unit per changed column, however many occurrences it held.
        self.report.replacements = self
            .report
            .replacements
            .saturating_add(u64::try_from(changes.len()).unwrap_or(u64::MAX));
        Ok(())
    }
}

/// Processes one table and returns its report.
///
/// Tables without text columns are skipped without a row scan. Updates
/// already applied stay committed if a later row fails.
///
/// # Errors
/// Propagates introspection, scan, and update errors, and the fatal
/// [`crate::DbReplaceError::UntargetableRow`].
pub async fn process_table(
    target: &dyn ReplaceTarget,
    table: &str,
    config: &ReplaceConfig,
) -> Result<TableReport> {
    let columns = target.describe_table(table).await?;
    let text_columns = classify::text_columns(&columns);

    debug!("  Table {}: found text columns: {:?}", table, text_columns);

    if text_columns.is_empty() {
        return Ok(TableReport::new(table, text_columns));
    }

    let key_columns = classify::primary_key_columns(&columns);
    let mut rewriter = TableRewriter::new(target, config, table, text_columns, key_columns);
    let rows = target.scan_table(table, &mut rewriter).await?;

    debug!("  Processed {} rows in table {}", rows, table);

    Ok(rewriter.finish())
}
