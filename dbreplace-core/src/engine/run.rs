//! Run orchestration across all tables.

use super::process_table;
use crate::Result;
use crate::adapters::ReplaceTarget;
use crate::config::ReplaceConfig;
use crate::report::{RunReport, TableReport, error_chain};
use tracing::{error, info};

/// Rewrites every table of `target`, one table at a time.
///
/// A failure listing the tables aborts the run before any mutation.
/// Per-table failures are logged, recorded in the report, and the run moves
/// on to the next table. Fatal errors such as an untargetable row stop the
/// run immediately.
///
/// # Errors
/// Returns the first fatal error encountered.
pub async fn run_replace(
    target: &dyn ReplaceTarget,
    database: &str,
    config: &ReplaceConfig,
) -> Result<RunReport> {
    let mut report = RunReport::start(database, config.search(), config.replace());

    let tables = target.list_tables().await?;
    if config.verbose {
        info!("Found {} tables to process", tables.len());
    }

    for table in tables {
        match process_table(target, &table, config).await {
            Ok(table_report) => {
                log_table(&table_report, config.verbose);
                report.push(table_report);
            }
            Err(e) if e.is_fatal() => {
                error!("Aborting run at table {}: {}", table, error_chain(&e));
                return Err(e);
            }
            Err(e) => {
                error!("Error processing table {}: {}", table, error_chain(&e));
                report.record_failure(table, &e);
            }
        }
    }

    report.finish();
    info!("Total replacements: {}", report.total_replacements());
    Ok(report)
}

fn log_table(report: &TableReport, verbose: bool) {
    if report.replacements > 0 || verbose {
        info!(
            "Table {}: {} replacements",
            report.table, report.replacements
        );
    }
}
