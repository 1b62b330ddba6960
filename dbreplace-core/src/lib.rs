//! Core library for dbreplace: literal find-and-replace across every text
//! column of every table in a MySQL database.
//!
//! The engine scans each table, rewrites the classified text columns of a
//! row in memory, and issues one parameterised UPDATE per changed row,
//! targeting the row by the values it was read with.
//!
//! # Security Guarantees
//! - Credentials live in zeroizing containers and never reach logs or errors
//! - Every value in an UPDATE is bound as a parameter, never interpolated
//! - Identifiers are backtick-quoted
//!
//! # Architecture
//! - `adapters`: the [`adapters::ReplaceTarget`] seam and its MySQL backend
//! - `engine`: pure row planning plus per-table and per-run orchestration
//! - `report`: per-table and whole-run accounting

pub mod adapters;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod security;

// Re-export commonly used types
#[cfg(feature = "mysql")]
pub use adapters::mysql::MySqlTarget;
pub use adapters::{ReplaceTarget, RowVisitor};
pub use config::{ConnectionConfig, DEFAULT_MYSQL_PORT, IdentityStrategy, ReplaceConfig};
pub use engine::{process_table, run_replace};
pub use error::{DbReplaceError, Result};
pub use logging::init_logging;
pub use models::{ColumnDescriptor, ColumnValue, ScannedRow};
pub use report::{RunReport, TableFailure, TableReport};
pub use security::Credentials;
