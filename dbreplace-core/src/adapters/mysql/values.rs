//! Decoding of scanned MySQL values.
//!
//! Scans run over the text protocol, so every non-null value arrives as the
//! bytes the server printed. The column's reported type decides whether
//! those bytes are character data, raw binary, or a rendered scalar.

use crate::models::ColumnValue;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo};
use std::sync::Arc;

/// How a MySQL column type is represented in a [`ColumnValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Character data
    Text,
    /// Binary strings and blobs
    Bytes,
    /// Numbers, temporal types, and everything else
    Other,
}

/// Maps a driver type name (e.g. `VARCHAR`, `BLOB`, `INT UNSIGNED`) to the
/// value representation used for scanning.
pub fn value_kind(type_name: &str) -> ValueKind {
    let upper = type_name.to_ascii_uppercase();
    if upper.contains("BINARY") || upper.contains("BLOB") {
        ValueKind::Bytes
    } else if upper.contains("CHAR")
        || upper.contains("TEXT")
        || matches!(upper.as_str(), "ENUM" | "SET" | "JSON")
    {
        ValueKind::Text
    } else {
        ValueKind::Other
    }
}

/// Builds a [`ColumnValue`] from raw text-protocol bytes.
///
/// Character data that is not valid UTF-8 is kept as bytes so it can still
/// be matched by value.
pub(super) fn from_wire(kind: ValueKind, raw: Option<Vec<u8>>) -> ColumnValue {
    let Some(bytes) = raw else {
        return ColumnValue::Null;
    };
    match kind {
        ValueKind::Bytes => ColumnValue::Bytes(bytes),
        ValueKind::Text => match String::from_utf8(bytes) {
            Ok(text) => ColumnValue::Text(text),
            Err(e) => ColumnValue::Bytes(e.into_bytes()),
        },
        ValueKind::Other => match String::from_utf8(bytes) {
            Ok(text) => ColumnValue::Other(text),
            Err(e) => ColumnValue::Bytes(e.into_bytes()),
        },
    }
}

pub(super) fn column_names(row: &MySqlRow) -> Arc<[String]> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

pub(super) fn decode_row(row: &MySqlRow) -> Result<Vec<ColumnValue>, sqlx::Error> {
    row.columns()
        .iter()
        .map(|column| {
            let kind = value_kind(column.type_info().name());
            // Unchecked: the raw bytes are wanted whatever the column type.
            let raw: Option<Vec<u8>> = row.try_get_unchecked(column.ordinal())?;
            Ok(from_wire(kind, raw))
        })
        .collect()
}
