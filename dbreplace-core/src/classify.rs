//! Text column classification from declared schema types.
//!
//! A column is textual when its lower-cased declared type contains `char`,
//! `text`, or `varchar`. This is a substring match on the type string, not a
//! semantic type check: `varchar(32)`, `tinytext` and `char(2)` qualify,
//! `varbinary(16)`, `blob` and `enum(...)` do not.

use crate::models::ColumnDescriptor;

const TEXT_TYPE_MARKERS: &[&str] = &["char", "text", "varchar"];

/// Returns true for a declared type that holds character data.
pub fn is_text_type(data_type: &str) -> bool {
    let lower = data_type.to_lowercase();
    TEXT_TYPE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Names of the textual columns, in schema order.
pub fn text_columns(columns: &[ColumnDescriptor]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| is_text_type(&c.data_type))
        .map(|c| c.name.clone())
        .collect()
}

/// Names of the primary key columns, in schema order.
pub fn primary_key_columns(columns: &[ColumnDescriptor]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.is_primary_key())
        .map(|c| c.name.clone())
        .collect()
}
