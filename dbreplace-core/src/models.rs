//! Data model for a replace run: column metadata, decoded values, and rows.
//!
//! Everything here is transient. A [`ScannedRow`] lives for exactly one
//! iteration of the table rewriter and is dropped before the next row is
//! read from the cursor.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

/// One column of a table as reported by schema introspection.
///
/// Mirrors the fields `DESCRIBE <table>` returns. Only `name` and
/// `data_type` take part in text classification; `key` feeds the
/// primary-key identity strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Declared type as written in the schema, e.g. `varchar(255)`
    pub data_type: String,
    /// Whether the column accepts NULL
    pub is_nullable: bool,
    /// Key marker (`PRI`, `UNI`, `MUL`, or empty)
    pub key: String,
    /// Column default, if any
    pub default_value: Option<String>,
    /// Extra attributes such as `auto_increment`
    pub extra: String,
}

impl ColumnDescriptor {
    /// Creates a nullable, non-key descriptor with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            key: String::new(),
            default_value: None,
            extra: String::new(),
        }
    }

    /// Builder method to mark the column as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.key = "PRI".to_string();
        self.is_nullable = false;
        self
    }

    /// Returns true when the column belongs to the table's primary key.
    pub fn is_primary_key(&self) -> bool {
        self.key.eq_ignore_ascii_case("PRI")
    }
}

/// A dynamically typed column value decoded from a scan.
///
/// `Other` carries scalars (numbers, dates, decimals, ...) already rendered
/// to the text form the server prints them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    /// SQL NULL
    Null,
    /// Character data
    Text(String),
    /// Raw byte sequence (binary columns or non UTF-8 data)
    Bytes(Vec<u8>),
    /// Any other scalar, rendered to its display string
    Other(String),
}

impl ColumnValue {
    /// Returns true for SQL NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value to the string used for comparison and replacement.
    ///
    /// Returns `None` for NULL. Byte sequences are decoded lossily.
    pub fn render(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Text(s) | Self::Other(s) => Some(Cow::Borrowed(s)),
            Self::Bytes(b) => Some(String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One row of a full-table scan.
///
/// Values are aligned positionally with `columns`, which is shared by every
/// row of the same scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRow {
    columns: Arc<[String]>,
    values: Vec<ColumnValue>,
}

impl ScannedRow {
    /// Creates a row from the scan's column list and the decoded values.
    ///
    /// # Errors
    /// Returns a configuration error if the value count does not match the
    /// column count.
    pub fn new(columns: Arc<[String]>, values: Vec<ColumnValue>) -> crate::Result<Self> {
        if columns.len() != values.len() {
            return Err(crate::error::DbReplaceError::configuration(format!(
                "row has {} values for {} columns",
                values.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Column names in scan order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Looks a value up by column name.
    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Iterates over (column name, value) pairs in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Returns true when every value in the row is NULL.
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(ColumnValue::is_null)
    }
}
