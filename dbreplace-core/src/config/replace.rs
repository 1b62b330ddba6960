//! Replacement settings: the literal pair, verbosity, and row identity.

use crate::error::DbReplaceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the UPDATE for a changed row identifies that row.
///
/// Both strategies are best-effort. Nothing locks the row between the scan
/// and the update, so a concurrent writer can change it in between. With
/// `FullRow`, physically identical rows are all updated together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    /// Equality on every column whose original value is non-null.
    #[default]
    FullRow,
    /// Equality on the primary key columns when the table has a primary key
    /// and all of its values are non-null, otherwise `FullRow`.
    PrimaryKey,
}

impl IdentityStrategy {
    /// CLI spelling of the strategy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullRow => "full-row",
            Self::PrimaryKey => "primary-key",
        }
    }
}

impl fmt::Display for IdentityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityStrategy {
    type Err = DbReplaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full-row" | "full_row" | "fullrow" => Ok(Self::FullRow),
            "primary-key" | "primary_key" | "pk" => Ok(Self::PrimaryKey),
            other => Err(DbReplaceError::configuration(format!(
                "unknown identity strategy '{other}' (expected full-row or primary-key)"
            ))),
        }
    }
}

/// What to replace across the database.
///
/// # Example
/// ```rust
/// use dbreplace_core::config::{IdentityStrategy, ReplaceConfig};
///
/// let config = ReplaceConfig::new("old.site.com", "new.site.com")?
///     .with_identity(IdentityStrategy::PrimaryKey);
/// assert_eq!(config.search(), "old.site.com");
/// # Ok::<(), dbreplace_core::DbReplaceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceConfig {
    search: String,
    replace: String,
    /// Log every table, including those without changes
    pub verbose: bool,
    /// Row identity strategy for generated UPDATE statements
    pub identity: IdentityStrategy,
}

impl ReplaceConfig {
    /// Creates a replacement config.
    ///
    /// An empty `replace` deletes every occurrence of `search`.
    ///
    /// # Errors
    /// Returns a configuration error when `search` is empty.
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> crate::Result<Self> {
        let search = search.into();
        if search.is_empty() {
            return Err(DbReplaceError::configuration(
                "search literal must not be empty",
            ));
        }
        Ok(Self {
            search,
            replace: replace.into(),
            verbose: false,
            identity: IdentityStrategy::default(),
        })
    }

    /// Builder method to set verbosity.
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builder method to set the identity strategy.
    pub const fn with_identity(mut self, identity: IdentityStrategy) -> Self {
        self.identity = identity;
        self
    }

    /// The literal to find.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The literal to substitute.
    pub fn replace(&self) -> &str {
        &self.replace
    }
}
