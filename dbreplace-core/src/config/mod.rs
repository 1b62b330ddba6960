//! Configuration types for a replace run.
//!
//! - `ConnectionConfig`: where to connect (no credentials)
//! - `ReplaceConfig`: what to replace and how rows are targeted
//!
//! # Security
//! These structs do NOT store passwords. Credentials travel separately in
//! [`crate::security::Credentials`].

mod connection;
mod replace;

pub use connection::{ConnectionConfig, DEFAULT_MYSQL_PORT};
pub use replace::{IdentityStrategy, ReplaceConfig};
