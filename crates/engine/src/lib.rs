//! Database engine for SnapDB
//!
//! Ties the store and the durability layer together behind [`Database`]:
//! - `database`: the session handle (open, typed access, commits, close)
//! - `query`: read-only queries over a session
//! - `config`: `snapdb.toml` settings

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod query;

pub use config::{CorruptionPolicy, SnapConfig, CONFIG_FILE_NAME};
pub use database::{CloseError, Database};
pub use query::Query;
pub use snapdb_durability::{CommitListener, CommitStats, LoadReport, LoadStatus};
