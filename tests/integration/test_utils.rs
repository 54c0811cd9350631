//! Shared helpers for the integration suite

use serde::{Deserialize, Serialize};
use snapdb::{Database, Document, SnapConfig};
use tempfile::TempDir;

/// Route `tracing` output to the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("snapdb=debug")
        .try_init();
}

/// Config without fsync so tests stay fast
pub fn test_config() -> SnapConfig {
    SnapConfig::default().with_fsync(false)
}

/// Fresh directory plus a database opened in it
pub fn fresh() -> (TempDir, Database) {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let db = Database::open_with_config(dir.path(), test_config()).unwrap();
    (dir, db)
}

/// Open a new session on an existing directory
pub fn reopen(dir: &TempDir) -> Database {
    Database::open_with_config(dir.path(), test_config()).unwrap()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub tags: Vec<String>,
}

impl Document for Profile {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub hits: u64,
}

impl Document for Counter {}
