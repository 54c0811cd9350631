//! Database configuration
//!
//! Settings are read from `snapdb.toml` in the database directory when it
//! exists; every field is optional and falls back to its default.
//!
//! ```toml
//! snapshot_file = "Sync.db"
//! on_corruption = "reset"   # or "abort"
//! fsync = true
//! ```

use serde::{Deserialize, Serialize};
use snapdb_core::{Error, Result};
use snapdb_durability::DEFAULT_SNAPSHOT_FILE;
use std::fs;
use std::path::Path;

/// Name of the configuration file inside the database directory
pub const CONFIG_FILE_NAME: &str = "snapdb.toml";

/// What to do when the snapshot cannot be read at open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptionPolicy {
    /// Start with an empty store; the loss is visible in the load report
    #[default]
    Reset,
    /// Fail `open` with `LoadCorruption`
    Abort,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Snapshot file name inside the database directory
    pub snapshot_file: String,
    /// Behavior on an unreadable snapshot
    pub on_corruption: CorruptionPolicy,
    /// Fsync the snapshot before it replaces the previous one
    pub fsync: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snapshot_file: DEFAULT_SNAPSHOT_FILE.to_string(),
            on_corruption: CorruptionPolicy::Reset,
            fsync: true,
        }
    }
}

impl SnapConfig {
    /// Read `dir/snapdb.toml`, or return defaults if it does not exist
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(target: "snapdb::engine", path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write `dir/snapdb.toml`
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: e.to_string(),
        })?;
        fs::write(dir.as_ref().join(CONFIG_FILE_NAME), text)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.snapshot_file.is_empty()
            || self.snapshot_file.contains(|c: char| c == '/' || c == '\\')
            || self.snapshot_file == CONFIG_FILE_NAME
            || self.snapshot_file == "."
            || self.snapshot_file == ".."
        {
            return Err(Error::Config {
                reason: format!("invalid snapshot_file '{}'", self.snapshot_file),
            });
        }
        Ok(())
    }

    /// Builder-style override of the snapshot file name
    pub fn with_snapshot_file(mut self, name: impl Into<String>) -> Self {
        self.snapshot_file = name.into();
        self
    }

    /// Builder-style override of the corruption policy
    pub fn with_corruption_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.on_corruption = policy;
        self
    }

    /// Builder-style override of fsync
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }
}
