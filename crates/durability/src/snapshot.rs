//! Snapshot file
//!
//! One file per database holds the complete encoded store. Loading reads it
//! in one shot; saving replaces it in one shot.
//!
//! Writes use temp file + rename so a crash mid-commit leaves either the old
//! snapshot or the new one, never a torn file.

use snapdb_core::{Error, Result, SnapshotImage};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default snapshot file name
pub const DEFAULT_SNAPSHOT_FILE: &str = "Sync.db";

/// What happened when the snapshot was loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No snapshot existed; an empty one was created
    Created,
    /// The snapshot file was empty
    Empty,
    /// The snapshot was decoded
    Loaded,
    /// The snapshot could not be read or decoded; the store starts empty
    Recovered {
        /// Why the snapshot was discarded
        reason: String,
    },
}

/// Outcome of [`SnapshotFile::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Load status
    pub status: LoadStatus,
    /// Number of records in the loaded image
    pub records: usize,
    /// Number of primitives in the loaded image
    pub primitives: usize,
    /// Snapshot size on disk
    pub bytes: u64,
}

impl LoadReport {
    fn empty(status: LoadStatus, bytes: u64) -> Self {
        Self {
            status,
            records: 0,
            primitives: 0,
            bytes,
        }
    }

    /// True if a corrupt snapshot was discarded
    pub fn is_recovered(&self) -> bool {
        matches!(self.status, LoadStatus::Recovered { .. })
    }

    /// The recovery reason, if the snapshot was discarded
    pub fn corruption(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Recovered { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Binding between a database directory and its snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    tmp_path: PathBuf,
    fsync: bool,
}

impl SnapshotFile {
    /// Bind `dir/file_name`
    ///
    /// # Arguments
    ///
    /// * `dir` - Database directory
    /// * `file_name` - Snapshot file name inside `dir`
    /// * `fsync` - Whether to fsync the temp file before renaming it
    pub fn new(dir: impl AsRef<Path>, file_name: &str, fsync: bool) -> Self {
        let dir = dir.as_ref();
        Self {
            path: dir.join(file_name),
            tmp_path: dir.join(format!("{}.tmp", file_name)),
            fsync,
        }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temp file used during saves
    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }

    /// Load the snapshot
    ///
    /// A missing file is created empty. A read or decode failure never
    /// errors here: it is logged and reported as [`LoadStatus::Recovered`]
    /// with an empty image, leaving the decision to abort to the caller.
    /// Only failing to create a missing file is an error.
    pub fn load(&self) -> Result<(SnapshotImage, LoadReport)> {
        if !self.path.exists() {
            File::create(&self.path)?;
            tracing::info!(target: "snapdb::snapshot", path = %self.path.display(), "Created empty snapshot");
            return Ok((
                SnapshotImage::default(),
                LoadReport::empty(LoadStatus::Created, 0),
            ));
        }

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => return Ok(self.recovered(format!("read failed: {}", e), 0)),
        };
        let size = bytes.len() as u64;

        if bytes.is_empty() {
            return Ok((
                SnapshotImage::default(),
                LoadReport::empty(LoadStatus::Empty, 0),
            ));
        }

        match SnapshotImage::decode(&bytes) {
            Ok(image) => {
                let report = LoadReport {
                    status: LoadStatus::Loaded,
                    records: image.records.len(),
                    primitives: image.primitives.len(),
                    bytes: size,
                };
                tracing::debug!(
                    target: "snapdb::snapshot",
                    path = %self.path.display(),
                    records = report.records,
                    primitives = report.primitives,
                    bytes = size,
                    "Loaded snapshot"
                );
                Ok((image, report))
            }
            Err(e) => Ok(self.recovered(e.to_string(), size)),
        }
    }

    fn recovered(&self, reason: String, bytes: u64) -> (SnapshotImage, LoadReport) {
        tracing::warn!(
            target: "snapdb::snapshot",
            path = %self.path.display(),
            reason = %reason,
            "Snapshot unreadable, starting with an empty store"
        );
        (
            SnapshotImage::default(),
            LoadReport::empty(LoadStatus::Recovered { reason }, bytes),
        )
    }

    /// Replace the snapshot with `bytes`
    ///
    /// Any I/O failure is returned as [`Error::CommitFailure`]; the temp
    /// file is cleaned up on a best-effort basis.
    pub fn save(&self, bytes: &[u8]) -> Result<()> {
        self.write_and_rename(bytes).map_err(|source| {
            let _ = fs::remove_file(&self.tmp_path);
            Error::CommitFailure { source }
        })
    }

    fn write_and_rename(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.tmp_path)?;
        file.write_all(bytes)?;
        if self.fsync {
            file.sync_all()?;
        }
        drop(file);
        fs::rename(&self.tmp_path, &self.path)
    }
}
