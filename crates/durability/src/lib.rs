//! Durability layer for SnapDB
//!
//! - `snapshot`: the backing file (load, atomic save, load reports)
//! - `commit`: the single-writer commit scheduler (sync + async commits)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commit;
pub mod snapshot;

pub use commit::{CommitListener, CommitScheduler, CommitStats};
pub use snapshot::{LoadReport, LoadStatus, SnapshotFile, DEFAULT_SNAPSHOT_FILE};
