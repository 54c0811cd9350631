//! SnapDB: an embedded key/value store persisted as a single snapshot file
//!
//! Every session holds its whole dataset in memory. Commits serialize the
//! dataset and atomically replace the snapshot on disk.
//!
//! ```ignore
//! use snapdb::prelude::*;
//!
//! let mut db = Database::open("./data")?;
//! db.put("greeting", "hello")?;
//! db.commit_sync()?;
//! ```

#![warn(missing_docs)]

pub mod types;

pub use types::*;

/// Everything needed for typical use
pub mod prelude {
    pub use crate::types::*;
}
