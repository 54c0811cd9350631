//! Error types for SnapDB
//!
//! Every fallible operation in the workspace returns [`Result<T>`], whose
//! error side is the single [`Error`] enum defined here.
//!
//! ## Propagation
//!
//! | Kind | Surfaced |
//! |------|----------|
//! | Structural / type errors | Synchronously to the caller |
//! | Commit I/O errors | Sync commit: returned. Async commit: listener or log |
//! | Snapshot corruption | Recovered on load, or returned under the abort policy |

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across all SnapDB crates
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by SnapDB
#[derive(Debug, Error)]
pub enum Error {
    /// A primitive was not text, number, or boolean
    #[error("invalid value type {found}: primitives must be one of text, number or boolean")]
    InvalidValueType {
        /// Description of the rejected value
        found: String,
    },

    /// A record key was rejected
    #[error("invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// An update targeted a key that holds nothing
    #[error("no value associated with key '{key}'")]
    NoSuchKey {
        /// The missing key
        key: String,
    },

    /// The stored value is not of the requested kind
    #[error("type mismatch for key '{key}': expected {expected}, found {actual}")]
    TypeMismatch {
        /// The key that was read
        key: String,
        /// What the caller asked for
        expected: String,
        /// What is actually stored
        actual: String,
    },

    /// A stored document payload could not be decoded into its type
    #[error("document '{key}' could not be decoded: {reason}")]
    DocumentDecode {
        /// The key holding the document
        key: String,
        /// Decoder message
        reason: String,
    },

    /// The store could not be encoded into a snapshot image
    #[error("snapshot encoding failed: {reason}")]
    Encode {
        /// Encoder message
        reason: String,
    },

    /// Writing the snapshot file failed
    #[error("commit failed: {source}")]
    CommitFailure {
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file could not be read or decoded
    #[error("snapshot is unreadable: {reason}")]
    LoadCorruption {
        /// What went wrong while loading
        reason: String,
    },

    /// The database directory does not satisfy the open contract
    #[error("{} is not a usable database directory: {reason}", path.display())]
    InvalidDirectory {
        /// The offending path
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// The configuration file is malformed
    #[error("configuration error: {reason}")]
    Config {
        /// Parser or writer message
        reason: String,
    },

    /// Any other I/O failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::TypeMismatch`]
    pub fn type_mismatch(
        key: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Error::TypeMismatch {
            key: key.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Build a [`Error::NoSuchKey`]
    pub fn no_such_key(key: impl Into<String>) -> Self {
        Error::NoSuchKey { key: key.into() }
    }

    /// True for errors raised by the file layer during a commit
    pub fn is_commit_failure(&self) -> bool {
        matches!(self, Error::CommitFailure { .. })
    }
}

/// Validate a record key
///
/// Keys must be non-empty. Any other string is accepted, including
/// `"primitives"`.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey {
            reason: "key must not be empty".into(),
        });
    }
    Ok(())
}
