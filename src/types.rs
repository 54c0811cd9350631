//! Public types for SnapDB.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Session
// ============================================================================

pub use snapdb_engine::{CloseError, Database, Query};

// Configuration
pub use snapdb_engine::{CorruptionPolicy, SnapConfig, CONFIG_FILE_NAME};

// Commit outcomes and load diagnostics
pub use snapdb_engine::{CommitListener, CommitStats, LoadReport, LoadStatus};

// ============================================================================
// Values
// ============================================================================

pub use snapdb_core::{Document, DocumentCell, Element, IntoPrimitive, Primitive, ValueKind};

// ============================================================================
// Errors
// ============================================================================

pub use snapdb_core::{Error, Result};
