//! Core types for SnapDB
//!
//! This crate defines the value model shared by every other crate:
//! - Primitive / IntoPrimitive: scalar values and their classification
//! - Document / DocumentCell: the structured-record capability and its slot
//! - Element: what a list can hold
//! - Record / ValueKind: what a key can hold
//! - SnapshotImage: the persisted form of a whole store
//! - Error / Result: the single error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod element;
pub mod error;
pub mod image;
pub mod primitive;
pub mod record;

pub use document::{encode_document, Document, DocumentCell};
pub use element::Element;
pub use error::{validate_key, Error, Result};
pub use image::{SnapshotImage, StoredElement, StoredRecord};
pub use primitive::{IntoPrimitive, Primitive};
pub use record::{Record, ValueKind};
