//! Snapshot image: the serializable form of a whole store
//!
//! The image is what gets written to the snapshot file. Primitives have
//! their own field instead of hiding under a reserved key in the record
//! map, so no user key is off limits.
//!
//! The encoding is MessagePack with named fields. There is no header and no
//! format version; a change to the stored types is not backward compatible.

use crate::error::{Error, Result};
use crate::primitive::Primitive;
use serde::{Deserialize, Serialize};

/// Persisted form of a list element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredElement {
    /// A primitive, stored inline
    Primitive(Primitive),
    /// A document: type tag plus opaque payload
    Document {
        /// Type tag of the concrete document type
        tag: String,
        /// Payload produced by the document's serializer
        payload: Vec<u8>,
    },
}

/// Persisted form of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredRecord {
    /// A list, stored inline
    List(Vec<StoredElement>),
    /// A document: type tag plus opaque payload
    Document {
        /// Type tag of the concrete document type
        tag: String,
        /// Payload produced by the document's serializer
        payload: Vec<u8>,
    },
}

/// Whole-store image
///
/// `records` keeps the record map's iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotImage {
    /// Primitive entries, sorted by key
    #[serde(default)]
    pub primitives: Vec<(String, Primitive)>,
    /// Lists and documents in map order
    #[serde(default)]
    pub records: Vec<(String, StoredRecord)>,
}

impl SnapshotImage {
    /// True when the image holds nothing
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.records.is_empty()
    }

    /// Serialize to bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self).map_err(|e| Error::Encode {
            reason: e.to_string(),
        })
    }

    /// Deserialize from bytes
    ///
    /// Any decode failure is reported as [`Error::LoadCorruption`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::LoadCorruption {
            reason: e.to_string(),
        })
    }
}
