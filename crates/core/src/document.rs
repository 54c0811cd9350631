//! Document capability and storage cell
//!
//! A Document is an opaque structured record. The store never looks at its
//! fields; it only needs to copy it and to serialize it. Those two
//! capabilities are the [`Document`] trait bounds.
//!
//! # Storage
//!
//! Documents live in a [`DocumentCell`], which is either:
//! - Live: a boxed value created in this session (or already materialized)
//! - Encoded: the payload read from a snapshot, decoded lazily on the first
//!   typed access and cached in a `OnceCell`
//!
//! Deferring the decode means a snapshot can be loaded without knowing every
//! concrete document type up front; a payload whose type is never asked for
//! is written back untouched on the next commit.

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// Capability contract for structured records
///
/// Any `Clone + Serialize + DeserializeOwned` type that is `Send + Sync`
/// can be stored:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use snapdb_core::Document;
///
/// #[derive(Clone, Default, Serialize, Deserialize)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// impl Document for User {}
/// ```
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Tag persisted next to the payload to identify the concrete type
    ///
    /// Defaults to the Rust type name. Override it to keep snapshots
    /// readable across renames or compiler upgrades.
    fn type_tag() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe view of a [`Document`]
trait ErasedDocument: Any + Send + Sync {
    fn encode(&self) -> Result<Vec<u8>, String>;
    fn clone_boxed(&self) -> Box<dyn ErasedDocument>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Document> ErasedDocument for T {
    fn encode(&self) -> Result<Vec<u8>, String> {
        encode_document(self)
    }

    fn clone_boxed(&self) -> Box<dyn ErasedDocument> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Encode a document payload (MessagePack with named fields)
pub fn encode_document<T: Serialize>(doc: &T) -> Result<Vec<u8>, String> {
    rmp_serde::to_vec_named(doc).map_err(|e| e.to_string())
}

fn decode_boxed<T: Document>(payload: &[u8]) -> Result<Box<dyn ErasedDocument>, String> {
    rmp_serde::from_slice::<T>(payload)
        .map(|doc| Box::new(doc) as Box<dyn ErasedDocument>)
        .map_err(|e| e.to_string())
}

enum CellState {
    Live(Box<dyn ErasedDocument>),
    Encoded {
        payload: Vec<u8>,
        decoded: OnceCell<Result<Box<dyn ErasedDocument>, String>>,
    },
}

/// Storage slot for one document
///
/// Typed access goes through [`DocumentCell::downcast_ref`] and
/// [`DocumentCell::downcast_mut`], which return `Ok(None)` when the cell
/// holds a different type and `Err(reason)` when the payload is the right
/// type but cannot be decoded.
pub struct DocumentCell {
    tag: String,
    state: CellState,
}

impl DocumentCell {
    /// Wrap a live document
    pub fn new<T: Document>(doc: T) -> Self {
        Self {
            tag: T::type_tag().to_string(),
            state: CellState::Live(Box::new(doc)),
        }
    }

    /// Rebuild a cell from a persisted tag and payload
    pub fn from_encoded(tag: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            tag: tag.into(),
            state: CellState::Encoded {
                payload,
                decoded: OnceCell::new(),
            },
        }
    }

    /// The persisted type tag
    pub fn type_tag(&self) -> &str {
        &self.tag
    }

    /// Whether this cell was tagged as `T`
    pub fn is<T: Document>(&self) -> bool {
        self.tag == T::type_tag()
    }

    /// Whether the payload has been decoded (or was never encoded)
    pub fn is_materialized(&self) -> bool {
        match &self.state {
            CellState::Live(_) => true,
            CellState::Encoded { decoded, .. } => matches!(decoded.get(), Some(Ok(_))),
        }
    }

    /// Borrow the document as `T`
    pub fn downcast_ref<T: Document>(&self) -> Result<Option<&T>, String> {
        if !self.is::<T>() {
            return Ok(None);
        }
        let erased: &dyn ErasedDocument = match &self.state {
            CellState::Live(doc) => doc.as_ref(),
            CellState::Encoded { payload, decoded } => {
                match decoded.get_or_init(|| decode_boxed::<T>(payload)) {
                    Ok(doc) => doc.as_ref(),
                    Err(reason) => return Err(reason.clone()),
                }
            }
        };
        Ok(erased.as_any().downcast_ref::<T>())
    }

    /// Mutably borrow the document as `T`, materializing it if needed
    ///
    /// After a successful call the cell is live: the next commit re-encodes
    /// it from the (possibly mutated) value.
    pub fn downcast_mut<T: Document>(&mut self) -> Result<Option<&mut T>, String> {
        if !self.is::<T>() {
            return Ok(None);
        }
        if let CellState::Encoded { payload, decoded } = &mut self.state {
            let live = match decoded.take() {
                Some(cached) => cached,
                None => decode_boxed::<T>(payload),
            }?;
            self.state = CellState::Live(live);
        }
        match &mut self.state {
            CellState::Live(doc) => Ok(doc.as_any_mut().downcast_mut::<T>()),
            CellState::Encoded { .. } => Ok(None),
        }
    }

    /// Encoded payload for persistence
    ///
    /// Encoded cells return their original bytes; live cells are serialized.
    pub fn encode(&self) -> Result<Vec<u8>, String> {
        match &self.state {
            CellState::Live(doc) => doc.encode(),
            CellState::Encoded { payload, .. } => Ok(payload.clone()),
        }
    }
}

impl Clone for DocumentCell {
    fn clone(&self) -> Self {
        let state = match &self.state {
            CellState::Live(doc) => CellState::Live(doc.clone_boxed()),
            CellState::Encoded { payload, .. } => CellState::Encoded {
                payload: payload.clone(),
                decoded: OnceCell::new(),
            },
        };
        Self {
            tag: self.tag.clone(),
            state,
        }
    }
}

/// Structural equality: same tag and same encoded payload
impl PartialEq for DocumentCell {
    fn eq(&self, other: &Self) -> bool {
        if self.tag != other.tag {
            return false;
        }
        match (self.encode(), other.encode()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for DocumentCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            CellState::Live(_) => "live",
            CellState::Encoded { .. } => "encoded",
        };
        f.debug_struct("DocumentCell")
            .field("tag", &self.tag)
            .field("state", &state)
            .finish()
    }
}
