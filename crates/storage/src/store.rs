//! In-memory store
//!
//! Holds the two maps of a session:
//! - records: lists and documents, iterated in last-insertion order
//! - primitives: scalar entries, kept sorted by key
//!
//! # Design
//!
//! - FxHashMap: O(1) key lookups for records
//! - BTreeMap<u64, String>: insertion-sequence index giving a stable,
//!   deterministic iteration order
//! - Replacing a key assigns a fresh sequence, so it moves to the end;
//!   removing a key drops it from both maps
//!
//! MemoryStore has no interior locking. Mutation needs `&mut self`; callers
//! that share a store across threads wrap it in their own lock.

use rustc_hash::FxHashMap;
use snapdb_core::{
    DocumentCell, Element, Error, Primitive, Record, Result, SnapshotImage, StoredElement,
    StoredRecord,
};
use std::collections::BTreeMap;

/// Record plus its position in iteration order
#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    record: Record,
}

/// Order-preserving in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: FxHashMap<String, Slot>,
    order: BTreeMap<u64, String>,
    primitives: BTreeMap<String, Primitive>,
    next_seq: u64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records (lists and documents)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there are no records and no primitives
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.primitives.is_empty()
    }

    /// Number of primitive entries
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Check if a record exists under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Get a record by key
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key).map(|slot| &slot.record)
    }

    /// Get a mutable record by key
    ///
    /// Mutating in place does not change the key's position.
    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.records.get_mut(key).map(|slot| &mut slot.record)
    }

    /// Insert or replace a record
    ///
    /// The key moves to the end of iteration order. Returns the previous
    /// record if there was one.
    pub fn insert(&mut self, key: impl Into<String>, record: Record) -> Option<Record> {
        let key = key.into();
        let seq = self.bump_seq();
        self.order.insert(seq, key.clone());
        let previous = self.records.insert(key, Slot { seq, record })?;
        self.order.remove(&previous.seq);
        Some(previous.record)
    }

    /// Return the record under `key`, inserting `make()` first if absent
    ///
    /// An existing record keeps its position.
    pub fn get_or_insert_with<F>(&mut self, key: &str, make: F) -> &mut Record
    where
        F: FnOnce() -> Record,
    {
        let next_seq = &mut self.next_seq;
        let order = &mut self.order;
        let slot = self.records.entry(key.to_string()).or_insert_with(|| {
            *next_seq += 1;
            order.insert(*next_seq, key.to_string());
            Slot {
                seq: *next_seq,
                record: make(),
            }
        });
        &mut slot.record
    }

    /// Remove a record
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        let slot = self.records.remove(key)?;
        self.order.remove(&slot.seq);
        Some(slot.record)
    }

    /// Iterate records in last-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> + '_ {
        self.order.values().filter_map(move |key| {
            self.records
                .get(key)
                .map(|slot| (key.as_str(), &slot.record))
        })
    }

    /// Record keys in iteration order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.values().map(String::as_str)
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    /// Get a primitive by key
    pub fn primitive(&self, key: &str) -> Option<&Primitive> {
        self.primitives.get(key)
    }

    /// Set or clear a primitive
    ///
    /// `None` removes the entry. Returns the previous value.
    pub fn set_primitive(
        &mut self,
        key: impl Into<String>,
        value: Option<Primitive>,
    ) -> Option<Primitive> {
        let key = key.into();
        match value {
            Some(value) => self.primitives.insert(key, value),
            None => self.primitives.remove(&key),
        }
    }

    /// Iterate primitives sorted by key
    pub fn primitives(&self) -> impl Iterator<Item = (&str, &Primitive)> + '_ {
        self.primitives.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ========================================================================
    // Snapshot images
    // ========================================================================

    /// Build the persisted image of the whole store
    ///
    /// Fails only if a live document refuses to serialize.
    pub fn to_image(&self) -> Result<SnapshotImage> {
        let primitives = self
            .primitives
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut records = Vec::with_capacity(self.records.len());
        for (key, record) in self.iter() {
            let stored = match record {
                Record::List(items) => StoredRecord::List(
                    items
                        .iter()
                        .map(|element| store_element(key, element))
                        .collect::<Result<_>>()?,
                ),
                Record::Document(cell) => StoredRecord::Document {
                    tag: cell.type_tag().to_string(),
                    payload: encode_cell(key, cell)?,
                },
            };
            records.push((key.to_string(), stored));
        }

        Ok(SnapshotImage {
            primitives,
            records,
        })
    }

    /// Rebuild a store from an image
    ///
    /// Record order follows the image. Documents stay encoded until first
    /// typed access. A key repeated in the image keeps its last occurrence.
    pub fn from_image(image: SnapshotImage) -> Self {
        let mut store = Self::new();
        for (key, value) in image.primitives {
            store.primitives.insert(key, value);
        }
        for (key, stored) in image.records {
            let record = match stored {
                StoredRecord::List(items) => {
                    Record::List(items.into_iter().map(load_element).collect())
                }
                StoredRecord::Document { tag, payload } => {
                    Record::Document(DocumentCell::from_encoded(tag, payload))
                }
            };
            if store.insert(key.clone(), record).is_some() {
                tracing::warn!(target: "snapdb::storage", key = %key, "Duplicate key in snapshot image, keeping last");
            }
        }
        store
    }
}

fn encode_cell(key: &str, cell: &DocumentCell) -> Result<Vec<u8>> {
    cell.encode().map_err(|reason| Error::Encode {
        reason: format!("document '{}': {}", key, reason),
    })
}

fn store_element(key: &str, element: &Element) -> Result<StoredElement> {
    Ok(match element {
        Element::Primitive(p) => StoredElement::Primitive(p.clone()),
        Element::Document(cell) => StoredElement::Document {
            tag: cell.type_tag().to_string(),
            payload: encode_cell(key, cell)?,
        },
    })
}

fn load_element(stored: StoredElement) -> Element {
    match stored {
        StoredElement::Primitive(p) => Element::Primitive(p),
        StoredElement::Document { tag, payload } => {
            Element::Document(DocumentCell::from_encoded(tag, payload))
        }
    }
}
