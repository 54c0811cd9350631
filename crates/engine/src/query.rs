//! Read-only queries over the current store
//!
//! A [`Query`] borrows the store, so nothing can mutate it while results
//! are being consumed. Every method returns a lazy iterator over references
//! in record-map order (last-insertion order of present keys). Queries never
//! mutate and never persist.

use snapdb_core::{Document, DocumentCell, Element, Record};
use snapdb_storage::MemoryStore;

/// Query handle bound to one store
#[derive(Clone, Copy)]
pub struct Query<'a> {
    store: &'a MemoryStore,
}

impl<'a> Query<'a> {
    pub(crate) fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Number of records (lists and documents)
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when no list or document is stored
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Record keys in iteration order
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.store.keys()
    }

    /// Every stored list
    pub fn all_lists(&self) -> impl Iterator<Item = &'a [Element]> + 'a {
        self.store.iter().filter_map(|(_, record)| match record {
            Record::List(items) => Some(items.as_slice()),
            Record::Document(_) => None,
        })
    }

    /// Every stored document, whatever its type
    pub fn all_documents(&self) -> impl Iterator<Item = &'a DocumentCell> + 'a {
        self.store.iter().filter_map(|(_, record)| match record {
            Record::Document(cell) => Some(cell),
            Record::List(_) => None,
        })
    }

    /// Lists holding an element equal to `element`
    ///
    /// Primitives compare by value (floats bitwise), documents by type tag
    /// and encoded contents.
    pub fn lists_containing(
        &self,
        element: impl Into<Element>,
    ) -> impl Iterator<Item = &'a [Element]> + 'a {
        let element = element.into();
        self.all_lists()
            .filter(move |items| items.contains(&element))
    }

    /// Documents of type `T` for which `predicate` holds
    ///
    /// Lists, documents of other types, and payloads that fail to decode
    /// are skipped.
    pub fn documents_matching<T, P>(&self, predicate: P) -> impl Iterator<Item = &'a T> + 'a
    where
        T: Document,
        P: Fn(&T) -> bool + 'a,
    {
        self.all_documents()
            .filter_map(|cell| cell.downcast_ref::<T>().ok().flatten())
            .filter(move |doc| predicate(*doc))
    }

    /// All documents of type `T`
    pub fn documents_of<T: Document>(&self) -> impl Iterator<Item = &'a T> + 'a {
        self.documents_matching::<T, _>(|_| true)
    }
}
