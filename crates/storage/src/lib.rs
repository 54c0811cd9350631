//! Storage layer for SnapDB
//!
//! The in-memory half of the snapshot store: an order-preserving record map
//! plus a sorted primitive map, and conversion to and from snapshot images.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;

pub use store::MemoryStore;
