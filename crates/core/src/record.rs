//! Records: the values stored under a key in the record map
//!
//! Primitives live in their own map, so a record is either a List or a
//! Document. [`ValueKind`] names all three variants for type checks and
//! error messages.

use crate::document::DocumentCell;
use crate::element::Element;
use std::fmt;

/// Variant of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Text, number, or boolean
    Primitive,
    /// Ordered sequence of primitives and documents
    List,
    /// Opaque structured record
    Document,
}

impl ValueKind {
    /// Lowercase name used in messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Primitive => "primitive",
            ValueKind::List => "list",
            ValueKind::Document => "document",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A List or Document stored in the record map
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Ordered, possibly heterogeneous sequence
    List(Vec<Element>),
    /// Structured record
    Document(DocumentCell),
}

impl Record {
    /// The variant of this record
    pub fn kind(&self) -> ValueKind {
        match self {
            Record::List(_) => ValueKind::List,
            Record::Document(_) => ValueKind::Document,
        }
    }

    /// Kind plus document tag, e.g. `document(app::User)`
    pub fn describe(&self) -> String {
        match self {
            Record::List(_) => ValueKind::List.to_string(),
            Record::Document(cell) => format!("{}({})", ValueKind::Document, cell.type_tag()),
        }
    }

    /// Borrow the list, if this is a list
    pub fn as_list(&self) -> Option<&Vec<Element>> {
        match self {
            Record::List(items) => Some(items),
            Record::Document(_) => None,
        }
    }

    /// Mutably borrow the list, if this is a list
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Record::List(items) => Some(items),
            Record::Document(_) => None,
        }
    }

    /// Borrow the document cell, if this is a document
    pub fn as_document(&self) -> Option<&DocumentCell> {
        match self {
            Record::Document(cell) => Some(cell),
            Record::List(_) => None,
        }
    }

    /// Mutably borrow the document cell, if this is a document
    pub fn as_document_mut(&mut self) -> Option<&mut DocumentCell> {
        match self {
            Record::Document(cell) => Some(cell),
            Record::List(_) => None,
        }
    }
}

impl From<Vec<Element>> for Record {
    fn from(items: Vec<Element>) -> Self {
        Record::List(items)
    }
}

impl From<DocumentCell> for Record {
    fn from(cell: DocumentCell) -> Self {
        Record::Document(cell)
    }
}
