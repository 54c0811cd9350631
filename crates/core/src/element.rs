//! List elements
//!
//! A list holds primitives, documents, or a mix of both. Element equality is
//! by value: primitives compare as [`Primitive`] does, documents compare by
//! type tag plus encoded payload.

use crate::document::{Document, DocumentCell};
use crate::primitive::Primitive;
use crate::record::ValueKind;

/// One element of a list
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Text, number, or boolean
    Primitive(Primitive),
    /// Structured record
    Document(DocumentCell),
}

impl Element {
    /// Wrap a document
    pub fn document<T: Document>(doc: T) -> Self {
        Element::Document(DocumentCell::new(doc))
    }

    /// The variant of this element
    pub fn kind(&self) -> ValueKind {
        match self {
            Element::Primitive(_) => ValueKind::Primitive,
            Element::Document(_) => ValueKind::Document,
        }
    }

    /// Borrow the primitive, if this is one
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Element::Primitive(p) => Some(p),
            Element::Document(_) => None,
        }
    }

    /// Borrow the document cell, if this is a document
    pub fn as_cell(&self) -> Option<&DocumentCell> {
        match self {
            Element::Document(cell) => Some(cell),
            Element::Primitive(_) => None,
        }
    }

    /// Borrow the element as a document of type `T`
    ///
    /// `Ok(None)` for primitives and other document types.
    pub fn downcast_ref<T: Document>(&self) -> Result<Option<&T>, String> {
        match self {
            Element::Document(cell) => cell.downcast_ref::<T>(),
            Element::Primitive(_) => Ok(None),
        }
    }

    /// Mutably borrow the element as a document of type `T`
    pub fn downcast_mut<T: Document>(&mut self) -> Result<Option<&mut T>, String> {
        match self {
            Element::Document(cell) => cell.downcast_mut::<T>(),
            Element::Primitive(_) => Ok(None),
        }
    }
}

impl PartialEq<Primitive> for Element {
    fn eq(&self, other: &Primitive) -> bool {
        self.as_primitive() == Some(other)
    }
}

impl From<Primitive> for Element {
    fn from(p: Primitive) -> Self {
        Element::Primitive(p)
    }
}

impl From<DocumentCell> for Element {
    fn from(cell: DocumentCell) -> Self {
        Element::Document(cell)
    }
}

impl<T: Document> From<T> for Element {
    fn from(doc: T) -> Self {
        Element::document(doc)
    }
}

macro_rules! element_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Element {
                fn from(value: $t) -> Self {
                    Element::Primitive(Primitive::from(value))
                }
            }
        )*
    };
}

element_from_primitive!(&str, String, &String, bool, f32, f64, i8, i16, i32, i64, u8, u16, u32);
