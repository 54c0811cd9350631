//! Primitive values
//!
//! This module defines the scalar side of the value model:
//! - Primitive: text, integer, float, or boolean
//! - IntoPrimitive: classification of inbound values, including the
//!   absence signal used by `put` to delete an entry

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar value
///
/// Exactly one of text, number, or boolean. Numbers keep their integer or
/// floating representation, so `Integer(1)` and `Float(1.0)` are different
/// values.
///
/// # Examples
///
/// ```
/// use snapdb_core::Primitive;
///
/// let s = Primitive::from("hello");
/// let n = Primitive::from(42i64);
/// let b = Primitive::from(true);
///
/// assert_eq!(s.as_str(), Some("hello"));
/// assert_eq!(n.as_i64(), Some(42));
/// assert_eq!(b.as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Primitive {
    /// UTF-8 text
    Text(String),
    /// Signed 64-bit integer
    Integer(i64),
    /// 64-bit float
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl Primitive {
    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Text(_) => "text",
            Primitive::Integer(_) => "integer",
            Primitive::Float(_) => "float",
            Primitive::Bool(_) => "boolean",
        }
    }

    /// Borrow the text, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer, if this is an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get a float view of either numeric variant
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Float(n) => Some(*n),
            Primitive::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Get the boolean, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// True for either numeric variant
    pub fn is_number(&self) -> bool {
        matches!(self, Primitive::Integer(_) | Primitive::Float(_))
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Primitive::Text(a), Primitive::Text(b)) => a == b,
            (Primitive::Integer(a), Primitive::Integer(b)) => a == b,
            (Primitive::Float(a), Primitive::Float(b)) => a.to_bits() == b.to_bits(),
            (Primitive::Bool(a), Primitive::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Text(s) => write!(f, "{}", s),
            Primitive::Integer(n) => write!(f, "{}", n),
            Primitive::Float(n) => write!(f, "{}", n),
            Primitive::Bool(b) => write!(f, "{}", b),
        }
    }
}

// From implementations for common types
impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::Text(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::Text(s)
    }
}

impl From<&String> for Primitive {
    fn from(s: &String) -> Self {
        Primitive::Text(s.clone())
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

impl From<f64> for Primitive {
    fn from(n: f64) -> Self {
        Primitive::Float(n)
    }
}

impl From<f32> for Primitive {
    fn from(n: f32) -> Self {
        Primitive::Float(n as f64)
    }
}

macro_rules! integer_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Primitive {
                fn from(n: $t) -> Self {
                    Primitive::Integer(n as i64)
                }
            }
        )*
    };
}

integer_from!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Primitive {
    type Error = Error;

    fn try_from(n: u64) -> Result<Self> {
        i64::try_from(n)
            .map(Primitive::Integer)
            .map_err(|_| Error::InvalidValueType {
                found: format!("u64 {} (out of integer range)", n),
            })
    }
}

impl TryFrom<serde_json::Value> for Primitive {
    type Error = Error;

    /// Classify a JSON value. Null, arrays, and objects are rejected.
    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value as J;
        match value {
            J::String(s) => Ok(Primitive::Text(s)),
            J::Bool(b) => Ok(Primitive::Bool(b)),
            J::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Primitive::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Primitive::Float(f))
                } else {
                    Err(Error::InvalidValueType {
                        found: format!("number {}", n),
                    })
                }
            }
            J::Null => Err(Error::InvalidValueType {
                found: "null".into(),
            }),
            J::Array(_) => Err(Error::InvalidValueType {
                found: "array".into(),
            }),
            J::Object(_) => Err(Error::InvalidValueType {
                found: "object".into(),
            }),
        }
    }
}

/// Classification of a value handed to `put`
///
/// `Ok(Some(p))` stores `p`, `Ok(None)` is the absence signal (delete the
/// entry), and `Err(InvalidValueType)` rejects anything that is not text,
/// number, or boolean.
pub trait IntoPrimitive {
    /// Classify `self`
    fn into_primitive(self) -> Result<Option<Primitive>>;
}

macro_rules! into_primitive_via_from {
    ($($t:ty),*) => {
        $(
            impl IntoPrimitive for $t {
                fn into_primitive(self) -> Result<Option<Primitive>> {
                    Ok(Some(Primitive::from(self)))
                }
            }
        )*
    };
}

into_primitive_via_from!(&str, String, &String, bool, f32, f64, i8, i16, i32, i64, u8, u16, u32);

impl IntoPrimitive for u64 {
    fn into_primitive(self) -> Result<Option<Primitive>> {
        Primitive::try_from(self).map(Some)
    }
}

impl IntoPrimitive for Primitive {
    fn into_primitive(self) -> Result<Option<Primitive>> {
        Ok(Some(self))
    }
}

impl<T: IntoPrimitive> IntoPrimitive for Option<T> {
    fn into_primitive(self) -> Result<Option<Primitive>> {
        match self {
            Some(value) => value.into_primitive(),
            None => Ok(None),
        }
    }
}

impl IntoPrimitive for serde_json::Value {
    /// JSON null is the absence signal; arrays and objects are rejected.
    fn into_primitive(self) -> Result<Option<Primitive>> {
        if self.is_null() {
            return Ok(None);
        }
        Primitive::try_from(self).map(Some)
    }
}
