//! Field values extracted from records.
//!
//! Every extractor maps a record into a [`FieldValue`], a closed set of
//! kinds that the indexes know how to hash, order and render as strings.
//! The [`IndexableValue`] trait lets extractors return plain Rust values
//! (`u32`, `String`, `Option<f64>`, ...) while the field's kind is fixed
//! at registration time.

mod compare;

pub use compare::{compare, to_comparable_string};

use std::fmt;
use std::hash::{Hash, Hasher};

/// The kind of a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Floating point number.
    Float,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Bytes,
}

impl FieldKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Null => "null",
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::UInt => "uint",
            FieldKind::Float => "float",
            FieldKind::Text => "text",
            FieldKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value extracted from a record field.
///
/// Signed and unsigned integers are kept apart; nothing is widened
/// implicitly. Floats compare and hash by their canonical bit pattern so
/// the type can key hash maps: `-0.0` equals `0.0` and all NaNs are equal.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Absence of a value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes. Indexable for exact matches only.
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Null => FieldKind::Null,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::UInt(_) => FieldKind::UInt,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Bytes(_) => FieldKind::Bytes,
        }
    }

    /// Check if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Get this value as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Folds `-0.0` into `0.0` and every NaN into one quiet NaN.
pub(super) fn canonical_float_bits(f: f64) -> u64 {
    if f == 0.0 {
        0.0f64.to_bits()
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::UInt(a), FieldValue::UInt(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => {
                canonical_float_bits(*a) == canonical_float_bits(*b)
            }
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Bytes(a), FieldValue::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Null => {}
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Int(n) => n.hash(state),
            FieldValue::UInt(n) => n.hash(state),
            FieldValue::Float(f) => canonical_float_bits(*f).hash(state),
            FieldValue::Text(s) => s.hash(state),
            FieldValue::Bytes(b) => b.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::UInt(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A Rust value that an extractor may return or a query may compare
/// against.
///
/// `KIND` is the field kind the value always maps to, or `None` when the
/// kind is only known at runtime (for [`FieldValue`] itself).
pub trait IndexableValue {
    /// Kind every value of this type converts to.
    const KIND: Option<FieldKind>;

    /// Converts into the closed value representation.
    fn into_field_value(self) -> FieldValue;
}

macro_rules! indexable_signed {
    ($($t:ty),*) => {$(
        impl IndexableValue for $t {
            const KIND: Option<FieldKind> = Some(FieldKind::Int);

            fn into_field_value(self) -> FieldValue {
                FieldValue::Int(self as i64)
            }
        }
    )*};
}

macro_rules! indexable_unsigned {
    ($($t:ty),*) => {$(
        impl IndexableValue for $t {
            const KIND: Option<FieldKind> = Some(FieldKind::UInt);

            fn into_field_value(self) -> FieldValue {
                FieldValue::UInt(self as u64)
            }
        }
    )*};
}

indexable_signed!(i8, i16, i32, i64, isize);
indexable_unsigned!(u8, u16, u32, u64, usize);

impl IndexableValue for f32 {
    const KIND: Option<FieldKind> = Some(FieldKind::Float);

    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(f64::from(self))
    }
}

impl IndexableValue for f64 {
    const KIND: Option<FieldKind> = Some(FieldKind::Float);

    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(self)
    }
}

impl IndexableValue for bool {
    const KIND: Option<FieldKind> = Some(FieldKind::Bool);

    fn into_field_value(self) -> FieldValue {
        FieldValue::Bool(self)
    }
}

impl IndexableValue for String {
    const KIND: Option<FieldKind> = Some(FieldKind::Text);

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self)
    }
}

impl IndexableValue for &str {
    const KIND: Option<FieldKind> = Some(FieldKind::Text);

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self.to_owned())
    }
}

impl IndexableValue for Vec<u8> {
    const KIND: Option<FieldKind> = Some(FieldKind::Bytes);

    fn into_field_value(self) -> FieldValue {
        FieldValue::Bytes(self)
    }
}

impl IndexableValue for FieldValue {
    const KIND: Option<FieldKind> = None;

    fn into_field_value(self) -> FieldValue {
        self
    }
}

impl<V: IndexableValue> IndexableValue for Option<V> {
    const KIND: Option<FieldKind> = V::KIND;

    fn into_field_value(self) -> FieldValue {
        match self {
            Some(v) => v.into_field_value(),
            None => FieldValue::Null,
        }
    }
}
