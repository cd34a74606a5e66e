//! String coercion, ordering and literal conversion for field values.

use super::{canonical_float_bits, FieldKind, FieldValue};
use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;

/// Renders a value as the string key used by prefix and substring indexes.
///
/// Text is returned verbatim, booleans as `true`/`false`, integers in
/// decimal and floats in their shortest round-trip form (`2.5`, `3`).
///
/// # Errors
///
/// Returns [`CoreError::TypeUnsupported`] for `Null` and `Bytes`.
pub fn to_comparable_string(value: &FieldValue) -> CoreResult<String> {
    match value {
        FieldValue::Text(s) => Ok(s.clone()),
        FieldValue::Bool(b) => Ok(b.to_string()),
        FieldValue::Int(n) => Ok(n.to_string()),
        FieldValue::UInt(n) => Ok(n.to_string()),
        FieldValue::Float(x) => Ok(x.to_string()),
        FieldValue::Null | FieldValue::Bytes(_) => Err(CoreError::TypeUnsupported {
            kind: value.kind(),
        }),
    }
}

/// Orders two values of the same kind.
///
/// There is no widening between signed, unsigned and float values; the
/// caller must coerce literals first (see [`FieldValue::coerce_to`]).
///
/// Floats agree with equality: `-0.0` equals `0.0`, and all NaNs are one
/// value ordered above positive infinity.
///
/// # Errors
///
/// Returns [`CoreError::IncomparableTypes`] when the kinds differ or the
/// kind has no order (`Null`, `Bytes`).
pub fn compare(a: &FieldValue, b: &FieldValue) -> CoreResult<Ordering> {
    match (a, b) {
        (FieldValue::Int(x), FieldValue::Int(y)) => Ok(x.cmp(y)),
        (FieldValue::UInt(x), FieldValue::UInt(y)) => Ok(x.cmp(y)),
        (FieldValue::Float(x), FieldValue::Float(y)) => {
            let (x, y) = (canonical_float_bits(*x), canonical_float_bits(*y));
            Ok(f64::from_bits(x).total_cmp(&f64::from_bits(y)))
        }
        (FieldValue::Text(x), FieldValue::Text(y)) => Ok(x.cmp(y)),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => Ok(x.cmp(y)),
        _ => Err(CoreError::IncomparableTypes {
            left: a.kind(),
            right: b.kind(),
        }),
    }
}

// 2^63 and 2^64 as floats; anything at or above is out of range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

impl FieldValue {
    /// Converts a literal to `kind` without losing information.
    ///
    /// `Null` converts to any kind and stays `Null`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TypeConversion`] when the conversion is not
    /// supported or would change the value.
    pub fn coerce_to(self, kind: FieldKind) -> CoreResult<FieldValue> {
        let from = self.kind();
        if from == kind || from == FieldKind::Null {
            return Ok(self);
        }

        let converted = match (self, kind) {
            (FieldValue::Int(n), FieldKind::UInt) => u64::try_from(n).ok().map(FieldValue::UInt),
            (FieldValue::UInt(n), FieldKind::Int) => i64::try_from(n).ok().map(FieldValue::Int),
            (FieldValue::Int(n), FieldKind::Float) => {
                let f = n as f64;
                (f < I64_BOUND && f as i64 == n).then_some(FieldValue::Float(f))
            }
            (FieldValue::UInt(n), FieldKind::Float) => {
                let f = n as f64;
                (f < U64_BOUND && f as u64 == n).then_some(FieldValue::Float(f))
            }
            (FieldValue::Float(f), FieldKind::Int) => (f.fract() == 0.0
                && f >= -I64_BOUND
                && f < I64_BOUND)
                .then(|| FieldValue::Int(f as i64)),
            (FieldValue::Float(f), FieldKind::UInt) => {
                (f.fract() == 0.0 && f >= 0.0 && f < U64_BOUND).then(|| FieldValue::UInt(f as u64))
            }
            _ => None,
        };

        converted.ok_or(CoreError::TypeConversion { from, to: kind })
    }
}
