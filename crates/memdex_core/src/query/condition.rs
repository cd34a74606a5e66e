//! Query conditions.

use crate::error::{CoreError, CoreResult};
use crate::value::{compare, FieldKind, FieldValue};
use std::cmp::Ordering;

/// One field-level predicate of a query.
///
/// Conditions of a query are combined with logical AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field equals the literal.
    Equals {
        /// Field name.
        field: String,
        /// Literal, coerced to the field's kind before lookup.
        value: FieldValue,
    },
    /// The field's string form contains the literal's string form.
    Contains {
        /// Field name.
        field: String,
        /// Literal searched for.
        needle: FieldValue,
    },
    /// The field equals any of the literals.
    In {
        /// Field name.
        field: String,
        /// Candidate literals.
        values: Vec<FieldValue>,
    },
    /// The field lies within a range. Served by a full scan.
    Range {
        /// Field name.
        field: String,
        /// Bound(s) of the range.
        op: RangeOp,
    },
}

impl Condition {
    /// Returns the field the condition targets.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Condition::Equals { field, .. }
            | Condition::Contains { field, .. }
            | Condition::In { field, .. }
            | Condition::Range { field, .. } => field,
        }
    }

    /// Returns a short name for the kind of condition.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Condition::Equals { .. } => "equals",
            Condition::Contains { .. } => "contains",
            Condition::In { .. } => "in",
            Condition::Range { op, .. } => op.name(),
        }
    }
}

/// Range bound variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOp {
    /// `lo <= value <= hi`.
    Between(FieldValue, FieldValue),
    /// `value > bound`.
    Gt(FieldValue),
    /// `value >= bound`.
    Gte(FieldValue),
    /// `value < bound`.
    Lt(FieldValue),
    /// `value <= bound`.
    Lte(FieldValue),
}

impl RangeOp {
    /// Returns the operator name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RangeOp::Between(..) => "between",
            RangeOp::Gt(_) => "gt",
            RangeOp::Gte(_) => "gte",
            RangeOp::Lt(_) => "lt",
            RangeOp::Lte(_) => "lte",
        }
    }

    /// Coerces the bounds to `kind` and checks the range's shape.
    ///
    /// Bounds must be neither null nor NaN, and `Between` needs `lo <= hi`.
    pub(crate) fn prepare(&self, kind: Option<FieldKind>) -> CoreResult<RangeOp> {
        let coerce = |bound: &FieldValue| -> CoreResult<FieldValue> {
            if bound.is_null() || is_nan(bound) {
                return Err(CoreError::invalid_input(format!(
                    "{} bound must not be {bound}",
                    self.name()
                )));
            }
            match kind {
                Some(kind) => bound.clone().coerce_to(kind),
                None => Ok(bound.clone()),
            }
        };

        Ok(match self {
            RangeOp::Between(lo, hi) => {
                let (lo, hi) = (coerce(lo)?, coerce(hi)?);
                if compare(&lo, &hi)? == Ordering::Greater {
                    return Err(CoreError::invalid_input(format!(
                        "between lower bound {lo} exceeds upper bound {hi}"
                    )));
                }
                RangeOp::Between(lo, hi)
            }
            RangeOp::Gt(bound) => RangeOp::Gt(coerce(bound)?),
            RangeOp::Gte(bound) => RangeOp::Gte(coerce(bound)?),
            RangeOp::Lt(bound) => RangeOp::Lt(coerce(bound)?),
            RangeOp::Lte(bound) => RangeOp::Lte(coerce(bound)?),
        })
    }

    /// Tests a value against the range.
    ///
    /// Null and NaN values never match.
    ///
    /// # Errors
    ///
    /// [`CoreError::IncomparableTypes`] if the value and bound kinds differ.
    pub fn matches(&self, value: &FieldValue) -> CoreResult<bool> {
        if value.is_null() || is_nan(value) {
            return Ok(false);
        }
        Ok(match self {
            RangeOp::Between(lo, hi) => {
                compare(value, lo)? != Ordering::Less && compare(value, hi)? != Ordering::Greater
            }
            RangeOp::Gt(bound) => compare(value, bound)? == Ordering::Greater,
            RangeOp::Gte(bound) => compare(value, bound)? != Ordering::Less,
            RangeOp::Lt(bound) => compare(value, bound)? == Ordering::Less,
            RangeOp::Lte(bound) => compare(value, bound)? != Ordering::Greater,
        })
    }
}

fn is_nan(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Float(f) if f.is_nan())
}
