//! Query engine.
//!
//! A [`Query`] accumulates field conditions and pagination settings, then
//! executes in two phases:
//!
//! 1. Each condition resolves to a set of record identifiers, through the
//!    index manager or, for ranges, a scan of the backing table. The sets
//!    are intersected.
//! 2. Surviving identifiers are resolved to live records in ascending
//!    identifier order and paginated.
//!
//! Every step takes the store lock on its own. A record deleted between
//! the phases is dropped from the result; a record inserted mid-query
//! may or may not appear.
//!
//! Ordering and time windows are accepted but not applied.

mod cancel;
mod condition;
mod execute;

pub use cancel::CancelToken;
pub use condition::{Condition, RangeOp};

use crate::store::Store;
use crate::value::{FieldValue, IndexableValue};
use std::fmt;
use std::time::Duration;

/// A query under construction.
///
/// Created by [`Store::query`]. Limit and timeout start from the store's
/// configuration.
#[must_use = "a query does nothing until executed"]
pub struct Query<'s, T> {
    store: &'s Store<T>,
    conditions: Vec<Condition>,
    limit: usize,
    offset: usize,
    order_by: Option<(String, bool)>,
    time_range: Option<(u64, u64)>,
    timeout: Duration,
}

impl<'s, T> Query<'s, T> {
    pub(crate) fn new(store: &'s Store<T>) -> Self {
        let config = store.config();
        Self {
            store,
            conditions: Vec::new(),
            limit: config.default_query_limit,
            offset: 0,
            order_by: None,
            time_range: None,
            timeout: config.query_timeout,
        }
    }

    /// Starts a condition on `name`.
    pub fn field(self, name: impl Into<String>) -> FieldQuery<'s, T> {
        FieldQuery {
            query: self,
            field: name.into(),
        }
    }

    /// Adds a prebuilt condition.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Sets the maximum number of records returned. Must be positive.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets how many matching records to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Records an ordering. Accepted but not applied: results stay in
    /// ascending identifier order.
    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some((field.into(), descending));
        self
    }

    /// Records a time window. Accepted but not applied.
    pub fn time_range(mut self, start: u64, end: u64) -> Self {
        self.time_range = Some((start, end));
        self
    }

    /// Bounds the execution time.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the accumulated conditions.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

impl<T> fmt::Debug for Query<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("conditions", &self.conditions)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("order_by", &self.order_by)
            .field("time_range", &self.time_range)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// A query waiting for the predicate on one field.
#[must_use = "a field query does nothing until a predicate is added"]
pub struct FieldQuery<'s, T> {
    query: Query<'s, T>,
    field: String,
}

impl<'s, T> FieldQuery<'s, T> {
    fn push(self, build: impl FnOnce(String) -> Condition) -> Query<'s, T> {
        let FieldQuery { query, field } = self;
        query.filter(build(field))
    }

    /// The field equals `value`.
    pub fn equals<V: IndexableValue>(self, value: V) -> Query<'s, T> {
        let value = value.into_field_value();
        self.push(|field| Condition::Equals { field, value })
    }

    /// The field's string form contains the string form of `needle`.
    pub fn contains<V: IndexableValue>(self, needle: V) -> Query<'s, T> {
        let needle = needle.into_field_value();
        self.push(|field| Condition::Contains { field, needle })
    }

    /// The field equals any of `values`.
    pub fn is_in<V, I>(self, values: I) -> Query<'s, T>
    where
        V: IndexableValue,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<FieldValue> = values.into_iter().map(V::into_field_value).collect();
        self.push(|field| Condition::In { field, values })
    }

    /// `lo <= field <= hi`.
    pub fn between<V: IndexableValue>(self, lo: V, hi: V) -> Query<'s, T> {
        self.range(RangeOp::Between(lo.into_field_value(), hi.into_field_value()))
    }

    /// `field > bound`.
    pub fn gt<V: IndexableValue>(self, bound: V) -> Query<'s, T> {
        self.range(RangeOp::Gt(bound.into_field_value()))
    }

    /// `field >= bound`.
    pub fn gte<V: IndexableValue>(self, bound: V) -> Query<'s, T> {
        self.range(RangeOp::Gte(bound.into_field_value()))
    }

    /// `field < bound`.
    pub fn lt<V: IndexableValue>(self, bound: V) -> Query<'s, T> {
        self.range(RangeOp::Lt(bound.into_field_value()))
    }

    /// `field <= bound`.
    pub fn lte<V: IndexableValue>(self, bound: V) -> Query<'s, T> {
        self.range(RangeOp::Lte(bound.into_field_value()))
    }

    fn range(self, op: RangeOp) -> Query<'s, T> {
        self.push(|field| Condition::Range { field, op })
    }
}

impl<T> fmt::Debug for FieldQuery<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldQuery")
            .field("field", &self.field)
            .field("query", &self.query)
            .finish()
    }
}
