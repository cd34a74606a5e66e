//! Query execution.

use super::cancel::{CancelToken, Interrupt};
use super::condition::{Condition, RangeOp};
use super::Query;
use crate::error::{CoreError, CoreResult};
use crate::index::{IdSet, IndexKind, IndexManager};
use crate::record::Record;
use crate::types::RecordId;
use crate::value::{to_comparable_string, FieldValue};
use tracing::{trace, warn};

/// Slots or identifiers visited between two interrupt checks.
const CHECK_INTERVAL: usize = 1024;

impl<T> Query<'_, T> {
    /// Runs the query and returns one page of matching live records in
    /// ascending identifier order.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidInput`] for a zero limit or a malformed
    ///   condition
    /// - [`CoreError::FieldNotIndexed`] or
    ///   [`CoreError::UnsupportedIndexForField`] when a condition targets
    ///   a field or matching mode that was never registered
    /// - [`CoreError::TypeConversion`] when a literal does not fit the
    ///   field's kind
    /// - [`CoreError::NoMatches`] when no member of an `in` condition
    ///   matched
    /// - [`CoreError::DeadlineExceeded`] when the timeout elapsed
    pub fn execute(self) -> CoreResult<Vec<Record<T>>> {
        self.execute_with_cancel(&CancelToken::new())
    }

    /// Like [`Query::execute`], additionally stopping with
    /// [`CoreError::Cancelled`] once `cancel` is triggered.
    pub fn execute_with_cancel(self, cancel: &CancelToken) -> CoreResult<Vec<Record<T>>> {
        if self.limit == 0 {
            return Err(CoreError::invalid_input("limit must be positive"));
        }
        self.run(cancel, |query, ids, interrupt| query.materialize(ids, interrupt))
    }

    /// Counts all matching live records, ignoring limit and offset.
    pub fn count(self) -> CoreResult<usize> {
        self.run(&CancelToken::new(), |query, ids, interrupt| {
            let mut count = 0;
            for (i, id) in ids.into_iter().enumerate() {
                if i % CHECK_INTERVAL == 0 {
                    interrupt.check()?;
                }
                if query.store.contains(id) {
                    count += 1;
                }
            }
            Ok(count)
        })
    }

    fn run<R, F>(&self, cancel: &CancelToken, finish: F) -> CoreResult<R>
    where
        F: FnOnce(&Self, Vec<RecordId>, &Interrupt<'_>) -> CoreResult<R>,
    {
        let stats = self.store.stats();
        stats.record_query();
        self.warn_unapplied();

        let interrupt = Interrupt::start(cancel, self.timeout);
        let outcome = self
            .resolve_ids(&interrupt)
            .and_then(|ids| finish(self, ids, &interrupt))
            .and_then(|result| interrupt.check().map(|()| result));

        match &outcome {
            Err(CoreError::DeadlineExceeded { .. }) => stats.record_query_timeout(),
            Err(CoreError::Cancelled) => stats.record_query_cancelled(),
            _ => {}
        }
        outcome
    }

    fn warn_unapplied(&self) {
        if let Some((field, descending)) = &self.order_by {
            warn!(field = %field, descending, "query ordering is not applied");
        }
        if let Some((start, end)) = self.time_range {
            warn!(start, end, "query time range is not applied");
        }
    }

    /// Resolves and intersects the candidate sets of all conditions.
    ///
    /// With no conditions every live record matches.
    pub(crate) fn resolve_ids(&self, interrupt: &Interrupt<'_>) -> CoreResult<Vec<RecordId>> {
        interrupt.check()?;
        if self.conditions.is_empty() {
            return Ok(self.store.live_ids());
        }

        let mut matched: Option<IdSet> = None;
        for condition in &self.conditions {
            interrupt.check()?;
            let hits = self.resolve_condition(condition, interrupt)?;
            trace!(
                field = condition.field(),
                condition = condition.name(),
                hits = hits.len(),
                "resolved condition"
            );
            matched = Some(match matched {
                None => hits,
                Some(mut acc) => {
                    acc.retain(|id| hits.contains(id));
                    acc
                }
            });
        }

        let mut ids: Vec<RecordId> = matched.unwrap_or_default().into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Resolves identifiers to live records, one lock per record, and
    /// cuts the requested page. Identifiers that no longer resolve are
    /// dropped.
    pub(crate) fn materialize(
        &self,
        ids: Vec<RecordId>,
        interrupt: &Interrupt<'_>,
    ) -> CoreResult<Vec<Record<T>>> {
        let mut page = Vec::with_capacity(self.limit.min(ids.len()));
        let mut skipped = 0;
        for (i, id) in ids.into_iter().enumerate() {
            if i % CHECK_INTERVAL == 0 {
                interrupt.check()?;
            }
            let Some(record) = self.store.resolve(id) else {
                continue;
            };
            if skipped < self.offset {
                skipped += 1;
                continue;
            }
            page.push(record);
            if page.len() == self.limit {
                break;
            }
        }
        Ok(page)
    }

    fn resolve_condition(
        &self,
        condition: &Condition,
        interrupt: &Interrupt<'_>,
    ) -> CoreResult<IdSet> {
        let stats = self.store.stats();
        match condition {
            Condition::Equals { field, value } => {
                stats.record_index_lookup();
                self.store.with_indexes(|im| {
                    let literal = coerce_literal(im, field, value)?;
                    self.lookup_equal(im, field, &literal)
                })
            }
            Condition::Contains { field, needle } => {
                let needle = to_comparable_string(needle)?;
                stats.record_index_lookup();
                self.store.with_indexes(|im| lookup_contains(im, field, &needle))
            }
            Condition::In { field, values } => {
                if values.is_empty() {
                    return Err(CoreError::invalid_input(format!(
                        "in condition on {field} needs at least one value"
                    )));
                }
                stats.record_index_lookup();
                let hits = self.store.with_indexes(|im| {
                    let mut hits = IdSet::new();
                    for value in values {
                        let literal = coerce_literal(im, field, value)?;
                        hits.extend(self.lookup_equal(im, field, &literal)?);
                    }
                    Ok::<_, CoreError>(hits)
                })?;
                if hits.is_empty() {
                    return Err(CoreError::no_matches(field.as_str()));
                }
                Ok(hits)
            }
            Condition::Range { field, op } => self.scan_range(field, op, interrupt),
        }
    }

    /// Equality lookup, falling through to prefix and substring lookups
    /// only when the store is configured to.
    fn lookup_equal(
        &self,
        im: &IndexManager<T>,
        field: &str,
        literal: &FieldValue,
    ) -> CoreResult<IdSet> {
        if self.store.config().equals_fallback {
            return Ok(im.query_exact(field, literal));
        }
        if !im.supports(field, IndexKind::Exact) {
            return Err(CoreError::unsupported_index(field, IndexKind::Exact.name()));
        }
        Ok(im.query_exact_strict(field, literal))
    }

    /// Full scan of the backing table, tombstones skipped.
    fn scan_range(&self, field: &str, op: &RangeOp, interrupt: &Interrupt<'_>) -> CoreResult<IdSet> {
        let (op, extractor) = self.store.with_indexes(|im| {
            let op = op.prepare(im.field_kind(field)?)?;
            let extractor = im
                .extractor(field)
                .ok_or_else(|| CoreError::field_not_indexed(field))?;
            Ok::<_, CoreError>((op, extractor))
        })?;

        self.store.stats().record_range_scan();
        let mut hits = IdSet::new();
        let mut visited = 0usize;
        self.store.scan(|record| {
            visited += 1;
            if visited % CHECK_INTERVAL == 0 {
                interrupt.check()?;
            }
            if !record.is_deleted() && op.matches(&extractor(record))? {
                hits.insert(record.id);
            }
            Ok(())
        })?;
        Ok(hits)
    }
}

/// Coerces a literal to the kind the field was registered with.
fn coerce_literal<T>(im: &IndexManager<T>, field: &str, value: &FieldValue) -> CoreResult<FieldValue> {
    match im.field_kind(field)? {
        Some(kind) => value.clone().coerce_to(kind),
        None => Ok(value.clone()),
    }
}

/// Union of the prefix and substring hits for `needle`.
fn lookup_contains<T>(im: &IndexManager<T>, field: &str, needle: &str) -> CoreResult<IdSet> {
    if !im.is_registered(field) {
        return Err(CoreError::field_not_indexed(field));
    }
    let prefix = im.supports(field, IndexKind::Prefix);
    let substring = im.supports(field, IndexKind::Substring);
    if !prefix && !substring {
        return Err(CoreError::unsupported_index(field, "contains"));
    }

    let mut hits = if prefix {
        im.query_prefix(field, needle)
    } else {
        IdSet::new()
    };
    if substring {
        hits.extend(im.query_substring(field, needle));
    }
    Ok(hits)
}
