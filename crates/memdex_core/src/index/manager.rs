//! Index manager - per-field index maintenance and lookup.
//!
//! The manager owns, for every registered field, up to three structures:
//! an [`ExactIndex`] over raw values, a [`PrefixTrie`] and a
//! [`SubstringIndex`] over the value's string form. The record store
//! drives it on every mutation while holding its own lock; the manager
//! itself does no locking.
//!
//! # Invariants
//!
//! - A live record's id sits in exactly one exact bucket per field.
//! - A tombstoned record's id sits in no bucket at all.
//! - A value that has no string form is left out of the prefix and
//!   substring structures only; its exact entry is still written.

use crate::error::{CoreError, CoreResult};
use crate::index::exact::ExactIndex;
use crate::index::traits::{IdSet, Index};
use crate::index::trie::PrefixTrie;
use crate::index::substring::SubstringIndex;
use crate::record::Record;
use crate::value::{to_comparable_string, FieldKind, FieldValue, IndexableValue};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Function mapping a record to the value of one field.
///
/// Extractors run on every insert, update and delete. They must be pure:
/// the same record must always produce the same value.
pub type Extractor<T> = Arc<dyn Fn(&Record<T>) -> FieldValue + Send + Sync>;

/// Matching mode a field index can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Equality on the raw value.
    Exact,
    /// Prefix of the value's string form.
    Prefix,
    /// Substring of the value's string form.
    Substring,
}

impl IndexKind {
    /// All three kinds.
    pub const ALL: [IndexKind; 3] = [IndexKind::Exact, IndexKind::Prefix, IndexKind::Substring];

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            IndexKind::Exact => "exact",
            IndexKind::Prefix => "prefix",
            IndexKind::Substring => "substring",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registration of one field index.
pub struct FieldIndexConfig<T> {
    /// Field name, unique per store.
    pub field: String,
    /// Value extractor.
    pub extractor: Extractor<T>,
    /// Kind the extractor always produces, when known statically.
    pub value_kind: Option<FieldKind>,
    /// Structures to maintain for the field.
    pub kinds: Vec<IndexKind>,
}

impl<T: 'static> FieldIndexConfig<T> {
    /// Creates a registration from a typed extractor.
    ///
    /// The extractor's return type fixes the field's value kind, which
    /// query literals are later coerced to.
    pub fn new<V, F>(field: impl Into<String>, extractor: F, kinds: &[IndexKind]) -> Self
    where
        V: IndexableValue,
        F: Fn(&Record<T>) -> V + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            extractor: Arc::new(move |record| extractor(record).into_field_value()),
            value_kind: V::KIND,
            kinds: kinds.to_vec(),
        }
    }
}

impl<T> fmt::Debug for FieldIndexConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldIndexConfig")
            .field("field", &self.field)
            .field("value_kind", &self.value_kind)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

struct FieldIndex<T> {
    extractor: Extractor<T>,
    value_kind: Option<FieldKind>,
    exact: Option<ExactIndex>,
    prefix: Option<PrefixTrie>,
    substring: Option<SubstringIndex>,
}

impl<T> FieldIndex<T> {
    fn from_config(config: &FieldIndexConfig<T>) -> Self {
        let has = |kind| config.kinds.contains(&kind);
        Self {
            extractor: Arc::clone(&config.extractor),
            value_kind: config.value_kind,
            exact: has(IndexKind::Exact).then(ExactIndex::new),
            prefix: has(IndexKind::Prefix).then(PrefixTrie::new),
            substring: has(IndexKind::Substring).then(SubstringIndex::new),
        }
    }

    fn kinds(&self) -> Vec<IndexKind> {
        let mut kinds = Vec::with_capacity(3);
        if self.exact.is_some() {
            kinds.push(IndexKind::Exact);
        }
        if self.prefix.is_some() {
            kinds.push(IndexKind::Prefix);
        }
        if self.substring.is_some() {
            kinds.push(IndexKind::Substring);
        }
        kinds
    }

    fn needs_string_key(&self) -> bool {
        self.prefix.is_some() || self.substring.is_some()
    }

    /// Adds `record` to every structure; returns 1 if the string-keyed
    /// structures had to skip it.
    fn add(&mut self, field: &str, record: &Record<T>) -> usize {
        let value = (self.extractor)(record);
        let id = record.id;

        if let Some(exact) = &mut self.exact {
            exact.insert(&value, id);
        }
        if !self.needs_string_key() {
            return 0;
        }

        match to_comparable_string(&value) {
            Ok(key) => {
                if let Some(trie) = &mut self.prefix {
                    trie.insert(&key, id);
                }
                if let Some(substring) = &mut self.substring {
                    substring.insert(&key, id);
                }
                0
            }
            Err(err) => {
                warn!(
                    field,
                    id = id.as_u64(),
                    error = %err,
                    "value skipped by prefix/substring index"
                );
                1
            }
        }
    }

    fn remove(&mut self, record: &Record<T>) {
        let value = (self.extractor)(record);
        let id = record.id;

        if let Some(exact) = &mut self.exact {
            exact.remove(&value, id);
        }
        if !self.needs_string_key() {
            return;
        }

        // Values without a string form were never added.
        if let Ok(key) = to_comparable_string(&value) {
            if let Some(trie) = &mut self.prefix {
                trie.remove(&key, id);
            }
            if let Some(substring) = &mut self.substring {
                substring.remove(&key, id);
            }
        }
    }
}

/// Manages all field indexes of one store.
pub struct IndexManager<T> {
    fields: HashMap<String, FieldIndex<T>>,
}

impl<T> Default for IndexManager<T> {
    fn default() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }
}

impl<T> IndexManager<T> {
    /// Creates a manager with no registered fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a field index, allocating only the requested structures.
    ///
    /// Registering a field again replaces its previous index wholesale.
    /// Existing records are not migrated; see `Store::register_index`
    /// for a registration that backfills.
    ///
    /// Returns true if an earlier registration was replaced.
    pub fn register(&mut self, config: FieldIndexConfig<T>) -> bool {
        let index = FieldIndex::from_config(&config);
        let replaced = self.fields.insert(config.field.clone(), index).is_some();
        info!(
            field = %config.field,
            kinds = ?config.kinds,
            replaced,
            "registered field index"
        );
        replaced
    }

    /// Adds a record to every registered field index.
    ///
    /// Returns how many fields skipped the record in their prefix and
    /// substring structures because the value has no string form.
    pub fn on_insert(&mut self, record: &Record<T>) -> usize {
        self.fields
            .iter_mut()
            .map(|(name, index)| index.add(name, record))
            .sum()
    }

    /// Removes a record from every registered field index.
    pub fn on_remove(&mut self, record: &Record<T>) {
        for index in self.fields.values_mut() {
            index.remove(record);
        }
    }

    /// Moves a record's entries from its old values to its new ones.
    ///
    /// Not atomic with respect to readers of the manager; the store's
    /// write lock provides that.
    pub fn on_update(&mut self, old: &Record<T>, new: &Record<T>) -> usize {
        self.on_remove(old);
        self.on_insert(new)
    }

    /// Indexes `records` into a single field, leaving other fields alone.
    ///
    /// Returns the number of skipped prefix/substring entries.
    pub fn backfill<'a, I>(&mut self, field: &str, records: I) -> CoreResult<usize>
    where
        I: IntoIterator<Item = &'a Record<T>>,
        T: 'a,
    {
        let index = self
            .fields
            .get_mut(field)
            .ok_or_else(|| CoreError::field_not_indexed(field))?;

        let mut skipped = 0;
        let mut count = 0usize;
        for record in records {
            skipped += index.add(field, record);
            count += 1;
        }
        debug!(field, records = count, skipped, "backfilled field index");
        Ok(skipped)
    }

    /// Equality lookup with fall-through.
    ///
    /// Returns the exact bucket for `value` if one exists. Otherwise the
    /// value's string form is tried as a prefix, then as a whole
    /// substring key. Returns an empty set when nothing applies.
    #[must_use]
    pub fn query_exact(&self, field: &str, value: &FieldValue) -> IdSet {
        let Some(index) = self.fields.get(field) else {
            return IdSet::new();
        };

        if let Some(set) = index.exact.as_ref().and_then(|exact| exact.lookup(value)) {
            return set.clone();
        }
        if !index.needs_string_key() {
            return IdSet::new();
        }

        let Ok(key) = to_comparable_string(value) else {
            return IdSet::new();
        };
        // Trie nodes are never pruned; skip emptied buckets.
        if let Some(set) = index
            .prefix
            .as_ref()
            .and_then(|trie| trie.lookup(&key))
            .filter(|set| !set.is_empty())
        {
            return set.clone();
        }
        index
            .substring
            .as_ref()
            .and_then(|substring| substring.lookup(&key))
            .cloned()
            .unwrap_or_default()
    }

    /// Equality lookup against the exact structure only.
    #[must_use]
    pub fn query_exact_strict(&self, field: &str, value: &FieldValue) -> IdSet {
        self.fields
            .get(field)
            .and_then(|index| index.exact.as_ref())
            .and_then(|exact| exact.lookup(value))
            .cloned()
            .unwrap_or_default()
    }

    /// Prefix lookup; empty if the field has no prefix structure.
    #[must_use]
    pub fn query_prefix(&self, field: &str, prefix: &str) -> IdSet {
        self.fields
            .get(field)
            .and_then(|index| index.prefix.as_ref())
            .map(|trie| trie.query_prefix(prefix))
            .unwrap_or_default()
    }

    /// Substring lookup; empty if the field has no substring structure.
    #[must_use]
    pub fn query_substring(&self, field: &str, needle: &str) -> IdSet {
        self.fields
            .get(field)
            .and_then(|index| index.substring.as_ref())
            .map(|substring| substring.query_substring(needle))
            .unwrap_or_default()
    }

    /// Checks if the field has a registered index.
    #[must_use]
    pub fn is_registered(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Checks if the field maintains the given structure.
    #[must_use]
    pub fn supports(&self, field: &str, kind: IndexKind) -> bool {
        self.fields.get(field).is_some_and(|index| match kind {
            IndexKind::Exact => index.exact.is_some(),
            IndexKind::Prefix => index.prefix.is_some(),
            IndexKind::Substring => index.substring.is_some(),
        })
    }

    /// Returns the structures a field maintains.
    #[must_use]
    pub fn kinds_for(&self, field: &str) -> Option<Vec<IndexKind>> {
        self.fields.get(field).map(FieldIndex::kinds)
    }

    /// Returns the value kind a field was declared with.
    ///
    /// `Ok(None)` means the extractor produces values of varying kinds.
    pub fn field_kind(&self, field: &str) -> CoreResult<Option<FieldKind>> {
        self.fields
            .get(field)
            .map(|index| index.value_kind)
            .ok_or_else(|| CoreError::field_not_indexed(field))
    }

    /// Returns the extractor registered for a field.
    #[must_use]
    pub fn extractor(&self, field: &str) -> Option<Extractor<T>> {
        self.fields
            .get(field)
            .map(|index| Arc::clone(&index.extractor))
    }

    /// Returns the names of all registered fields, sorted.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T> fmt::Debug for IndexManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexManager")
            .field("fields", &self.fields())
            .finish()
    }
}
