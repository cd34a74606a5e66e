//! Exact-match index.

use crate::index::traits::{IdSet, Index};
use crate::types::RecordId;
use crate::value::FieldValue;
use std::collections::HashMap;

/// Hash-based index for equality lookups on raw field values.
///
/// Values are stored as extracted, without string coercion, so every
/// kind (including `Null` and `Bytes`) can be matched exactly. Empty
/// buckets are pruned on removal.
///
/// # Example
///
/// ```rust
/// use memdex_core::{ExactIndex, FieldValue, Index, RecordId};
///
/// let mut index = ExactIndex::new();
/// index.insert(&FieldValue::Text("bob".into()), RecordId::new(3));
///
/// let ids = index.lookup(&FieldValue::Text("bob".into())).unwrap();
/// assert!(ids.contains(&RecordId::new(3)));
/// ```
#[derive(Debug, Default)]
pub struct ExactIndex {
    /// Value to record IDs mapping.
    entries: HashMap<FieldValue, IdSet>,
    /// Total (value, id) pair count.
    count: usize,
}

impl ExactIndex {
    /// Creates a new exact index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of (value, id) pairs.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.count
    }
}

impl Index<FieldValue> for ExactIndex {
    fn insert(&mut self, key: &FieldValue, id: RecordId) {
        let set = self.entries.entry(key.clone()).or_default();
        if set.insert(id) {
            self.count += 1;
        }
    }

    fn remove(&mut self, key: &FieldValue, id: RecordId) -> bool {
        if let Some(set) = self.entries.get_mut(key) {
            if set.remove(&id) {
                self.count -= 1;
                if set.is_empty() {
                    self.entries.remove(key);
                }
                return true;
            }
        }
        false
    }

    fn lookup(&self, key: &FieldValue) -> Option<&IdSet> {
        self.entries.get(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn id(n: u64) -> RecordId {
        RecordId::new(n)
    }

    #[test]
    fn insert_and_lookup() {
        let mut index = ExactIndex::new();
        index.insert(&text("key1"), id(1));

        let found = index.lookup(&text("key1")).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains(&id(1)));
    }

    #[test]
    fn lookup_missing() {
        let index = ExactIndex::new();
        assert!(index.lookup(&text("missing")).is_none());
    }

    #[test]
    fn multiple_records_same_value() {
        let mut index = ExactIndex::new();
        index.insert(&FieldValue::UInt(30), id(1));
        index.insert(&FieldValue::UInt(30), id(2));

        let found = index.lookup(&FieldValue::UInt(30)).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(index.entry_count(), 2);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn kinds_do_not_collide() {
        let mut index = ExactIndex::new();
        index.insert(&FieldValue::Int(1), id(1));
        index.insert(&FieldValue::UInt(1), id(2));
        index.insert(&text("1"), id(3));

        assert_eq!(index.len(), 3);
        assert!(index.lookup(&FieldValue::Int(1)).unwrap().contains(&id(1)));
        assert!(!index.lookup(&FieldValue::UInt(1)).unwrap().contains(&id(1)));
    }

    #[test]
    fn remove_prunes_empty_bucket() {
        let mut index = ExactIndex::new();
        index.insert(&text("key"), id(1));
        assert!(index.contains(&text("key")));

        assert!(index.remove(&text("key"), id(1)));
        assert!(!index.contains(&text("key")));
        assert!(index.is_empty());
    }

    #[test]
    fn remove_one_of_many() {
        let mut index = ExactIndex::new();
        index.insert(&text("key"), id(1));
        index.insert(&text("key"), id(2));

        index.remove(&text("key"), id(1));

        let found = index.lookup(&text("key")).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found.contains(&id(2)));
    }

    #[test]
    fn remove_unknown_is_false() {
        let mut index = ExactIndex::new();
        index.insert(&text("key"), id(1));
        assert!(!index.remove(&text("key"), id(2)));
        assert!(!index.remove(&text("other"), id(1)));
        assert_eq!(index.entry_count(), 1);
    }

    #[test]
    fn null_values_are_indexed() {
        let mut index = ExactIndex::new();
        index.insert(&FieldValue::Null, id(4));
        assert!(index.lookup(&FieldValue::Null).unwrap().contains(&id(4)));
    }
}
