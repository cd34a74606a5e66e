//! Substring inverted index.
//!
//! Every contiguous substring of an indexed value becomes a key of the
//! inverted map. A value of `n` characters produces at most
//! `n * (n + 1) / 2` keys, so both memory and insert cost grow
//! quadratically with value length. That cost buys single-probe
//! substring lookups; keep substring indexing for short fields.

use crate::index::traits::{IdSet, Index};
use crate::types::RecordId;
use std::collections::HashMap;

/// Inverted index from substrings to the records containing them.
///
/// Windows are cut on character boundaries, never inside a multi-byte
/// character. Empty buckets are pruned on removal.
#[derive(Debug, Default)]
pub struct SubstringIndex {
    /// Substring to record IDs mapping.
    inverted: HashMap<String, IdSet>,
}

impl SubstringIndex {
    /// Creates a new substring index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ids of records whose value contains `needle`.
    #[must_use]
    pub fn query_substring(&self, needle: &str) -> IdSet {
        self.lookup(needle).cloned().unwrap_or_default()
    }
}

/// Calls `f` once per contiguous substring of `value`.
fn for_each_window(value: &str, mut f: impl FnMut(&str)) {
    let mut bounds: Vec<usize> = value.char_indices().map(|(i, _)| i).collect();
    bounds.push(value.len());

    for (i, &start) in bounds.iter().enumerate() {
        for &end in &bounds[i + 1..] {
            f(&value[start..end]);
        }
    }
}

impl Index<str> for SubstringIndex {
    fn insert(&mut self, key: &str, id: RecordId) {
        for_each_window(key, |window| {
            self.inverted
                .entry(window.to_owned())
                .or_default()
                .insert(id);
        });
    }

    fn remove(&mut self, key: &str, id: RecordId) -> bool {
        let mut removed = false;
        for_each_window(key, |window| {
            if let Some(set) = self.inverted.get_mut(window) {
                removed |= set.remove(&id);
                if set.is_empty() {
                    self.inverted.remove(window);
                }
            }
        });
        removed
    }

    fn lookup(&self, key: &str) -> Option<&IdSet> {
        self.inverted.get(key)
    }

    fn len(&self) -> usize {
        self.inverted.len()
    }

    fn clear(&mut self) {
        self.inverted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> RecordId {
        RecordId::new(n)
    }

    fn windows(value: &str) -> Vec<String> {
        let mut out = Vec::new();
        for_each_window(value, |w| out.push(w.to_owned()));
        out
    }

    #[test]
    fn windows_cover_all_substrings() {
        assert_eq!(windows("abc"), vec!["a", "ab", "abc", "b", "bc", "c"]);
        assert!(windows("").is_empty());
    }

    #[test]
    fn windows_respect_char_boundaries() {
        assert_eq!(windows("éa"), vec!["é", "éa", "a"]);
    }

    #[test]
    fn bucket_count_is_bounded() {
        let mut index = SubstringIndex::new();
        index.insert("abcd", id(1));
        assert_eq!(index.len(), 4 * 5 / 2);

        // Repeated characters share buckets.
        let mut index = SubstringIndex::new();
        index.insert("aaa", id(1));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn index_and_search() {
        let mut index = SubstringIndex::new();
        index.insert("alice", id(1));
        index.insert("alicia", id(2));
        index.insert("bob", id(3));

        let hits = index.query_substring("ic");
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&id(1)));
        assert!(hits.contains(&id(2)));

        assert_eq!(index.query_substring("ob").len(), 1);
        assert!(index.query_substring("zz").is_empty());
    }

    #[test]
    fn remove_prunes_empty_buckets() {
        let mut index = SubstringIndex::new();
        index.insert("alice", id(1));
        index.insert("bob", id(2));

        assert!(index.remove("alice", id(1)));

        assert!(index.lookup("lic").is_none());
        assert_eq!(index.len(), windows("bob").len() - 1);
    }

    #[test]
    fn remove_keeps_shared_buckets() {
        let mut index = SubstringIndex::new();
        index.insert("alice", id(1));
        index.insert("alicia", id(2));

        index.remove("alice", id(1));

        assert!(index.query_substring("ali").contains(&id(2)));
        assert!(index.lookup("ce").is_none());
    }

    #[test]
    fn unicode_text() {
        let mut index = SubstringIndex::new();
        index.insert("こんにちは世界", id(1));
        index.insert("Привет мир", id(2));

        assert!(index.query_substring("世界").contains(&id(1)));
        assert!(index.query_substring("вет").contains(&id(2)));
    }
}
