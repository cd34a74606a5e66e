//! Prefix tree index.

use crate::index::traits::{IdSet, Index};
use crate::types::RecordId;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    /// Records whose key passes through this node.
    ids: IdSet,
}

/// Prefix tree keyed by Unicode scalar values.
///
/// Every node holds the identifiers of all keys that pass through it, so
/// a prefix lookup is a single walk. If an id is present at a node it is
/// present at every ancestor, the root included; the root therefore
/// answers the empty prefix with every id in the tree.
///
/// Removal clears ids along the path but never prunes nodes. Memory is
/// reclaimed only by [`Index::clear`].
#[derive(Debug, Default)]
pub struct PrefixTrie {
    root: TrieNode,
    /// Number of non-root nodes.
    nodes: usize,
}

impl PrefixTrie {
    /// Creates an empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn walk(&self, key: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for c in key.chars() {
            node = node.children.get(&c)?;
        }
        Some(node)
    }

    /// Returns the ids of all keys starting with `prefix`.
    #[must_use]
    pub fn query_prefix(&self, prefix: &str) -> IdSet {
        self.lookup(prefix).cloned().unwrap_or_default()
    }
}

impl Index<str> for PrefixTrie {
    fn insert(&mut self, key: &str, id: RecordId) {
        let mut node = &mut self.root;
        node.ids.insert(id);
        for c in key.chars() {
            node = match node.children.entry(c) {
                std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::hash_map::Entry::Vacant(e) => {
                    self.nodes += 1;
                    e.insert(TrieNode::default())
                }
            };
            node.ids.insert(id);
        }
    }

    fn remove(&mut self, key: &str, id: RecordId) -> bool {
        // A broken path means the key was never inserted.
        if self.walk(key).is_none() {
            return false;
        }

        let mut node = &mut self.root;
        let mut removed = node.ids.remove(&id);
        for c in key.chars() {
            let Some(next) = node.children.get_mut(&c) else {
                break;
            };
            node = next;
            removed |= node.ids.remove(&id);
        }
        removed
    }

    fn lookup(&self, key: &str) -> Option<&IdSet> {
        self.walk(key).map(|node| &node.ids)
    }

    fn len(&self) -> usize {
        self.nodes
    }

    fn clear(&mut self) {
        self.root = TrieNode::default();
        self.nodes = 0;
    }
}
