//! Index trait and identifier sets.

use crate::types::RecordId;
use std::collections::HashSet;

/// A set of record identifiers.
pub type IdSet = HashSet<RecordId>;

/// Core index trait.
///
/// An index maps keys to the set of records currently holding them. All
/// three field index structures implement it, each with its own notion
/// of which keys a single inserted value produces.
pub trait Index<K: ?Sized>: Send + Sync {
    /// Records that `id` holds `key`.
    fn insert(&mut self, key: &K, id: RecordId);

    /// Forgets that `id` holds `key`.
    ///
    /// Returns false if nothing was removed.
    fn remove(&mut self, key: &K, id: RecordId) -> bool;

    /// Looks up the bucket for `key`.
    ///
    /// `None` means no bucket exists. A bucket may exist and be empty for
    /// structures that do not prune.
    fn lookup(&self, key: &K) -> Option<&IdSet>;

    /// Checks if the index holds a bucket for `key`.
    fn contains(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns the number of buckets in the index.
    fn len(&self) -> usize;

    /// Returns true if the index holds no buckets.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the index.
    fn clear(&mut self);
}
