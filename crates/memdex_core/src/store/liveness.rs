//! Ordered sequence of live record slots.

/// Slots of non-deleted records, in insertion order.
///
/// Slots are appended in increasing order, so the sequence stays sorted
/// and removal can binary-search. Listing a page slices the sequence
/// directly without touching tombstones.
#[derive(Debug, Default)]
pub(crate) struct Liveness {
    slots: Vec<usize>,
}

impl Liveness {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a newly inserted slot.
    pub(crate) fn push(&mut self, slot: usize) {
        debug_assert!(self.slots.last().map_or(true, |&last| last < slot));
        self.slots.push(slot);
    }

    /// Removes a slot; returns false if it was not live.
    pub(crate) fn remove(&mut self, slot: usize) -> bool {
        match self.slots.binary_search(&slot) {
            Ok(pos) => {
                self.slots.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the slots in `[offset, offset + limit)`, clamped to bounds.
    pub(crate) fn page(&self, offset: usize, limit: usize) -> &[usize] {
        let total = self.slots.len();
        if offset >= total {
            return &[];
        }
        let end = offset.saturating_add(limit).min(total);
        &self.slots[offset..end]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().copied()
    }
}
