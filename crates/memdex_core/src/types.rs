//! Core type definitions for memdex.

use std::fmt;

/// Unique identifier for a record.
///
/// Record IDs are assigned by the store, strictly increasing and never
/// reused, even after the record they named has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Creates a new record ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_raw_value() {
        assert!(RecordId::new(1) < RecordId::new(2));
        assert_eq!(RecordId::from(9).as_u64(), 9);
        assert_eq!(RecordId::new(42).to_string(), "42");
    }
}
