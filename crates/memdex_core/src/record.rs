//! Stored records and their lifecycle metadata.

use crate::types::RecordId;
use std::sync::Arc;

/// Lifecycle metadata of a record.
///
/// Timestamps are nanoseconds since the Unix epoch, taken from the
/// store's monotonic clock, so `created_at <= updated_at` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMeta {
    /// When the record was inserted.
    pub created_at: u64,
    /// When the record was last updated or deleted.
    pub updated_at: u64,
    /// Tombstone flag.
    pub deleted: bool,
}

/// A record held by the store.
///
/// The payload sits behind an `Arc`: cloning a record is cheap and the
/// payload cannot be mutated outside the store's update path. A record
/// returned by the store is a snapshot; later updates produce a new
/// record in the store and leave the snapshot untouched.
#[derive(Debug)]
pub struct Record<T> {
    /// Identifier assigned on insert.
    pub id: RecordId,
    /// Caller-defined payload.
    pub data: Arc<T>,
    /// Starts at 1; bumped by updates when versioning is enabled.
    pub version: u64,
    /// Lifecycle metadata.
    pub meta: RecordMeta,
}

impl<T> Record<T> {
    pub(crate) fn new(id: RecordId, data: T, now: u64) -> Self {
        Self {
            id,
            data: Arc::new(data),
            version: 1,
            meta: RecordMeta {
                created_at: now,
                updated_at: now,
                deleted: false,
            },
        }
    }

    /// Returns true if the record has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.meta.deleted
    }

    /// Builds the successor of this record carrying a new payload.
    pub(crate) fn with_data(&self, data: T, now: u64, bump_version: bool) -> Self {
        Self {
            id: self.id,
            data: Arc::new(data),
            version: if bump_version {
                self.version + 1
            } else {
                self.version
            },
            meta: RecordMeta {
                created_at: self.meta.created_at,
                updated_at: now,
                deleted: false,
            },
        }
    }

    /// Builds the tombstoned successor of this record.
    pub(crate) fn tombstone(&self, now: u64) -> Self {
        Self {
            id: self.id,
            data: Arc::clone(&self.data),
            version: self.version,
            meta: RecordMeta {
                created_at: self.meta.created_at,
                updated_at: now,
                deleted: true,
            },
        }
    }
}

impl<T> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            data: Arc::clone(&self.data),
            version: self.version,
            meta: self.meta,
        }
    }
}
