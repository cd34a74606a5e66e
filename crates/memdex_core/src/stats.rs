//! Store statistics.
//!
//! Provides counters for monitoring store and query activity.
//!
//! # Usage
//!
//! ```rust
//! use memdex_core::{Store, StoreConfig};
//!
//! let store: Store<String> = Store::new(StoreConfig::default());
//! store.insert("hello".to_string());
//!
//! let stats = store.stats().snapshot();
//! assert_eq!(stats.inserts, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics.
///
/// All counters are atomic and can be read while operations are in
/// progress. Values only ever increase.
#[derive(Debug, Default)]
pub struct StoreStats {
    // Mutation counters
    inserts: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,

    // Read counters
    reads: AtomicU64,
    index_lookups: AtomicU64,
    range_scans: AtomicU64,

    // Query outcomes
    queries: AtomicU64,
    queries_timed_out: AtomicU64,
    queries_cancelled: AtomicU64,

    /// Prefix/substring entries skipped because a value had no string form.
    index_skips: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    // === Increment methods (internal use) ===

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_index_lookup(&self) {
        self.index_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_range_scan(&self) {
        self.range_scans.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query_timeout(&self) {
        self.queries_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query_cancelled(&self) {
        self.queries_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_index_skips(&self, count: usize) {
        if count > 0 {
            self.index_skips.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    // === Getter methods (public API) ===

    /// Returns the total number of inserts.
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Returns the total number of updates.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Returns the total number of deletes.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the total number of point reads and list calls.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the total number of index lookups made by queries.
    pub fn index_lookups(&self) -> u64 {
        self.index_lookups.load(Ordering::Relaxed)
    }

    /// Returns the total number of full-table range scans.
    ///
    /// Each range condition costs one scan over every stored slot.
    pub fn range_scans(&self) -> u64 {
        self.range_scans.load(Ordering::Relaxed)
    }

    /// Returns the total number of executed queries.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Returns the number of queries stopped by their deadline.
    pub fn queries_timed_out(&self) -> u64 {
        self.queries_timed_out.load(Ordering::Relaxed)
    }

    /// Returns the number of queries stopped by cancellation.
    pub fn queries_cancelled(&self) -> u64 {
        self.queries_cancelled.load(Ordering::Relaxed)
    }

    /// Returns the number of skipped prefix/substring entries.
    pub fn index_skips(&self) -> u64 {
        self.index_skips.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserts: self.inserts(),
            updates: self.updates(),
            deletes: self.deletes(),
            reads: self.reads(),
            index_lookups: self.index_lookups(),
            range_scans: self.range_scans(),
            queries: self.queries(),
            queries_timed_out: self.queries_timed_out(),
            queries_cancelled: self.queries_cancelled(),
            index_skips: self.index_skips(),
        }
    }
}

/// A point-in-time snapshot of store statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Total number of inserts.
    pub inserts: u64,
    /// Total number of updates.
    pub updates: u64,
    /// Total number of deletes.
    pub deletes: u64,
    /// Total number of point reads and list calls.
    pub reads: u64,
    /// Total number of index lookups.
    pub index_lookups: u64,
    /// Total number of range scans.
    pub range_scans: u64,
    /// Total number of executed queries.
    pub queries: u64,
    /// Queries stopped by their deadline.
    pub queries_timed_out: u64,
    /// Queries stopped by cancellation.
    pub queries_cancelled: u64,
    /// Skipped prefix/substring entries.
    pub index_skips: u64,
}
