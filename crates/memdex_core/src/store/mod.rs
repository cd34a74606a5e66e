//! Record store for CRUD operations.
//!
//! The store owns the backing table, identifier allocation, the liveness
//! sequence and the index manager. It is the single synchronization
//! domain: mutations take the write lock for the whole of the table
//! change plus the index pass, reads take the read lock.
//!
//! Records are never physically removed. A delete writes a tombstone in
//! the record's slot, drops the slot from the liveness sequence and
//! clears the record from every index, so slot positions and identifiers
//! stay stable for the life of the store.

mod clock;
mod liveness;

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::index::{FieldIndexConfig, IndexKind, IndexManager};
use crate::query::Query;
use crate::record::Record;
use crate::stats::StoreStats;
use crate::types::RecordId;
use crate::value::IndexableValue;
use clock::Clock;
use liveness::Liveness;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// CRUD contract of a record store.
pub trait Storage<T> {
    /// Inserts a record and returns it with its assigned identifier.
    fn insert(&self, data: T) -> Record<T>;

    /// Gets a live record.
    fn get(&self, id: RecordId) -> CoreResult<Record<T>>;

    /// Replaces a live record's payload.
    fn update(&self, id: RecordId, data: T) -> CoreResult<Record<T>>;

    /// Soft-deletes a live record.
    fn delete(&self, id: RecordId) -> CoreResult<()>;

    /// Lists a page of live records and the total live count.
    fn list(&self, offset: usize, limit: usize) -> (Vec<Record<T>>, usize);
}

struct StoreInner<T> {
    /// Backing table; a slot is never reused or removed.
    records: Vec<Record<T>>,
    /// Identifier to slot mapping.
    slots: HashMap<RecordId, usize>,
    live: Liveness,
    indexes: IndexManager<T>,
}

impl<T> StoreInner<T> {
    /// Resolves an identifier to the slot of a live record.
    fn live_slot(&self, id: RecordId) -> CoreResult<usize> {
        let slot = *self.slots.get(&id).ok_or(CoreError::not_found(id))?;
        if self.records[slot].is_deleted() {
            return Err(CoreError::record_deleted(id));
        }
        Ok(slot)
    }
}

/// Thread-safe, memory-resident record store with secondary indexes.
///
/// # Example
///
/// ```rust
/// use memdex_core::{IndexKind, Store, StoreConfig};
///
/// let store: Store<String> = Store::new(StoreConfig::default());
/// store.register_index("word", |r| r.data.as_str().to_owned(), &IndexKind::ALL);
///
/// let hello = store.insert("hello".to_string());
/// store.insert("help".to_string());
///
/// let (page, total) = store.list(0, 10);
/// assert_eq!(total, 2);
/// assert_eq!(page[0].id, hello.id);
///
/// store.delete(hello.id).unwrap();
/// assert!(store.get(hello.id).unwrap_err().is_deleted());
/// ```
pub struct Store<T> {
    inner: RwLock<StoreInner<T>>,
    /// Last identifier handed out.
    last_id: AtomicU64,
    clock: Clock,
    config: StoreConfig,
    stats: StoreStats,
}

impl<T> Store<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let capacity = config.effective_capacity();
        Self {
            inner: RwLock::new(StoreInner {
                records: Vec::with_capacity(capacity),
                slots: HashMap::with_capacity(capacity),
                live: Liveness::new(),
                indexes: IndexManager::new(),
            }),
            last_id: AtomicU64::new(0),
            clock: Clock::new(),
            config,
            stats: StoreStats::new(),
        }
    }

    /// Creates an empty store with a set of field indexes installed.
    #[must_use]
    pub fn with_field_indexes(config: StoreConfig, fields: Vec<FieldIndexConfig<T>>) -> Self {
        let store = Self::new(config);
        {
            let mut inner = store.inner.write();
            for field in fields {
                inner.indexes.register(field);
            }
        }
        store
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the store statistics.
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Installs (or replaces) a field index and indexes every live record
    /// into it.
    ///
    /// The replacement and the backfill happen under one write lock, so
    /// no reader observes a half-built index.
    pub fn register_field_index(&self, config: FieldIndexConfig<T>) -> bool {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let field = config.field.clone();
        let replaced = inner.indexes.register(config);
        let records = &inner.records;
        let live = inner.live.iter().map(|slot| &records[slot]);
        // The field was registered just above.
        if let Ok(skipped) = inner.indexes.backfill(&field, live) {
            self.stats.record_index_skips(skipped);
        }
        replaced
    }

    /// Inserts a record.
    ///
    /// Assigns the next identifier, stamps creation time, appends the
    /// record to the table and the liveness sequence, and indexes it.
    pub fn insert(&self, data: T) -> Record<T> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let id = RecordId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let record = Record::new(id, data, self.clock.now());

        let slot = inner.records.len();
        inner.records.push(record.clone());
        inner.slots.insert(id, slot);
        inner.live.push(slot);

        let skipped = inner.indexes.on_insert(&record);
        self.stats.record_index_skips(skipped);
        self.stats.record_insert();
        debug!(id = id.as_u64(), slot, "inserted record");

        record
    }

    /// Gets a live record.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] if the identifier was never assigned,
    /// [`CoreError::RecordDeleted`] if the record has been deleted.
    pub fn get(&self, id: RecordId) -> CoreResult<Record<T>> {
        let inner = self.inner.read();
        self.stats.record_read();
        let slot = inner.live_slot(id)?;
        Ok(inner.records[slot].clone())
    }

    /// Replaces the payload of a live record.
    ///
    /// Bumps `updated_at`, and the version when versioning is enabled.
    /// The index pass removes the entries of the previous payload before
    /// adding the new ones.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] or [`CoreError::RecordDeleted`].
    pub fn update(&self, id: RecordId, data: T) -> CoreResult<Record<T>> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let slot = inner.live_slot(id)?;
        let updated =
            inner.records[slot].with_data(data, self.clock.now(), self.config.enable_versioning);
        let previous = std::mem::replace(&mut inner.records[slot], updated.clone());

        let skipped = inner.indexes.on_update(&previous, &updated);
        self.stats.record_index_skips(skipped);
        self.stats.record_update();
        debug!(id = id.as_u64(), version = updated.version, "updated record");

        Ok(updated)
    }

    /// Soft-deletes a live record.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotFound`] or [`CoreError::RecordDeleted`].
    pub fn delete(&self, id: RecordId) -> CoreResult<()> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let slot = inner.live_slot(id)?;
        let tombstone = inner.records[slot].tombstone(self.clock.now());
        let previous = std::mem::replace(&mut inner.records[slot], tombstone);
        inner.live.remove(slot);
        inner.indexes.on_remove(&previous);

        self.stats.record_delete();
        debug!(id = id.as_u64(), slot, "deleted record");
        Ok(())
    }

    /// Lists live records in insertion order.
    ///
    /// Returns the page `[offset, offset + limit)` clamped to the number
    /// of live records, together with that number. An offset past the end
    /// yields an empty page, not an error.
    pub fn list(&self, offset: usize, limit: usize) -> (Vec<Record<T>>, usize) {
        let inner = self.inner.read();
        self.stats.record_read();
        let page = inner
            .live
            .page(offset, limit)
            .iter()
            .map(|&slot| inner.records[slot].clone())
            .collect();
        (page, inner.live.len())
    }

    /// Starts a query against this store.
    pub fn query(&self) -> Query<'_, T> {
        Query::new(self)
    }

    /// Returns the number of slots in the backing table, tombstones
    /// included.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Returns true if nothing was ever inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of live records.
    pub fn live_count(&self) -> usize {
        self.inner.read().live.len()
    }

    /// Checks if `id` names a live record.
    pub fn contains(&self, id: RecordId) -> bool {
        self.inner.read().live_slot(id).is_ok()
    }

    /// Returns the names of all indexed fields, sorted.
    pub fn indexed_fields(&self) -> Vec<String> {
        self.inner.read().indexes.fields()
    }

    /// Runs `f` against the index manager under the read lock.
    pub fn with_indexes<R>(&self, f: impl FnOnce(&IndexManager<T>) -> R) -> R {
        let inner = self.inner.read();
        f(&inner.indexes)
    }

    /// Visits every slot of the backing table, tombstones included, under
    /// one read lock. Stops at the first error.
    pub(crate) fn scan<F>(&self, mut f: F) -> CoreResult<()>
    where
        F: FnMut(&Record<T>) -> CoreResult<()>,
    {
        let inner = self.inner.read();
        inner.records.iter().try_for_each(|record| f(record))
    }

    /// Resolves an identifier to its live record without counting a read.
    pub(crate) fn resolve(&self, id: RecordId) -> Option<Record<T>> {
        let inner = self.inner.read();
        let slot = inner.live_slot(id).ok()?;
        Some(inner.records[slot].clone())
    }

    /// Identifiers of all live records in insertion order.
    pub(crate) fn live_ids(&self) -> Vec<RecordId> {
        let inner = self.inner.read();
        inner.live.iter().map(|slot| inner.records[slot].id).collect()
    }
}

impl<T: 'static> Store<T> {
    /// Installs (or replaces) a field index from a typed extractor and
    /// backfills it from the live records.
    ///
    /// Returns true if an earlier registration was replaced.
    pub fn register_index<V, F>(&self, field: impl Into<String>, extractor: F, kinds: &[IndexKind]) -> bool
    where
        V: IndexableValue,
        F: Fn(&Record<T>) -> V + Send + Sync + 'static,
    {
        self.register_field_index(FieldIndexConfig::new(field, extractor, kinds))
    }
}

impl<T> Storage<T> for Store<T> {
    fn insert(&self, data: T) -> Record<T> {
        Store::insert(self, data)
    }

    fn get(&self, id: RecordId) -> CoreResult<Record<T>> {
        Store::get(self, id)
    }

    fn update(&self, id: RecordId, data: T) -> CoreResult<Record<T>> {
        Store::update(self, id, data)
    }

    fn delete(&self, id: RecordId) -> CoreResult<()> {
        Store::delete(self, id)
    }

    fn list(&self, offset: usize, limit: usize) -> (Vec<Record<T>>, usize) {
        Store::list(self, offset, limit)
    }
}

impl<T> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Store")
            .field("slots", &inner.records.len())
            .field("live", &inner.live.len())
            .field("indexes", &inner.indexes)
            .finish_non_exhaustive()
    }
}
