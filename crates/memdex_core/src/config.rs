//! Store configuration.

use std::time::Duration;

/// Capacity used when the configured value is zero.
pub(crate) const DEFAULT_INITIAL_CAPACITY: usize = 1000;

/// Configuration for creating a store.
///
/// Versioning is off by default: records keep `version == 1` for their
/// whole life unless `enable_versioning` is set.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity hint for the backing table. Zero falls back to 1000.
    pub initial_capacity: usize,

    /// Whether updates increment the record version.
    pub enable_versioning: bool,

    /// Upper bound on the execution time of a single query.
    pub query_timeout: Duration,

    /// Page size a new query starts with.
    pub default_query_limit: usize,

    /// Whether `equals` conditions fall back to prefix and substring
    /// lookups when no exact bucket exists.
    pub equals_fallback: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            enable_versioning: false,
            query_timeout: Duration::from_secs(30),
            default_query_limit: 100,
            equals_fallback: false,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity hint.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets whether updates bump the record version.
    #[must_use]
    pub const fn enable_versioning(mut self, value: bool) -> Self {
        self.enable_versioning = value;
        self
    }

    /// Sets the query execution bound.
    #[must_use]
    pub const fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Sets the default page size for new queries.
    #[must_use]
    pub const fn default_query_limit(mut self, limit: usize) -> Self {
        self.default_query_limit = limit;
        self
    }

    /// Sets whether `equals` conditions may fall back to prefix and
    /// substring lookups.
    #[must_use]
    pub const fn equals_fallback(mut self, value: bool) -> Self {
        self.equals_fallback = value;
        self
    }

    /// Returns the capacity to allocate, replacing zero with the default.
    pub(crate) fn effective_capacity(&self) -> usize {
        if self.initial_capacity == 0 {
            DEFAULT_INITIAL_CAPACITY
        } else {
            self.initial_capacity
        }
    }
}
