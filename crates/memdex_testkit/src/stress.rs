//! Stress tests for memdex.
//!
//! These runners exercise the store under heavy load and concurrent
//! access. Expected failures (such as reading a record another thread
//! just deleted) are counted rather than treated as bugs.

use crate::fixtures::{scenarios::NAMES, Person};
use memdex_core::{CoreError, RecordId, Store};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Number of records to seed before reading.
    pub record_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            record_count: 1_000,
        }
    }
}

fn person_for(i: usize) -> Person {
    let age = 20 + u32::try_from(i % 60).unwrap_or(0);
    Person::new(NAMES[i % NAMES.len()], age)
}

fn seed(store: &Store<Person>, count: usize) -> Vec<RecordId> {
    (0..count).map(|i| store.insert(person_for(i)).id).collect()
}

/// Run a sequential insert stress test.
pub fn stress_sequential_inserts(store: &Store<Person>, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    for i in 0..config.operations {
        store.insert(person_for(i));
    }
    StressTestResult::new(config.operations, 0, start.elapsed())
}

/// Run a mixed update/read/delete stress test over seeded records.
///
/// Operations on records deleted earlier in the run count as failed.
pub fn stress_mixed_operations(store: &Store<Person>, config: &StressConfig) -> StressTestResult {
    let ids = seed(store, config.record_count.max(1));

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let id = ids[i % ids.len()];

        let result = match i % 4 {
            0 => store.update(id, person_for(i + 1)).map(|_| ()),
            1 | 2 => store.get(id).map(|_| ()),
            _ => store.delete(id),
        };

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run concurrent writers and query readers against one store.
///
/// Half of the threads insert and delete, the other half run prefix and
/// range queries. Query errors other than [`CoreError::NoMatches`] count
/// as failures.
pub fn stress_concurrent_mixed(store: Arc<Store<Person>>, config: &StressConfig) -> StressTestResult {
    seed(&store, config.record_count);

    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let threads = config.threads.max(2);
    let ops_per_thread = config.operations / threads;

    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let ok = if t % 2 == 0 {
                        let id = store.insert(person_for(t * ops_per_thread + i)).id;
                        i % 2 == 1 || store.delete(id).is_ok()
                    } else if i % 2 == 0 {
                        store.query().field("name").contains("ali").execute().is_ok()
                    } else {
                        match store.query().field("age").between(25, 35).count() {
                            Ok(_) | Err(CoreError::NoMatches { .. }) => true,
                            Err(_) => false,
                        }
                    };

                    let counter = if ok { &successful } else { &failed };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::person_store;

    #[test]
    fn test_sequential_inserts() {
        let store = person_store();
        let config = StressConfig {
            operations: 1_000,
            ..Default::default()
        };

        let result = stress_sequential_inserts(&store, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 1_000);
        assert_eq!(store.live_count(), 1_000);
    }

    #[test]
    fn test_mixed_operations() {
        let store = person_store();
        let config = StressConfig {
            operations: 400,
            record_count: 100,
            ..Default::default()
        };

        let result = stress_mixed_operations(&store, &config);
        assert_eq!(result.total_ops, 400);
        // Each record always sees the same op kind; a quarter are
        // deleted once and then fail three more deletes.
        assert_eq!(store.live_count(), 75);
        assert_eq!(result.failed_ops, 75);
    }

    #[test]
    fn test_concurrent_mixed() {
        let store = Arc::new(person_store());
        let config = StressConfig {
            operations: 800,
            threads: 4,
            record_count: 200,
        };

        let result = stress_concurrent_mixed(Arc::clone(&store), &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.total_ops, 800);
        // Writers delete every other record they insert.
        assert_eq!(store.live_count(), 200 + 2 * 100);
    }
}
