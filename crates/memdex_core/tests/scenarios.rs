//! End-to-end scenarios against the public API.

use memdex_core::{
    CancelToken, CoreError, FieldValue, IndexKind, Record, RecordId, Storage, Store, StoreConfig,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
    age: i64,
}

fn user(name: &str, age: i64) -> User {
    User {
        name: name.to_string(),
        age,
    }
}

fn user_store(config: StoreConfig) -> Store<User> {
    let store = Store::new(config);
    store.register_index("name", |r: &Record<User>| r.data.name.clone(), &IndexKind::ALL);
    store.register_index("age", |r: &Record<User>| r.data.age, &[IndexKind::Exact]);
    store
}

fn set(ids: &[RecordId]) -> HashSet<RecordId> {
    ids.iter().copied().collect()
}

#[test]
fn alice_alicia_bob() {
    let store = user_store(StoreConfig::default());
    let alice = store.insert(user("alice", 30)).id;
    let alicia = store.insert(user("alicia", 25)).id;
    let bob = store.insert(user("bob", 40)).id;

    store.with_indexes(|im| {
        assert_eq!(im.query_prefix("name", "ali"), set(&[alice, alicia]));
        assert_eq!(
            im.query_exact("name", &FieldValue::Text("bob".into())),
            set(&[bob])
        );
        assert_eq!(im.query_substring("name", "ic"), set(&[alice, alicia]));
    });

    store.delete(alicia).unwrap();

    store.with_indexes(|im| {
        assert_eq!(im.query_prefix("name", "ali"), set(&[alice]));
    });
}

#[test]
fn age_between_25_and_30() {
    let store = user_store(StoreConfig::default());
    let ids: Vec<RecordId> = [20, 25, 28, 31]
        .into_iter()
        .enumerate()
        .map(|(i, age)| store.insert(user(&format!("u{i}"), age)).id)
        .collect();

    let hits = store.query().field("age").between(25, 30).execute().unwrap();
    let hit_ids: Vec<RecordId> = hits.iter().map(|r| r.id).collect();
    assert_eq!(hit_ids, vec![ids[1], ids[2]]);
}

#[test]
fn tombstones_are_excluded_everywhere() {
    let store = user_store(StoreConfig::default());
    let keep = store.insert(user("carol", 33)).id;
    let gone = store.insert(user("carl", 33)).id;

    store.delete(gone).unwrap();

    assert_eq!(store.get(gone).unwrap_err(), CoreError::record_deleted(gone));
    let (page, total) = store.list(0, 10);
    assert_eq!(total, 1);
    assert!(page.iter().all(|r| r.id != gone));

    let hits = store.query().field("name").contains("car").execute().unwrap();
    assert_eq!(hits.iter().map(|r| r.id).collect::<Vec<_>>(), vec![keep]);

    let hits = store.query().field("age").equals(33).execute().unwrap();
    assert_eq!(hits.len(), 1);

    let hits = store.query().field("age").gte(0).execute().unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn update_round_trip_with_and_without_versioning() {
    for versioning in [false, true] {
        let store = user_store(StoreConfig::new().enable_versioning(versioning));
        let id = store.insert(user("dora", 50)).id;

        store.update(id, user("dora", 51)).unwrap();
        let record = store.get(id).unwrap();

        assert_eq!(*record.data, user("dora", 51));
        assert_eq!(record.version, if versioning { 2 } else { 1 });
    }
}

#[test]
fn list_pagination_boundaries() {
    let store = user_store(StoreConfig::default());
    for i in 0..7 {
        store.insert(user(&format!("p{i}"), i));
    }

    let (page, total) = store.list(0, 3);
    assert_eq!((page.len(), total), (3, 7));

    let (page, total) = store.list(0, 100);
    assert_eq!((page.len(), total), (7, 7));

    let (page, total) = store.list(7, 3);
    assert_eq!((page.len(), total), (0, 7));

    let (page, total) = store.list(usize::MAX, usize::MAX);
    assert_eq!((page.len(), total), (0, 7));
}

#[test]
fn values_without_string_form_still_reach_exact_index() {
    #[derive(Debug)]
    struct Blob {
        bytes: Vec<u8>,
    }

    let store: Store<Blob> = Store::new(StoreConfig::default());
    store.register_index("bytes", |r: &Record<Blob>| r.data.bytes.clone(), &IndexKind::ALL);

    let id = store.insert(Blob { bytes: vec![1, 2] }).id;

    assert_eq!(store.stats().index_skips(), 1);
    let hits = store
        .query()
        .field("bytes")
        .equals(vec![1u8, 2])
        .execute()
        .unwrap();
    assert_eq!(hits[0].id, id);

    let err = store.query().field("bytes").contains(vec![1u8]).execute().unwrap_err();
    assert!(matches!(err, CoreError::TypeUnsupported { .. }));
}

#[test]
fn dynamic_field_values() {
    #[derive(Debug)]
    struct Row {
        value: FieldValue,
    }

    let store: Store<Row> = Store::new(StoreConfig::default());
    store.register_index("value", |r: &Record<Row>| r.data.value.clone(), &[IndexKind::Exact]);

    store.insert(Row {
        value: FieldValue::Int(5),
    });
    store.insert(Row {
        value: FieldValue::Text("five".into()),
    });

    // Without a declared kind, literals are used as given.
    let hits = store.query().field("value").equals(5i64).execute().unwrap();
    assert_eq!(hits.len(), 1);
    let hits = store.query().field("value").equals(5u64).execute().unwrap();
    assert!(hits.is_empty());

    // A range over mixed kinds reports the mismatch.
    let err = store.query().field("value").gt(1i64).execute().unwrap_err();
    assert!(matches!(err, CoreError::IncomparableTypes { .. }));
}

#[test]
fn storage_trait_object() {
    let store = user_store(StoreConfig::default());
    let storage: &dyn Storage<User> = &store;

    let record = storage.insert(user("erin", 29));
    storage.delete(record.id).unwrap();
    assert!(storage.get(record.id).unwrap_err().is_deleted());
    assert_eq!(storage.list(0, 10).1, 0);
}

#[test]
fn concurrent_writers_and_queries() {
    let store = Arc::new(user_store(StoreConfig::default()));
    for i in 0..100 {
        store.insert(user(&format!("seed{i}"), i));
    }

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    let id = store.insert(user(&format!("w{t}-{i}"), 1000 + i)).id;
                    if i % 2 == 0 {
                        store.delete(id).unwrap();
                    } else {
                        store.update(id, user(&format!("w{t}-{i}-u"), 2000 + i)).unwrap();
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    // Seeds are never touched by writers.
                    let seeds = store
                        .query()
                        .field("name")
                        .contains("seed")
                        .limit(1000)
                        .execute()
                        .unwrap();
                    assert_eq!(seeds.len(), 100);

                    for record in store.query().field("age").gte(1000).limit(1000).execute().unwrap() {
                        assert!(!record.is_deleted());
                    }
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(store.live_count(), 100 + 4 * 50);
    let updated = store
        .query()
        .field("age")
        .gte(2000)
        .limit(1000)
        .count()
        .unwrap();
    assert_eq!(updated, 200);
}

#[test]
fn token_cancelled_from_another_thread() {
    let store = Arc::new(user_store(StoreConfig::default()));
    for i in 0..1000 {
        store.insert(user(&format!("n{i}"), i));
    }

    let token = CancelToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || token.cancel())
    };
    canceller.join().unwrap();

    let err = store
        .query()
        .field("age")
        .lt(500)
        .execute_with_cancel(&token)
        .unwrap_err();
    assert_eq!(err, CoreError::Cancelled);
    assert_eq!(store.live_count(), 1000);
}

/// Store of plain numbers whose "n" extractor runs `on_scan` once armed.
fn armed_store<F>(count: u64, on_scan: F) -> (Store<u64>, Arc<AtomicBool>)
where
    F: Fn() + Send + Sync + 'static,
{
    let armed = Arc::new(AtomicBool::new(false));
    let store = Store::new(StoreConfig::default());
    let flag = Arc::clone(&armed);
    store.register_index(
        "n",
        move |r: &Record<u64>| {
            if flag.load(Ordering::Acquire) {
                on_scan();
            }
            *r.data
        },
        &[IndexKind::Exact],
    );
    for n in 0..count {
        store.insert(n);
    }
    (store, armed)
}

fn assert_untouched(store: &Store<u64>, count: u64) {
    assert_eq!(store.live_count(), count as usize);
    assert_eq!(store.len(), count as usize);
    let (page, total) = store.list(0, 1);
    assert_eq!(total, count as usize);
    assert_eq!(*page[0].data, 0);
    store.with_indexes(|im| {
        for n in [0, count / 2, count - 1] {
            let hits = im.query_exact_strict("n", &FieldValue::UInt(n));
            assert_eq!(hits.len(), 1);
        }
    });
}

#[test]
fn cancel_during_range_scan() {
    let token = CancelToken::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let (store, armed) = {
        let token = token.clone();
        let calls = Arc::clone(&calls);
        armed_store(3000, move || {
            if calls.fetch_add(1, Ordering::Relaxed) == 10 {
                token.cancel();
            }
        })
    };

    armed.store(true, Ordering::Release);
    let err = store
        .query()
        .field("n")
        .gte(0u64)
        .execute_with_cancel(&token)
        .unwrap_err();
    armed.store(false, Ordering::Release);

    assert_eq!(err, CoreError::Cancelled);
    // The scan stopped at the first periodic check, well short of the table.
    let scanned = calls.load(Ordering::Relaxed);
    assert!(scanned > 10 && scanned < 3000, "scanned {scanned}");
    assert_eq!(store.stats().queries_cancelled(), 1);
    assert_untouched(&store, 3000);
    assert_eq!(store.query().field("n").gte(0u64).count().unwrap(), 3000);
}

#[test]
fn deadline_during_range_scan() {
    let (store, armed) = armed_store(3000, || thread::sleep(Duration::from_micros(100)));

    armed.store(true, Ordering::Release);
    let err = store
        .query()
        .field("n")
        .lt(3000u64)
        .timeout(Duration::from_millis(20))
        .execute()
        .unwrap_err();
    armed.store(false, Ordering::Release);

    assert_eq!(
        err,
        CoreError::DeadlineExceeded {
            timeout: Duration::from_millis(20)
        }
    );
    assert_eq!(store.stats().queries_timed_out(), 1);
    assert_untouched(&store, 3000);
    assert_eq!(store.query().field("n").lt(3000u64).count().unwrap(), 3000);
}
