//! Integration test harness.
//!
//! Drives a [`Store`] and a plain shadow model side by side and checks
//! that the store's records, listing and every index agree with the
//! model.

use crate::fixtures::{register_person_indexes, Person};
use crate::generators::StoreOperation;
use memdex_core::{FieldValue, IndexManager, RecordId, Store, StoreConfig};
use std::collections::{BTreeMap, HashMap};

/// Every non-empty prefix of `value`, on character boundaries.
fn prefixes(value: &str) -> impl Iterator<Item = &str> {
    value
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .map(move |end| &value[..end])
}

/// Every non-empty substring of `value`, on character boundaries.
fn substrings(value: &str) -> Vec<&str> {
    let bounds: Vec<usize> = value
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(value.len()))
        .collect();
    let mut out = Vec::new();
    for (n, &start) in bounds.iter().enumerate() {
        for &end in &bounds[n + 1..] {
            out.push(&value[start..end]);
        }
    }
    out
}

/// Checks that `id` is (or is not) reachable through every index entry
/// derived from `person`.
fn assert_indexed(im: &IndexManager<Person>, id: RecordId, person: &Person, expected: bool) {
    let check = |what: &str, found: bool| {
        assert_eq!(
            found, expected,
            "{what} lookup for {id} (expected present: {expected}) on {person:?}"
        );
    };

    let name = FieldValue::Text(person.name.clone());
    check("name exact", im.query_exact_strict("name", &name).contains(&id));
    for prefix in prefixes(&person.name) {
        check("name prefix", im.query_prefix("name", prefix).contains(&id));
    }
    for sub in substrings(&person.name) {
        check("name substring", im.query_substring("name", sub).contains(&id));
    }

    let age = FieldValue::UInt(u64::from(person.age));
    check("age exact", im.query_exact_strict("age", &age).contains(&id));

    let email = person
        .email
        .clone()
        .map_or(FieldValue::Null, FieldValue::Text);
    check("email exact", im.query_exact_strict("email", &email).contains(&id));
    if let Some(email) = &person.email {
        check("email prefix", im.query_prefix("email", email).contains(&id));
    }

    let score = FieldValue::Float(person.score);
    check("score exact", im.query_exact_strict("score", &score).contains(&id));
}

/// A test harness for integration testing.
pub struct IntegrationHarness {
    /// The store under test.
    pub store: Store<Person>,
    /// Live records as the model sees them.
    live: BTreeMap<RecordId, Person>,
    /// Last payload of each deleted record.
    deleted: HashMap<RecordId, Person>,
    /// Every id assigned, in order.
    assigned: Vec<RecordId>,
}

impl IntegrationHarness {
    /// Creates a harness over a store with the standard `Person` indexes.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a harness with a custom store configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let store = Store::new(config);
        register_person_indexes(&store);
        Self {
            store,
            live: BTreeMap::new(),
            deleted: HashMap::new(),
            assigned: Vec::new(),
        }
    }

    /// Inserts a record and tracks it. Asserts id monotonicity.
    pub fn insert(&mut self, person: Person) -> RecordId {
        let record = self.store.insert(person.clone());
        if let Some(&last) = self.assigned.last() {
            assert!(record.id > last, "id {} not above {}", record.id, last);
        }
        self.assigned.push(record.id);
        self.live.insert(record.id, person);
        record.id
    }

    /// Updates a record and checks the outcome against the model.
    pub fn update(&mut self, id: RecordId, person: Person) {
        let result = self.store.update(id, person.clone());
        if self.live.contains_key(&id) {
            let record = result.expect("update of a live record failed");
            assert_eq!(*record.data, person);
            self.live.insert(id, person);
        } else {
            let err = result.expect_err("update of a deleted record succeeded");
            assert!(err.is_deleted(), "unexpected error {err}");
        }
    }

    /// Deletes a record and checks the outcome against the model.
    pub fn delete(&mut self, id: RecordId) {
        let result = self.store.delete(id);
        match self.live.remove(&id) {
            Some(person) => {
                result.expect("delete of a live record failed");
                self.deleted.insert(id, person);
            }
            None => {
                let err = result.expect_err("second delete succeeded");
                assert!(err.is_deleted(), "unexpected error {err}");
            }
        }
    }

    /// Reads a record and checks it against the model.
    pub fn get_and_verify(&self, id: RecordId) {
        match (self.store.get(id), self.live.get(&id)) {
            (Ok(record), Some(expected)) => assert_eq!(*record.data, *expected),
            (Err(err), None) => assert!(err.is_deleted(), "unexpected error {err}"),
            (Ok(record), None) => panic!("deleted record {} still readable", record.id),
            (Err(err), Some(_)) => panic!("live record {id} unreadable: {err}"),
        }
    }

    /// Applies a generated operation. Operations that target a record
    /// are skipped while nothing has been inserted.
    pub fn apply(&mut self, op: &StoreOperation) {
        let pick = |target: usize, assigned: &[RecordId]| -> Option<RecordId> {
            (!assigned.is_empty()).then(|| assigned[target % assigned.len()])
        };
        match op {
            StoreOperation::Insert { person } => {
                self.insert(person.clone());
            }
            StoreOperation::Update { target, person } => {
                if let Some(id) = pick(*target, &self.assigned) {
                    self.update(id, person.clone());
                }
            }
            StoreOperation::Delete { target } => {
                if let Some(id) = pick(*target, &self.assigned) {
                    self.delete(id);
                }
            }
            StoreOperation::Get { target } => {
                if let Some(id) = pick(*target, &self.assigned) {
                    self.get_and_verify(id);
                }
            }
        }
    }

    /// Verifies records, listing and indexes against the model.
    pub fn verify_all(&self) {
        for (&id, expected) in &self.live {
            let record = self.store.get(id).expect("live record unreadable");
            assert_eq!(*record.data, *expected);
        }
        for &id in self.deleted.keys() {
            let err = self.store.get(id).expect_err("deleted record readable");
            assert!(err.is_deleted());
        }

        let (page, total) = self.store.list(0, usize::MAX);
        assert_eq!(total, self.live.len());
        let listed: Vec<RecordId> = page.iter().map(|r| r.id).collect();
        let expected: Vec<RecordId> = self.live.keys().copied().collect();
        assert_eq!(listed, expected, "listing out of insertion order");

        self.store.with_indexes(|im| {
            for (&id, person) in &self.live {
                assert_indexed(im, id, person, true);
            }
            for (&id, person) in &self.deleted {
                assert_indexed(im, id, person, false);
            }
        });
    }

    /// Returns the number of live records in the model.
    pub fn tracked_count(&self) -> usize {
        self.live.len()
    }

    /// Returns the ids of live records in the model, ascending.
    pub fn live_ids(&self) -> Vec<RecordId> {
        self.live.keys().copied().collect()
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}
