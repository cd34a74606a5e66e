//! Test fixtures and store helpers.
//!
//! Provides a small record type with one field per interesting value
//! kind, and stores pre-registered with indexes over it.

use memdex_core::{IndexKind, Record, RecordId, Store, StoreConfig};

/// Record payload used across tests and benchmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    /// Indexed exact + prefix + substring.
    pub name: String,
    /// Indexed exact.
    pub age: u32,
    /// Indexed exact + prefix; `None` exercises null handling.
    pub email: Option<String>,
    /// Indexed exact; used by float range queries.
    pub score: f64,
}

impl Person {
    /// Creates a person without email and a zero score.
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            email: None,
            score: 0.0,
        }
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Registers the standard `Person` indexes on `store`.
pub fn register_person_indexes(store: &Store<Person>) {
    store.register_index("name", |r: &Record<Person>| r.data.name.clone(), &IndexKind::ALL);
    store.register_index("age", |r: &Record<Person>| r.data.age, &[IndexKind::Exact]);
    store.register_index(
        "email",
        |r: &Record<Person>| r.data.email.clone(),
        &[IndexKind::Exact, IndexKind::Prefix],
    );
    store.register_index("score", |r: &Record<Person>| r.data.score, &[IndexKind::Exact]);
}

/// Creates an empty `Person` store with the standard indexes.
pub fn person_store() -> Store<Person> {
    person_store_with(StoreConfig::default())
}

/// Creates an empty `Person` store with the standard indexes and a
/// custom configuration.
pub fn person_store_with(config: StoreConfig) -> Store<Person> {
    let store = Store::new(config);
    register_person_indexes(&store);
    store
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Names used by the populated scenario; several share prefixes and
    /// inner substrings.
    pub const NAMES: [&str; 8] = [
        "alice", "alicia", "bob", "bobby", "carol", "malina", "dave", "eve",
    ];

    /// Creates a store with `count` people cycling through [`NAMES`],
    /// with ages `20 + i % 50`. Returns the store and the assigned ids.
    pub fn populated_store(count: usize) -> (Store<Person>, Vec<RecordId>) {
        let store = person_store();
        let ids = (0..count)
            .map(|i| {
                let age = 20 + u32::try_from(i % 50).unwrap_or(0);
                let person = Person::new(NAMES[i % NAMES.len()], age)
                    .with_email(format!("user{i}@example.com"))
                    .with_score(i as f64 / 10.0);
                store.insert(person).id
            })
            .collect();
        (store, ids)
    }

    /// The three-record scenario: `alice`, `alicia`, `bob`.
    pub fn alice_alicia_bob() -> (Store<Person>, [RecordId; 3]) {
        let store = person_store();
        let ids = [
            store.insert(Person::new("alice", 30)).id,
            store.insert(Person::new("alicia", 25)).id,
            store.insert(Person::new("bob", 40)).id,
        ];
        (store, ids)
    }
}
