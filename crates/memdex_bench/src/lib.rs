//! Benchmark utilities.

use memdex_core::{RecordId, Store};
use memdex_testkit::{person_store, Person};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generate a random lowercase-alphanumeric name of `len` characters.
pub fn random_name(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Generate `count` people with random names and ages in `18..90`.
pub fn generate_people(count: usize, name_len: usize) -> Vec<Person> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| Person::new(random_name(name_len), rng.gen_range(18..90)).with_score(rng.gen()))
        .collect()
}

/// Build an indexed store holding `count` random people.
pub fn populated_store(count: usize, name_len: usize) -> (Store<Person>, Vec<RecordId>) {
    let store = person_store();
    let ids = generate_people(count, name_len)
        .into_iter()
        .map(|p| store.insert(p).id)
        .collect();
    (store, ids)
}
