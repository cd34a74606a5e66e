//! Property-based test generators using proptest.
//!
//! Operation strategies refer to records by position among the
//! identifiers assigned so far rather than by identifier, so that a
//! generated sequence stays meaningful whatever ids the store hands out.

use crate::fixtures::Person;
use proptest::prelude::*;

/// Strategy for short lowercase names drawn from a small alphabet, so
/// that prefixes and substrings collide often.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[abc]{1,6}").expect("Invalid regex")
}

/// Strategy for names that include multi-byte characters.
pub fn unicode_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[aé日b]{1,6}").expect("Invalid regex")
}

/// Strategy for generating people.
pub fn person_strategy() -> impl Strategy<Value = Person> {
    (
        name_strategy(),
        0u32..100,
        prop::option::of(prop::string::string_regex("[ab]{1,4}@x").expect("Invalid regex")),
        -100.0f64..100.0,
    )
        .prop_map(|(name, age, email, score)| Person {
            name,
            age,
            email,
            score,
        })
}

/// One store operation.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Insert a record.
    Insert {
        /// Payload
        person: Person,
    },
    /// Update the record at `target`.
    Update {
        /// Position among assigned ids, taken modulo their count
        target: usize,
        /// New payload
        person: Person,
    },
    /// Delete the record at `target`.
    Delete {
        /// Position among assigned ids, taken modulo their count
        target: usize,
    },
    /// Read the record at `target`.
    Get {
        /// Position among assigned ids, taken modulo their count
        target: usize,
    },
}

/// Strategy for generating store operations.
pub fn store_operation_strategy() -> impl Strategy<Value = StoreOperation> {
    prop_oneof![
        4 => person_strategy().prop_map(|person| StoreOperation::Insert { person }),
        2 => (any::<usize>(), person_strategy())
            .prop_map(|(target, person)| StoreOperation::Update { target, person }),
        2 => any::<usize>().prop_map(|target| StoreOperation::Delete { target }),
        1 => any::<usize>().prop_map(|target| StoreOperation::Get { target }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn names_use_small_alphabet(name in name_strategy()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| matches!(c, 'a' | 'b' | 'c')));
        }

        #[test]
        fn people_are_in_range(person in person_strategy()) {
            prop_assert!(person.age < 100);
            prop_assert!(person.score.is_finite());
        }

        #[test]
        fn sequences_respect_bounds(ops in operation_sequence_strategy(5, 20)) {
            prop_assert!(ops.len() >= 5 && ops.len() < 20);
        }
    }
}
