//! Property tests for the store and its indexes.

use memdex_core::{
    compare, FieldKind, FieldValue, Index, IndexKind, PrefixTrie, Record, RecordId, Store,
    StoreConfig, SubstringIndex,
};
use proptest::prelude::*;
use std::cmp::Ordering;

fn word_store() -> Store<String> {
    let store = Store::new(StoreConfig::default());
    store.register_index("word", |r: &Record<String>| r.data.as_str().to_owned(), &IndexKind::ALL);
    store
}

fn char_bounds(s: &str) -> Vec<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ids_strictly_increase_across_deletes(
        ops in prop::collection::vec(any::<bool>(), 1..60),
    ) {
        let store = word_store();
        let mut last: Option<RecordId> = None;
        for (i, delete_after) in ops.into_iter().enumerate() {
            let id = store.insert(format!("w{i}")).id;
            if let Some(prev) = last {
                prop_assert!(id > prev);
            }
            last = Some(id);
            if delete_after {
                store.delete(id).unwrap();
            }
        }
    }

    #[test]
    fn every_prefix_and_substring_finds_the_record(word in "[a-c日é]{1,8}") {
        let store = word_store();
        let id = store.insert(word.clone()).id;
        store.insert("zzz".to_string());

        let bounds = char_bounds(&word);
        store.with_indexes(|im| {
            for &end in &bounds[1..] {
                assert!(im.query_prefix("word", &word[..end]).contains(&id));
            }
            for (n, &start) in bounds.iter().enumerate() {
                for &end in &bounds[n + 1..] {
                    assert!(im.query_substring("word", &word[start..end]).contains(&id));
                }
            }
        });

        store.delete(id).unwrap();
        store.with_indexes(|im| {
            assert!(!im.query_prefix("word", &word).contains(&id));
            assert!(!im.query_substring("word", &word).contains(&id));
        });
    }

    #[test]
    fn trie_agrees_with_starts_with(
        words in prop::collection::vec("[ab]{0,5}", 1..20),
        prefix in "[ab]{0,3}",
    ) {
        let mut trie = PrefixTrie::new();
        for (i, w) in words.iter().enumerate() {
            trie.insert(w, RecordId::new(i as u64 + 1));
        }
        let expected: std::collections::HashSet<RecordId> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.starts_with(prefix.as_str()))
            .map(|(i, _)| RecordId::new(i as u64 + 1))
            .collect();
        prop_assert_eq!(trie.query_prefix(&prefix), expected);
    }

    #[test]
    fn substring_index_agrees_with_contains(
        words in prop::collection::vec("[ab]{1,5}", 1..20),
        needle in "[ab]{1,3}",
    ) {
        let mut index = SubstringIndex::new();
        for (i, w) in words.iter().enumerate() {
            index.insert(w, RecordId::new(i as u64 + 1));
        }
        let expected: std::collections::HashSet<RecordId> = words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.contains(needle.as_str()))
            .map(|(i, _)| RecordId::new(i as u64 + 1))
            .collect();
        prop_assert_eq!(index.query_substring(&needle), expected);
    }

    #[test]
    fn list_pages_are_clamped(live in 0usize..30, offset in 0usize..40, limit in 1usize..40) {
        let store = word_store();
        for i in 0..live {
            store.insert(format!("w{i}"));
        }

        let (page, total) = store.list(offset, limit);
        prop_assert_eq!(total, live);
        prop_assert_eq!(page.len(), live.saturating_sub(offset).min(limit));
    }

    #[test]
    fn query_pages_partition_results(live in 1usize..40, limit in 1usize..10) {
        let store = word_store();
        let ids: Vec<RecordId> = (0..live).map(|i| store.insert(format!("w{i}")).id).collect();

        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let page = store.query().offset(offset).limit(limit).execute().unwrap();
            if page.is_empty() {
                break;
            }
            seen.extend(page.iter().map(|r| r.id));
            offset += limit;
        }
        prop_assert_eq!(seen, ids);
    }

    #[test]
    fn integer_coercion_preserves_order(a in any::<i32>(), b in any::<i32>()) {
        let signed = compare(&FieldValue::Int(a.into()), &FieldValue::Int(b.into())).unwrap();
        let float = compare(
            &FieldValue::Int(a.into()).coerce_to(FieldKind::Float).unwrap(),
            &FieldValue::Int(b.into()).coerce_to(FieldKind::Float).unwrap(),
        )
        .unwrap();
        prop_assert_eq!(signed, float);
        prop_assert_eq!(signed, a.cmp(&b));
    }

    #[test]
    fn unsigned_literals_round_trip(n in 0u64..=(i64::MAX as u64)) {
        let signed = FieldValue::UInt(n).coerce_to(FieldKind::Int).unwrap();
        prop_assert_eq!(signed.clone().coerce_to(FieldKind::UInt).unwrap(), FieldValue::UInt(n));
        prop_assert_eq!(
            compare(&signed, &FieldValue::Int(0)).unwrap(),
            if n == 0 { Ordering::Equal } else { Ordering::Greater }
        );
    }
}
