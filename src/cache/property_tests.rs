//! Property-Based Tests for the Cache Module
//!
//! Uses proptest over the in-process backend; async calls are driven with
//! `tokio_test::block_on`.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use tokio_test::block_on;

use crate::cache::{Cache, Coercion, Value, STORE_IDENTITY};
use crate::instrument::{inputs_key, outputs_key};
use crate::store::{Keyspace, KvStore, MemoryStore, SharedStore};

// == Strategies ==
/// Generates values of every storable kind
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        ".{0,64}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12f64..1.0e12f64).prop_map(Value::Float),
    ]
}

/// The coercion that reads a value back as the same kind
fn coercion_for(value: &Value) -> Coercion {
    match value {
        Value::Text(_) => Coercion::Text,
        Value::Bytes(_) => Coercion::Raw,
        Value::Integer(_) => Coercion::Integer,
        Value::Float(_) => Coercion::Float,
    }
}

fn fresh_cache() -> (Cache, SharedStore) {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let cache = block_on(Cache::new(store.clone())).unwrap();
    (cache, store)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Round-trip: storing a value and reading it back with the matching
    // coercion returns the same value.
    #[test]
    fn prop_roundtrip_storage(value in value_strategy()) {
        let (cache, _) = fresh_cache();

        let key = block_on(cache.store(value.clone())).unwrap();
        let retrieved = block_on(cache.retrieve(&key, coercion_for(&value))).unwrap();

        prop_assert_eq!(retrieved, Some(value), "Round-trip value mismatch");
    }

    // Counting: after n sequential stores the counter reads n.
    #[test]
    fn prop_counter_matches_call_count(values in prop::collection::vec(value_strategy(), 1..20)) {
        let (cache, store) = fresh_cache();

        for value in &values {
            block_on(cache.store(value.clone())).unwrap();
        }

        let counter = block_on(store.get(STORE_IDENTITY)).unwrap();
        prop_assert_eq!(counter, Some(values.len().to_string().into_bytes()));
    }

    // History: every successful call appends exactly one input and one output,
    // and the replayed outputs are the keys the calls returned, in order.
    #[test]
    fn prop_history_pairs_calls(values in prop::collection::vec(value_strategy(), 1..20)) {
        let (cache, store) = fresh_cache();

        let keys: Vec<String> = values
            .iter()
            .map(|value| block_on(cache.store(value.clone())).unwrap())
            .collect();

        let inputs = block_on(store.lrange(&inputs_key(STORE_IDENTITY), 0, -1)).unwrap();
        let outputs = block_on(store.lrange(&outputs_key(STORE_IDENTITY), 0, -1)).unwrap();
        prop_assert_eq!(inputs.len(), outputs.len());

        let log = block_on(cache.replay(STORE_IDENTITY)).unwrap();
        prop_assert_eq!(log.call_count(), values.len() as u64);

        let replayed: Vec<String> = log.entries.into_iter().map(|e| e.output).collect();
        prop_assert_eq!(replayed, keys);
    }

    // Keys: generated keys never collide within a session.
    #[test]
    fn prop_keys_are_unique(values in prop::collection::vec(value_strategy(), 1..50)) {
        let (cache, _) = fresh_cache();

        let keys: Vec<String> = values
            .into_iter()
            .map(|value| block_on(cache.store(value)).unwrap())
            .collect();

        let unique: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(unique.len(), keys.len());
    }

    // Fresh session: keys written before a new cache is constructed are gone.
    #[test]
    fn prop_new_cache_hides_old_keys(values in prop::collection::vec(value_strategy(), 1..10)) {
        let (old, store) = fresh_cache();

        let keys: Vec<String> = values
            .into_iter()
            .map(|value| block_on(old.store(value)).unwrap())
            .collect();

        let fresh = block_on(Cache::new(store)).unwrap();
        for key in keys {
            prop_assert_eq!(block_on(fresh.retrieve(&key, Coercion::Raw)).unwrap(), None);
        }
    }

    // Lists: lrange over the whole list returns pushed items in push order.
    #[test]
    fn prop_rpush_preserves_order(items in prop::collection::vec("[a-z]{0,8}", 0..30)) {
        let mut keyspace = Keyspace::new();

        for item in &items {
            keyspace.rpush("list", item.as_bytes()).unwrap();
        }

        let expected: Vec<Vec<u8>> = items.iter().map(|s| s.as_bytes().to_vec()).collect();
        prop_assert_eq!(keyspace.lrange("list", 0, -1).unwrap(), expected);
    }

    // Lists: lrange agrees with slicing for in-range non-negative bounds.
    #[test]
    fn prop_lrange_matches_slice(
        items in prop::collection::vec("[a-z]{1,4}", 1..20),
        start in 0usize..25,
        stop in 0usize..25,
    ) {
        let mut keyspace = Keyspace::new();
        for item in &items {
            keyspace.rpush("list", item.as_bytes()).unwrap();
        }

        let got = keyspace.lrange("list", start as isize, stop as isize).unwrap();
        let stop = stop.min(items.len() - 1);
        let expected: Vec<Vec<u8>> = if start > stop {
            Vec::new()
        } else {
            items[start..=stop].iter().map(|s| s.as_bytes().to_vec()).collect()
        };
        prop_assert_eq!(got, expected);
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Expiry: a value written with setex is readable until the TTL elapses and
    // absent afterwards.
    #[test]
    fn prop_setex_expiration_behavior(key in "[a-zA-Z0-9_]{1,32}", value in "[a-zA-Z0-9 ]{1,64}") {
        let store = MemoryStore::new();

        block_on(store.setex(&key, 1, value.as_bytes())).unwrap();
        prop_assert_eq!(
            block_on(store.get(&key)).unwrap(),
            Some(value.into_bytes()),
            "Value should match before expiration"
        );

        std::thread::sleep(std::time::Duration::from_millis(1100));

        prop_assert_eq!(block_on(store.get(&key)).unwrap(), None);
    }
}
