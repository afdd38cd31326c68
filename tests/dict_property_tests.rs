use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use kvant::Dict;

proptest! {
    #[test]
    fn prop_behaves_like_hashmap(ops in prop::collection::vec(
        (0u8..3, 0i32..64, -1000i32..1000), 0..300
    )) {
        let mut d: Dict<i32, i32> = Dict::new();
        let mut map = HashMap::new();

        for (op, key, value) in ops {
            match op {
                0 => { // insert
                    let fresh = d.insert(key, value);
                    let old = map.insert(key, value);
                    prop_assert_eq!(fresh, old.is_none());
                }
                1 => { // remove
                    prop_assert_eq!(d.remove(&key), map.remove(&key));
                }
                2 => { // lookup
                    prop_assert_eq!(d.get(&key), map.get(&key));
                }
                _ => unreachable!(),
            }

            prop_assert_eq!(d.len(), map.len());
        }

        // финальная сверка содержимого
        let d_items: HashMap<i32, i32> = d.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(d_items, map);
    }
}

proptest! {
    #[test]
    fn prop_rehash_never_loses_keys(keys in prop::collection::hash_set(0u32..10_000, 1..400)) {
        let mut d: Dict<u32, u32> = Dict::new();

        for &k in &keys {
            d.insert(k, k);
        }

        // прогоняем миграцию по одному шагу, проверяя досягаемость
        while d.rehash_step(1) {
            prop_assert_eq!(d.len(), keys.len());
        }

        for &k in &keys {
            prop_assert_eq!(d.get(&k), Some(&k));
        }
    }
}

proptest! {
    #[test]
    fn prop_scan_visits_every_preexisting_key(
        keys in prop::collection::hash_set(0u32..10_000, 1..300),
        steps_per_call in 1usize..8,
    ) {
        let mut d: Dict<u32, u32> = Dict::new();

        for &k in &keys {
            d.insert(k, k);
        }

        // обход с шагами рехеширования между вызовами
        let mut seen = HashSet::new();
        let mut cursor = 0;

        loop {
            cursor = d.scan(cursor, |k, _| {
                seen.insert(*k);
            });

            d.rehash_step(steps_per_call);

            if cursor == 0 {
                break;
            }
        }

        for &k in &keys {
            prop_assert!(seen.contains(&k), "scan missed key {}", k);
        }
    }
}

proptest! {
    #[test]
    fn prop_entry_matches_insert(pairs in prop::collection::vec((0i32..32, -100i32..100), 0..200)) {
        let mut via_entry: Dict<i32, i32> = Dict::new();
        let mut via_insert: Dict<i32, i32> = Dict::new();

        for (k, v) in pairs {
            *via_entry.entry(k).or_insert(0) += v;

            let cur = via_insert.get(&k).copied().unwrap_or(0);
            via_insert.insert(k, cur + v);
        }

        prop_assert_eq!(via_entry.len(), via_insert.len());

        for (k, v) in via_entry.iter() {
            prop_assert_eq!(via_insert.get(k), Some(v));
        }
    }
}

proptest! {
    #[test]
    fn prop_serde_roundtrip(pairs in prop::collection::vec((0i32..1000, -100i32..100), 0..150)) {
        let mut d: Dict<i32, i32> = Dict::new();

        for (k, v) in &pairs {
            d.insert(*k, *v);
        }

        let json = serde_json::to_string(&d).unwrap();
        let restored: Dict<i32, i32> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(restored.len(), d.len());

        for (k, v) in d.iter() {
            prop_assert_eq!(restored.get(k), Some(v));
        }
    }
}
