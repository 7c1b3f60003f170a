// A closure that panics inside compute/compute_if_present/merge must not
// leave a hole in the middle of a probe run.
//
// - The entry whose value was handed to the closure is removed, as if the
//   closure had returned `None`.
// - Every other member of the run is still found.
// - `len()` matches what iteration yields, and the map stays usable.
use probe_collections::hashing::home_index;
use probe_collections::{Int2ObjectHashMap, NonNullValues, ObjectHashMap, TableConfig};
use std::hash::{BuildHasherDefault, Hasher};
use std::panic::{catch_unwind, AssertUnwindSafe};

fn colliding_keys(mask: usize, count: usize) -> Vec<i32> {
    let home = home_index(0i32, mask);
    (0..)
        .filter(|&k| home_index(k, mask) == home)
        .take(count)
        .collect()
}

/// Sends every key to the same home slot.
#[derive(Default)]
struct SameHome;

impl Hasher for SameHome {
    fn finish(&self) -> u64 {
        0
    }

    fn write(&mut self, _bytes: &[u8]) {}
}

type CollidingMap = ObjectHashMap<u32, String, NonNullValues, BuildHasherDefault<SameHome>>;

fn colliding_object_map(count: u32) -> CollidingMap {
    let config = TableConfig::new().with_initial_capacity(16);
    let mut m = CollidingMap::with_config_and_hasher(config, Default::default()).unwrap();
    for k in 0..count {
        m.put(k, format!("v{k}"));
    }
    m
}

fn int_map_with(keys: &[i32]) -> Int2ObjectHashMap<String> {
    let mut m = Int2ObjectHashMap::with_capacity(16, 0.9).unwrap();
    for &k in keys {
        m.put(k, format!("v{k}"));
    }
    m
}

fn assert_int_map_survivors(m: &Int2ObjectHashMap<String>, lost: i32, kept: &[i32]) {
    assert_eq!(m.len(), kept.len());
    assert_eq!(m.iter().count(), m.len());
    assert!(!m.contains_key(lost));
    for &k in kept {
        assert_eq!(m.get(k), Some(&format!("v{k}")), "key {k} unreachable");
    }
}

#[test]
fn int_object_map_compute_panic_keeps_chain_reachable() {
    let keys = colliding_keys(15, 3);
    let mut m = int_map_with(&keys);
    let result = catch_unwind(AssertUnwindSafe(|| {
        m.compute(keys[0], |_, _| panic!("compute failed"));
    }));
    assert!(result.is_err());
    assert_int_map_survivors(&m, keys[0], &keys[1..]);

    m.put(keys[0], "again".into());
    assert_eq!(m.len(), 3);
    assert_eq!(m.get(keys[0]).map(String::as_str), Some("again"));
}

#[test]
fn int_object_map_compute_if_present_and_merge_panics() {
    let keys = colliding_keys(15, 4);

    let mut m = int_map_with(&keys);
    let result = catch_unwind(AssertUnwindSafe(|| {
        m.compute_if_present(keys[1], |_, _| panic!("compute_if_present failed"));
    }));
    assert!(result.is_err());
    assert_int_map_survivors(&m, keys[1], &[keys[0], keys[2], keys[3]]);

    let mut m = int_map_with(&keys);
    let result = catch_unwind(AssertUnwindSafe(|| {
        m.merge(keys[2], "x".into(), |_, _| panic!("merge failed"));
    }));
    assert!(result.is_err());
    assert_int_map_survivors(&m, keys[2], &[keys[0], keys[1], keys[3]]);
}

#[test]
fn object_map_panics_keep_chain_reachable() {
    let ops: [fn(&mut CollidingMap); 3] = [
        |m| {
            m.merge(2, "x".into(), |_, _| panic!("merge failed"));
        },
        |m| {
            m.compute(2, |_, _| panic!("compute failed"));
        },
        |m| {
            m.compute_if_present(&2u32, |_, _| panic!("compute_if_present failed"));
        },
    ];
    for op in ops {
        let mut m = colliding_object_map(5);
        let result = catch_unwind(AssertUnwindSafe(|| op(&mut m)));
        assert!(result.is_err());
        assert_eq!(m.len(), 4);
        assert_eq!(m.iter().count(), 4);
        assert!(!m.contains_key(&2u32));
        for k in [0u32, 1, 3, 4] {
            assert_eq!(m.get(&k), Some(&format!("v{k}")), "key {k} unreachable");
        }
        m.put(2, "back".into());
        assert_eq!(m.len(), 5);
    }
}
