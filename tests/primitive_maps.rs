// Primitive map scenarios through the public API.
//
// Each test states which table behavior it pins down:
// - Probing: colliding keys stay reachable after removals inside a chain.
// - Sentinels: the missing value is never stored; any key, including the
//   missing value itself, is a legal key.
// - Sizing: growth keeps len <= threshold; compact shrinks to the smallest
//   capacity that holds the entries.
// - Equality and hash codes are logical, independent of layout.
use probe_collections::hashing::home_index;
use probe_collections::{
    map_hash_code, CollectionError, Int2IntHashMap, Int2LongHashMap, IterationMode,
    Long2LongHashMap, TableConfig,
};
use std::collections::HashMap;

fn colliding_keys(mask: usize, count: usize) -> Vec<i32> {
    let home = home_index(0i32, mask);
    (0..)
        .filter(|&k| home_index(k, mask) == home)
        .take(count)
        .collect()
}

// Verifies: removing from the middle of a probe chain shifts later
// members back so every survivor is still found.
#[test]
fn removal_inside_collision_chain_keeps_survivors_reachable() {
    let keys = colliding_keys(15, 5);
    let mut m = Int2IntHashMap::with_capacity(16, 0.9, -1).unwrap();
    assert_eq!(m.capacity(), 16);
    for &k in &keys {
        m.put(k, k * 10).unwrap();
    }
    assert_eq!(m.remove(keys[1]), keys[1] * 10);
    assert_eq!(m.remove(keys[3]), keys[3] * 10);
    for &k in [keys[0], keys[2], keys[4]].iter() {
        assert_eq!(m.get(k), k * 10, "key {k} lost after chain removal");
    }
    assert_eq!(m.get(keys[1]), -1);
    assert_eq!(m.len(), 3);
}

// Verifies: the missing value is rejected as a value, accepted as a key,
// and a rejected store leaves the map untouched.
#[test]
fn missing_value_is_a_legal_key_but_not_a_value() {
    let mut m = Int2IntHashMap::new(-1);
    assert_eq!(m.put(-1, 5), Ok(-1));
    assert_eq!(m.get(-1), 5);
    assert_eq!(
        m.put(7, -1),
        Err(CollectionError::MissingValue("-1".to_string()))
    );
    assert_eq!(
        m.merge(-1, -1, |a, b| a + b),
        Err(CollectionError::MissingValue("-1".to_string()))
    );
    assert_eq!(m.len(), 1);
    assert!(!m.contains_key(7));
    assert!(!m.contains_value(-1));
}

#[test]
fn custom_missing_value() {
    let mut m = Int2LongHashMap::new(i64::MIN);
    assert_eq!(m.get(3), i64::MIN);
    m.put(3, -1).unwrap();
    assert_eq!(m.get(3), -1);
    assert!(m.put(4, i64::MIN).is_err());
    assert_eq!(m.get_or_default(4, 0), 0);
}

// Verifies: growth doubles capacity, every key survives, and the load
// never exceeds the threshold.
#[test]
fn growth_keeps_load_below_threshold() {
    let mut m = Long2LongHashMap::new(-1);
    for k in 0..10_000i64 {
        m.put(k * 7919, k).unwrap();
        assert!(m.len() <= m.resize_threshold());
        assert!(m.capacity().is_power_of_two());
    }
    for k in 0..10_000i64 {
        assert_eq!(m.get(k * 7919), k);
    }
}

#[test]
fn compact_shrinks_and_preserves_entries() {
    let mut m = Int2IntHashMap::new(-1);
    for k in 0..1_000 {
        m.put(k, k).unwrap();
    }
    let grown = m.capacity();
    m.retain(|k, _| k < 10);
    assert_eq!(m.capacity(), grown);
    m.compact();
    assert_eq!(m.capacity(), 16);
    assert_eq!(m.len(), 10);
    for k in 0..10 {
        assert_eq!(m.get(k), k);
    }
}

#[test]
fn invalid_configuration_is_rejected() {
    assert_eq!(
        Int2IntHashMap::with_capacity(8, 1.0, -1).err(),
        Some(CollectionError::InvalidLoadFactor(1.0))
    );
    assert_eq!(
        Int2IntHashMap::with_capacity(8, 0.0, -1).err(),
        Some(CollectionError::InvalidLoadFactor(0.0))
    );
    let config = TableConfig::new().with_initial_capacity(usize::MAX);
    assert!(matches!(
        Int2IntHashMap::with_config(config, -1),
        Err(CollectionError::CapacityOverflow(_))
    ));
}

// Verifies: a cursor can remove every entry it visits, in both modes,
// including entries that wrapped around the end of the table.
#[test]
fn cursor_removes_while_iterating_in_both_modes() {
    for mode in [IterationMode::Cached, IterationMode::Fresh] {
        let config = TableConfig::new()
            .with_initial_capacity(64)
            .with_iteration_mode(mode);
        let mut m = Int2IntHashMap::with_config(config, -1).unwrap();
        for k in 0..40 {
            m.put(k, k + 100).unwrap();
        }
        let mut visited = 0;
        let mut cursor = m.cursor();
        while let Some((k, v)) = cursor.next() {
            assert_eq!(v, k + 100);
            visited += 1;
            if k % 2 == 0 {
                assert_eq!(cursor.remove(), Some((k, v)));
                assert_eq!(cursor.remove(), None);
            }
        }
        assert_eq!(visited, 40);
        assert_eq!(m.len(), 20);
        assert!(m.keys().all(|k| k % 2 == 1));
    }
}

#[test]
fn cursor_set_value_rejects_missing() {
    let mut m = Int2IntHashMap::new(0);
    m.put(1, 1).unwrap();
    let mut cursor = m.cursor();
    assert_eq!(cursor.next(), Some((1, 1)));
    assert!(cursor.set_value(0).is_err());
    assert_eq!(cursor.set_value(9), Ok(true));
    assert_eq!(m.get(1), 9);
}

// Verifies: with no current entry the write is refused, not silently
// dropped, and the map is left untouched.
#[test]
fn cursor_set_value_without_current_entry() {
    let mut m = Int2IntHashMap::new(-1);
    m.put(1, 10).unwrap();
    m.put(2, 20).unwrap();
    let mut cursor = m.cursor();
    assert_eq!(cursor.set_value(7), Ok(false));
    let (k, _) = cursor.next().unwrap();
    assert!(cursor.remove().is_some());
    assert_eq!(cursor.set_value(7), Ok(false));
    assert_eq!(m.len(), 1);
    assert!(!m.contains_key(k));
    assert!(m.iter().all(|(_, v)| v != 7));
}

// Verifies: equality and hash code ignore capacity and insertion order,
// and agree with a std map holding the same entries.
#[test]
fn equality_and_hash_code_are_layout_independent() {
    let mut small = Int2IntHashMap::new(-1);
    let mut large = Int2IntHashMap::with_capacity(1024, 0.5, -1).unwrap();
    let mut reference = HashMap::new();
    for k in 0..50 {
        small.put(k, k * 3).unwrap();
        large.put(49 - k, (49 - k) * 3).unwrap();
        reference.insert(k, k * 3);
    }
    assert_eq!(small, large);
    assert!(small == reference);
    assert_eq!(small.hash_code(), large.hash_code());
    assert_eq!(small.hash_code(), map_hash_code(reference.iter()));

    large.put(0, 1).unwrap();
    assert_ne!(small, large);
}

#[test]
fn display_renders_entries() {
    let mut m = Int2IntHashMap::new(-1);
    assert_eq!(m.to_string(), "{}");
    m.put(4, 2).unwrap();
    assert_eq!(m.to_string(), "{4=2}");
}

#[test]
fn bulk_copy_and_conversion_from_std() {
    let reference: HashMap<i32, i32> = (0..20).map(|k| (k, k)).collect();
    let converted = Int2IntHashMap::try_from(&reference).unwrap();
    assert!(converted == reference);

    let mut target = Int2IntHashMap::new(-1);
    target.put(100, 1).unwrap();
    target.put_all(&converted).unwrap();
    assert_eq!(target.len(), 21);

    let with_sentinel: HashMap<i32, i32> = [(1, -1)].into_iter().collect();
    assert!(Int2IntHashMap::try_from(&with_sentinel).is_err());
}
