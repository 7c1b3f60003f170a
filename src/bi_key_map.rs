//! BiInt2ObjectMap: values keyed by a pair of `i32` components.
//!
//! The pair is packed into one `i64` probe key, the first component in the
//! high half and the second, zero-extended, in the low half. Packing is a
//! bijection, so distinct pairs never share a key and iteration recovers
//! both components from the stored key.

use crate::config::TableConfig;
use crate::error::Result;
use crate::hashing::map_hash_code;
use crate::primitive_object_map::Long2ObjectHashMap;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use std::collections::HashMap;

#[inline]
pub fn compose_key(a: i32, b: i32) -> i64 {
    ((a as i64) << 32) | (b as u32 as i64)
}

#[inline]
pub fn split_key(key: i64) -> (i32, i32) {
    ((key >> 32) as i32, key as i32)
}

pub struct BiInt2ObjectMap<V> {
    map: Long2ObjectHashMap<V>,
}

impl<V> Default for BiInt2ObjectMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for BiInt2ObjectMap<V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<V> BiInt2ObjectMap<V> {
    pub fn new() -> Self {
        Self {
            map: Long2ObjectHashMap::new(),
        }
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Ok(Self {
            map: Long2ObjectHashMap::with_config(config)?,
        })
    }

    pub fn with_capacity(initial_capacity: usize, load_factor: f32) -> Result<Self> {
        Ok(Self {
            map: Long2ObjectHashMap::with_capacity(initial_capacity, load_factor)?,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.map.load_factor()
    }

    pub fn get(&self, a: i32, b: i32) -> Option<&V> {
        self.map.get(compose_key(a, b))
    }

    pub fn get_mut(&mut self, a: i32, b: i32) -> Option<&mut V> {
        self.map.get_mut(compose_key(a, b))
    }

    pub fn contains_key(&self, a: i32, b: i32) -> bool {
        self.map.contains_key(compose_key(a, b))
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    pub fn put(&mut self, a: i32, b: i32, value: V) -> Option<V> {
        self.map.put(compose_key(a, b), value)
    }

    pub fn put_if_absent(&mut self, a: i32, b: i32, value: V) -> Option<&V> {
        self.map.put_if_absent(compose_key(a, b), value)
    }

    pub fn replace(&mut self, a: i32, b: i32, value: V) -> Option<V> {
        self.map.replace(compose_key(a, b), value)
    }

    pub fn remove(&mut self, a: i32, b: i32) -> Option<V> {
        self.map.remove(compose_key(a, b))
    }

    pub fn remove_if_value(&mut self, a: i32, b: i32, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.remove_if_value(compose_key(a, b), value)
    }

    pub fn compute_if_absent<F>(&mut self, a: i32, b: i32, f: F) -> Option<&V>
    where
        F: FnOnce(i32, i32) -> Option<V>,
    {
        self.map.compute_if_absent(compose_key(a, b), |_| f(a, b))
    }

    pub fn compute_if_present<F>(&mut self, a: i32, b: i32, f: F) -> Option<&V>
    where
        F: FnOnce(i32, i32, V) -> Option<V>,
    {
        self.map
            .compute_if_present(compose_key(a, b), |_, v| f(a, b, v))
    }

    pub fn compute<F>(&mut self, a: i32, b: i32, f: F) -> Option<&V>
    where
        F: FnOnce(i32, i32, Option<V>) -> Option<V>,
    {
        self.map.compute(compose_key(a, b), |_, v| f(a, b, v))
    }

    pub fn merge<F>(&mut self, a: i32, b: i32, value: V, f: F) -> Option<&V>
    where
        F: FnOnce(V, V) -> Option<V>,
    {
        self.map.merge(compose_key(a, b), value, f)
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(i32, i32, &V),
    {
        for (a, b, v) in self.iter() {
            f(a, b, v);
        }
    }

    pub fn remove_if<F>(&mut self, mut pred: F) -> bool
    where
        F: FnMut(i32, i32, &V) -> bool,
    {
        self.map.remove_if(|k, v| {
            let (a, b) = split_key(k);
            v.is_some_and(|v| pred(a, b, v))
        })
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(i32, i32, &V) -> bool,
    {
        self.remove_if(|a, b, v| !keep(a, b, v));
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn compact(&mut self) {
        self.map.compact();
    }

    /// Entries as `(a, b, value)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &V)> + '_ {
        self.map.iter().filter_map(|(k, v)| {
            let (a, b) = split_key(k);
            v.map(|v| (a, b, v))
        })
    }

    /// Content hash, equal to that of a std map keyed by `(a, b)` tuples.
    pub fn hash_code(&self) -> u64
    where
        V: Hash,
    {
        map_hash_code(self.iter().map(|(a, b, v)| ((a, b), v)))
    }
}

impl<V: PartialEq> PartialEq for BiInt2ObjectMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<V: Eq> Eq for BiInt2ObjectMap<V> {}

impl<V: PartialEq, S: BuildHasher> PartialEq<HashMap<(i32, i32), V, S>> for BiInt2ObjectMap<V> {
    fn eq(&self, other: &HashMap<(i32, i32), V, S>) -> bool {
        self.len() == other.len() && other.iter().all(|(&(a, b), v)| self.get(a, b) == Some(v))
    }
}

impl<V: Hash> Hash for BiInt2ObjectMap<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<V: fmt::Display> fmt::Display for BiInt2ObjectMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (n, (a, b, v)) in self.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{a}_{b}={v}")?;
        }
        f.write_str("}")
    }
}

impl<V: fmt::Debug> fmt::Debug for BiInt2ObjectMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(a, b, v)| ((a, b), v)))
            .finish()
    }
}

impl<V> FromIterator<(i32, i32, V)> for BiInt2ObjectMap<V> {
    fn from_iter<I: IntoIterator<Item = (i32, i32, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (a, b, v) in iter {
            map.put(a, b, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::{RngCore, SeedableRng};
    use rand_pcg::Pcg64;

    #[test]
    fn packing_round_trips_components() {
        for (a, b) in [(0, 0), (-1, -1), (i32::MIN, i32::MAX), (7, -7), (-7, 7)] {
            assert_eq!(split_key(compose_key(a, b)), (a, b));
        }
        assert_ne!(compose_key(1, -1), compose_key(-1, 1));
        assert_ne!(compose_key(0, -1), compose_key(-1, 0));
    }

    /// Invariant: random pairs, negatives included, never cross-talk.
    #[test]
    fn ten_thousand_random_pairs() {
        let mut rng = Pcg64::seed_from_u64(0x5eed);
        let mut reference: HashMap<(i32, i32), u32> = HashMap::new();
        let mut m = BiInt2ObjectMap::new();
        for n in 0..10_000u32 {
            let a = rng.next_u32() as i32;
            let b = (rng.next_u32() % 64) as i32 - 32;
            m.put(a, b, n);
            reference.insert((a, b), n);
        }
        assert_eq!(m.len(), reference.len());
        for (&(a, b), &n) in &reference {
            assert_eq!(m.get(a, b), Some(&n));
        }
        assert!(m == reference);
        assert_eq!(
            m.hash_code(),
            map_hash_code(reference.iter().map(|(k, v)| (*k, v)))
        );
    }

    #[test]
    fn operations_take_both_components() {
        let mut m: BiInt2ObjectMap<String> = BiInt2ObjectMap::new();
        m.put(1, 2, "x".into());
        assert!(m.contains_key(1, 2));
        assert!(!m.contains_key(2, 1));
        assert_eq!(m.to_string(), "{1_2=x}");
        assert_eq!(
            m.compute(1, 2, |a, b, v| v.map(|s| format!("{s}{a}{b}"))),
            Some(&"x12".to_string())
        );
        assert_eq!(m.compute_if_absent(-3, 4, |a, b| Some(format!("{a}{b}"))).map(String::as_str), Some("-34"));
        let mut seen = Vec::new();
        m.for_each(|a, b, _| seen.push((a, b)));
        seen.sort();
        assert_eq!(seen, vec![(-3, 4), (1, 2)]);
        m.retain(|a, _, _| a > 0);
        assert_eq!(m.len(), 1);
        assert_eq!(m.remove(1, 2), Some("x12".to_string()));
        assert!(m.is_empty());
    }
}
