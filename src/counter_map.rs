//! CounterMap: per-key accumulators that only store non-initial counts.
//!
//! The initial value doubles as the underlying map's missing value. Any
//! operation leaving a key at the initial value removes it, so the live
//! entries are exactly the keys whose count differs from the initial
//! value. Arithmetic wraps.

use crate::config::TableConfig;
use crate::error::Result;
use crate::hashing::Primitive;
use crate::primitive_map::{Iter, PrimitiveMap};
use crate::view::fmt_map;
use core::fmt;
use core::hash::{Hash, Hasher};

pub type Int2IntCounterMap = CounterMap<i32, i32>;
pub type Long2LongCounterMap = CounterMap<i64, i64>;

#[derive(Clone)]
pub struct CounterMap<K: Primitive, V: Primitive> {
    map: PrimitiveMap<K, V>,
}

impl<K: Primitive, V: Primitive> CounterMap<K, V> {
    pub fn new(initial_value: V) -> Self {
        Self {
            map: PrimitiveMap::new(initial_value),
        }
    }

    pub fn with_config(config: TableConfig, initial_value: V) -> Result<Self> {
        Ok(Self {
            map: PrimitiveMap::with_config(config, initial_value)?,
        })
    }

    #[inline]
    pub fn initial_value(&self) -> V {
        self.map.missing_value()
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

    /// Count for `key`, the initial value when absent.
    #[inline]
    pub fn get(&self, key: K) -> V {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.map.contains_key(key)
    }

    /// Sets the count of `key` and returns the previous one. Setting the
    /// initial value removes the key.
    pub fn put(&mut self, key: K, value: V) -> V {
        if value == self.initial_value() {
            self.map.remove(key)
        } else {
            self.map.put_unchecked(key, value)
        }
    }

    pub fn remove(&mut self, key: K) -> V {
        self.map.remove(key)
    }

    pub fn increment_and_get(&mut self, key: K) -> V {
        self.add_and_get(key, V::ONE)
    }

    pub fn decrement_and_get(&mut self, key: K) -> V {
        self.add_and_get(key, V::ZERO.wrapping_sub(V::ONE))
    }

    pub fn get_and_increment(&mut self, key: K) -> V {
        self.get_and_add(key, V::ONE)
    }

    pub fn get_and_decrement(&mut self, key: K) -> V {
        self.get_and_add(key, V::ZERO.wrapping_sub(V::ONE))
    }

    /// Adds `amount` and returns the new count. Adding zero never inserts.
    pub fn add_and_get(&mut self, key: K, amount: V) -> V {
        if amount == V::ZERO {
            return self.map.get(key);
        }
        self.map.compute(key, |_, v| v.wrapping_add(amount))
    }

    /// Adds `amount` and returns the previous count.
    pub fn get_and_add(&mut self, key: K, amount: V) -> V {
        if amount == V::ZERO {
            return self.map.get(key);
        }
        let mut old = self.initial_value();
        self.map.compute(key, |_, v| {
            old = v;
            v.wrapping_add(amount)
        });
        old
    }

    /// Smallest count held, or the initial value when empty.
    pub fn min_value(&self) -> V {
        self.map.values().min().unwrap_or(self.initial_value())
    }

    /// Largest count held, or the initial value when empty.
    pub fn max_value(&self) -> V {
        self.map.values().max().unwrap_or(self.initial_value())
    }

    pub fn compute_if_absent<F>(&mut self, key: K, f: F) -> V
    where
        F: FnOnce(K) -> V,
    {
        self.map.compute_if_absent(key, f)
    }

    pub fn compute_if_present<F>(&mut self, key: K, f: F) -> V
    where
        F: FnOnce(K, V) -> V,
    {
        self.map.compute_if_present(key, f)
    }

    /// Recomputes the count from the current one; a result equal to the
    /// initial value removes the key.
    pub fn compute<F>(&mut self, key: K, f: F) -> V
    where
        F: FnOnce(K, V) -> V,
    {
        self.map.compute(key, f)
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(K, V),
    {
        self.map.for_each(f);
    }

    pub fn remove_if<F>(&mut self, pred: F) -> bool
    where
        F: FnMut(K, V) -> bool,
    {
        self.map.remove_if(pred)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn compact(&mut self) {
        self.map.compact();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.map.iter()
    }

    pub fn hash_code(&self) -> u64 {
        self.map.hash_code()
    }
}

impl<K: Primitive, V: Primitive> PartialEq for CounterMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.initial_value() == other.initial_value() && self.map == other.map
    }
}

impl<K: Primitive, V: Primitive> Eq for CounterMap<K, V> {}

impl<K: Primitive, V: Primitive> Hash for CounterMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K: Primitive, V: Primitive> fmt::Display for CounterMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_map(f, self.iter())
    }
}

impl<K: Primitive, V: Primitive> fmt::Debug for CounterMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterMap")
            .field("initial_value", &self.initial_value())
            .field("counts", &self.map)
            .finish()
    }
}
