//! SetAssociativeCache: a fixed-size cache of primitive keys to values.
//!
//! Capacity is `num_sets * set_size`, both powers of two. A key belongs to
//! exactly one set, chosen from its spread hash. Within a set the occupied
//! slots form a prefix ordered newest first: a put shifts the set down by
//! one and writes at the front, so a full set drops its last (oldest)
//! entry and hands it to the eviction callback. The table never grows.

use crate::engine::MAX_CAPACITY;
use crate::error::{CollectionError, Result};
use crate::hashing::Primitive;
use crate::view::fmt_map;
use core::cell::Cell;
use core::fmt;

pub type Int2ObjectCache<V, E> = SetAssociativeCache<i32, V, E>;
pub type Long2ObjectCache<V, E> = SetAssociativeCache<i64, V, E>;

pub struct SetAssociativeCache<K: Primitive, V, E: FnMut(V)> {
    keys: Box<[K]>,
    values: Box<[Option<V>]>,
    set_mask: usize,
    set_size: usize,
    len: usize,
    hits: Cell<u64>,
    misses: Cell<u64>,
    puts: Cell<u64>,
    eviction: E,
}

fn round_dimension(requested: usize) -> Result<usize> {
    if requested == 0 {
        return Err(CollectionError::ZeroCapacity);
    }
    requested
        .checked_next_power_of_two()
        .ok_or(CollectionError::CapacityOverflow(requested))
}

impl<K: Primitive, V, E: FnMut(V)> SetAssociativeCache<K, V, E> {
    /// Builds a cache of `num_sets` sets with `set_size` slots each, both
    /// rounded up to a power of two. `eviction` receives every value the
    /// cache displaces.
    pub fn new(num_sets: usize, set_size: usize, eviction: E) -> Result<Self> {
        let num_sets = round_dimension(num_sets)?;
        let set_size = round_dimension(set_size)?;
        let capacity = num_sets
            .checked_mul(set_size)
            .filter(|&c| c <= MAX_CAPACITY)
            .ok_or(CollectionError::CapacityOverflow(num_sets.saturating_mul(set_size)))?;
        Ok(Self {
            keys: vec![K::default(); capacity].into_boxed_slice(),
            values: (0..capacity).map(|_| None).collect(),
            set_mask: num_sets - 1,
            set_size,
            len: 0,
            hits: Cell::new(0),
            misses: Cell::new(0),
            puts: Cell::new(0),
            eviction,
        })
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    pub fn num_sets(&self) -> usize {
        self.set_mask + 1
    }

    pub fn set_size(&self) -> usize {
        self.set_size
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cache_hits(&self) -> u64 {
        self.hits.get()
    }

    pub fn cache_misses(&self) -> u64 {
        self.misses.get()
    }

    pub fn cache_puts(&self) -> u64 {
        self.puts.get()
    }

    pub fn reset_counters(&self) {
        self.hits.set(0);
        self.misses.set(0);
        self.puts.set(0);
    }

    #[inline]
    fn set_start(&self, key: K) -> usize {
        ((key.spread() as usize) & self.set_mask) * self.set_size
    }

    #[inline]
    fn position(&self, key: K) -> Option<usize> {
        let start = self.set_start(key);
        (start..start + self.set_size)
            .take_while(|&i| self.values[i].is_some())
            .find(|&i| self.keys[i] == key)
    }

    #[inline]
    fn bump(counter: &Cell<u64>) {
        counter.set(counter.get() + 1);
    }

    /// Looks up `key`, counting a hit or a miss.
    pub fn get(&self, key: K) -> Option<&V> {
        match self.position(key) {
            Some(i) => {
                Self::bump(&self.hits);
                self.values[i].as_ref()
            }
            None => {
                Self::bump(&self.misses);
                None
            }
        }
    }

    /// Presence check that leaves the counters alone.
    pub fn contains_key(&self, key: K) -> bool {
        self.position(key).is_some()
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values.iter().flatten().any(|v| v == value)
    }

    /// Stores `value` under `key`. A replaced value, or the oldest value of
    /// a full set, goes to the eviction callback.
    pub fn put(&mut self, key: K, value: V) {
        Self::bump(&self.puts);
        if let Some(i) = self.position(key) {
            if let Some(old) = self.values[i].replace(value) {
                (self.eviction)(old);
            }
            return;
        }
        let start = self.set_start(key);
        self.insert_front(start, key, value);
    }

    /// Returns the cached value for `key`, computing and caching it with
    /// `f` on a miss. A `None` result caches nothing.
    pub fn compute_if_absent<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(K) -> Option<V>,
    {
        if let Some(i) = self.position(key) {
            Self::bump(&self.hits);
            return self.values[i].as_ref();
        }
        Self::bump(&self.misses);
        let value = f(key)?;
        Self::bump(&self.puts);
        let start = self.set_start(key);
        self.insert_front(start, key, value);
        self.values[start].as_ref()
    }

    /// Removes `key` and returns its value; the eviction callback is not
    /// invoked.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let i = self.position(key)?;
        let start = self.set_start(key);
        let end = start + self.set_size;
        let removed = self.values[i].take();
        // Close the hole so occupied slots stay a prefix of the set.
        for j in i..end - 1 {
            if self.values[j + 1].is_none() {
                break;
            }
            self.keys[j] = self.keys[j + 1];
            self.values[j] = self.values[j + 1].take();
        }
        self.len -= 1;
        removed
    }

    /// Empties the cache, passing every held value to the eviction
    /// callback.
    pub fn clear(&mut self) {
        tracing::debug!(len = self.len, "set associative cache cleared");
        for slot in self.values.iter_mut() {
            if let Some(v) = slot.take() {
                (self.eviction)(v);
            }
        }
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter_map(|(&k, v)| v.as_ref().map(|v| (k, v)))
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(K, &V),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    fn insert_front(&mut self, start: usize, key: K, value: V) {
        let last = start + self.set_size - 1;
        let evicted = self.values[last].take();
        for i in (start + 1..=last).rev() {
            self.keys[i] = self.keys[i - 1];
            self.values[i] = self.values[i - 1].take();
        }
        self.keys[start] = key;
        self.values[start] = Some(value);
        match evicted {
            Some(v) => {
                tracing::trace!(set = start / self.set_size, "cache entry evicted");
                (self.eviction)(v);
            }
            None => self.len += 1,
        }
    }
}

impl<K: Primitive, V: fmt::Display, E: FnMut(V)> fmt::Display for SetAssociativeCache<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_map(f, self.iter())
    }
}

impl<K: Primitive, V: fmt::Debug, E: FnMut(V)> fmt::Debug for SetAssociativeCache<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetAssociativeCache")
            .field("num_sets", &self.num_sets())
            .field("set_size", &self.set_size)
            .field("len", &self.len)
            .field("hits", &self.hits.get())
            .field("misses", &self.misses.get())
            .field("puts", &self.puts.get())
            .finish()
    }
}
