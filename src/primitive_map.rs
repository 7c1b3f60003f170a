//! PrimitiveMap: primitive keys to primitive values, stored inline.
//!
//! Keys and values are interleaved in one slot array. A slot is vacant
//! exactly when its value equals the map's missing value, so the missing
//! value can never be stored while every key, including the missing value
//! itself, is valid.

use crate::config::{IterationMode, TableConfig};
use crate::engine::{close_gap, first_vacant, probe, trace_rehash, Probe, ProbeSlots, Sizing};
use crate::error::{CollectionError, Result};
use crate::hashing::{home_index, map_hash_code, Primitive};
use crate::iter::{self, CursorState};
use crate::sentinel::{check_value, missing_value_error};
use crate::view::fmt_map;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::iter::FusedIterator;
use std::collections::HashMap;

pub type Int2IntHashMap = PrimitiveMap<i32, i32>;
pub type Int2LongHashMap = PrimitiveMap<i32, i64>;
pub type Long2IntHashMap = PrimitiveMap<i64, i32>;
pub type Long2LongHashMap = PrimitiveMap<i64, i64>;

#[derive(Clone)]
struct Entries<K, V> {
    slots: Box<[(K, V)]>,
    missing: V,
}

impl<K: Primitive, V: Primitive> Entries<K, V> {
    fn vacant(capacity: usize, missing: V) -> Self {
        Self {
            slots: vec![(K::default(), missing); capacity].into_boxed_slice(),
            missing,
        }
    }
}

impl<K: Primitive, V: Primitive> ProbeSlots for Entries<K, V> {
    #[inline]
    fn is_vacant(&self, index: usize) -> bool {
        self.slots[index].1 == self.missing
    }

    #[inline]
    fn home_of(&self, index: usize, mask: usize) -> usize {
        home_index(self.slots[index].0, mask)
    }

    #[inline]
    fn shift(&mut self, from: usize, to: usize) {
        self.slots[to] = self.slots[from];
        self.slots[from].1 = self.missing;
    }
}

/// Open-addressing map from a primitive key to a primitive value.
#[derive(Clone)]
pub struct PrimitiveMap<K: Primitive, V: Primitive> {
    entries: Entries<K, V>,
    len: usize,
    sizing: Sizing,
    iteration: IterationMode,
    cursor: CursorState,
}

impl<K: Primitive, V: Primitive> Default for PrimitiveMap<K, V> {
    fn default() -> Self {
        Self::new(V::DEFAULT_MISSING)
    }
}

impl<K: Primitive, V: Primitive> PrimitiveMap<K, V> {
    /// Empty map with default sizing that reports `missing_value` for
    /// absent keys.
    pub fn new(missing_value: V) -> Self {
        Self::from_sizing(Sizing::default(), IterationMode::Cached, missing_value)
    }

    pub fn with_config(config: TableConfig, missing_value: V) -> Result<Self> {
        let sizing = Sizing::from_config(&config)?;
        Ok(Self::from_sizing(sizing, config.iteration, missing_value))
    }

    /// Shorthand for a config with only capacity and load factor set.
    pub fn with_capacity(initial_capacity: usize, load_factor: f32, missing_value: V) -> Result<Self> {
        Self::with_config(
            TableConfig::new()
                .with_initial_capacity(initial_capacity)
                .with_load_factor(load_factor),
            missing_value,
        )
    }

    fn from_sizing(sizing: Sizing, iteration: IterationMode, missing: V) -> Self {
        Self {
            entries: Entries::vacant(sizing.capacity(), missing),
            len: 0,
            sizing,
            iteration,
            cursor: CursorState::default(),
        }
    }

    #[inline]
    pub fn missing_value(&self) -> V {
        self.entries.missing
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.sizing.capacity()
    }

    pub fn load_factor(&self) -> f32 {
        self.sizing.load_factor()
    }

    pub fn resize_threshold(&self) -> usize {
        self.sizing.resize_threshold()
    }

    pub fn iteration_mode(&self) -> IterationMode {
        self.iteration
    }

    #[inline]
    fn locate(&self, key: K) -> Probe {
        let mask = self.sizing.mask();
        let slots = &self.entries.slots;
        probe(&self.entries, home_index(key, mask), mask, |i| slots[i].0 == key)
    }

    #[inline]
    pub(crate) fn find(&self, key: K) -> Option<usize> {
        match self.locate(key) {
            Probe::Found(i) => Some(i),
            Probe::Vacant(_) => None,
        }
    }

    #[inline]
    pub(crate) fn value_at(&self, index: usize) -> &V {
        &self.entries.slots[index].1
    }

    /// Value for `key`, or the missing value when absent.
    #[inline]
    pub fn get(&self, key: K) -> V {
        match self.locate(key) {
            Probe::Found(i) => self.entries.slots[i].1,
            Probe::Vacant(_) => self.entries.missing,
        }
    }

    pub fn get_or_default(&self, key: K, default: V) -> V {
        match self.locate(key) {
            Probe::Found(i) => self.entries.slots[i].1,
            Probe::Vacant(_) => default,
        }
    }

    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    pub fn contains_value(&self, value: V) -> bool {
        value != self.entries.missing && self.values().any(|v| v == value)
    }

    /// Stores `value` under `key` and returns the previous value, or the
    /// missing value if the key was absent.
    ///
    /// Fails with `MissingValue` if `value` is the missing value.
    pub fn put(&mut self, key: K, value: V) -> Result<V> {
        check_value(value, self.entries.missing)?;
        Ok(self.put_unchecked(key, value))
    }

    /// `put` for callers that have already excluded the missing value.
    pub(crate) fn put_unchecked(&mut self, key: K, value: V) -> V {
        debug_assert!(value != self.entries.missing);
        match self.locate(key) {
            Probe::Found(i) => core::mem::replace(&mut self.entries.slots[i].1, value),
            Probe::Vacant(i) => {
                self.insert_at(i, key, value);
                self.entries.missing
            }
        }
    }

    /// Stores `value` only when `key` is absent. Returns the current value,
    /// or the missing value if the insert happened.
    pub fn put_if_absent(&mut self, key: K, value: V) -> Result<V> {
        check_value(value, self.entries.missing)?;
        match self.locate(key) {
            Probe::Found(i) => Ok(self.entries.slots[i].1),
            Probe::Vacant(i) => {
                self.insert_at(i, key, value);
                Ok(self.entries.missing)
            }
        }
    }

    /// Overwrites the value of a present key. Absent keys are left alone
    /// and the missing value is returned.
    pub fn replace(&mut self, key: K, value: V) -> Result<V> {
        check_value(value, self.entries.missing)?;
        Ok(match self.locate(key) {
            Probe::Found(i) => core::mem::replace(&mut self.entries.slots[i].1, value),
            Probe::Vacant(_) => self.entries.missing,
        })
    }

    /// Overwrites the value of `key` only if it currently equals `old`.
    pub fn replace_if(&mut self, key: K, old: V, new: V) -> Result<bool> {
        check_value(new, self.entries.missing)?;
        match self.locate(key) {
            Probe::Found(i) if self.entries.slots[i].1 == old => {
                self.entries.slots[i].1 = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Removes `key`, returning its value or the missing value.
    pub fn remove(&mut self, key: K) -> V {
        match self.locate(key) {
            Probe::Found(i) => {
                let value = self.entries.slots[i].1;
                self.remove_at(i);
                value
            }
            Probe::Vacant(_) => self.entries.missing,
        }
    }

    /// Removes `key` only if it is mapped to `value`.
    pub fn remove_if_value(&mut self, key: K, value: V) -> bool {
        match self.locate(key) {
            Probe::Found(i) if self.entries.slots[i].1 == value => {
                self.remove_at(i);
                true
            }
            _ => false,
        }
    }

    /// Returns the value of `key`, first computing and storing it with `f`
    /// when absent. A computed missing value is returned but not stored.
    pub fn compute_if_absent<F>(&mut self, key: K, f: F) -> V
    where
        F: FnOnce(K) -> V,
    {
        match self.locate(key) {
            Probe::Found(i) => self.entries.slots[i].1,
            Probe::Vacant(i) => {
                let value = f(key);
                if value != self.entries.missing {
                    self.insert_at(i, key, value);
                }
                value
            }
        }
    }

    /// Recomputes the value of a present key. A result equal to the missing
    /// value removes the entry.
    pub fn compute_if_present<F>(&mut self, key: K, f: F) -> V
    where
        F: FnOnce(K, V) -> V,
    {
        match self.locate(key) {
            Probe::Found(i) => self.update_at(i, f(key, self.entries.slots[i].1)),
            Probe::Vacant(_) => self.entries.missing,
        }
    }

    /// Computes a new value from the current one (the missing value when
    /// absent). A result equal to the missing value removes the entry.
    pub fn compute<F>(&mut self, key: K, f: F) -> V
    where
        F: FnOnce(K, V) -> V,
    {
        match self.locate(key) {
            Probe::Found(i) => self.update_at(i, f(key, self.entries.slots[i].1)),
            Probe::Vacant(i) => {
                let value = f(key, self.entries.missing);
                if value != self.entries.missing {
                    self.insert_at(i, key, value);
                }
                value
            }
        }
    }

    /// Stores `value` if `key` is absent, otherwise combines the current
    /// value with `value` using `f`. A combined missing value removes the
    /// entry.
    pub fn merge<F>(&mut self, key: K, value: V, f: F) -> Result<V>
    where
        F: FnOnce(V, V) -> V,
    {
        check_value(value, self.entries.missing)?;
        Ok(match self.locate(key) {
            Probe::Found(i) => self.update_at(i, f(self.entries.slots[i].1, value)),
            Probe::Vacant(i) => {
                self.insert_at(i, key, value);
                value
            }
        })
    }

    /// Copies every entry of `other`. Fails without copying anything if
    /// `other` holds this map's missing value.
    pub fn put_all(&mut self, other: &PrimitiveMap<K, V>) -> Result<()> {
        let missing = self.entries.missing;
        if other.entries.missing != missing && other.values().any(|v| v == missing) {
            return Err(missing_value_error(missing));
        }
        for (k, v) in other.iter() {
            self.put_unchecked(k, v);
        }
        Ok(())
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(K, V),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Removes every entry matching `pred`; true if any was removed.
    pub fn remove_if<F>(&mut self, mut pred: F) -> bool
    where
        F: FnMut(K, V) -> bool,
    {
        let mask = self.sizing.mask();
        let mut scan = CursorState::default();
        scan.reset(&self.entries, self.sizing.capacity(), self.len);
        let mut removed = false;
        while let Some(i) = scan.advance(&self.entries, mask) {
            let (k, v) = self.entries.slots[i];
            if pred(k, v) {
                self.remove_at(i);
                removed = true;
            }
        }
        removed
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(K, V) -> bool,
    {
        self.remove_if(|k, v| !keep(k, v));
    }

    pub fn clear(&mut self) {
        if self.len > 0 {
            let vacant = (K::default(), self.entries.missing);
            self.entries.slots.fill(vacant);
            self.len = 0;
        }
    }

    /// Shrinks the table to the smallest capacity that holds the current
    /// entries under the load factor.
    pub fn compact(&mut self) {
        let target = self.sizing.compacted_for(self.len);
        if target.capacity() < self.sizing.capacity() {
            self.rehash(target, "compact");
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.entries.slots.iter(),
            missing: self.entries.missing,
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Iterator that can remove the entry it last produced.
    pub fn cursor(&mut self) -> Cursor<'_, K, V> {
        let own = iter::begin(
            self.iteration,
            &mut self.cursor,
            &self.entries,
            self.sizing.capacity(),
            self.len,
        );
        Cursor { map: self, own }
    }

    /// Content hash, equal for any map holding the same entries.
    pub fn hash_code(&self) -> u64 {
        map_hash_code(self.iter())
    }

    fn insert_at(&mut self, index: usize, key: K, value: V) {
        self.entries.slots[index] = (key, value);
        self.len += 1;
        if self.sizing.exceeded_by(self.len) {
            let grown = self.sizing.grown_for(self.len);
            self.rehash(grown, "grow");
        }
    }

    fn update_at(&mut self, index: usize, value: V) -> V {
        if value == self.entries.missing {
            self.remove_at(index);
        } else {
            self.entries.slots[index].1 = value;
        }
        value
    }

    pub(crate) fn remove_at(&mut self, index: usize) {
        self.entries.slots[index].1 = self.entries.missing;
        self.len -= 1;
        close_gap(&mut self.entries, index, self.sizing.mask());
    }

    fn rehash(&mut self, sizing: Sizing, reason: &'static str) {
        let missing = self.entries.missing;
        let mask = sizing.mask();
        let mut fresh = Entries::vacant(sizing.capacity(), missing);
        for &(k, v) in self.entries.slots.iter() {
            if v != missing {
                let i = first_vacant(&fresh, home_index(k, mask), mask);
                fresh.slots[i] = (k, v);
            }
        }
        trace_rehash(reason, self.sizing.capacity(), sizing.capacity(), self.len);
        self.entries = fresh;
        self.sizing = sizing;
    }
}

/// Borrowing iterator in slot order.
#[derive(Clone)]
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, (K, V)>,
    missing: V,
    remaining: usize,
}

impl<'a, K: Primitive, V: Primitive> Iterator for Iter<'a, K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for &(k, v) in self.slots.by_ref() {
            if v != self.missing {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Primitive, V: Primitive> ExactSizeIterator for Iter<'_, K, V> {}
impl<K: Primitive, V: Primitive> FusedIterator for Iter<'_, K, V> {}

#[derive(Clone)]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K: Primitive, V: Primitive> Iterator for Keys<'_, K, V> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Primitive, V: Primitive> ExactSizeIterator for Keys<'_, K, V> {}

#[derive(Clone)]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K: Primitive, V: Primitive> Iterator for Values<'_, K, V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Primitive, V: Primitive> ExactSizeIterator for Values<'_, K, V> {}

/// Removal-capable iterator returned by [`PrimitiveMap::cursor`].
///
/// Adding entries while a cursor is alive is prevented by the borrow.
pub struct Cursor<'a, K: Primitive, V: Primitive> {
    map: &'a mut PrimitiveMap<K, V>,
    own: Option<CursorState>,
}

impl<K: Primitive, V: Primitive> Cursor<'_, K, V> {
    /// Removes the entry last returned by `next`. Returns `None` if there
    /// is none or it was already removed.
    pub fn remove(&mut self) -> Option<(K, V)> {
        let index = iter::select(&mut self.own, &mut self.map.cursor).take_current()?;
        let entry = self.map.entries.slots[index];
        self.map.remove_at(index);
        Some(entry)
    }

    /// Overwrites the value of the entry last returned by `next`. Returns
    /// `false` and writes nothing when there is no such entry, before the
    /// first `next` or after `remove`.
    pub fn set_value(&mut self, value: V) -> Result<bool> {
        let missing = self.map.entries.missing;
        check_value(value, missing)?;
        match iter::select(&mut self.own, &mut self.map.cursor).current() {
            Some(index) => {
                self.map.entries.slots[index].1 = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<K: Primitive, V: Primitive> Iterator for Cursor<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let mask = self.map.sizing.mask();
        let state = iter::select(&mut self.own, &mut self.map.cursor);
        let index = state.advance(&self.map.entries, mask)?;
        Some(self.map.entries.slots[index])
    }
}

impl<'a, K: Primitive, V: Primitive> IntoIterator for &'a PrimitiveMap<K, V> {
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Primitive, V: Primitive> PartialEq for PrimitiveMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|(k, v)| other.find(k).map(|i| other.entries.slots[i].1) == Some(v))
    }
}

impl<K: Primitive, V: Primitive> Eq for PrimitiveMap<K, V> {}

impl<K: Primitive, V: Primitive, S: BuildHasher> PartialEq<HashMap<K, V, S>> for PrimitiveMap<K, V> {
    fn eq(&self, other: &HashMap<K, V, S>) -> bool {
        self.len == other.len()
            && other
                .iter()
                .all(|(&k, &v)| self.find(k).map(|i| self.entries.slots[i].1) == Some(v))
    }
}

impl<K: Primitive, V: Primitive> Hash for PrimitiveMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K: Primitive, V: Primitive> fmt::Display for PrimitiveMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_map(f, self.iter())
    }
}

impl<K: Primitive, V: Primitive> fmt::Debug for PrimitiveMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K: Primitive, V: Primitive> TryFrom<&'a HashMap<K, V>> for PrimitiveMap<K, V> {
    type Error = CollectionError;

    /// Builds a map with the default missing value from a std map.
    fn try_from(source: &'a HashMap<K, V>) -> Result<Self> {
        let mut map = Self::default();
        let missing = map.entries.missing;
        if source.values().any(|&v| v == missing) {
            return Err(missing_value_error(missing));
        }
        for (&k, &v) in source {
            map.put_unchecked(k, v);
        }
        Ok(map)
    }
}
