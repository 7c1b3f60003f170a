//! PrimitiveObjectMap: primitive keys to owned values.
//!
//! Keys sit in a primitive array and values in a parallel array of
//! optional slots; `None` marks a vacant slot. Whether a stored null is
//! allowed is decided by the `NullPolicy` type parameter.

use crate::config::{IterationMode, TableConfig};
use crate::engine::{
    close_gap, first_vacant, probe, trace_rehash, GapGuard, Probe, ProbeSlots, Sizing,
};
use crate::error::Result;
use crate::hashing::{home_index, map_hash_code, Primitive};
use crate::iter::{self, CursorState};
use crate::sentinel::{masked_null, Masked, NonNullValues, NullPolicy, NullableValues};
use crate::view::{fmt_map, OrNull};
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use std::collections::HashMap;

pub type Int2ObjectHashMap<V> = PrimitiveObjectMap<i32, V, NonNullValues>;
pub type Long2ObjectHashMap<V> = PrimitiveObjectMap<i64, V, NonNullValues>;
pub type Int2NullableObjectHashMap<V> = PrimitiveObjectMap<i32, V, NullableValues>;
pub type Long2NullableObjectHashMap<V> = PrimitiveObjectMap<i64, V, NullableValues>;

#[derive(Clone)]
struct Slots<K, V> {
    keys: Box<[K]>,
    values: Box<[Option<Masked<V>>]>,
}

impl<K: Primitive, V> Slots<K, V> {
    fn vacant(capacity: usize) -> Self {
        Self {
            keys: vec![K::default(); capacity].into_boxed_slice(),
            values: (0..capacity).map(|_| None).collect(),
        }
    }
}

impl<K: Primitive, V> ProbeSlots for Slots<K, V> {
    #[inline]
    fn is_vacant(&self, index: usize) -> bool {
        self.values[index].is_none()
    }

    #[inline]
    fn home_of(&self, index: usize, mask: usize) -> usize {
        home_index(self.keys[index], mask)
    }

    #[inline]
    fn shift(&mut self, from: usize, to: usize) {
        self.keys[to] = self.keys[from];
        self.values[to] = self.values[from].take();
    }
}

/// Open-addressing map from a primitive key to a value of type `V`.
///
/// Lookups return `Option<&V>`; a stored null and an absent key both read
/// as `None`, and `contains_key` tells them apart.
pub struct PrimitiveObjectMap<K: Primitive, V, P: NullPolicy = NonNullValues> {
    slots: Slots<K, V>,
    len: usize,
    sizing: Sizing,
    iteration: IterationMode,
    cursor: CursorState,
    _policy: PhantomData<P>,
}

impl<K: Primitive, V, P: NullPolicy> Default for PrimitiveObjectMap<K, V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Primitive, V: Clone, P: NullPolicy> Clone for PrimitiveObjectMap<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            len: self.len,
            sizing: self.sizing,
            iteration: self.iteration,
            cursor: CursorState::default(),
            _policy: PhantomData,
        }
    }
}

impl<K: Primitive, V, P: NullPolicy> PrimitiveObjectMap<K, V, P> {
    pub fn new() -> Self {
        Self::from_sizing(Sizing::default(), IterationMode::Cached)
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        let sizing = Sizing::from_config(&config)?;
        Ok(Self::from_sizing(sizing, config.iteration))
    }

    pub fn with_capacity(initial_capacity: usize, load_factor: f32) -> Result<Self> {
        Self::with_config(
            TableConfig::new()
                .with_initial_capacity(initial_capacity)
                .with_load_factor(load_factor),
        )
    }

    fn from_sizing(sizing: Sizing, iteration: IterationMode) -> Self {
        Self {
            slots: Slots::vacant(sizing.capacity()),
            len: 0,
            sizing,
            iteration,
            cursor: CursorState::default(),
            _policy: PhantomData,
        }
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
        let keys = &self.slots.keys;
        probe(&self.slots, home_index(key, mask), mask, |i| keys[i] == key)
    }

    #[inline]
    pub(crate) fn find(&self, key: K) -> Option<usize> {
        match self.locate(key) {
            Probe::Found(i) => Some(i),
            Probe::Vacant(_) => None,
        }
    }

    #[inline]
    fn stored(&self, index: usize) -> Option<&V> {
        self.slots.values[index].as_ref().and_then(Masked::get)
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.find(key).and_then(|i| self.stored(i))
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let i = self.find(key)?;
        self.slots.values[i].as_mut().and_then(Masked::get_mut)
    }

    /// True for present keys, including keys mapped to null.
    #[inline]
    pub fn contains_key(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == Some(value))
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put_masked(key, Masked::Value(value))
    }

    /// Maps `key` to null. Fails with `NullValue` unless the map accepts
    /// nulls.
    pub fn put_null(&mut self, key: K) -> Result<Option<V>> {
        let null = masked_null::<P, V>()?;
        Ok(self.put_masked(key, null))
    }

    fn put_masked(&mut self, key: K, value: Masked<V>) -> Option<V> {
        match self.locate(key) {
            Probe::Found(i) => self.slots.values[i]
                .replace(value)
                .and_then(Masked::into_option),
            Probe::Vacant(i) => {
                self.insert_at(i, key, value);
                None
            }
        }
    }

    /// Stores `value` unless `key` already maps to a non-null value, which
    /// is returned instead.
    pub fn put_if_absent(&mut self, key: K, value: V) -> Option<&V> {
        match self.locate(key) {
            Probe::Found(i) if self.stored(i).is_some() => self.stored(i),
            Probe::Found(i) => {
                self.slots.values[i] = Some(Masked::Value(value));
                None
            }
            Probe::Vacant(i) => {
                self.insert_at(i, key, Masked::Value(value));
                None
            }
        }
    }

    /// Overwrites the value of a present key and returns the old one.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        let i = self.find(key)?;
        self.slots.values[i]
            .replace(Masked::Value(value))
            .and_then(Masked::into_option)
    }

    /// Overwrites the value of `key` only if it currently equals `old`.
    pub fn replace_if(&mut self, key: K, old: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        match self.find(key) {
            Some(i) if self.stored(i) == Some(old) => {
                self.slots.values[i] = Some(Masked::Value(new));
                true
            }
            _ => false,
        }
    }

    /// Removes `key`, returning its value. A null value reads as `None`.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let i = self.find(key)?;
        self.take_at(i).and_then(Masked::into_option)
    }

    pub fn remove_if_value(&mut self, key: K, value: &V) -> bool
    where
        V: PartialEq,
    {
        match self.find(key) {
            Some(i) if self.stored(i) == Some(value) => {
                self.take_at(i);
                true
            }
            _ => false,
        }
    }

    /// Returns the value of `key`, computing it with `f` when the key is
    /// absent or null. A `None` result stores nothing.
    pub fn compute_if_absent<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(K) -> Option<V>,
    {
        match self.locate(key) {
            Probe::Found(i) if self.stored(i).is_some() => self.stored(i),
            Probe::Found(i) => {
                let value = f(key)?;
                self.slots.values[i] = Some(Masked::Value(value));
                self.stored(i)
            }
            Probe::Vacant(i) => {
                let value = f(key)?;
                let i = self.insert_at(i, key, Masked::Value(value));
                self.stored(i)
            }
        }
    }

    /// Recomputes a present, non-null value. `None` removes the entry.
    pub fn compute_if_present<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(K, V) -> Option<V>,
    {
        let i = self.find(key)?;
        if self.stored(i).is_none() {
            return None;
        }
        let old = self.slots.values[i].take().and_then(Masked::into_option);
        let guard = self.gap_guard(i);
        let next = old.and_then(|old| f(key, old));
        guard.disarm();
        self.settle(i, next)
    }

    /// Computes a new value from the current one (`None` when absent or
    /// null). `None` removes the entry.
    pub fn compute<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(K, Option<V>) -> Option<V>,
    {
        match self.locate(key) {
            Probe::Found(i) => {
                let old = self.slots.values[i].take().and_then(Masked::into_option);
                let guard = self.gap_guard(i);
                let next = f(key, old);
                guard.disarm();
                self.settle(i, next)
            }
            Probe::Vacant(i) => {
                let value = f(key, None)?;
                let i = self.insert_at(i, key, Masked::Value(value));
                self.stored(i)
            }
        }
    }

    /// Stores `value` when the key is absent or null, otherwise combines
    /// the current value with it. A `None` result removes the entry.
    pub fn merge<F>(&mut self, key: K, value: V, f: F) -> Option<&V>
    where
        F: FnOnce(V, V) -> Option<V>,
    {
        match self.locate(key) {
            Probe::Found(i) => {
                let old = self.slots.values[i].take().and_then(Masked::into_option);
                let guard = self.gap_guard(i);
                let next = match old {
                    Some(old) => f(old, value),
                    None => Some(value),
                };
                guard.disarm();
                self.settle(i, next)
            }
            Probe::Vacant(i) => {
                let i = self.insert_at(i, key, Masked::Value(value));
                self.stored(i)
            }
        }
    }

    /// Copies every entry of `other`, nulls included.
    pub fn put_all(&mut self, other: &Self)
    where
        V: Clone,
    {
        for (k, slot) in other.occupied() {
            self.put_masked(k, slot.clone());
        }
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(K, Option<&V>),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    /// Removes every entry matching `pred`; true if any was removed.
    pub fn remove_if<F>(&mut self, mut pred: F) -> bool
    where
        F: FnMut(K, Option<&V>) -> bool,
    {
        let mask = self.sizing.mask();
        let mut scan = CursorState::default();
        scan.reset(&self.slots, self.sizing.capacity(), self.len);
        let mut removed = false;
        while let Some(i) = scan.advance(&self.slots, mask) {
            if pred(self.slots.keys[i], self.stored(i)) {
                self.take_at(i);
                removed = true;
            }
        }
        removed
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(K, Option<&V>) -> bool,
    {
        self.remove_if(|k, v| !keep(k, v));
    }

    pub fn clear(&mut self) {
        if self.len > 0 {
            self.slots.values.iter_mut().for_each(|v| *v = None);
            self.len = 0;
        }
    }

    pub fn compact(&mut self) {
        let target = self.sizing.compacted_for(self.len);
        if target.capacity() < self.sizing.capacity() {
            self.rehash(target, "compact", usize::MAX);
        }
    }

    /// Entries in slot order; a null value reads as `None`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.slots.keys.iter().zip(self.slots.values.iter()),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&V>> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn cursor(&mut self) -> Cursor<'_, K, V, P> {
        let own = iter::begin(
            self.iteration,
            &mut self.cursor,
            &self.slots,
            self.sizing.capacity(),
            self.len,
        );
        Cursor { map: self, own }
    }

    /// Content hash. Non-null maps hash like a std map of the same
    /// entries; nullable maps hash each value as `Option<&V>`.
    pub fn hash_code(&self) -> u64
    where
        V: Hash,
    {
        if P::ACCEPTS_NULL {
            map_hash_code(self.iter())
        } else {
            map_hash_code(self.iter().filter_map(|(k, v)| v.map(|v| (k, v))))
        }
    }

    fn occupied(&self) -> impl Iterator<Item = (K, &Masked<V>)> + '_ {
        self.slots
            .keys
            .iter()
            .zip(self.slots.values.iter())
            .filter_map(|(&k, v)| v.as_ref().map(|v| (k, v)))
    }

    /// Stores the outcome of a compute at a slot whose value was taken.
    fn settle(&mut self, index: usize, value: Option<V>) -> Option<&V> {
        match value {
            Some(v) => {
                self.slots.values[index] = Some(Masked::Value(v));
                self.stored(index)
            }
            None => {
                self.vacate(index);
                None
            }
        }
    }

    /// Removes the entry taken from `index` if a closure unwinds before
    /// `settle` runs.
    fn gap_guard(&mut self, index: usize) -> GapGuard<'_, Slots<K, V>> {
        let mask = self.sizing.mask();
        GapGuard::new(&mut self.slots, &mut self.len, index, mask)
    }

    /// Inserts into a vacant slot and returns the slot the entry ends up
    /// in, which differs from `index` if the table grew.
    fn insert_at(&mut self, index: usize, key: K, value: Masked<V>) -> usize {
        self.slots.keys[index] = key;
        self.slots.values[index] = Some(value);
        self.len += 1;
        if self.sizing.exceeded_by(self.len) {
            let grown = self.sizing.grown_for(self.len);
            return self.rehash(grown, "grow", index);
        }
        index
    }

    pub(crate) fn take_at(&mut self, index: usize) -> Option<Masked<V>> {
        let taken = self.slots.values[index].take();
        self.vacate(index);
        taken
    }

    /// Closes the gap at an already emptied slot.
    fn vacate(&mut self, index: usize) {
        debug_assert!(self.slots.values[index].is_none());
        self.len -= 1;
        close_gap(&mut self.slots, index, self.sizing.mask());
    }

    /// Rebuilds the table at `sizing`; returns the new slot of the entry
    /// previously at `track`.
    fn rehash(&mut self, sizing: Sizing, reason: &'static str, track: usize) -> usize {
        let mask = sizing.mask();
        let mut fresh = Slots::vacant(sizing.capacity());
        let mut tracked = track;
        let old = core::mem::replace(&mut self.slots, Slots::vacant(0));
        for (index, (k, v)) in old.keys.iter().zip(old.values.into_vec()).enumerate() {
            if let Some(v) = v {
                let i = first_vacant(&fresh, home_index(*k, mask), mask);
                fresh.keys[i] = *k;
                fresh.values[i] = Some(v);
                if index == track {
                    tracked = i;
                }
            }
        }
        trace_rehash(reason, self.sizing.capacity(), sizing.capacity(), self.len);
        self.slots = fresh;
        self.sizing = sizing;
        tracked
    }
}

/// Borrowing iterator in slot order.
pub struct Iter<'a, K, V> {
    inner: core::iter::Zip<core::slice::Iter<'a, K>, core::slice::Iter<'a, Option<Masked<V>>>>,
    remaining: usize,
}

impl<'a, K: Primitive, V> Iterator for Iter<'a, K, V> {
    type Item = (K, Option<&'a V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (&k, slot) in self.inner.by_ref() {
            if let Some(masked) = slot {
                self.remaining -= 1;
                return Some((k, masked.get()));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Primitive, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K: Primitive, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K: Primitive, V, P: NullPolicy> IntoIterator for &'a PrimitiveObjectMap<K, V, P> {
    type Item = (K, Option<&'a V>);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Removal-capable cursor returned by [`PrimitiveObjectMap::cursor`].
///
/// Entries borrow from the cursor, so it advances with `next_entry`
/// rather than implementing `Iterator`.
pub struct Cursor<'a, K: Primitive, V, P: NullPolicy> {
    map: &'a mut PrimitiveObjectMap<K, V, P>,
    own: Option<CursorState>,
}

impl<K: Primitive, V, P: NullPolicy> Cursor<'_, K, V, P> {
    pub fn next_entry(&mut self) -> Option<(K, Option<&V>)> {
        let mask = self.map.sizing.mask();
        let index = iter::select(&mut self.own, &mut self.map.cursor).advance(&self.map.slots, mask)?;
        Some((self.map.slots.keys[index], self.map.stored(index)))
    }

    /// Removes the entry last returned by `next_entry`.
    pub fn remove(&mut self) -> Option<(K, Option<V>)> {
        let index = iter::select(&mut self.own, &mut self.map.cursor).take_current()?;
        let key = self.map.slots.keys[index];
        let value = self.map.take_at(index).and_then(Masked::into_option);
        Some((key, value))
    }

    /// Mutable access to the value last returned by `next_entry`.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        let index = iter::select(&mut self.own, &mut self.map.cursor).current()?;
        self.map.slots.values[index].as_mut().and_then(Masked::get_mut)
    }
}

impl<K: Primitive, V: PartialEq, P: NullPolicy> PartialEq for PrimitiveObjectMap<K, V, P> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.occupied().all(|(k, v)| {
                other
                    .find(k)
                    .and_then(|i| other.slots.values[i].as_ref())
                    == Some(v)
            })
    }
}

impl<K: Primitive, V: Eq, P: NullPolicy> Eq for PrimitiveObjectMap<K, V, P> {}

impl<K, V, P, S> PartialEq<HashMap<K, V, S>> for PrimitiveObjectMap<K, V, P>
where
    K: Primitive,
    V: PartialEq,
    P: NullPolicy,
    S: BuildHasher,
{
    fn eq(&self, other: &HashMap<K, V, S>) -> bool {
        self.len == other.len() && other.iter().all(|(&k, v)| self.get(k) == Some(v))
    }
}

impl<K: Primitive, V: Hash, P: NullPolicy> Hash for PrimitiveObjectMap<K, V, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K: Primitive, V: fmt::Display, P: NullPolicy> fmt::Display for PrimitiveObjectMap<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_map(f, self.iter().map(|(k, v)| (k, OrNull(v))))
    }
}

impl<K: Primitive, V: fmt::Debug, P: NullPolicy> fmt::Debug for PrimitiveObjectMap<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Primitive, V, P: NullPolicy> Extend<(K, V)> for PrimitiveObjectMap<K, V, P> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K: Primitive, V, P: NullPolicy> FromIterator<(K, V)> for PrimitiveObjectMap<K, V, P> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectionError;
    use proptest::prelude::*;

    #[test]
    fn put_get_remove() {
        let mut m: Int2ObjectHashMap<String> = Int2ObjectHashMap::new();
        assert_eq!(m.put(1, "one".into()), None);
        assert_eq!(m.put(1, "uno".into()), Some("one".to_string()));
        assert_eq!(m.get(1).map(String::as_str), Some("uno"));
        m.get_mut(1).unwrap().push('!');
        assert_eq!(m.remove(1), Some("uno!".to_string()));
        assert!(m.is_empty());
        assert_eq!(m.remove(1), None);
    }

    /// Invariant: a non-nullable map rejects nulls and stays unchanged.
    #[test]
    fn null_rejected_by_non_nullable_map() {
        let mut m: Long2ObjectHashMap<u8> = Long2ObjectHashMap::new();
        m.put(5, 1);
        assert_eq!(m.put_null(5), Err(CollectionError::NullValue));
        assert_eq!(m.get(5), Some(&1));
        assert_eq!(m.put_null(6), Err(CollectionError::NullValue));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: nulls are stored behind a marker that never leaks out,
    /// and a null entry is still a present key.
    #[test]
    fn nullable_map_keeps_null_entries() {
        let mut m: Int2NullableObjectHashMap<&str> = Int2NullableObjectHashMap::new();
        assert_eq!(m.put_null(3), Ok(None));
        assert!(m.contains_key(3));
        assert_eq!(m.get(3), None);
        assert_eq!(m.len(), 1);
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(3, None)]);
        assert_eq!(m.to_string(), "{3=null}");

        // Absent-or-null keys are filled by compute_if_absent and merge.
        assert_eq!(m.compute_if_absent(3, |_| Some("x")), Some(&"x"));
        m.put_null(3).unwrap();
        assert_eq!(m.merge(3, "y", |_, _| unreachable!()), Some(&"y"));
        assert_eq!(m.put_null(3), Ok(Some("y")));
        assert_eq!(m.remove(3), None);
        assert!(!m.contains_key(3));
    }

    #[test]
    fn compute_family_removes_on_none() {
        let mut m: Int2ObjectHashMap<i64> = Int2ObjectHashMap::new();
        assert_eq!(m.compute_if_absent(1, |_| None), None);
        assert!(!m.contains_key(1));
        assert_eq!(m.compute_if_absent(1, |k| Some(k as i64 * 10)), Some(&10));
        assert_eq!(m.compute_if_absent(1, |_| unreachable!()), Some(&10));

        assert_eq!(m.compute_if_present(1, |_, v| Some(v + 1)), Some(&11));
        assert_eq!(m.compute_if_present(2, |_, _| unreachable!()), None);
        assert_eq!(m.compute_if_present(1, |_, _| None), None);
        assert!(m.is_empty());

        assert_eq!(m.compute(7, |_, v| Some(v.unwrap_or(0) + 1)), Some(&1));
        assert_eq!(m.compute(7, |_, v| Some(v.unwrap_or(0) + 1)), Some(&2));
        assert_eq!(m.compute(7, |_, _| None), None);
        assert!(m.is_empty());

        assert_eq!(m.merge(9, 4, |a, b| Some(a * b)), Some(&4));
        assert_eq!(m.merge(9, 4, |a, b| Some(a * b)), Some(&16));
        assert_eq!(m.merge(9, 4, |_, _| None), None);
        assert!(m.is_empty());
    }

    /// Invariant: a value computed while the table grows is returned from
    /// its post-growth slot.
    #[test]
    fn compute_returns_value_after_growth() {
        let mut m: Int2ObjectHashMap<i32> = Int2ObjectHashMap::new();
        for k in 0..200 {
            let v = *m.compute_if_absent(k, |k| Some(k * 3)).unwrap();
            assert_eq!(v, k * 3);
        }
        for k in 0..200 {
            assert_eq!(m.get(k), Some(&(k * 3)));
        }
    }

    #[test]
    fn conditional_operations() {
        let mut m: Int2ObjectHashMap<u32> = Int2ObjectHashMap::new();
        assert_eq!(m.put_if_absent(1, 10), None);
        assert_eq!(m.put_if_absent(1, 11), Some(&10));
        assert_eq!(m.replace(2, 5), None);
        assert!(!m.contains_key(2));
        assert!(!m.replace_if(1, &11, 12));
        assert!(m.replace_if(1, &10, 12));
        assert!(!m.remove_if_value(1, &10));
        assert!(m.remove_if_value(1, &12));
        assert!(m.is_empty());
    }

    #[test]
    fn cursor_removes_and_mutates() {
        let mut m: Long2ObjectHashMap<Vec<u8>> = (0..40i64).map(|k| (k, vec![k as u8])).collect();
        let mut cursor = m.cursor();
        let mut seen = 0;
        while let Some((k, _)) = cursor.next_entry() {
            seen += 1;
            if k % 3 == 0 {
                assert_eq!(cursor.remove(), Some((k, Some(vec![k as u8]))));
            } else {
                cursor.value_mut().unwrap().push(0);
            }
        }
        assert_eq!(seen, 40);
        assert_eq!(m.len(), 26);
        assert!(m.iter().all(|(k, v)| k % 3 != 0 && v.unwrap().len() == 2));
    }

    #[test]
    fn equality_and_hash_match_std() {
        let m: Int2ObjectHashMap<String> = (0..30).map(|k| (k, k.to_string())).collect();
        let reference: HashMap<i32, String> = (0..30).map(|k| (k, k.to_string())).collect();
        assert!(m == reference);
        assert_eq!(
            m.hash_code(),
            map_hash_code(reference.iter().map(|(k, v)| (*k, v)))
        );
        let mut other = m.clone();
        assert_eq!(m, other);
        other.put(0, "zero".into());
        assert_ne!(m, other);
        assert!(m.contains_value(&"7".to_string()));
    }

    proptest! {
        /// Invariant: contents, length and content hash agree with a std
        /// HashMap through random puts, removes and compactions.
        #[test]
        fn prop_matches_std_model(
            ops in proptest::collection::vec((0u8..3, -10i64..30, any::<u16>()), 1..300)
        ) {
            let mut m: Long2ObjectHashMap<u16> = Long2ObjectHashMap::with_capacity(8, 0.6).unwrap();
            let mut model: HashMap<i64, u16> = HashMap::new();
            for (op, k, v) in ops {
                match op {
                    0 => {
                        prop_assert_eq!(m.put(k, v), model.insert(k, v));
                    }
                    1 => {
                        prop_assert_eq!(m.remove(k), model.remove(&k));
                    }
                    _ => m.compact(),
                }
                prop_assert_eq!(m.len(), model.len());
                prop_assert!(m == model);
                prop_assert_eq!(m.hash_code(), map_hash_code(model.iter().map(|(k, v)| (*k, v))));
            }
        }
    }
}
