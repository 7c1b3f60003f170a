//! ObjectHashMap: owned keys to owned values on the probing engine.
//!
//! Each occupied slot keeps the key's spread hash next to the entry, so
//! probing compares hashes before keys and rehashing or gap closing never
//! calls the hasher again.

use crate::config::{IterationMode, TableConfig};
use crate::engine::{
    close_gap, first_vacant, probe, trace_rehash, GapGuard, Probe, ProbeSlots, Sizing,
};
use crate::error::Result;
use crate::hashing::{map_hash_code, object_hash};
use crate::iter::{self, CursorState};
use crate::sentinel::{masked_null, Masked, NonNullValues, NullPolicy, NullableValues};
use crate::view::{fmt_map, OrNull};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;

pub type Object2ObjectHashMap<K, V> = ObjectHashMap<K, V, NonNullValues>;
pub type Object2NullableObjectHashMap<K, V> = ObjectHashMap<K, V, NullableValues>;

#[derive(Clone, Debug)]
struct Bucket<K, V> {
    hash: u64,
    key: K,
    value: Masked<V>,
}

#[derive(Clone)]
struct Buckets<K, V>(Box<[Option<Bucket<K, V>>]>);

impl<K, V> Buckets<K, V> {
    fn vacant(capacity: usize) -> Self {
        Self((0..capacity).map(|_| None).collect())
    }

    #[inline]
    fn at(&self, index: usize) -> Option<&Bucket<K, V>> {
        self.0[index].as_ref()
    }
}

impl<K, V> ProbeSlots for Buckets<K, V> {
    #[inline]
    fn is_vacant(&self, index: usize) -> bool {
        self.0[index].is_none()
    }

    #[inline]
    fn home_of(&self, index: usize, mask: usize) -> usize {
        self.0[index]
            .as_ref()
            .map_or(index, |b| b.hash as usize & mask)
    }

    #[inline]
    fn shift(&mut self, from: usize, to: usize) {
        self.0[to] = self.0[from].take();
    }
}

/// Open-addressing map with object keys compared by `Eq`, never by
/// identity, and looked up through any borrowed form of the key.
pub struct ObjectHashMap<K, V, P: NullPolicy = NonNullValues, S = RandomState> {
    hasher: S,
    buckets: Buckets<K, V>,
    len: usize,
    sizing: Sizing,
    iteration: IterationMode,
    cursor: CursorState,
    _policy: PhantomData<P>,
}

impl<K, V, P> ObjectHashMap<K, V, P>
where
    K: Eq + Hash,
    P: NullPolicy,
{
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V, P> Default for ObjectHashMap<K, V, P>
where
    K: Eq + Hash,
    P: NullPolicy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, P: NullPolicy, S: Clone> Clone for ObjectHashMap<K, V, P, S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            buckets: self.buckets.clone(),
            len: self.len,
            sizing: self.sizing,
            iteration: self.iteration,
            cursor: CursorState::default(),
            _policy: PhantomData,
        }
    }
}

impl<K, V, P, S> ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    P: NullPolicy,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_parts(hasher, Sizing::default(), IterationMode::Cached)
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        let sizing = Sizing::from_config(&config)?;
        Ok(Self::from_parts(hasher, sizing, config.iteration))
    }

    fn from_parts(hasher: S, sizing: Sizing, iteration: IterationMode) -> Self {
        Self {
            hasher,
            buckets: Buckets::vacant(sizing.capacity()),
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

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    #[inline]
    fn locate<Q>(&self, hash: u64, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mask = self.sizing.mask();
        let buckets = &self.buckets;
        probe(buckets, hash as usize & mask, mask, |i| {
            buckets
                .at(i)
                .is_some_and(|b| b.hash == hash && b.key.borrow() == key)
        })
    }

    #[inline]
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.locate(object_hash(&self.hasher, key), key) {
            Probe::Found(i) => Some(i),
            Probe::Vacant(_) => None,
        }
    }

    #[inline]
    fn stored(&self, index: usize) -> Option<&V> {
        self.buckets.at(index).and_then(|b| b.value.get())
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).and_then(|i| self.stored(i))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(key)?;
        self.buckets.0[i].as_mut().and_then(|b| b.value.get_mut())
    }

    /// True for present keys, including keys mapped to null.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).is_some()
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == Some(value))
    }

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
        let hash = object_hash(&self.hasher, &key);
        match self.locate(hash, &key) {
            Probe::Found(i) => self.buckets.0[i]
                .as_mut()
                .and_then(|b| core::mem::replace(&mut b.value, value).into_option()),
            Probe::Vacant(i) => {
                self.insert_at(i, Bucket { hash, key, value });
                None
            }
        }
    }

    /// Stores `value` unless `key` already maps to a non-null value, which
    /// is returned instead.
    pub fn put_if_absent(&mut self, key: K, value: V) -> Option<&V> {
        let hash = object_hash(&self.hasher, &key);
        match self.locate(hash, &key) {
            Probe::Found(i) if self.stored(i).is_some() => self.stored(i),
            Probe::Found(i) => {
                self.set_value(i, value);
                None
            }
            Probe::Vacant(i) => {
                let value = Masked::Value(value);
                self.insert_at(i, Bucket { hash, key, value });
                None
            }
        }
    }

    pub fn replace<Q>(&mut self, key: &Q, value: V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(key)?;
        self.buckets.0[i]
            .as_mut()
            .and_then(|b| core::mem::replace(&mut b.value, Masked::Value(value)).into_option())
    }

    pub fn replace_if<Q>(&mut self, key: &Q, old: &V, new: V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: PartialEq,
    {
        match self.find(key) {
            Some(i) if self.stored(i) == Some(old) => {
                self.set_value(i, new);
                true
            }
            _ => false,
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).and_then(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, Option<V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.find(key)?;
        self.take_at(i).map(|b| (b.key, b.value.into_option()))
    }

    pub fn remove_if_value<Q>(&mut self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
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
        F: FnOnce(&K) -> Option<V>,
    {
        let hash = object_hash(&self.hasher, &key);
        match self.locate(hash, &key) {
            Probe::Found(i) if self.stored(i).is_some() => self.stored(i),
            Probe::Found(i) => {
                let value = f(&key)?;
                self.set_value(i, value);
                self.stored(i)
            }
            Probe::Vacant(i) => {
                let value = Masked::Value(f(&key)?);
                let i = self.insert_at(i, Bucket { hash, key, value });
                self.stored(i)
            }
        }
    }

    /// Recomputes a present, non-null value. `None` removes the entry.
    pub fn compute_if_present<Q, F>(&mut self, key: &Q, f: F) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&K, V) -> Option<V>,
    {
        let i = self.find(key)?;
        self.stored(i)?;
        let Bucket { hash, key, value } = self.buckets.0[i].take()?;
        let guard = self.gap_guard(i);
        let next = value.into_option().and_then(|old| f(&key, old));
        guard.disarm();
        self.settle(i, hash, key, next)
    }

    /// Computes a new value from the current one (`None` when absent or
    /// null). `None` removes the entry.
    pub fn compute<F>(&mut self, key: K, f: F) -> Option<&V>
    where
        F: FnOnce(&K, Option<V>) -> Option<V>,
    {
        let hash = object_hash(&self.hasher, &key);
        match self.locate(hash, &key) {
            Probe::Found(i) => {
                let old = self.buckets.0[i].take().and_then(|b| b.value.into_option());
                let guard = self.gap_guard(i);
                let next = f(&key, old);
                guard.disarm();
                self.settle(i, hash, key, next)
            }
            Probe::Vacant(i) => {
                let value = Masked::Value(f(&key, None)?);
                let i = self.insert_at(i, Bucket { hash, key, value });
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
        let hash = object_hash(&self.hasher, &key);
        match self.locate(hash, &key) {
            Probe::Found(i) => {
                let old = self.buckets.0[i].take().and_then(|b| b.value.into_option());
                let guard = self.gap_guard(i);
                let next = match old {
                    Some(old) => f(old, value),
                    None => Some(value),
                };
                guard.disarm();
                self.settle(i, hash, key, next)
            }
            Probe::Vacant(i) => {
                let value = Masked::Value(value);
                let i = self.insert_at(i, Bucket { hash, key, value });
                self.stored(i)
            }
        }
    }

    pub fn put_all(&mut self, other: &Self)
    where
        K: Clone,
        V: Clone,
    {
        for bucket in other.buckets.0.iter().flatten() {
            self.put_masked(bucket.key.clone(), bucket.value.clone());
        }
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, Option<&V>),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }

    pub fn remove_if<F>(&mut self, mut pred: F) -> bool
    where
        F: FnMut(&K, Option<&V>) -> bool,
    {
        let mask = self.sizing.mask();
        let mut scan = CursorState::default();
        scan.reset(&self.buckets, self.sizing.capacity(), self.len);
        let mut removed = false;
        while let Some(i) = scan.advance(&self.buckets, mask) {
            let hit = self
                .buckets
                .at(i)
                .is_some_and(|b| pred(&b.key, b.value.get()));
            if hit {
                self.take_at(i);
                removed = true;
            }
        }
        removed
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, Option<&V>) -> bool,
    {
        self.remove_if(|k, v| !keep(k, v));
    }

    pub fn clear(&mut self) {
        if self.len > 0 {
            self.buckets.0.iter_mut().for_each(|b| *b = None);
            self.len = 0;
        }
    }

    pub fn compact(&mut self) {
        let target = self.sizing.compacted_for(self.len);
        if target.capacity() < self.sizing.capacity() {
            self.rehash(target, "compact", usize::MAX);
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.buckets.0.iter(),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&V>> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn cursor(&mut self) -> Cursor<'_, K, V, P, S> {
        let own = iter::begin(
            self.iteration,
            &mut self.cursor,
            &self.buckets,
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

    fn set_value(&mut self, index: usize, value: V) {
        if let Some(b) = self.buckets.0[index].as_mut() {
            b.value = Masked::Value(value);
        }
    }

    /// Puts a taken bucket back with its computed value, or closes the gap.
    fn settle(&mut self, index: usize, hash: u64, key: K, value: Option<V>) -> Option<&V> {
        match value {
            Some(v) => {
                let value = Masked::Value(v);
                self.buckets.0[index] = Some(Bucket { hash, key, value });
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
    fn gap_guard(&mut self, index: usize) -> GapGuard<'_, Buckets<K, V>> {
        let mask = self.sizing.mask();
        GapGuard::new(&mut self.buckets, &mut self.len, index, mask)
    }

    fn insert_at(&mut self, index: usize, bucket: Bucket<K, V>) -> usize {
        self.buckets.0[index] = Some(bucket);
        self.len += 1;
        if self.sizing.exceeded_by(self.len) {
            let grown = self.sizing.grown_for(self.len);
            return self.rehash(grown, "grow", index);
        }
        index
    }

    fn take_at(&mut self, index: usize) -> Option<Bucket<K, V>> {
        let taken = self.buckets.0[index].take();
        self.vacate(index);
        taken
    }

    fn vacate(&mut self, index: usize) {
        debug_assert!(self.buckets.is_vacant(index));
        self.len -= 1;
        close_gap(&mut self.buckets, index, self.sizing.mask());
    }

    fn rehash(&mut self, sizing: Sizing, reason: &'static str, track: usize) -> usize {
        let mask = sizing.mask();
        let mut fresh = Buckets::vacant(sizing.capacity());
        let mut tracked = track;
        let old = core::mem::replace(&mut self.buckets, Buckets::vacant(0));
        for (index, bucket) in old.0.into_vec().into_iter().enumerate() {
            if let Some(bucket) = bucket {
                let i = first_vacant(&fresh, bucket.hash as usize & mask, mask);
                fresh.0[i] = Some(bucket);
                if index == track {
                    tracked = i;
                }
            }
        }
        trace_rehash(reason, self.sizing.capacity(), sizing.capacity(), self.len);
        self.buckets = fresh;
        self.sizing = sizing;
        tracked
    }
}

pub struct Iter<'a, K, V> {
    inner: core::slice::Iter<'a, Option<Bucket<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, Option<&'a V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let b = self.inner.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some((&b.key, b.value.get()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, P, S> IntoIterator for &'a ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    P: NullPolicy,
    S: BuildHasher,
{
    type Item = (&'a K, Option<&'a V>);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Removal-capable cursor returned by [`ObjectHashMap::cursor`].
pub struct Cursor<'a, K, V, P: NullPolicy, S> {
    map: &'a mut ObjectHashMap<K, V, P, S>,
    own: Option<CursorState>,
}

impl<K, V, P, S> Cursor<'_, K, V, P, S>
where
    K: Eq + Hash,
    P: NullPolicy,
    S: BuildHasher,
{
    pub fn next_entry(&mut self) -> Option<(&K, Option<&V>)> {
        let mask = self.map.sizing.mask();
        let index = iter::select(&mut self.own, &mut self.map.cursor).advance(&self.map.buckets, mask)?;
        self.map.buckets.at(index).map(|b| (&b.key, b.value.get()))
    }

    /// Removes the entry last returned by `next_entry`.
    pub fn remove(&mut self) -> Option<(K, Option<V>)> {
        let index = iter::select(&mut self.own, &mut self.map.cursor).take_current()?;
        self.map
            .take_at(index)
            .map(|b| (b.key, b.value.into_option()))
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        let index = iter::select(&mut self.own, &mut self.map.cursor).current()?;
        self.map.buckets.0[index]
            .as_mut()
            .and_then(|b| b.value.get_mut())
    }
}

impl<K, V, P, S> PartialEq for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    V: PartialEq,
    P: NullPolicy,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.buckets.0.iter().flatten().all(|b| {
                other
                    .find(&b.key)
                    .and_then(|i| other.buckets.at(i))
                    .is_some_and(|o| o.value == b.value)
            })
    }
}

impl<K, V, P, S> Eq for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    V: Eq,
    P: NullPolicy,
    S: BuildHasher,
{
}

impl<K, V, P, S, S2> PartialEq<HashMap<K, V, S2>> for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    V: PartialEq,
    P: NullPolicy,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &HashMap<K, V, S2>) -> bool {
        self.len == other.len() && other.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl<K, V, P, S> Hash for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    V: Hash,
    P: NullPolicy,
    S: BuildHasher,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K, V, P, S> fmt::Display for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash + fmt::Display,
    V: fmt::Display,
    P: NullPolicy,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_map(f, self.iter().map(|(k, v)| (k, OrNull(v))))
    }
}

impl<K, V, P, S> fmt::Debug for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    P: NullPolicy,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, P, S> Extend<(K, V)> for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    P: NullPolicy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, P, S> FromIterator<(K, V)> for ObjectHashMap<K, V, P, S>
where
    K: Eq + Hash,
    P: NullPolicy,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}
