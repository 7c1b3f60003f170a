//! ObjectHashSet: owned elements on the probing engine, each slot caching
//! the element's spread hash.

use crate::config::{IterationMode, TableConfig};
use crate::engine::{close_gap, first_vacant, probe, trace_rehash, Probe, ProbeSlots, Sizing};
use crate::error::Result;
use crate::hashing::{object_hash, set_hash_code};
use crate::iter::{self, CursorState};
use crate::view::fmt_set;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::iter::FusedIterator;
use std::collections::hash_map::RandomState;
use std::collections::HashSet;

#[derive(Clone)]
struct Elements<T>(Box<[Option<(u64, T)>]>);

impl<T> Elements<T> {
    fn vacant(capacity: usize) -> Self {
        Self((0..capacity).map(|_| None).collect())
    }
}

impl<T> ProbeSlots for Elements<T> {
    #[inline]
    fn is_vacant(&self, index: usize) -> bool {
        self.0[index].is_none()
    }

    #[inline]
    fn home_of(&self, index: usize, mask: usize) -> usize {
        self.0[index]
            .as_ref()
            .map_or(index, |(hash, _)| *hash as usize & mask)
    }

    #[inline]
    fn shift(&mut self, from: usize, to: usize) {
        self.0[to] = self.0[from].take();
    }
}

pub struct ObjectHashSet<T, S = RandomState> {
    hasher: S,
    elements: Elements<T>,
    len: usize,
    sizing: Sizing,
    iteration: IterationMode,
    cursor: CursorState,
}

impl<T: Eq + Hash> ObjectHashSet<T> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<T: Eq + Hash> Default for ObjectHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, S: Clone> Clone for ObjectHashSet<T, S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            elements: self.elements.clone(),
            len: self.len,
            sizing: self.sizing,
            iteration: self.iteration,
            cursor: CursorState::default(),
        }
    }
}

impl<T, S> ObjectHashSet<T, S>
where
    T: Eq + Hash,
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
            elements: Elements::vacant(sizing.capacity()),
            len: 0,
            sizing,
            iteration,
            cursor: CursorState::default(),
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

    fn locate<Q>(&self, hash: u64, value: &Q) -> Probe
    where
        T: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mask = self.sizing.mask();
        let elements = &self.elements.0;
        probe(&self.elements, hash as usize & mask, mask, |i| {
            elements[i]
                .as_ref()
                .is_some_and(|(h, e)| *h == hash && e.borrow() == value)
        })
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = object_hash(&self.hasher, value);
        matches!(self.locate(hash, value), Probe::Found(_))
    }

    /// Stored element equal to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = object_hash(&self.hasher, value);
        match self.locate(hash, value) {
            Probe::Found(i) => self.elements.0[i].as_ref().map(|(_, e)| e),
            Probe::Vacant(_) => None,
        }
    }

    /// Adds `value`; false (and `value` dropped) if an equal element was
    /// already present.
    pub fn insert(&mut self, value: T) -> bool {
        let hash = object_hash(&self.hasher, &value);
        match self.locate(hash, &value) {
            Probe::Found(_) => false,
            Probe::Vacant(i) => {
                self.elements.0[i] = Some((hash, value));
                self.len += 1;
                if self.sizing.exceeded_by(self.len) {
                    let grown = self.sizing.grown_for(self.len);
                    self.rehash(grown, "grow");
                }
                true
            }
        }
    }

    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the stored element equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = object_hash(&self.hasher, value);
        match self.locate(hash, value) {
            Probe::Found(i) => self.take_at(i),
            Probe::Vacant(_) => None,
        }
    }

    pub fn contains_all(&self, other: &Self) -> bool {
        other.iter().all(|v| self.contains(v))
    }

    pub fn remove_all(&mut self, other: &Self) -> bool {
        let mut removed = false;
        for v in other.iter() {
            removed |= self.remove(v);
        }
        removed
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mask = self.sizing.mask();
        let mut scan = CursorState::default();
        scan.reset(&self.elements, self.sizing.capacity(), self.len);
        while let Some(i) = scan.advance(&self.elements, mask) {
            let drop_it = self.elements.0[i].as_ref().is_some_and(|(_, e)| !keep(e));
            if drop_it {
                self.take_at(i);
            }
        }
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self
    where
        T: Clone,
        S: Clone,
    {
        let mut out = Self::from_parts(self.hasher.clone(), Sizing::default(), self.iteration);
        out.extend(self.iter().filter(|v| !other.contains(*v)).cloned());
        out
    }

    pub fn clear(&mut self) {
        if self.len > 0 {
            self.elements.0.iter_mut().for_each(|e| *e = None);
            self.len = 0;
        }
    }

    pub fn compact(&mut self) {
        let target = self.sizing.compacted_for(self.len);
        if target.capacity() < self.sizing.capacity() {
            self.rehash(target, "compact");
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.elements.0.iter(),
            remaining: self.len,
        }
    }

    pub fn cursor(&mut self) -> Cursor<'_, T, S> {
        let own = iter::begin(
            self.iteration,
            &mut self.cursor,
            &self.elements,
            self.sizing.capacity(),
            self.len,
        );
        Cursor { set: self, own }
    }

    /// Content hash, equal for any set holding the same elements.
    pub fn hash_code(&self) -> u64 {
        set_hash_code(self.iter())
    }

    fn take_at(&mut self, index: usize) -> Option<T> {
        let taken = self.elements.0[index].take();
        self.len -= 1;
        close_gap(&mut self.elements, index, self.sizing.mask());
        taken.map(|(_, e)| e)
    }

    fn rehash(&mut self, sizing: Sizing, reason: &'static str) {
        let mask = sizing.mask();
        let mut fresh = Elements::vacant(sizing.capacity());
        let old = core::mem::replace(&mut self.elements, Elements::vacant(0));
        for (hash, e) in old.0.into_vec().into_iter().flatten() {
            let i = first_vacant(&fresh, hash as usize & mask, mask);
            fresh.0[i] = Some((hash, e));
        }
        trace_rehash(reason, self.sizing.capacity(), sizing.capacity(), self.len);
        self.elements = fresh;
        self.sizing = sizing;
    }
}

pub struct Iter<'a, T> {
    inner: core::slice::Iter<'a, Option<(u64, T)>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let (_, e) = self.inner.by_ref().flatten().next()?;
        self.remaining -= 1;
        Some(e)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T: Eq + Hash, S: BuildHasher> IntoIterator for &'a ObjectHashSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Removal-capable cursor returned by [`ObjectHashSet::cursor`].
pub struct Cursor<'a, T, S> {
    set: &'a mut ObjectHashSet<T, S>,
    own: Option<CursorState>,
}

impl<T: Eq + Hash, S: BuildHasher> Cursor<'_, T, S> {
    pub fn next_element(&mut self) -> Option<&T> {
        let mask = self.set.sizing.mask();
        let index = iter::select(&mut self.own, &mut self.set.cursor).advance(&self.set.elements, mask)?;
        self.set.elements.0[index].as_ref().map(|(_, e)| e)
    }

    /// Removes the element last returned by `next_element`.
    pub fn remove(&mut self) -> Option<T> {
        let index = iter::select(&mut self.own, &mut self.set.cursor).take_current()?;
        self.set.take_at(index)
    }
}

impl<T: Eq + Hash, S: BuildHasher> PartialEq for ObjectHashSet<T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|v| other.contains(v))
    }
}

impl<T: Eq + Hash, S: BuildHasher> Eq for ObjectHashSet<T, S> {}

impl<T, S, S2> PartialEq<HashSet<T, S2>> for ObjectHashSet<T, S>
where
    T: Eq + Hash,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &HashSet<T, S2>) -> bool {
        self.len == other.len() && other.iter().all(|v| self.contains(v))
    }
}

impl<T: Eq + Hash, S: BuildHasher> Hash for ObjectHashSet<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<T: Eq + Hash, S: BuildHasher> Extend<T> for ObjectHashSet<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<T: Eq + Hash, S: BuildHasher + Default> FromIterator<T> for ObjectHashSet<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

impl<T: Eq + Hash + fmt::Display, S: BuildHasher> fmt::Display for ObjectHashSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_set(f, self.iter())
    }
}

impl<T: Eq + Hash + fmt::Debug, S: BuildHasher> fmt::Debug for ObjectHashSet<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
