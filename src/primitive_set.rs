//! PrimitiveHashSet: a set of primitives stored inline.
//!
//! Vacant slots hold the type's default missing value (-1). That value is
//! still a valid member: its membership lives in a separate flag and it is
//! produced after the table entries when iterating.

use crate::config::{IterationMode, TableConfig};
use crate::engine::{close_gap, first_vacant, probe, trace_rehash, Probe, ProbeSlots, Sizing};
use crate::error::Result;
use crate::hashing::{home_index, set_hash_code, Primitive};
use crate::iter::{self, CursorState};
use crate::view::fmt_set;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::iter::FusedIterator;
use std::collections::HashSet;

pub type IntHashSet = PrimitiveHashSet<i32>;
pub type LongHashSet = PrimitiveHashSet<i64>;

#[derive(Clone)]
struct Members<T>(Box<[T]>);

impl<T: Primitive> Members<T> {
    fn vacant(capacity: usize) -> Self {
        Self(vec![T::DEFAULT_MISSING; capacity].into_boxed_slice())
    }
}

impl<T: Primitive> ProbeSlots for Members<T> {
    #[inline]
    fn is_vacant(&self, index: usize) -> bool {
        self.0[index] == T::DEFAULT_MISSING
    }

    #[inline]
    fn home_of(&self, index: usize, mask: usize) -> usize {
        home_index(self.0[index], mask)
    }

    #[inline]
    fn shift(&mut self, from: usize, to: usize) {
        self.0[to] = self.0[from];
        self.0[from] = T::DEFAULT_MISSING;
    }
}

#[derive(Clone)]
pub struct PrimitiveHashSet<T: Primitive> {
    members: Members<T>,
    /// Entries in the table, not counting the missing value.
    table_len: usize,
    contains_missing: bool,
    sizing: Sizing,
    iteration: IterationMode,
    cursor: CursorState,
}

impl<T: Primitive> Default for PrimitiveHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Primitive> PrimitiveHashSet<T> {
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
            members: Members::vacant(sizing.capacity()),
            table_len: 0,
            contains_missing: false,
            sizing,
            iteration,
            cursor: CursorState::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table_len + usize::from(self.contains_missing)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
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
    fn locate(&self, value: T) -> Probe {
        let mask = self.sizing.mask();
        let members = &self.members.0;
        probe(&self.members, home_index(value, mask), mask, |i| members[i] == value)
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        if value == T::DEFAULT_MISSING {
            return self.contains_missing;
        }
        matches!(self.locate(value), Probe::Found(_))
    }

    /// Adds `value`; false if it was already a member.
    pub fn insert(&mut self, value: T) -> bool {
        if value == T::DEFAULT_MISSING {
            let added = !self.contains_missing;
            self.contains_missing = true;
            return added;
        }
        match self.locate(value) {
            Probe::Found(_) => false,
            Probe::Vacant(i) => {
                self.members.0[i] = value;
                self.table_len += 1;
                if self.sizing.exceeded_by(self.table_len) {
                    let grown = self.sizing.grown_for(self.table_len);
                    self.rehash(grown, "grow");
                }
                true
            }
        }
    }

    /// Removes `value`; false if it was not a member.
    pub fn remove(&mut self, value: T) -> bool {
        if value == T::DEFAULT_MISSING {
            let removed = self.contains_missing;
            self.contains_missing = false;
            return removed;
        }
        match self.locate(value) {
            Probe::Found(i) => {
                self.remove_at(i);
                true
            }
            Probe::Vacant(_) => false,
        }
    }

    pub fn contains_all(&self, other: &Self) -> bool {
        other.iter().all(|v| self.contains(v))
    }

    /// Removes every member of `other`; true if anything was removed.
    pub fn remove_all(&mut self, other: &Self) -> bool {
        let mut removed = false;
        for v in other.iter() {
            removed |= self.remove(v);
        }
        removed
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(T) -> bool,
    {
        let mask = self.sizing.mask();
        let mut scan = CursorState::default();
        scan.reset(&self.members, self.sizing.capacity(), self.table_len);
        while let Some(i) = scan.advance(&self.members, mask) {
            if !keep(self.members.0[i]) {
                self.remove_at(i);
            }
        }
        if self.contains_missing && !keep(T::DEFAULT_MISSING) {
            self.contains_missing = false;
        }
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = Self::from_sizing(Sizing::default(), self.iteration);
        out.extend(self.iter().filter(|&v| !other.contains(v)));
        out
    }

    pub fn clear(&mut self) {
        if self.table_len > 0 {
            self.members.0.fill(T::DEFAULT_MISSING);
            self.table_len = 0;
        }
        self.contains_missing = false;
    }

    pub fn compact(&mut self) {
        let target = self.sizing.compacted_for(self.table_len);
        if target.capacity() < self.sizing.capacity() {
            self.rehash(target, "compact");
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.members.0.iter(),
            remaining: self.table_len,
            missing_pending: self.contains_missing,
        }
    }

    pub fn cursor(&mut self) -> Cursor<'_, T> {
        let own = iter::begin(
            self.iteration,
            &mut self.cursor,
            &self.members,
            self.sizing.capacity(),
            self.table_len,
        );
        let missing_pending = self.contains_missing;
        Cursor {
            set: self,
            own,
            missing_pending,
            at_missing: false,
        }
    }

    /// Content hash, equal for any set holding the same members.
    pub fn hash_code(&self) -> u64 {
        set_hash_code(self.iter())
    }

    fn remove_at(&mut self, index: usize) {
        self.members.0[index] = T::DEFAULT_MISSING;
        self.table_len -= 1;
        close_gap(&mut self.members, index, self.sizing.mask());
    }

    fn rehash(&mut self, sizing: Sizing, reason: &'static str) {
        let mask = sizing.mask();
        let mut fresh = Members::vacant(sizing.capacity());
        for &v in self.members.0.iter() {
            if v != T::DEFAULT_MISSING {
                let i = first_vacant(&fresh, home_index(v, mask), mask);
                fresh.0[i] = v;
            }
        }
        trace_rehash(reason, self.sizing.capacity(), sizing.capacity(), self.table_len);
        self.members = fresh;
        self.sizing = sizing;
    }
}

#[derive(Clone)]
pub struct Iter<'a, T> {
    slots: core::slice::Iter<'a, T>,
    remaining: usize,
    missing_pending: bool,
}

impl<T: Primitive> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining > 0 {
            if let Some(&v) = self.slots.by_ref().find(|&&v| v != T::DEFAULT_MISSING) {
                self.remaining -= 1;
                return Some(v);
            }
        }
        if self.missing_pending {
            self.missing_pending = false;
            return Some(T::DEFAULT_MISSING);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining + usize::from(self.missing_pending);
        (n, Some(n))
    }
}

impl<T: Primitive> ExactSizeIterator for Iter<'_, T> {}
impl<T: Primitive> FusedIterator for Iter<'_, T> {}

impl<'a, T: Primitive> IntoIterator for &'a PrimitiveHashSet<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Removal-capable iterator returned by [`PrimitiveHashSet::cursor`].
pub struct Cursor<'a, T: Primitive> {
    set: &'a mut PrimitiveHashSet<T>,
    own: Option<CursorState>,
    missing_pending: bool,
    at_missing: bool,
}

impl<T: Primitive> Cursor<'_, T> {
    /// Removes the member last returned by `next`.
    pub fn remove(&mut self) -> Option<T> {
        if self.at_missing {
            self.at_missing = false;
            self.set.contains_missing = false;
            return Some(T::DEFAULT_MISSING);
        }
        let index = iter::select(&mut self.own, &mut self.set.cursor).take_current()?;
        let value = self.set.members.0[index];
        self.set.remove_at(index);
        Some(value)
    }
}

impl<T: Primitive> Iterator for Cursor<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mask = self.set.sizing.mask();
        let state = iter::select(&mut self.own, &mut self.set.cursor);
        if let Some(i) = state.advance(&self.set.members, mask) {
            return Some(self.set.members.0[i]);
        }
        self.at_missing = false;
        if self.missing_pending {
            self.missing_pending = false;
            self.at_missing = true;
            return Some(T::DEFAULT_MISSING);
        }
        None
    }
}

impl<T: Primitive> PartialEq for PrimitiveHashSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<T: Primitive> Eq for PrimitiveHashSet<T> {}

impl<T: Primitive, S: BuildHasher> PartialEq<HashSet<T, S>> for PrimitiveHashSet<T> {
    fn eq(&self, other: &HashSet<T, S>) -> bool {
        self.len() == other.len() && other.iter().all(|&v| self.contains(v))
    }
}

impl<T: Primitive> Hash for PrimitiveHashSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<T: Primitive> Extend<T> for PrimitiveHashSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl<T: Primitive> FromIterator<T> for PrimitiveHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Primitive> fmt::Display for PrimitiveHashSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_set(f, self.iter())
    }
}

impl<T: Primitive> fmt::Debug for PrimitiveHashSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Invariant: the reserved missing value is a member like any other and
    /// distinct from absence.
    #[test]
    fn missing_value_is_a_member() {
        let mut s = IntHashSet::new();
        assert!(!s.contains(-1));
        assert!(s.insert(-1));
        assert!(!s.insert(-1));
        assert!(s.contains(-1));
        assert_eq!(s.len(), 1);
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![-1]);
        assert_eq!(s.to_string(), "{-1}");
        assert!(s.remove(-1));
        assert!(!s.remove(-1));
        assert!(s.is_empty());
    }

    #[test]
    fn insert_remove_and_growth() {
        let mut s = LongHashSet::with_capacity(8, 0.5).unwrap();
        for v in 0..100i64 {
            assert!(s.insert(v * 7));
        }
        assert_eq!(s.len(), 100);
        assert!(s.capacity() >= 256);
        for v in 0..100i64 {
            assert!(s.contains(v * 7));
            assert!(!s.contains(v * 7 + 1));
        }
        for v in 0..95i64 {
            assert!(s.remove(v * 7));
        }
        s.compact();
        assert_eq!(s.capacity(), 16);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn bulk_operations() {
        let a: IntHashSet = (-3..10).collect();
        let b: IntHashSet = (5..20).collect();
        let d = a.difference(&b);
        assert_eq!(d, (-3..5).collect::<IntHashSet>());
        assert!(a.contains_all(&d));
        assert!(!d.contains_all(&a));

        let mut c = a.clone();
        assert!(c.remove_all(&b));
        assert_eq!(c, d);
        assert!(!c.remove_all(&b));

        c.retain(|v| v >= 0);
        assert_eq!(c, (0..5).collect::<IntHashSet>());
    }

    #[test]
    fn cursor_removes_including_missing_value() {
        let mut s: IntHashSet = (-1..50).collect();
        let mut cursor = s.cursor();
        let mut seen = 0;
        while let Some(v) = cursor.next() {
            seen += 1;
            if v < 10 {
                assert_eq!(cursor.remove(), Some(v));
            }
        }
        assert_eq!(seen, 51);
        assert_eq!(s, (10..50).collect::<IntHashSet>());
        assert!(!s.contains(-1));
    }

    #[test]
    fn equality_and_hash_match_std() {
        let s: LongHashSet = [-1i64, 0, 1, 1 << 40].into_iter().collect();
        let reference: HashSet<i64> = [-1i64, 0, 1, 1 << 40].into_iter().collect();
        assert!(s == reference);
        assert_eq!(s.hash_code(), set_hash_code(reference.iter()));
    }

    proptest! {
        /// Invariant: the set agrees with a std HashSet, including on the
        /// missing value, after every insert and remove.
        #[test]
        fn prop_matches_std_model(ops in proptest::collection::vec((any::<bool>(), -4i32..40), 1..300)) {
            let mut s = IntHashSet::with_capacity(8, 0.7).unwrap();
            let mut model: HashSet<i32> = HashSet::new();
            for (insert, v) in ops {
                if insert {
                    prop_assert_eq!(s.insert(v), model.insert(v));
                } else {
                    prop_assert_eq!(s.remove(v), model.remove(&v));
                }
                prop_assert_eq!(s.len(), model.len());
                prop_assert!(s == model);
                prop_assert_eq!(s.hash_code(), set_hash_code(model.iter()));
            }
        }
    }
}
