//! Boxed-interface adapter layer and string rendering.
//!
//! `MapView` and `SetView` give generic code one surface over these
//! containers and over `std` / `hashbrown` collections. Primitive maps
//! translate their missing value to `None` on the way out and reject it
//! with `Err(MissingValue)` on the way in; object maps report a null value
//! as `None`.

use crate::error::Result;
use crate::hashing::Primitive;
use crate::object_map::ObjectHashMap;
use crate::object_set::ObjectHashSet;
use crate::primitive_map::PrimitiveMap;
use crate::primitive_object_map::PrimitiveObjectMap;
use crate::primitive_set::PrimitiveHashSet;
use crate::sentinel::NonNullValues;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::{HashMap, HashSet};

/// Writes entries as `{k=v, k=v}`.
pub(crate) fn fmt_map<K, V, I>(f: &mut fmt::Formatter<'_>, entries: I) -> fmt::Result
where
    K: fmt::Display,
    V: fmt::Display,
    I: IntoIterator<Item = (K, V)>,
{
    f.write_str("{")?;
    for (n, (k, v)) in entries.into_iter().enumerate() {
        if n > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{k}={v}")?;
    }
    f.write_str("}")
}

/// Writes elements as `{e, e}`.
pub(crate) fn fmt_set<T, I>(f: &mut fmt::Formatter<'_>, elements: I) -> fmt::Result
where
    T: fmt::Display,
    I: IntoIterator<Item = T>,
{
    f.write_str("{")?;
    for (n, e) in elements.into_iter().enumerate() {
        if n > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{e}")?;
    }
    f.write_str("}")
}

/// Renders a nullable value, `null` when absent.
pub(crate) struct OrNull<'a, V>(pub(crate) Option<&'a V>);

impl<V: fmt::Display> fmt::Display for OrNull<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => v.fmt(f),
            None => f.write_str("null"),
        }
    }
}

/// Map operations shared by every map in this crate and by standard maps.
pub trait MapView<K, V> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_key(&self, key: &K) -> bool;

    fn get_ref(&self, key: &K) -> Option<&V>;

    /// Inserts and returns the previous value. Fails only for values the
    /// map cannot represent.
    fn insert_value(&mut self, key: K, value: V) -> Result<Option<V>>;

    fn remove_key(&mut self, key: &K) -> Option<V>;

    fn clear(&mut self);

    fn visit(&self, f: &mut dyn FnMut(&K, &V));
}

/// Set operations shared by every set in this crate and by standard sets.
pub trait SetView<T> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, value: &T) -> bool;

    /// Inserts `value`; false if it was already present.
    fn insert_value(&mut self, value: T) -> bool;

    fn remove_value(&mut self, value: &T) -> bool;

    fn visit(&self, f: &mut dyn FnMut(&T));
}

impl<K: Primitive, V: Primitive> MapView<K, V> for PrimitiveMap<K, V> {
    fn len(&self) -> usize {
        PrimitiveMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        PrimitiveMap::contains_key(self, *key)
    }

    fn get_ref(&self, key: &K) -> Option<&V> {
        self.find(*key).map(|i| self.value_at(i))
    }

    fn insert_value(&mut self, key: K, value: V) -> Result<Option<V>> {
        let missing = self.missing_value();
        let old = self.put(key, value)?;
        Ok((old != missing).then_some(old))
    }

    fn remove_key(&mut self, key: &K) -> Option<V> {
        let i = self.find(*key)?;
        let value = *self.value_at(i);
        self.remove_at(i);
        Some(value)
    }

    fn clear(&mut self) {
        PrimitiveMap::clear(self);
    }

    fn visit(&self, f: &mut dyn FnMut(&K, &V)) {
        for (k, v) in self.iter() {
            f(&k, &v);
        }
    }
}

impl<K: Primitive, V> MapView<K, V> for PrimitiveObjectMap<K, V, NonNullValues> {
    fn len(&self) -> usize {
        PrimitiveObjectMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        PrimitiveObjectMap::contains_key(self, *key)
    }

    fn get_ref(&self, key: &K) -> Option<&V> {
        self.get(*key)
    }

    fn insert_value(&mut self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.put(key, value))
    }

    fn remove_key(&mut self, key: &K) -> Option<V> {
        self.remove(*key)
    }

    fn clear(&mut self) {
        PrimitiveObjectMap::clear(self);
    }

    fn visit(&self, f: &mut dyn FnMut(&K, &V)) {
        for (k, v) in self.iter() {
            if let Some(v) = v {
                f(&k, v);
            }
        }
    }
}

impl<K, V, S> MapView<K, V> for ObjectHashMap<K, V, NonNullValues, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        ObjectHashMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        ObjectHashMap::contains_key(self, key)
    }

    fn get_ref(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn insert_value(&mut self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.put(key, value))
    }

    fn remove_key(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }

    fn clear(&mut self) {
        ObjectHashMap::clear(self);
    }

    fn visit(&self, f: &mut dyn FnMut(&K, &V)) {
        for (k, v) in self.iter() {
            if let Some(v) = v {
                f(k, v);
            }
        }
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> MapView<K, V> for HashMap<K, V, S> {
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    fn get_ref(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn insert_value(&mut self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.insert(key, value))
    }

    fn remove_key(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn visit(&self, f: &mut dyn FnMut(&K, &V)) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> MapView<K, V> for hashbrown::HashMap<K, V, S> {
    fn len(&self) -> usize {
        hashbrown::HashMap::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        hashbrown::HashMap::contains_key(self, key)
    }

    fn get_ref(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn insert_value(&mut self, key: K, value: V) -> Result<Option<V>> {
        Ok(self.insert(key, value))
    }

    fn remove_key(&mut self, key: &K) -> Option<V> {
        self.remove(key)
    }

    fn clear(&mut self) {
        hashbrown::HashMap::clear(self);
    }

    fn visit(&self, f: &mut dyn FnMut(&K, &V)) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }
}

impl<T: Primitive> SetView<T> for PrimitiveHashSet<T> {
    fn len(&self) -> usize {
        PrimitiveHashSet::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        PrimitiveHashSet::contains(self, *value)
    }

    fn insert_value(&mut self, value: T) -> bool {
        self.insert(value)
    }

    fn remove_value(&mut self, value: &T) -> bool {
        self.remove(*value)
    }

    fn visit(&self, f: &mut dyn FnMut(&T)) {
        for v in self.iter() {
            f(&v);
        }
    }
}

impl<T: Eq + Hash, S: BuildHasher> SetView<T> for ObjectHashSet<T, S> {
    fn len(&self) -> usize {
        ObjectHashSet::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        ObjectHashSet::contains(self, value)
    }

    fn insert_value(&mut self, value: T) -> bool {
        self.insert(value)
    }

    fn remove_value(&mut self, value: &T) -> bool {
        self.remove(value)
    }

    fn visit(&self, f: &mut dyn FnMut(&T)) {
        for v in self.iter() {
            f(v);
        }
    }
}

impl<T: Eq + Hash, S: BuildHasher> SetView<T> for HashSet<T, S> {
    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        HashSet::contains(self, value)
    }

    fn insert_value(&mut self, value: T) -> bool {
        self.insert(value)
    }

    fn remove_value(&mut self, value: &T) -> bool {
        self.remove(value)
    }

    fn visit(&self, f: &mut dyn FnMut(&T)) {
        for v in self.iter() {
            f(v);
        }
    }
}

impl<T: Eq + Hash, S: BuildHasher> SetView<T> for hashbrown::HashSet<T, S> {
    fn len(&self) -> usize {
        hashbrown::HashSet::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        hashbrown::HashSet::contains(self, value)
    }

    fn insert_value(&mut self, value: T) -> bool {
        self.insert(value)
    }

    fn remove_value(&mut self, value: &T) -> bool {
        self.remove(value)
    }

    fn visit(&self, f: &mut dyn FnMut(&T)) {
        for v in self.iter() {
            f(v);
        }
    }
}
