//! LruCache: a small cache of resources keyed by primitive ids.
//!
//! Values are built on demand by a factory and released by a closer.
//! Nodes live in a `SlotMap` and form a doubly linked list ordered most
//! recently used first; a primitive-keyed map indexes them by key. When
//! the cache is full, a lookup of a new key closes the least recently used
//! value before building the new one.

use crate::error::{CollectionError, Result};
use crate::hashing::Primitive;
use crate::primitive_object_map::PrimitiveObjectMap;
use slotmap::{DefaultKey, SlotMap};

struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

pub type IntLruCache<V, F, C> = LruCache<i32, V, F, C>;

pub struct LruCache<K, V, F, C>
where
    K: Primitive,
    F: FnMut(K) -> V,
    C: FnMut(V),
{
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    index: PrimitiveObjectMap<K, DefaultKey>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    capacity: usize,
    factory: F,
    closer: C,
}

impl<K, V, F, C> LruCache<K, V, F, C>
where
    K: Primitive,
    F: FnMut(K) -> V,
    C: FnMut(V),
{
    pub fn new(capacity: usize, factory: F, closer: C) -> Result<Self> {
        if capacity == 0 {
            return Err(CollectionError::ZeroCapacity);
        }
        Ok(Self {
            nodes: SlotMap::with_capacity(capacity),
            index: PrimitiveObjectMap::new(),
            head: None,
            tail: None,
            capacity,
            factory,
            closer,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.index.contains_key(key)
    }

    /// Value for `key`, built by the factory on a miss. The key becomes the
    /// most recently used.
    pub fn lookup(&mut self, key: K) -> &V {
        let node = match self.index.get(key).copied() {
            Some(node) => {
                self.unlink(node);
                node
            }
            None => {
                if self.nodes.len() == self.capacity {
                    self.evict_lru();
                }
                let value = (self.factory)(key);
                let node = self.nodes.insert(Node {
                    key,
                    value,
                    prev: None,
                    next: None,
                });
                self.index.put(key, node);
                node
            }
        };
        self.push_front(node);
        &self.nodes[node].value
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let node = self.nodes.get(cursor?)?;
            cursor = node.next;
            Some(node.key)
        })
    }

    /// Closes every held value, leaving the cache empty.
    pub fn close(&mut self) {
        self.index.clear();
        self.head = None;
        self.tail = None;
        for (_, node) in self.nodes.drain() {
            (self.closer)(node.value);
        }
    }

    fn evict_lru(&mut self) {
        let Some(lru) = self.tail else { return };
        self.unlink(lru);
        if let Some(node) = self.nodes.remove(lru) {
            self.index.remove(node.key);
            tracing::trace!(key = %node.key, "lru entry closed");
            (self.closer)(node.value);
        }
    }

    fn unlink(&mut self, node: DefaultKey) {
        let Some(n) = self.nodes.get_mut(node) else { return };
        let (prev, next) = (n.prev.take(), n.next.take());
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, node: DefaultKey) {
        let old_head = self.head;
        if let Some(n) = self.nodes.get_mut(node) {
            n.prev = None;
            n.next = old_head;
        }
        match old_head.and_then(|h| self.nodes.get_mut(h)) {
            Some(h) => h.prev = Some(node),
            None => self.tail = Some(node),
        }
        self.head = Some(node);
    }
}

impl<K, V, F, C> Drop for LruCache<K, V, F, C>
where
    K: Primitive,
    F: FnMut(K) -> V,
    C: FnMut(V),
{
    fn drop(&mut self) {
        self.close();
    }
}
