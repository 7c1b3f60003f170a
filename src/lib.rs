//! probe-collections: open-addressing maps, sets and bounded caches
//! specialized for `i32`/`i64` keys and values, plus generic object
//! variants built on the same probing engine.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep primitive keys and values unboxed in flat slot arrays, with
//!   no per-entry allocation and no tombstones, so lookups are a masked
//!   index plus a short linear scan.
//! - Layers:
//!   - `engine`: power-of-two sizing, load-factor thresholds, linear
//!     probing and backward-shift deletion over any slot storage that
//!     implements `ProbeSlots`.
//!   - `iter`: the backward-scanning cursor state shared by every
//!     container, which tolerates removal of the current entry.
//!   - Containers: `PrimitiveMap`, `PrimitiveObjectMap`, `ObjectHashMap`,
//!     `PrimitiveHashSet` and `ObjectHashSet` own their slots and drive the
//!     engine.
//!   - Composites: `BiInt2ObjectMap` packs two `i32` keys into one `i64`,
//!     `CounterMap` treats its missing value as the initial count,
//!     `LruCache` pairs a `SlotMap` list with a primitive index.
//!   - `SetAssociativeCache` is a fixed-size table outside the engine;
//!     it never grows and evicts the oldest entry of a full set.
//!   - `view`: `MapView` / `SetView` adapters shared with `std` and
//!     `hashbrown` collections, and the `{k=v}` rendering.
//!
//! Constraints
//! - Single-threaded: no container synchronizes; wrap one in a lock to
//!   share it.
//! - Primitive-valued maps reserve one value as "missing". Storing it is
//!   rejected with `CollectionError::MissingValue`.
//! - Primitive sets reserve `-1` as the vacant marker and track membership
//!   of `-1` itself out of band.
//! - Object maps take a `NullPolicy`: `NonNullValues` rejects null stores,
//!   `NullableValues` keeps them as live entries that read back as `None`.
//! - Capacity is always a power of two in `[MIN_CAPACITY, MAX_CAPACITY]`;
//!   a table grows when its length exceeds `capacity * load_factor`.
//!
//! Equality and hashing
//! - Equality is logical: two containers with the same entries are equal
//!   whatever their capacity, load factor or slot layout.
//! - `hash_code` is the wrapping sum of per-entry hashes, so it matches the
//!   value computed over a `std` or `hashbrown` collection holding the same
//!   entries.
//!
//! Iteration
//! - Every container offers a borrowing `iter()` and a `cursor()` that can
//!   remove the current entry. With `IterationMode::Cached` the cursor
//!   state lives in the container and is reset by each new cursor; with
//!   `IterationMode::Fresh` every cursor owns its state.

pub mod bi_key_map;
pub mod cache;
pub mod config;
pub mod counter_map;
mod engine;
pub mod error;
pub mod hashing;
mod iter;
pub mod lru;
pub mod object_map;
pub mod object_set;
pub mod primitive_map;
pub mod primitive_object_map;
pub mod primitive_set;
mod sentinel;
pub mod view;

// Public surface
pub use bi_key_map::{compose_key, split_key, BiInt2ObjectMap};
pub use cache::{Int2ObjectCache, Long2ObjectCache, SetAssociativeCache};
pub use config::{IterationMode, TableConfig};
pub use counter_map::{CounterMap, Int2IntCounterMap, Long2LongCounterMap};
pub use engine::{DEFAULT_LOAD_FACTOR, MAX_CAPACITY, MIN_CAPACITY};
pub use error::{CollectionError, Result};
pub use hashing::{map_hash_code, set_hash_code, Primitive};
pub use lru::{IntLruCache, LruCache};
pub use object_map::{Object2NullableObjectHashMap, Object2ObjectHashMap, ObjectHashMap};
pub use object_set::ObjectHashSet;
pub use primitive_map::{
    Int2IntHashMap, Int2LongHashMap, Long2IntHashMap, Long2LongHashMap, PrimitiveMap,
};
pub use primitive_object_map::{
    Int2NullableObjectHashMap, Int2ObjectHashMap, Long2NullableObjectHashMap, Long2ObjectHashMap,
    PrimitiveObjectMap,
};
pub use primitive_set::{IntHashSet, LongHashSet, PrimitiveHashSet};
pub use sentinel::{NonNullValues, NullPolicy, NullableValues};
pub use view::{MapView, SetView};
