//! Primitive key/value representations, hash spreading and content hashes.
//!
//! Probe indices come from `spread`, a golden-ratio multiply followed by
//! an xor fold, masked to the table size. The multiply scatters
//! sequential keys and the fold pulls high bits into the low bits that
//! the mask keeps.
//!
//! Content hashes (`map_hash_code`, `set_hash_code`) are independent of
//! capacity, load factor, sentinel and iteration order, and are computed
//! with a fixed hasher so that any collection with the same contents,
//! including `std` and `hashbrown` ones, produces the same code.

use core::fmt::{Debug, Display};
use core::hash::{BuildHasher, Hash};
use rustc_hash::FxBuildHasher;

const GOLDEN_32: u32 = 0x9E37_79B9;
const GOLDEN_64: u64 = 0x9E37_79B9_7F4A_7C15;

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// A primitive usable as an unboxed key or value.
pub trait Primitive:
    Copy + Eq + Ord + Hash + Debug + Display + Default + sealed::Sealed + 'static
{
    /// Missing value used where a container needs one and none is given.
    const DEFAULT_MISSING: Self;
    const ZERO: Self;
    const ONE: Self;
    const MIN: Self;
    const MAX: Self;

    /// Mixed hash bits; the low bits are used for the probe index.
    fn spread(self) -> u64;

    fn wrapping_add(self, rhs: Self) -> Self;

    fn wrapping_sub(self, rhs: Self) -> Self;
}

impl Primitive for i32 {
    const DEFAULT_MISSING: Self = -1;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MIN: Self = i32::MIN;
    const MAX: Self = i32::MAX;

    #[inline]
    fn spread(self) -> u64 {
        let x = (self as u32).wrapping_mul(GOLDEN_32);
        (x ^ (x >> 16)) as u64
    }

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        i32::wrapping_add(self, rhs)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        i32::wrapping_sub(self, rhs)
    }
}

impl Primitive for i64 {
    const DEFAULT_MISSING: Self = -1;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MIN: Self = i64::MIN;
    const MAX: Self = i64::MAX;

    #[inline]
    fn spread(self) -> u64 {
        mix64(self as u64)
    }

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        i64::wrapping_add(self, rhs)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        i64::wrapping_sub(self, rhs)
    }
}

/// Spreads a 64-bit hash so that the low bits depend on every input bit.
#[inline]
pub fn mix64(hash: u64) -> u64 {
    let mut x = hash.wrapping_mul(GOLDEN_64);
    x ^= x >> 32;
    x ^= x >> 16;
    x
}

/// Natural slot of a primitive key in a table with the given mask.
#[inline]
pub fn home_index<K: Primitive>(key: K, mask: usize) -> usize {
    (key.spread() as usize) & mask
}

/// Spread hash of an object key under `hasher`. Its low bits, masked,
/// give the key's natural slot.
#[inline]
pub(crate) fn object_hash<S, Q>(hasher: &S, key: &Q) -> u64
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    mix64(hasher.hash_one(key))
}

/// Fixed hash of a single value, the building block of content hashes.
#[inline]
pub fn hash_of<T: ?Sized + Hash>(value: &T) -> u64 {
    FxBuildHasher.hash_one(value)
}

/// Order-independent hash of a map's entries: the wrapping sum of
/// `hash_of(k) ^ hash_of(v)`.
pub fn map_hash_code<K, V, I>(entries: I) -> u64
where
    K: Hash,
    V: Hash,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .fold(0u64, |acc, (k, v)| acc.wrapping_add(hash_of(&k) ^ hash_of(&v)))
}

/// Order-independent hash of a set's elements: the wrapping sum of
/// `hash_of(e)`.
pub fn set_hash_code<T, I>(elements: I) -> u64
where
    T: Hash,
    I: IntoIterator<Item = T>,
{
    elements
        .into_iter()
        .fold(0u64, |acc, e| acc.wrapping_add(hash_of(&e)))
}
