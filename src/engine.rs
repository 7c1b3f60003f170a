//! Probing table engine shared by every growing container.
//!
//! Layout and invariants
//! - Slots live in flat arrays whose length (the capacity) is a power of
//!   two, at least `MIN_CAPACITY`. Indices are masked, never reduced by
//!   modulo.
//! - `len <= resize_threshold < capacity` after every operation, so a
//!   probe always reaches a vacant slot and terminates.
//! - Collisions resolve by linear probing with wraparound.
//! - Deletion never writes tombstones. After a slot is vacated,
//!   `close_gap` walks the rest of the probe run and moves back every
//!   entry that stays reachable from its home slot when moved into the
//!   gap. An entry is never moved in front of its home slot.
//!
//! Containers own their storage and implement `ProbeSlots` on it; the
//! engine functions here only see slot indices. This keeps the one
//! subtle piece, `can_fill_gap`, in a single place.

use crate::config::TableConfig;
use crate::error::{CollectionError, Result};

/// Smallest table a growing container allocates.
pub const MIN_CAPACITY: usize = 8;

/// Load factor used when none is configured.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.65;

/// Largest power-of-two capacity a table may reach.
pub const MAX_CAPACITY: usize = 1 << (usize::BITS - 2);

/// Validates a load factor against the open interval (0, 1).
pub fn validate_load_factor(load_factor: f32) -> Result<()> {
    if load_factor > 0.0 && load_factor < 1.0 {
        Ok(())
    } else {
        Err(CollectionError::InvalidLoadFactor(load_factor))
    }
}

/// Rounds a requested capacity up to a power of two no smaller than
/// `MIN_CAPACITY`.
pub fn capacity_for(requested: usize) -> Result<usize> {
    if requested == 0 {
        return Err(CollectionError::ZeroCapacity);
    }
    if requested > MAX_CAPACITY {
        return Err(CollectionError::CapacityOverflow(requested));
    }
    Ok(requested.max(MIN_CAPACITY).next_power_of_two())
}

#[inline]
fn threshold(capacity: usize, load_factor: f32) -> usize {
    (capacity as f64 * load_factor as f64) as usize
}

/// Capacity, load factor and the derived resize threshold of one table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Sizing {
    capacity: usize,
    load_factor: f32,
    resize_threshold: usize,
}

impl Default for Sizing {
    fn default() -> Self {
        Self::at(MIN_CAPACITY, DEFAULT_LOAD_FACTOR)
    }
}

impl Sizing {
    pub(crate) fn new(requested: usize, load_factor: f32) -> Result<Self> {
        validate_load_factor(load_factor)?;
        let capacity = capacity_for(requested)?;
        Ok(Self::at(capacity, load_factor))
    }

    pub(crate) fn from_config(config: &TableConfig) -> Result<Self> {
        Self::new(config.initial_capacity, config.load_factor)
    }

    fn at(capacity: usize, load_factor: f32) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            capacity,
            load_factor,
            resize_threshold: threshold(capacity, load_factor),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn mask(&self) -> usize {
        self.capacity - 1
    }

    #[inline]
    pub(crate) fn resize_threshold(&self) -> usize {
        self.resize_threshold
    }

    #[inline]
    pub(crate) fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// True once `len` entries no longer fit under the threshold.
    #[inline]
    pub(crate) fn exceeded_by(&self, len: usize) -> bool {
        len > self.resize_threshold
    }

    /// Doubled sizing, repeated until `len` fits under the threshold.
    ///
    /// Panics if the table would outgrow `MAX_CAPACITY`, the same way
    /// `Vec` panics on capacity overflow.
    pub(crate) fn grown_for(&self, len: usize) -> Self {
        let mut capacity = self.capacity;
        loop {
            capacity = match capacity.checked_mul(2) {
                Some(c) if c <= MAX_CAPACITY => c,
                _ => panic!("probe table capacity overflow"),
            };
            if threshold(capacity, self.load_factor) >= len {
                return Self::at(capacity, self.load_factor);
            }
        }
    }

    /// Smallest sizing that holds `len` entries under the threshold.
    pub(crate) fn compacted_for(&self, len: usize) -> Self {
        let ideal = (len as f64 / self.load_factor as f64).round() as usize;
        let mut capacity = ideal.max(MIN_CAPACITY).next_power_of_two();
        while threshold(capacity, self.load_factor) < len {
            capacity *= 2;
        }
        Self::at(capacity, self.load_factor)
    }
}

pub(crate) fn trace_rehash(reason: &'static str, from: usize, to: usize, len: usize) {
    tracing::debug!(reason, from, to, len, "probe table rehashed");
}

/// Slot storage driven by the engine.
pub(crate) trait ProbeSlots {
    fn is_vacant(&self, index: usize) -> bool;

    /// Natural (home) index of the occupant of `index`.
    fn home_of(&self, index: usize, mask: usize) -> usize;

    /// Moves the occupant of `from` into the vacant slot `to`, leaving
    /// `from` vacant.
    fn shift(&mut self, from: usize, to: usize);
}

/// Outcome of a probe for a key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    Found(usize),
    /// Key absent; this is the slot an insertion claims.
    Vacant(usize),
}

/// Linear probe from `home` until `is_match` accepts a slot or a vacant
/// slot ends the run.
#[inline]
pub(crate) fn probe<S, F>(slots: &S, home: usize, mask: usize, mut is_match: F) -> Probe
where
    S: ProbeSlots + ?Sized,
    F: FnMut(usize) -> bool,
{
    let mut index = home;
    loop {
        if slots.is_vacant(index) {
            return Probe::Vacant(index);
        }
        if is_match(index) {
            return Probe::Found(index);
        }
        index = (index + 1) & mask;
    }
}

/// First vacant slot at or after `home`; used when rehashing, where every
/// key is known to be distinct.
#[inline]
pub(crate) fn first_vacant<S>(slots: &S, home: usize, mask: usize) -> usize
where
    S: ProbeSlots + ?Sized,
{
    let mut index = home;
    while !slots.is_vacant(index) {
        index = (index + 1) & mask;
    }
    index
}

/// Backward-shift deletion. `gap` must already be vacant.
///
/// Walks forward from the gap to the end of the run. Each occupant that
/// can legally fill the current gap is shifted into it and its old slot
/// becomes the new gap. Occupants that cannot move are skipped, since a
/// later one in the same run may still belong at or before the gap.
pub(crate) fn close_gap<S>(slots: &mut S, gap: usize, mask: usize)
where
    S: ProbeSlots + ?Sized,
{
    let mut gap = gap;
    let mut index = (gap + 1) & mask;
    while !slots.is_vacant(index) {
        let home = slots.home_of(index, mask);
        if can_fill_gap(home, gap, index) {
            slots.shift(index, gap);
            gap = index;
        }
        index = (index + 1) & mask;
    }
}

/// Held while user code runs against an entry taken out of its slot.
///
/// If the user code unwinds, dropping the guard finishes the removal: the
/// count drops by one and the gap is closed, so the rest of the run stays
/// reachable. `disarm` hands the slot back to the caller once the outcome
/// is known.
pub(crate) struct GapGuard<'a, S: ProbeSlots + ?Sized> {
    slots: &'a mut S,
    len: &'a mut usize,
    gap: usize,
    mask: usize,
    armed: bool,
}

impl<'a, S: ProbeSlots + ?Sized> GapGuard<'a, S> {
    pub(crate) fn new(slots: &'a mut S, len: &'a mut usize, gap: usize, mask: usize) -> Self {
        debug_assert!(slots.is_vacant(gap));
        Self {
            slots,
            len,
            gap,
            mask,
            armed: true,
        }
    }

    #[inline]
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S: ProbeSlots + ?Sized> Drop for GapGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            *self.len -= 1;
            close_gap(self.slots, self.gap, self.mask);
        }
    }
}

/// Whether an entry with home slot `home`, found at `index`, may move back
/// into `gap` without becoming unreachable.
///
/// Walking forward from `home` reaches `index`; the entry may move to
/// `gap` exactly when `gap` lies on that walk, that is in the cyclic
/// interval `[home, index)`.
#[inline]
pub(crate) fn can_fill_gap(home: usize, gap: usize, index: usize) -> bool {
    if home <= index {
        home <= gap && gap < index
    } else {
        home <= gap || gap < index
    }
}
