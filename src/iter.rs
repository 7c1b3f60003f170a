//! Reusable cursor state for iteration with in-place removal.
//!
//! A cursor scans slots downward starting just below a slot that was
//! vacant when the cursor was reset, wrapping once around the table.
//! Removing the current entry shifts later members of its run back into
//! the gap; because the scan runs downward and no run crosses the vacant
//! start slot, every shifted entry has already been visited, so removal
//! during a scan neither skips nor repeats entries.

use crate::config::IterationMode;
use crate::engine::ProbeSlots;

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct CursorState {
    position: usize,
    stop: usize,
    remaining: usize,
    current: Option<usize>,
}

impl CursorState {
    pub(crate) fn reset<S>(&mut self, slots: &S, capacity: usize, len: usize)
    where
        S: ProbeSlots + ?Sized,
    {
        let mut start = capacity;
        if !slots.is_vacant(capacity - 1) {
            start = (0..capacity)
                .find(|&i| slots.is_vacant(i))
                .unwrap_or(capacity);
        }
        self.stop = start;
        self.position = start + capacity;
        self.remaining = len;
        self.current = None;
    }

    /// Index of the next occupied slot, or `None` once `len` entries have
    /// been produced.
    pub(crate) fn advance<S>(&mut self, slots: &S, mask: usize) -> Option<usize>
    where
        S: ProbeSlots + ?Sized,
    {
        if self.remaining == 0 {
            self.current = None;
            return None;
        }
        let mut i = self.position;
        while i > self.stop {
            i -= 1;
            let index = i & mask;
            if !slots.is_vacant(index) {
                self.position = i;
                self.remaining -= 1;
                self.current = Some(index);
                return Some(index);
            }
        }
        self.position = self.stop;
        self.current = None;
        None
    }

    /// Slot of the entry last produced, at most once per `advance`.
    pub(crate) fn take_current(&mut self) -> Option<usize> {
        self.current.take()
    }

    pub(crate) fn current(&self) -> Option<usize> {
        self.current
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining
    }
}

/// Starts a cursor: resets the embedded state when cached, otherwise
/// returns a fresh state for the cursor to own.
pub(crate) fn begin<S>(
    mode: IterationMode,
    embedded: &mut CursorState,
    slots: &S,
    capacity: usize,
    len: usize,
) -> Option<CursorState>
where
    S: ProbeSlots + ?Sized,
{
    match mode {
        IterationMode::Cached => {
            embedded.reset(slots, capacity, len);
            None
        }
        IterationMode::Fresh => {
            let mut own = CursorState::default();
            own.reset(slots, capacity, len);
            Some(own)
        }
    }
}

/// The state a cursor drives: its own if it has one, else the embedded one.
#[inline]
pub(crate) fn select<'a>(
    own: &'a mut Option<CursorState>,
    embedded: &'a mut CursorState,
) -> &'a mut CursorState {
    match own {
        Some(state) => state,
        None => embedded,
    }
}
