//! Power-set traversal of the object universe.
//!
//! The enumerator keeps `N + 1` counter flags, the last one being an
//! overflow sentinel. Each step ripples through the flags like a binary
//! increment: set flags are cleared until the first clear flag, which is
//! set. The working set toggles only the object at the position where
//! the ripple stopped, which walks the binary-reflected Gray code: every
//! subset appears exactly once and consecutive subsets differ by one
//! object.

use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::key::{StateKey, Universe};

/// Inline capacity for per-object flag vectors
pub(crate) const INLINE_OBJECTS: usize = 16;

pub(crate) type Flags = SmallVec<[bool; INLINE_OBJECTS]>;

/// Binary counter whose increments report the single position to toggle
#[derive(Debug, Clone)]
pub(crate) struct RippleCounter {
    /// `width` counter flags plus the overflow sentinel
    flags: Flags,
}

impl RippleCounter {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            flags: SmallVec::from_elem(false, width + 1),
        }
    }

    pub(crate) fn overflowed(&self) -> bool {
        self.flags.last().copied().unwrap_or(true)
    }

    /// Advance by one; returns the position that flipped on, or `None`
    /// once the overflow sentinel is reached.
    pub(crate) fn advance(&mut self) -> Option<usize> {
        let width = self.flags.len() - 1;
        for idx in 0..self.flags.len() {
            if self.flags[idx] {
                self.flags[idx] = false;
            } else {
                self.flags[idx] = true;
                return (idx < width).then_some(idx);
            }
        }
        None
    }
}

/// Lazy sequence of every destination-shore assignment over a universe
#[derive(Debug, Clone)]
pub struct Subsets<'u> {
    universe: &'u Universe,
    counter: RippleCounter,
    current: Flags,
}

impl<'u> Subsets<'u> {
    /// Start a fresh enumeration at the empty set
    pub fn new(universe: &'u Universe) -> Self {
        Self {
            universe,
            counter: RippleCounter::new(universe.len()),
            current: SmallVec::from_elem(false, universe.len()),
        }
    }
}

impl Iterator for Subsets<'_> {
    type Item = StateKey;

    fn next(&mut self) -> Option<StateKey> {
        if self.counter.overflowed() {
            return None;
        }

        let key = StateKey::from_mask(self.universe, &self.current);
        if let Some(idx) = self.counter.advance() {
            self.current[idx] = !self.current[idx];
        }
        Some(key)
    }
}

impl FusedIterator for Subsets<'_> {}
