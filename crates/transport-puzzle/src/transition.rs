//! Outgoing-transition generation for carrier puzzles.
//!
//! The carrier flips shore on every transition. Every other object is
//! classified per candidate as not moving, moving with the carrier, or
//! moving against it. Candidates are walked with the same ripple counter
//! as [`crate::subsets`], restricted to the passengers, so each step
//! changes exactly one passenger and the trip tallies update in O(1).

use std::collections::BTreeSet;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::key::{StateKey, Universe};
use crate::subsets::{Flags, RippleCounter, INLINE_OBJECTS};

/// Per-passenger classification of a candidate transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripState {
    /// The object stays where it is
    NotMade,
    /// The object travels with the carrier
    Made,
    /// The object would travel without the carrier
    Impossible,
}

impl TripState {
    /// Classify one passenger.
    ///
    /// `on_destination` is its shore in the source state, `to_destination`
    /// its shore in the candidate, `carrier_to_destination` the carrier's
    /// direction of travel.
    pub fn classify(on_destination: bool, to_destination: bool, carrier_to_destination: bool) -> Self {
        if on_destination == to_destination {
            TripState::NotMade
        } else if to_destination == carrier_to_destination {
            TripState::Made
        } else {
            TripState::Impossible
        }
    }
}

/// Running tally of trip states over all passengers
#[derive(Debug, Clone)]
pub struct TripCounter {
    made: usize,
    not_made: usize,
    impossible: usize,
    states: SmallVec<[TripState; INLINE_OBJECTS]>,
}

impl TripCounter {
    /// Every passenger starts as [`TripState::NotMade`]
    pub fn new(passengers: usize) -> Self {
        Self {
            made: 0,
            not_made: passengers,
            impossible: 0,
            states: SmallVec::from_elem(TripState::NotMade, passengers),
        }
    }

    /// Replace one passenger's state, adjusting the tallies
    pub fn set(&mut self, slot: usize, state: TripState) {
        let previous = std::mem::replace(&mut self.states[slot], state);
        *self.tally_mut(previous) -= 1;
        *self.tally_mut(state) += 1;
    }

    fn tally_mut(&mut self, state: TripState) -> &mut usize {
        match state {
            TripState::Made => &mut self.made,
            TripState::NotMade => &mut self.not_made,
            TripState::Impossible => &mut self.impossible,
        }
    }

    pub fn made(&self) -> usize {
        self.made
    }

    pub fn not_made(&self) -> usize {
        self.not_made
    }

    pub fn impossible(&self) -> usize {
        self.impossible
    }

    /// Number of passengers tracked
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Lazy sequence of legal neighbor keys of one state.
///
/// Yields each candidate whose passengers all move with the carrier and
/// whose passenger count is a legal arity. Building a new instance is the
/// only way to restart.
#[derive(Debug, Clone)]
pub struct OutgoingKeys<'a> {
    universe: &'a Universe,
    arities: &'a BTreeSet<usize>,
    /// Universe index of each passenger
    passengers: SmallVec<[usize; INLINE_OBJECTS]>,
    source: Flags,
    candidate: Flags,
    carrier_to_destination: bool,
    counter: TripCounter,
    ripple: RippleCounter,
}

impl<'a> OutgoingKeys<'a> {
    pub fn new(
        universe: &'a Universe,
        carrier: &str,
        arities: &'a BTreeSet<usize>,
        source: &StateKey,
    ) -> Self {
        let carrier_idx = universe.index_of(carrier);
        let source: Flags = universe.names().iter().map(|name| source.contains(name)).collect();
        let passengers: SmallVec<[usize; INLINE_OBJECTS]> = (0..universe.len())
            .filter(|&idx| Some(idx) != carrier_idx)
            .collect();

        let carrier_to_destination = carrier_idx.map_or(true, |idx| !source[idx]);
        let mut candidate: Flags = SmallVec::from_elem(false, universe.len());
        if let Some(idx) = carrier_idx {
            candidate[idx] = carrier_to_destination;
        }

        let mut counter = TripCounter::new(passengers.len());
        for (slot, &idx) in passengers.iter().enumerate() {
            counter.set(
                slot,
                TripState::classify(source[idx], false, carrier_to_destination),
            );
        }

        Self {
            universe,
            arities,
            ripple: RippleCounter::new(passengers.len()),
            passengers,
            source,
            candidate,
            carrier_to_destination,
            counter,
        }
    }

    /// Trip tallies for the candidate about to be examined
    pub fn counter(&self) -> &TripCounter {
        &self.counter
    }

    fn accepts_current(&self) -> bool {
        self.counter.impossible() == 0 && self.arities.contains(&self.counter.made())
    }

    /// Move to the next candidate by toggling a single passenger
    fn step(&mut self) {
        if let Some(slot) = self.ripple.advance() {
            let idx = self.passengers[slot];
            self.candidate[idx] = !self.candidate[idx];
            self.counter.set(
                slot,
                TripState::classify(self.source[idx], self.candidate[idx], self.carrier_to_destination),
            );
        }
    }
}

impl Iterator for OutgoingKeys<'_> {
    type Item = StateKey;

    fn next(&mut self) -> Option<StateKey> {
        while !self.ripple.overflowed() {
            let accepted = self
                .accepts_current()
                .then(|| StateKey::from_mask(self.universe, &self.candidate));
            self.step();
            if accepted.is_some() {
                return accepted;
            }
        }
        None
    }
}

impl FusedIterator for OutgoingKeys<'_> {}
