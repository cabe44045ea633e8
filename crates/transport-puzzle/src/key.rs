//! State and edge identifiers.
//!
//! A [`StateKey`] names the set of objects currently on the destination
//! shore. Its canonical form lists the members in universe order joined
//! by `/`, so two keys built from the same set always compare equal.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::error::{GraphError, Result};

/// Separator between names in canonical keys
pub const KEY_SEPARATOR: &str = "/";

/// The fixed, sorted set of objects a puzzle moves around
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    names: Vec<String>,
}

impl Universe {
    /// Build a universe, rejecting duplicate names
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        for pair in names.windows(2) {
            if pair[0] == pair[1] {
                return Err(GraphError::DuplicateObject(pair[0].clone()));
            }
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of an object in the universe ordering
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|probe| probe.as_str().cmp(name)).ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Return `Ok(())` if `name` is an object of this universe
    pub fn require(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(GraphError::UnknownObject(name.to_string()))
        }
    }
}

/// Canonical identifier for "which objects are on the destination shore"
#[derive(Debug, Clone)]
pub struct StateKey {
    members: Vec<String>,
    canonical: String,
}

impl StateKey {
    /// Build a key from any collection of object names.
    ///
    /// Names outside the universe are rejected; repeated names collapse
    /// into one member.
    pub fn new<I, S>(universe: &Universe, members: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mask = vec![false; universe.len()];
        for name in members {
            let name = name.as_ref();
            let idx = universe
                .index_of(name)
                .ok_or_else(|| GraphError::UnknownObject(name.to_string()))?;
            mask[idx] = true;
        }
        Ok(Self::from_mask(universe, &mask))
    }

    /// Build a key from a membership flag per universe object
    pub(crate) fn from_mask(universe: &Universe, mask: &[bool]) -> Self {
        let members: Vec<String> = universe
            .names()
            .iter()
            .zip(mask)
            .filter(|&(_, &on_destination)| on_destination)
            .map(|(name, _)| name.clone())
            .collect();
        let canonical = members.join(KEY_SEPARATOR);
        Self { members, canonical }
    }

    /// Everyone still on the origin shore
    pub fn empty(universe: &Universe) -> Self {
        Self::from_mask(universe, &vec![false; universe.len()])
    }

    /// Everyone on the destination shore
    pub fn full(universe: &Universe) -> Self {
        Self::from_mask(universe, &vec![true; universe.len()])
    }

    /// Members in universe order
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Objects that change shore when moving from `self` to `next`
    pub fn transfer_to(&self, next: &StateKey) -> Transfer {
        let to_destination = next
            .members
            .iter()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect();
        let to_origin = self
            .members
            .iter()
            .filter(|name| !next.contains(name))
            .cloned()
            .collect();
        Transfer {
            to_destination,
            to_origin,
        }
    }
}

impl PartialEq for StateKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for StateKey {}

impl Hash for StateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for StateKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StateKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.canonical.is_empty() {
            write!(f, "{{}}")
        } else {
            write!(f, "{}", self.canonical)
        }
    }
}

impl Serialize for StateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

/// The symmetric difference between two adjacent states
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transfer {
    /// Objects gained by the destination shore
    pub to_destination: Vec<String>,
    /// Objects lost by the destination shore
    pub to_origin: Vec<String>,
}

impl Transfer {
    /// The group that actually travelled.
    ///
    /// A single transition moves one group one way, so at most one side
    /// is non-empty for a well-formed puzzle.
    pub fn moved(&self) -> &[String] {
        if self.to_origin.is_empty() {
            &self.to_destination
        } else {
            &self.to_origin
        }
    }
}

/// Edge identifier derived from the signed difference of its endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EdgeKey(String);

impl EdgeKey {
    /// `+name` for each object gained by the destination shore, `-name`
    /// for each object lost, sorted and joined by the key separator.
    pub fn between(src: &StateKey, dst: &StateKey) -> Self {
        let transfer = src.transfer_to(dst);
        let mut tokens: Vec<String> = transfer
            .to_destination
            .iter()
            .map(|name| format!("+{}", name))
            .chain(transfer.to_origin.iter().map(|name| format!("-{}", name)))
            .collect();
        tokens.sort();
        Self(tokens.join(KEY_SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goat_universe() -> Universe {
        Universe::new(["goat", "wolf", "cabbage", "boat"]).unwrap()
    }

    #[test]
    fn test_universe_is_sorted() {
        let universe = goat_universe();
        assert_eq!(universe.names(), &["boat", "cabbage", "goat", "wolf"]);
        assert_eq!(universe.index_of("goat"), Some(2));
        assert_eq!(universe.index_of("man"), None);
    }

    #[test]
    fn test_duplicate_object_rejected() {
        let err = Universe::new(["goat", "wolf", "goat"]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateObject("goat".to_string()));
    }

    #[test]
    fn test_key_canonical_form_ignores_input_order() {
        let universe = goat_universe();
        let a = StateKey::new(&universe, ["wolf", "boat"]).unwrap();
        let b = StateKey::new(&universe, ["boat", "wolf", "wolf"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "boat/wolf");
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_key_rejects_unknown_object() {
        let universe = goat_universe();
        let err = StateKey::new(&universe, ["farmer"]).unwrap_err();
        assert_eq!(err, GraphError::UnknownObject("farmer".to_string()));
    }

    #[test]
    fn test_edge_key_single_move() {
        let universe = goat_universe();
        let origin = StateKey::empty(&universe);
        let goat = StateKey::new(&universe, ["goat"]).unwrap();
        assert_eq!(EdgeKey::between(&origin, &goat).as_str(), "+goat");
        assert_eq!(EdgeKey::between(&goat, &origin).as_str(), "-goat");
    }

    #[test]
    fn test_edge_key_is_sorted_signed_difference() {
        let universe = goat_universe();
        let src = StateKey::new(&universe, ["wolf"]).unwrap();
        let dst = StateKey::new(&universe, ["boat", "goat", "wolf"]).unwrap();
        assert_eq!(EdgeKey::between(&src, &dst).as_str(), "+boat/+goat");

        let back = StateKey::new(&universe, ["cabbage"]).unwrap();
        assert_eq!(EdgeKey::between(&dst, &back).as_str(), "+cabbage/-boat/-goat/-wolf");
    }

    #[test]
    fn test_transfer_moved_group() {
        let universe = goat_universe();
        let src = StateKey::new(&universe, ["boat", "goat", "wolf"]).unwrap();
        let dst = StateKey::new(&universe, ["wolf"]).unwrap();
        let transfer = src.transfer_to(&dst);
        assert!(transfer.to_destination.is_empty());
        assert_eq!(transfer.moved(), &["boat", "goat"]);
    }
}
