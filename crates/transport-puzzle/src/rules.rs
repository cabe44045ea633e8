//! Per-puzzle strategy plugged into the graph.
//!
//! A [`Rules`] value carries the three hooks a puzzle customizes: the
//! state validity predicate, the outgoing-key generator and the edge
//! factory. Puzzles pick their behavior by composing these, starting
//! from defaults that accept every state and edge.

use std::collections::BTreeMap;
use std::fmt;

use crate::graph::PuzzleConfig;
use crate::key::{StateKey, Transfer};
use crate::transition::OutgoingKeys;

/// What the edge factory reports for one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSpec {
    pub name: String,
    pub weight: Option<u64>,
    pub valid: bool,
}

impl EdgeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: None,
            valid: true,
        }
    }

    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Mark the transition as one the graph must not link
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }
}

pub type ValidityFn = Box<dyn Fn(&StateKey, &PuzzleConfig) -> bool>;
pub type OutgoingFn =
    Box<dyn for<'a> Fn(&'a StateKey, &'a PuzzleConfig) -> Box<dyn Iterator<Item = StateKey> + 'a>>;
pub type EdgeFactoryFn = Box<dyn Fn(&StateKey, &StateKey, &PuzzleConfig) -> EdgeSpec>;

/// Validity, neighbor generation and edge construction for one puzzle
pub struct Rules {
    validity: ValidityFn,
    outgoing: OutgoingFn,
    edge_factory: EdgeFactoryFn,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            validity: Box::new(|_: &StateKey, _: &PuzzleConfig| true),
            outgoing: Box::new(ferry_keys),
            edge_factory: Box::new(transfer_edge),
        }
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules").finish_non_exhaustive()
    }
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validity<F>(mut self, validity: F) -> Self
    where
        F: Fn(&StateKey, &PuzzleConfig) -> bool + 'static,
    {
        self.validity = Box::new(validity);
        self
    }

    pub fn with_outgoing<F>(mut self, outgoing: F) -> Self
    where
        F: for<'a> Fn(&'a StateKey, &'a PuzzleConfig) -> Box<dyn Iterator<Item = StateKey> + 'a>
            + 'static,
    {
        self.outgoing = Box::new(outgoing);
        self
    }

    pub fn with_edge_factory<F>(mut self, edge_factory: F) -> Self
    where
        F: Fn(&StateKey, &StateKey, &PuzzleConfig) -> EdgeSpec + 'static,
    {
        self.edge_factory = Box::new(edge_factory);
        self
    }

    pub fn is_valid(&self, key: &StateKey, config: &PuzzleConfig) -> bool {
        (self.validity)(key, config)
    }

    pub fn outgoing<'a>(
        &self,
        key: &'a StateKey,
        config: &'a PuzzleConfig,
    ) -> Box<dyn Iterator<Item = StateKey> + 'a> {
        (self.outgoing)(key, config)
    }

    pub fn edge(&self, src: &StateKey, dst: &StateKey, config: &PuzzleConfig) -> EdgeSpec {
        (self.edge_factory)(src, dst, config)
    }
}

/// Default neighbor generator: the carrier ferries a legal number of
/// passengers across
pub fn ferry_keys<'a>(
    key: &'a StateKey,
    config: &'a PuzzleConfig,
) -> Box<dyn Iterator<Item = StateKey> + 'a> {
    Box::new(OutgoingKeys::new(
        config.universe(),
        config.carrier(),
        config.arities(),
        key,
    ))
}

/// Human-readable description of who moved where
pub fn transfer_name(transfer: &Transfer) -> String {
    let mut parts = Vec::with_capacity(2);
    if !transfer.to_destination.is_empty() {
        parts.push(format!("moved to destination: {}", transfer.to_destination.join(", ")));
    }
    if !transfer.to_origin.is_empty() {
        parts.push(format!("moved to origin: {}", transfer.to_origin.join(", ")));
    }
    parts.join("; ")
}

/// Default edge factory: unweighted, named after the transfer
pub fn transfer_edge(src: &StateKey, dst: &StateKey, _config: &PuzzleConfig) -> EdgeSpec {
    EdgeSpec::new(transfer_name(&src.transfer_to(dst)))
}

/// Edge factory whose weight is the slowest transit cost of the group
/// that moved. Objects without a listed cost cost nothing.
pub fn weighted_transfer_edge(
    costs: BTreeMap<String, u64>,
) -> impl Fn(&StateKey, &StateKey, &PuzzleConfig) -> EdgeSpec {
    move |src: &StateKey, dst: &StateKey, _config: &PuzzleConfig| {
        let transfer = src.transfer_to(dst);
        let weight = transfer
            .moved()
            .iter()
            .filter_map(|name| costs.get(name).copied())
            .max()
            .unwrap_or(0);
        EdgeSpec::new(format!("{} (weight {})", transfer_name(&transfer), weight)).with_weight(weight)
    }
}

/// Validity predicate forbidding any listed group from sharing the shore
/// the carrier is absent from
pub fn unattended_exclusion(
    groups: Vec<Vec<String>>,
) -> impl Fn(&StateKey, &PuzzleConfig) -> bool {
    move |key: &StateKey, config: &PuzzleConfig| {
        let carrier_on_destination = key.contains(config.carrier());
        let unattended = |name: &String| key.contains(name) != carrier_on_destination;
        !groups
            .iter()
            .any(|group| !group.is_empty() && group.iter().all(unattended))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goat_config() -> PuzzleConfig {
        PuzzleConfig::new(["goat", "wolf", "cabbage", "boat"], "boat", [0, 1]).unwrap()
    }

    fn goat_groups() -> Vec<Vec<String>> {
        vec![
            vec!["goat".to_string(), "wolf".to_string()],
            vec!["goat".to_string(), "cabbage".to_string()],
        ]
    }

    fn key(config: &PuzzleConfig, names: &[&str]) -> StateKey {
        StateKey::new(config.universe(), names).unwrap()
    }

    #[test]
    fn test_default_rules_accept_everything() {
        let config = goat_config();
        let rules = Rules::new();
        let origin = key(&config, &[]);
        assert!(rules.is_valid(&origin, &config));

        let goat = key(&config, &["goat"]);
        let spec = rules.edge(&origin, &goat, &config);
        assert!(spec.valid);
        assert_eq!(spec.weight, None);
        assert_eq!(spec.name, "moved to destination: goat");
    }

    #[test]
    fn test_unattended_exclusion() {
        let config = goat_config();
        let valid = unattended_exclusion(goat_groups());

        assert!(valid(&key(&config, &[]), &config));
        assert!(valid(&key(&config, &["boat", "goat"]), &config));
        // goat and cabbage left behind on the origin shore
        assert!(!valid(&key(&config, &["boat", "wolf"]), &config));
        // goat and wolf together on the destination shore, boat away
        assert!(!valid(&key(&config, &["goat", "wolf"]), &config));
        assert!(valid(&key(&config, &["boat", "goat", "wolf"]), &config));
    }

    #[test]
    fn test_weighted_edge_uses_slowest_mover() {
        let config = PuzzleConfig::new(["flashlight", "oner", "fiver"], "flashlight", [1, 2]).unwrap();
        let costs: BTreeMap<String, u64> = [("flashlight", 0), ("oner", 1), ("fiver", 5)]
            .into_iter()
            .map(|(name, cost)| (name.to_string(), cost))
            .collect();
        let factory = weighted_transfer_edge(costs);

        let origin = key(&config, &[]);
        let across = key(&config, &["fiver", "flashlight", "oner"]);
        let spec = factory(&origin, &across, &config);
        assert_eq!(spec.weight, Some(5));
        assert_eq!(spec.name, "moved to destination: fiver, flashlight, oner (weight 5)");

        let back = key(&config, &["fiver"]);
        assert_eq!(factory(&across, &back, &config).weight, Some(1));
    }

    #[test]
    fn test_transfer_name_both_directions() {
        let transfer = Transfer {
            to_destination: vec!["goat".to_string()],
            to_origin: vec!["wolf".to_string()],
        };
        assert_eq!(
            transfer_name(&transfer),
            "moved to destination: goat; moved to origin: wolf"
        );
    }

    #[test]
    fn test_invalid_edge_spec() {
        let spec = EdgeSpec::new("never").with_weight(3).invalid();
        assert!(!spec.valid);
        assert_eq!(spec.weight, Some(3));
    }
}
