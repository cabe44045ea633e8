//! Puzzle definitions that deserialize from JSON.
//!
//! A definition names the objects, the carrier, the legal passenger
//! counts and the constraints; [`PuzzleDefinition::build`] turns it into
//! a ready [`GameGraph`]. The two classic puzzles are provided as
//! built-ins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{GameGraph, Mode, PuzzleConfig};
use crate::rules::{unattended_exclusion, weighted_transfer_edge, Rules};

fn default_mode() -> String {
    Mode::Eager.to_string()
}

/// A transport puzzle as described in JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDefinition {
    #[serde(default)]
    pub name: String,
    pub objects: Vec<String>,
    pub carrier: String,
    /// Allowed passenger counts per trip, carrier excluded
    pub arities: Vec<usize>,
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Groups that may not be left together on the shore without the carrier
    #[serde(rename = "forbiddenUnattended", default)]
    pub forbidden_unattended: Vec<Vec<String>>,
    /// Per-object crossing time; when present edges carry weights
    #[serde(rename = "transitCosts", default, skip_serializing_if = "Option::is_none")]
    pub transit_costs: Option<BTreeMap<String, u64>>,
}

impl PuzzleDefinition {
    /// Validated objects, carrier and arities
    pub fn config(&self) -> Result<PuzzleConfig> {
        PuzzleConfig::new(
            self.objects.iter().cloned(),
            self.carrier.clone(),
            self.arities.iter().copied(),
        )
    }

    /// Strategy for this puzzle. Every object named by a constraint or a
    /// cost must belong to the universe.
    pub fn rules(&self, config: &PuzzleConfig) -> Result<Rules> {
        let universe = config.universe();
        for name in self.forbidden_unattended.iter().flatten() {
            universe.require(name)?;
        }

        let mut rules = Rules::new();
        if !self.forbidden_unattended.is_empty() {
            rules = rules.with_validity(unattended_exclusion(self.forbidden_unattended.clone()));
        }
        if let Some(costs) = &self.transit_costs {
            for name in costs.keys() {
                universe.require(name)?;
            }
            rules = rules.with_edge_factory(weighted_transfer_edge(costs.clone()));
        }
        Ok(rules)
    }

    /// Parse the mode, validate the definition and build the graph
    pub fn build(&self) -> Result<GameGraph> {
        let mode: Mode = self.mode.parse()?;
        let config = self.config()?;
        let rules = self.rules(&config)?;
        GameGraph::new(config, rules, mode)
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode.to_string();
        self
    }
}

/// Goat, wolf and cabbage: the boat takes at most one passenger and the
/// goat may not be left alone with the wolf or the cabbage
pub fn goat_wolf_cabbage_definition() -> PuzzleDefinition {
    PuzzleDefinition {
        name: "goat-wolf-cabbage".to_string(),
        objects: ["goat", "wolf", "cabbage", "boat"].map(String::from).to_vec(),
        carrier: "boat".to_string(),
        arities: vec![0, 1],
        mode: default_mode(),
        forbidden_unattended: vec![
            vec!["goat".to_string(), "wolf".to_string()],
            vec!["goat".to_string(), "cabbage".to_string()],
        ],
        transit_costs: None,
    }
}

/// Four people and one flashlight; at most two cross at a time, someone
/// has to bring the flashlight back, and a group walks at its slowest
/// member's pace
pub fn night_crossing_definition() -> PuzzleDefinition {
    let costs = [("flashlight", 0), ("oner", 1), ("twoer", 2), ("fiver", 5), ("tener", 10)];
    PuzzleDefinition {
        name: "night-crossing".to_string(),
        objects: costs.iter().map(|(name, _)| name.to_string()).collect(),
        carrier: "flashlight".to_string(),
        arities: vec![1, 2],
        mode: default_mode(),
        forbidden_unattended: Vec::new(),
        transit_costs: Some(
            costs
                .iter()
                .map(|&(name, cost)| (name.to_string(), cost))
                .collect(),
        ),
    }
}

pub fn goat_wolf_cabbage(mode: Mode) -> Result<GameGraph> {
    goat_wolf_cabbage_definition().with_mode(mode).build()
}

pub fn night_crossing() -> Result<GameGraph> {
    night_crossing_definition().build()
}
