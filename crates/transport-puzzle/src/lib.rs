//! State-graph solver for river-crossing transport puzzles.
//!
//! A puzzle moves a set of objects from an origin shore to a destination
//! shore with a capacity-limited carrier. Each state is the set of objects
//! on the destination shore; transitions flip the carrier together with
//! a legal group of passengers. The graph can be built eagerly or lazily
//! and is searched with BFS, exhaustive DFS or Dijkstra.

pub mod error;
pub mod graph;
pub mod key;
pub mod puzzles;
pub mod rules;
pub mod solver;
pub mod subsets;
pub mod transition;

// Re-export main types
pub use error::{GraphError, Result};
pub use graph::{Edge, EdgeId, GameGraph, Mode, PuzzleConfig, Vertex};
pub use key::{EdgeKey, StateKey, Transfer, Universe};
pub use puzzles::{
    goat_wolf_cabbage, goat_wolf_cabbage_definition, night_crossing, night_crossing_definition,
    PuzzleDefinition,
};
pub use rules::{EdgeSpec, Rules};
pub use solver::{bfs_solve, dfs_solve, dijkstra, path_weight, DfsSolutions, Distance, Path};
pub use subsets::Subsets;
pub use transition::{OutgoingKeys, TripCounter, TripState};
