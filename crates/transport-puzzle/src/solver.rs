//! Path searches over a [`GameGraph`].
//!
//! - [`bfs_solve`]: fewest transitions from source to destination.
//! - [`dfs_solve`]: every simple path, produced one at a time.
//! - [`dijkstra`]: cheapest path by edge weight.
//!
//! All three only talk to the graph through keys, edge handles and the
//! outgoing-edge accessor, so they work on eager and lazy graphs alike
//! (Dijkstra needs the full registry and therefore an eager graph).

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::{Edge, EdgeId, GameGraph};
use crate::key::StateKey;

/// Sequence of edges from source to destination
pub type Path = Vec<Edge>;

/// Cost of an edge that carries no weight
pub const UNIT_WEIGHT: u64 = 1;

fn edge_cost(edge: &Edge) -> u64 {
    edge.weight().unwrap_or(UNIT_WEIGHT)
}

/// Total cost of a path, counting unweighted edges as [`UNIT_WEIGHT`]
pub fn path_weight(path: &[Edge]) -> u64 {
    path.iter().map(edge_cost).sum()
}

/// Rebuild a path by following parent edges back from `dst`
fn walk_back(
    graph: &GameGraph,
    parents: &HashMap<StateKey, EdgeId>,
    src: &StateKey,
    dst: &StateKey,
) -> Path {
    let mut path = Vec::new();
    let mut cursor = dst.clone();
    while &cursor != src {
        let Some(&id) = parents.get(&cursor) else {
            break;
        };
        let edge = graph.edge(id);
        path.push(edge.clone());
        cursor = edge.src().clone();
    }
    path.reverse();
    path
}

/// Shortest path by number of transitions.
///
/// Returns an empty path when `dst` is unreachable. The source must be a
/// valid state; in lazy mode it is created on demand.
pub fn bfs_solve(graph: &mut GameGraph, src: &StateKey, dst: &StateKey) -> Result<Path> {
    if graph.create(src)?.is_none() {
        return Err(GraphError::InvalidSource(src.to_string()));
    }

    let mut parents: HashMap<StateKey, EdgeId> = HashMap::new();
    let mut discovered: HashSet<StateKey> = HashSet::from([src.clone()]);
    let mut queue: VecDeque<StateKey> = VecDeque::from([src.clone()]);
    let mut found = false;

    while let Some(current) = queue.pop_front() {
        if &current == dst {
            found = true;
            break;
        }

        for id in graph.outgoing_ids(&current)? {
            let next = graph.edge(id).dst();
            if discovered.insert(next.clone()) {
                parents.insert(next.clone(), id);
                queue.push_back(next.clone());
            }
        }
    }

    debug!(discovered = discovered.len(), found, "bfs finished");
    if !found {
        return Ok(Vec::new());
    }
    Ok(walk_back(graph, &parents, src, dst))
}

/// One level of the depth-first search
#[derive(Debug, Clone)]
struct DfsFrame {
    key: StateKey,
    /// Edge followed to reach this frame; `None` at the root
    edge: Option<EdgeId>,
    children: Vec<EdgeId>,
    cursor: usize,
    reported: bool,
}

impl DfsFrame {
    fn new(key: StateKey, edge: Option<EdgeId>, children: Vec<EdgeId>) -> Self {
        Self {
            key,
            edge,
            children,
            cursor: 0,
            reported: false,
        }
    }

    /// Advance the cursor to the next child not on the current path
    fn next_unvisited(&mut self, graph: &GameGraph, visited: &HashSet<StateKey>) -> Option<EdgeId> {
        while let Some(&id) = self.children.get(self.cursor) {
            self.cursor += 1;
            if !visited.contains(graph.edge(id).dst()) {
                return Some(id);
            }
        }
        None
    }
}

/// Lazy sequence of every simple path from source to destination.
///
/// Reaching the destination reports the path and keeps searching past it,
/// so the whole reachable space is explored.
pub struct DfsSolutions<'g> {
    graph: &'g mut GameGraph,
    src: StateKey,
    dst: StateKey,
    stack: Vec<DfsFrame>,
    edges: Vec<EdgeId>,
    visited: HashSet<StateKey>,
}

impl fmt::Debug for DfsSolutions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DfsSolutions")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("depth", &self.stack.len())
            .finish()
    }
}

/// Start enumerating every path from `src` to `dst`.
///
/// With `cycle` set the source is never marked visited, so paths may come
/// back to it (they are not extended past it).
pub fn dfs_solve<'g>(
    graph: &'g mut GameGraph,
    src: &StateKey,
    dst: &StateKey,
    cycle: bool,
) -> Result<DfsSolutions<'g>> {
    if graph.create(src)?.is_none() {
        return Err(GraphError::InvalidSource(src.to_string()));
    }

    let children = graph.outgoing_ids(src)?;
    let mut visited = HashSet::new();
    if !cycle {
        visited.insert(src.clone());
    }

    Ok(DfsSolutions {
        graph,
        src: src.clone(),
        dst: dst.clone(),
        stack: vec![DfsFrame::new(src.clone(), None, children)],
        edges: Vec::new(),
        visited,
    })
}

impl DfsSolutions<'_> {
    fn current_path(&self) -> Path {
        self.edges.iter().map(|&id| self.graph.edge(id).clone()).collect()
    }

    fn pop(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.visited.remove(&frame.key);
            if frame.edge.is_some() {
                self.edges.pop();
            }
        }
    }
}

impl Iterator for DfsSolutions<'_> {
    type Item = Result<Path>;

    fn next(&mut self) -> Option<Result<Path>> {
        loop {
            let depth = self.stack.len();
            let top = self.stack.last_mut()?;

            if !top.reported {
                top.reported = true;
                if depth > 1 && top.key == self.dst {
                    return Some(Ok(self.current_path()));
                }
            }

            let may_descend = depth == 1 || top.key != self.src;
            let next_edge = if may_descend {
                top.next_unvisited(self.graph, &self.visited)
            } else {
                None
            };

            let Some(id) = next_edge else {
                self.pop();
                continue;
            };

            let next_key = self.graph.edge(id).dst().clone();
            let children = match self.graph.outgoing_ids(&next_key) {
                Ok(children) => children,
                Err(err) => {
                    self.stack.clear();
                    return Some(Err(err));
                }
            };
            if next_key != self.src {
                self.visited.insert(next_key.clone());
            }
            self.edges.push(id);
            self.stack.push(DfsFrame::new(next_key, Some(id), children));
        }
    }
}

/// Tentative distance in Dijkstra's algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Distance {
    Finite(u64),
    Infinite,
}

impl Distance {
    /// Extend by one edge; infinity absorbs everything
    pub fn extend(self, weight: u64) -> Distance {
        match self {
            Distance::Finite(value) => Distance::Finite(value.saturating_add(weight)),
            Distance::Infinite => Distance::Infinite,
        }
    }

    pub fn finite(self) -> Option<u64> {
        match self {
            Distance::Finite(value) => Some(value),
            Distance::Infinite => None,
        }
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Distance::Finite(a), Distance::Finite(b)) => a.cmp(b),
            (Distance::Finite(_), Distance::Infinite) => Ordering::Less,
            (Distance::Infinite, Distance::Finite(_)) => Ordering::Greater,
            (Distance::Infinite, Distance::Infinite) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(value) => write!(f, "{}", value),
            Distance::Infinite => write!(f, "inf"),
        }
    }
}

/// Cheapest path by total edge weight.
///
/// Works over every registered vertex, so the graph must be eager (or
/// fully explored). Unweighted edges cost [`UNIT_WEIGHT`]. Returns an
/// empty path when `dst` is unreachable.
pub fn dijkstra(graph: &mut GameGraph, src: &StateKey, dst: &StateKey) -> Result<Path> {
    if graph.find(src).is_none() {
        return Err(GraphError::InvalidSource(src.to_string()));
    }

    let mut distances: HashMap<StateKey, Distance> = graph
        .iterate_all()
        .map(|(key, _)| (key.clone(), Distance::Infinite))
        .collect();
    let mut unvisited: HashSet<StateKey> = distances.keys().cloned().collect();
    let mut parents: HashMap<StateKey, EdgeId> = HashMap::new();
    distances.insert(src.clone(), Distance::Finite(0));

    loop {
        let nearest = unvisited
            .iter()
            .map(|key| (key, distances[key]))
            .min_by(|a, b| a.1.cmp(&b.1))
            .map(|(key, distance)| (key.clone(), distance));
        let Some((current, distance)) = nearest else {
            break;
        };
        if distance == Distance::Infinite {
            // everything left is unreachable
            break;
        }

        for id in graph.outgoing_ids(&current)? {
            let edge = graph.edge(id);
            if !unvisited.contains(edge.dst()) {
                continue;
            }
            let candidate = distance.extend(edge_cost(edge));
            if candidate < distances[edge.dst()] {
                distances.insert(edge.dst().clone(), candidate);
                parents.insert(edge.dst().clone(), id);
            }
        }
        unvisited.remove(&current);
    }

    debug!(
        distance = %distances.get(dst).copied().unwrap_or(Distance::Infinite),
        "dijkstra finished"
    );
    if !parents.contains_key(dst) {
        return Ok(Vec::new());
    }
    Ok(walk_back(graph, &parents, src, dst))
}
