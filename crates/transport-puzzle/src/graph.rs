//! The puzzle state graph.
//!
//! Vertices and edges live in one graph-owned registry. Edges refer to
//! their endpoints by [`StateKey`] and vertices refer to edges by
//! [`EdgeId`], so nothing holds a direct reference to another entity.
//!
//! In [`Mode::Eager`] every valid state and every edge is built during
//! construction. In [`Mode::Lazy`] a vertex's outgoing edges are built the
//! first time they are requested, creating destination vertices on the fly.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{GraphError, Result};
use crate::key::{EdgeKey, StateKey, Universe};
use crate::rules::{EdgeSpec, Rules};
use crate::subsets::Subsets;

/// Graph construction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Build the whole state space up front
    Eager,
    /// Build states and edges as the solvers reach them
    Lazy,
}

impl FromStr for Mode {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "eager" => Ok(Mode::Eager),
            "lazy" => Ok(Mode::Lazy),
            other => Err(GraphError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Eager => write!(f, "eager"),
            Mode::Lazy => write!(f, "lazy"),
        }
    }
}

/// Objects, carrier and legal passenger counts of a puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleConfig {
    universe: Universe,
    carrier: String,
    arities: BTreeSet<usize>,
}

impl PuzzleConfig {
    /// Validate and assemble a configuration.
    ///
    /// Fails on duplicate object names or a carrier outside the universe.
    pub fn new<I, S, A>(objects: I, carrier: impl Into<String>, arities: A) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        A: IntoIterator<Item = usize>,
    {
        let universe = Universe::new(objects)?;
        let carrier = carrier.into();
        universe.require(&carrier)?;
        Ok(Self {
            universe,
            carrier,
            arities: arities.into_iter().collect(),
        })
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn arities(&self) -> &BTreeSet<usize> {
        &self.arities
    }
}

/// Handle to an edge stored in a [`GameGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

/// A transition between two states
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    key: EdgeKey,
    src: StateKey,
    dst: StateKey,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<u64>,
}

impl Edge {
    fn new(src: StateKey, dst: StateKey, spec: EdgeSpec) -> Self {
        Self {
            key: EdgeKey::between(&src, &dst),
            src,
            dst,
            name: spec.name,
            weight: spec.weight,
        }
    }

    pub fn key(&self) -> &EdgeKey {
        &self.key
    }

    pub fn src(&self) -> &StateKey {
        &self.src
    }

    pub fn dst(&self) -> &StateKey {
        &self.dst
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> Option<u64> {
        self.weight
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A puzzle state and its adjacency
#[derive(Debug, Clone)]
pub struct Vertex {
    key: StateKey,
    valid: bool,
    outgoing: BTreeMap<EdgeKey, EdgeId>,
    incoming: BTreeMap<EdgeKey, EdgeId>,
    has_edges: bool,
}

impl Vertex {
    fn new(key: StateKey, valid: bool) -> Self {
        Self {
            key,
            valid,
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
            has_edges: false,
        }
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the outgoing edges have been built
    pub fn has_edges(&self) -> bool {
        self.has_edges
    }

    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }
}

/// Key → vertex table plus the edge arena
#[derive(Debug, Default)]
struct Registry {
    vertices: HashMap<StateKey, Vertex>,
    edges: Vec<Edge>,
}

impl Registry {
    /// Resolve `key`, building and registering it if it is a valid state.
    /// Returns whether the key is now registered.
    fn create(&mut self, config: &PuzzleConfig, rules: &Rules, key: &StateKey) -> Result<bool> {
        if self.vertices.contains_key(key) {
            return Ok(true);
        }

        let vertex = Vertex::new(key.clone(), rules.is_valid(key, config));
        if !vertex.is_valid() {
            trace!(key = %key, "rejected invalid state");
            return Ok(false);
        }

        trace!(key = %key, "registered state");
        self.insert(vertex)?;
        Ok(true)
    }

    fn insert(&mut self, vertex: Vertex) -> Result<()> {
        if self.vertices.contains_key(vertex.key()) {
            return Err(GraphError::DuplicateVertex(vertex.key().to_string()));
        }
        self.vertices.insert(vertex.key.clone(), vertex);
        Ok(())
    }

    /// Store `edge` and register it with both endpoints
    fn link(&mut self, edge: Edge) -> Result<EdgeId> {
        for endpoint in [edge.src(), edge.dst()] {
            if !self.vertices.contains_key(endpoint) {
                return Err(GraphError::UnregisteredEndpoint {
                    edge: edge.key().to_string(),
                    endpoint: endpoint.to_string(),
                });
            }
        }

        let duplicate_on = if self.vertices[edge.src()].outgoing.contains_key(edge.key()) {
            Some(edge.src())
        } else if self.vertices[edge.dst()].incoming.contains_key(edge.key()) {
            Some(edge.dst())
        } else {
            None
        };
        if let Some(vertex) = duplicate_on {
            return Err(GraphError::DuplicateEdge {
                edge: edge.name().to_string(),
                vertex: vertex.to_string(),
            });
        }

        let id = EdgeId(self.edges.len());
        if let Some(src) = self.vertices.get_mut(edge.src()) {
            src.outgoing.insert(edge.key().clone(), id);
        }
        if let Some(dst) = self.vertices.get_mut(edge.dst()) {
            dst.incoming.insert(edge.key().clone(), id);
        }
        self.edges.push(edge);
        Ok(id)
    }
}

/// State-transition graph of one puzzle
#[derive(Debug)]
pub struct GameGraph {
    config: PuzzleConfig,
    rules: Rules,
    mode: Mode,
    registry: Registry,
}

impl GameGraph {
    /// Build a graph. In eager mode this enumerates every subset of the
    /// universe, keeps the valid ones and links all their edges.
    pub fn new(config: PuzzleConfig, rules: Rules, mode: Mode) -> Result<Self> {
        let mut graph = Self {
            config,
            rules,
            mode,
            registry: Registry::default(),
        };

        if mode == Mode::Eager {
            graph.define_states()?;
            let keys: Vec<StateKey> = graph.registry.vertices.keys().cloned().collect();
            for key in &keys {
                graph.materialize_outgoing(key)?;
            }
            debug!(
                vertices = graph.vertex_count(),
                edges = graph.edge_count(),
                "built eager graph"
            );
        }

        Ok(graph)
    }

    fn define_states(&mut self) -> Result<()> {
        for key in Subsets::new(&self.config.universe) {
            self.registry.create(&self.config, &self.rules, &key)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Look up a registered vertex without building anything
    pub fn find(&self, key: &StateKey) -> Option<&Vertex> {
        self.registry.vertices.get(key)
    }

    /// Return the vertex for `key`, registering it first if needed.
    /// Invalid states are never registered and yield `None`.
    pub fn create(&mut self, key: &StateKey) -> Result<Option<&Vertex>> {
        if self.registry.create(&self.config, &self.rules, key)? {
            Ok(self.registry.vertices.get(key))
        } else {
            Ok(None)
        }
    }

    /// Build the outgoing edges of a registered vertex, once.
    ///
    /// Candidate destinations are resolved with [`find`](Self::find) in
    /// eager mode and [`create`](Self::create) in lazy mode; unresolved
    /// destinations and edges that report themselves invalid are skipped.
    pub fn materialize_outgoing(&mut self, key: &StateKey) -> Result<()> {
        let Self {
            config,
            rules,
            mode,
            registry,
        } = self;

        match registry.vertices.get(key) {
            None => return Err(GraphError::UnknownVertex(key.to_string())),
            Some(vertex) if vertex.has_edges => return Ok(()),
            Some(_) => {}
        }

        for dest in rules.outgoing(key, config) {
            let resolved = match *mode {
                Mode::Eager => registry.vertices.contains_key(&dest),
                Mode::Lazy => registry.create(config, rules, &dest)?,
            };
            if !resolved {
                continue;
            }

            let spec = rules.edge(key, &dest, config);
            if !spec.valid {
                trace!(src = %key, dst = %dest, "skipped invalid edge");
                continue;
            }
            registry.link(Edge::new(key.clone(), dest, spec))?;
        }

        if let Some(vertex) = registry.vertices.get_mut(key) {
            vertex.has_edges = true;
        }
        Ok(())
    }

    /// Outgoing edge handles of `key` in edge-key order, building them first
    /// if necessary
    pub fn outgoing_ids(&mut self, key: &StateKey) -> Result<Vec<EdgeId>> {
        self.materialize_outgoing(key)?;
        let vertex = self
            .find(key)
            .ok_or_else(|| GraphError::UnknownVertex(key.to_string()))?;
        Ok(vertex.outgoing.values().copied().collect())
    }

    /// Outgoing edges of `key`, building them first if necessary
    pub fn outgoing(&mut self, key: &StateKey) -> Result<Vec<&Edge>> {
        let ids = self.outgoing_ids(key)?;
        Ok(ids.into_iter().map(|id| self.edge(id)).collect())
    }

    /// Incoming edges of `key`.
    ///
    /// Only the edges linked so far are known, so this refuses vertices
    /// whose own outgoing edges were never built.
    pub fn incoming(&self, key: &StateKey) -> Result<Vec<&Edge>> {
        let vertex = self
            .find(key)
            .ok_or_else(|| GraphError::UnknownVertex(key.to_string()))?;
        if !vertex.has_edges {
            return Err(GraphError::EdgesNotMaterialized(key.to_string()));
        }
        Ok(vertex.incoming.values().map(|&id| self.edge(id)).collect())
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.registry.edges[id.0]
    }

    /// Every registered vertex. Complete only in eager mode or once lazy
    /// exploration has reached the whole state space.
    pub fn iterate_all(&self) -> impl Iterator<Item = (&StateKey, &Vertex)> {
        self.registry.vertices.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.registry.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.registry.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::unattended_exclusion;

    fn goat_config() -> PuzzleConfig {
        PuzzleConfig::new(["goat", "wolf", "cabbage", "boat"], "boat", [0, 1]).unwrap()
    }

    fn goat_rules() -> Rules {
        Rules::new().with_validity(unattended_exclusion(vec![
            vec!["goat".to_string(), "wolf".to_string()],
            vec!["goat".to_string(), "cabbage".to_string()],
        ]))
    }

    fn key(graph: &GameGraph, names: &[&str]) -> StateKey {
        StateKey::new(graph.config().universe(), names).unwrap()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("eager".parse::<Mode>().unwrap(), Mode::Eager);
        assert_eq!("lazy".parse::<Mode>().unwrap(), Mode::Lazy);
        assert_eq!(
            "greedy".parse::<Mode>().unwrap_err(),
            GraphError::UnknownMode("greedy".to_string())
        );
    }

    #[test]
    fn test_config_rejects_duplicates_and_unknown_carrier() {
        let err = PuzzleConfig::new(["goat", "goat", "boat"], "boat", [1]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateObject("goat".to_string()));

        let err = PuzzleConfig::new(["goat", "boat"], "raft", [1]).unwrap_err();
        assert_eq!(err, GraphError::UnknownObject("raft".to_string()));
    }

    #[test]
    fn test_eager_keeps_only_valid_states() {
        let graph = GameGraph::new(goat_config(), goat_rules(), Mode::Eager).unwrap();
        // 16 subsets, 6 of which leave goat with wolf or cabbage unattended
        assert_eq!(graph.vertex_count(), 10);
        assert!(graph.iterate_all().all(|(_, vertex)| vertex.is_valid() && vertex.has_edges()));
        assert!(graph.find(&key(&graph, &["goat", "wolf"])).is_none());
    }

    #[test]
    fn test_eager_edges_are_linked_both_ways() {
        let graph = GameGraph::new(goat_config(), goat_rules(), Mode::Eager).unwrap();
        let total_out: usize = graph.iterate_all().map(|(_, v)| v.out_degree()).sum();
        let total_in: usize = graph.iterate_all().map(|(_, v)| v.in_degree()).sum();
        assert_eq!(total_out, graph.edge_count());
        assert_eq!(total_in, graph.edge_count());

        let origin = key(&graph, &[]);
        let incoming = graph.incoming(&origin).unwrap();
        assert!(incoming.iter().all(|edge| edge.dst() == &origin));
    }

    #[test]
    fn test_lazy_builds_on_demand() {
        let mut graph = GameGraph::new(goat_config(), goat_rules(), Mode::Lazy).unwrap();
        assert_eq!(graph.vertex_count(), 0);

        let origin = key(&graph, &[]);
        assert!(graph.create(&origin).unwrap().is_some());
        assert_eq!(graph.vertex_count(), 1);

        let names: Vec<String> = graph
            .outgoing(&origin)
            .unwrap()
            .iter()
            .map(|edge| edge.key().to_string())
            .collect();
        // only taking the goat leaves a safe shore behind
        assert_eq!(names, vec!["+boat/+goat"]);
        assert_eq!(graph.vertex_count(), 2);

        let origin_vertex = graph.find(&origin).unwrap();
        assert!(origin_vertex.has_edges());
    }

    #[test]
    fn test_lazy_and_eager_agree() {
        let eager = GameGraph::new(goat_config(), goat_rules(), Mode::Eager).unwrap();
        let mut lazy = GameGraph::new(goat_config(), goat_rules(), Mode::Lazy).unwrap();

        let mut pending = vec![key(&lazy, &[])];
        lazy.create(&pending[0]).unwrap();
        while let Some(current) = pending.pop() {
            let was_built = lazy.find(&current).map_or(false, Vertex::has_edges);
            if was_built {
                continue;
            }
            for id in lazy.outgoing_ids(&current).unwrap() {
                pending.push(lazy.edge(id).dst().clone());
            }
        }

        for (state, vertex) in lazy.iterate_all() {
            let twin = eager.find(state).unwrap();
            assert_eq!(vertex.out_degree(), twin.out_degree(), "{}", state);
        }
    }

    #[test]
    fn test_create_rejects_invalid_state() {
        let mut graph = GameGraph::new(goat_config(), goat_rules(), Mode::Lazy).unwrap();
        let unsafe_state = key(&graph, &["boat", "wolf"]);
        assert!(graph.create(&unsafe_state).unwrap().is_none());
        assert_eq!(graph.vertex_count(), 0);
    }

    #[test]
    fn test_incoming_requires_materialized_vertex() {
        let mut graph = GameGraph::new(goat_config(), goat_rules(), Mode::Lazy).unwrap();
        let origin = key(&graph, &[]);
        graph.create(&origin).unwrap();
        assert_eq!(
            graph.incoming(&origin).unwrap_err(),
            GraphError::EdgesNotMaterialized(origin.to_string())
        );
    }

    #[test]
    fn test_materialize_unknown_vertex() {
        let mut graph = GameGraph::new(goat_config(), goat_rules(), Mode::Lazy).unwrap();
        let origin = key(&graph, &[]);
        assert_eq!(
            graph.materialize_outgoing(&origin).unwrap_err(),
            GraphError::UnknownVertex(origin.to_string())
        );
    }

    #[test]
    fn test_invalid_edges_are_skipped() {
        let rules = goat_rules().with_edge_factory(|src: &StateKey, dst: &StateKey, _: &PuzzleConfig| {
            let spec = EdgeSpec::new(format!("{} -> {}", src, dst));
            if dst.contains("cabbage") {
                spec.invalid()
            } else {
                spec
            }
        });
        let graph = GameGraph::new(goat_config(), rules, Mode::Eager).unwrap();
        for (_, vertex) in graph.iterate_all() {
            if !vertex.key().contains("cabbage") {
                continue;
            }
            assert_eq!(vertex.in_degree(), 0, "{}", vertex.key());
        }
    }

    #[test]
    fn test_link_rejects_unregistered_endpoint() {
        let mut registry = Registry::default();
        let config = goat_config();
        let rules = goat_rules();
        let origin = StateKey::empty(config.universe());
        let goat = StateKey::new(config.universe(), ["boat", "goat"]).unwrap();
        registry.create(&config, &rules, &origin).unwrap();

        let err = registry
            .link(Edge::new(origin.clone(), goat.clone(), EdgeSpec::new("cross")))
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnregisteredEndpoint {
                edge: "+boat/+goat".to_string(),
                endpoint: goat.to_string(),
            }
        );
    }

    #[test]
    fn test_link_rejects_duplicate_edge_key() {
        let mut registry = Registry::default();
        let config = goat_config();
        let rules = goat_rules();
        let origin = StateKey::empty(config.universe());
        let goat = StateKey::new(config.universe(), ["boat", "goat"]).unwrap();
        registry.create(&config, &rules, &origin).unwrap();
        registry.create(&config, &rules, &goat).unwrap();

        registry
            .link(Edge::new(origin.clone(), goat.clone(), EdgeSpec::new("first")))
            .unwrap();
        let err = registry
            .link(Edge::new(origin.clone(), goat, EdgeSpec::new("second")))
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateEdge {
                edge: "second".to_string(),
                vertex: origin.to_string(),
            }
        );
    }

    #[test]
    fn test_insert_rejects_duplicate_vertex() {
        let mut registry = Registry::default();
        let origin = StateKey::empty(goat_config().universe());
        registry.insert(Vertex::new(origin.clone(), true)).unwrap();
        assert_eq!(
            registry.insert(Vertex::new(origin.clone(), true)).unwrap_err(),
            GraphError::DuplicateVertex(origin.to_string())
        );
    }
}
