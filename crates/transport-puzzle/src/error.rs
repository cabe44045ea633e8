//! Error type shared by graph construction and the solvers.
//!
//! Configuration errors are raised once, before any state is built.
//! The remaining variants are invariant violations that point at a
//! malformed puzzle definition rather than bad user input.

use thiserror::Error;

/// Errors raised by the state graph and its solvers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The object universe names the same object twice
    #[error("object `{0}` appears more than once in the universe")]
    DuplicateObject(String),

    /// Construction mode other than `eager` or `lazy`
    #[error("graph mode must be 'eager' or 'lazy', got `{0}`")]
    UnknownMode(String),

    /// A carrier, cost or constraint refers to an object outside the universe
    #[error("object `{0}` is not part of the universe")]
    UnknownObject(String),

    /// A state key is not registered in the graph
    #[error("state with key `{0}` not in graph")]
    UnknownVertex(String),

    /// A state key was registered twice
    #[error("state with key `{0}` already in graph")]
    DuplicateVertex(String),

    /// An edge was linked while one of its endpoints is unregistered
    #[error("edge `{edge}` endpoint `{endpoint}` not in graph")]
    UnregisteredEndpoint { edge: String, endpoint: String },

    /// Two edges of one vertex produced the same signed-difference key
    #[error("edge `{edge}` has the same key as another edge in vertex `{vertex}`")]
    DuplicateEdge { edge: String, vertex: String },

    /// Incoming edges were requested before outgoing edges were built
    #[error("vertex `{0}` iterated before its edges were created")]
    EdgesNotMaterialized(String),

    /// The search source does not resolve to a valid vertex
    #[error("source state key `{0}` invalid")]
    InvalidSource(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GraphError>;
