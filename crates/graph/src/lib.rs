//! Graph model and algorithms backing the orthogonal layout pipeline.
//!
//! The central type is [`Graph`], an undirected multigraph with stable,
//! non-negative integer node and edge ids. An undirected edge is stored as a
//! pair of opposite directed edges, which keeps per-endpoint iteration cheap
//! and lets the layout pipeline reason about directed shape edges without a
//! separate representation.
//!
//! # Example
//!
//! ```
//! use ortho_graph::Graph;
//!
//! let mut graph = Graph::new();
//! let a = graph.add_node();
//! let b = graph.add_node();
//! graph.add_undirected_edge(a, b).unwrap();
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.degree(a), 1);
//! assert!(graph.has_edge(a, b) && graph.has_edge(b, a));
//! ```

pub mod algo;
pub mod attributes;
pub mod generate;
pub mod graph;
pub mod input;

pub use crate::attributes::{chain_key, Color, GraphAttributes};
pub use crate::graph::{EdgeId, Graph, NodeId};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("error while reading graph file")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("malformed graph file: {0}")]
    MalformedFile(String),
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    #[error("node {0} does not exist")]
    MissingNode(NodeId),
    #[error("edge ({0}, {1}) already exists")]
    DuplicateEdge(NodeId, NodeId),
    #[error("edge ({0}, {1}) does not exist")]
    MissingEdge(NodeId, NodeId),
    #[error("edge id {0} does not exist")]
    MissingEdgeId(EdgeId),
    #[error("cannot add self-loop at node {0}")]
    SelfLoop(NodeId),
    #[error("graph is not undirected")]
    NotUndirected,
    #[error("directed graph contains a cycle")]
    CyclicGraph,
    #[error("attribute already set for id {0}")]
    AttributeAlreadySet(usize),
    #[error("attribute not set for id {0}")]
    AttributeNotSet(usize),
    #[error("number of edges is too large for the requested node count")]
    TooManyEdges,
}
