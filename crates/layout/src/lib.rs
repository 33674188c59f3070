//! SAT-driven rectilinear drawing of undirected graphs.
//!
//! The pipeline turns the combinatorial structure of a connected undirected
//! graph into an overlap-free grid drawing in four stages:
//!
//! 1. **Shape synthesis** — every directed edge is assigned one of the four
//!    compass directions by an external SAT solver. When the constraints are
//!    unsatisfiable, the solver's unsatisfiability proof points at the edge
//!    to subdivide with a bend node, and the encoding is retried.
//! 2. **Coordinate synthesis** — nodes are grouped into classes of shared
//!    coordinates, the classes are ordered per axis, and a topological sort
//!    of the ordering graphs yields integer grid positions. A cycle in an
//!    ordering graph is lifted back to the input graph and fed to stage 1
//!    as an additional constraint.
//! 3. **Refinement and compaction** — bends that do not turn are dropped,
//!    and coordinate classes slide toward the origin wherever their
//!    projection intervals do not conflict.
//! 4. **High-degree rewiring** — nodes with more than four incident edges
//!    are handled by drawing a maximal degree-4 subgraph and splicing every
//!    removed edge back in as a short chain of bends.
//!
//! # Example
//!
//! ```no_run
//! use ortho_graph::generate;
//! use ortho_layout::{DrawingBuilder, GlucoseSolver};
//!
//! let graph = generate::cycle(4).unwrap();
//! let result = DrawingBuilder::new(&graph, GlucoseSolver::new("./glucose"))
//!     .draw()
//!     .unwrap();
//!
//! for node in result.graph.node_ids() {
//!     let point = result.positions.point(node).unwrap();
//!     println!("{node} -> ({}, {})", point.x, point.y);
//! }
//! ```

pub mod classes;
pub mod compact;
pub mod drawing;
pub mod ordering;
pub mod positions;
pub mod refine;
pub mod rewire;
pub mod sat;
pub mod shape;
pub mod shape_builder;
pub mod stats;
pub mod svg;

pub use crate::drawing::{DrawingBuilder, DrawingResult};
pub use crate::positions::{Point, Positions};
pub use crate::sat::solver::{GlucoseSolver, SatOutcome, SatSolver};
pub use crate::shape::{Direction, Shape};
pub use crate::stats::DrawingStats;

use ortho_graph::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("graph invariant violated")]
    Graph {
        #[from]
        source: ortho_graph::Error,
    },
    #[error("malformed input graph: {0}")]
    MalformedInput(String),
    #[error("error while exchanging files with the solver")]
    SolverIo {
        #[from]
        source: std::io::Error,
    },
    #[error("solver subprocess failed: {0}")]
    SolverFailure(String),
    #[error("shape synthesis gave up after inserting {limit} bends")]
    ShapeInfeasible { limit: usize },
    #[error("drawing has overlapping geometry: {0}")]
    GeometryOverlap(String),
    #[error("shape invariant violated: {0}")]
    ShapeInvariant(String),
    #[error("node {0} has no assigned position")]
    MissingPosition(NodeId),
    #[error("node {0} already has a position")]
    DuplicatePosition(NodeId),
}
