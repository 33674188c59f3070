//! The end-to-end pipeline: validation, shape synthesis, coordinate
//! synthesis, refinement, compaction and high-degree rewiring.

use std::time::Instant;

use fxhash::FxHashMap;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use ortho_graph::{algo, Color, Graph, GraphAttributes, NodeId};

use crate::compact;
use crate::ordering::{synthesize_coordinates, CoordinateSynthesis};
use crate::positions::Positions;
use crate::refine;
use crate::rewire;
use crate::sat::solver::SatSolver;
use crate::shape::Shape;
use crate::shape_builder::{build_shape, build_shape_any_degree, BendLimiter};
use crate::stats;
use crate::Error;

/// Everything a finished `draw` call hands back: the augmented graph with
/// its bend nodes, the colour map, the shape, the grid positions and the
/// pipeline counters.
#[derive(Debug)]
pub struct DrawingResult {
    pub graph: Graph,
    pub attributes: GraphAttributes,
    pub shape: Shape,
    pub positions: Positions,
    pub initial_cycle_count: usize,
    pub added_cycle_count: usize,
    pub removed_bend_count: usize,
}

/// Configures and runs the drawing pipeline.
///
/// # Example
///
/// ```no_run
/// use ortho_graph::generate;
/// use ortho_layout::{DrawingBuilder, GlucoseSolver};
///
/// let graph = generate::cycle(4).unwrap();
/// let result = DrawingBuilder::new(&graph, GlucoseSolver::new("./glucose"))
///     .max_bends(500)
///     .draw()
///     .unwrap();
/// assert_eq!(result.positions.len(), 4);
/// ```
pub struct DrawingBuilder<'g, S> {
    graph: &'g Graph,
    solver: S,
    randomize: bool,
    max_bends: usize,
}

impl<'g, S: SatSolver> DrawingBuilder<'g, S> {
    pub fn new(graph: &'g Graph, solver: S) -> Self {
        Self {
            graph,
            solver,
            randomize: false,
            max_bends: 1000,
        }
    }

    /// Seeds the repair randomness from entropy instead of the fixed
    /// default seed.
    pub fn randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    /// Caps the number of bend insertions before the call fails with
    /// `ShapeInfeasible`.
    pub fn max_bends(mut self, max_bends: usize) -> Self {
        self.max_bends = max_bends;
        self
    }

    fn rng(&self) -> StdRng {
        if self.randomize {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(42)
        }
    }

    /// Draws the graph, dispatching on its maximum degree, and validates
    /// the geometry of the result.
    pub fn draw(mut self) -> Result<DrawingResult, Error> {
        let start = Instant::now();
        let mut rng = self.rng();
        let mut limiter = BendLimiter::new(self.max_bends);
        let low_degree = self.graph.max_degree() <= 4;
        let result = if low_degree {
            draw_low_degree(self.graph, &mut self.solver, &mut rng, &mut limiter)?
        } else {
            draw_any_degree(self.graph, &mut self.solver, &mut rng, &mut limiter)?
        };
        // Spliced chains legitimately ride the tracks of their saturated
        // anchors, so the any-degree check exempts those junctions.
        let overlap = if low_degree {
            stats::find_overlap(&result.graph, &result.positions)?
        } else {
            stats::find_overlap_any_degree(&result.graph, &result.positions, &result.attributes)?
        };
        if let Some(overlap) = overlap {
            return Err(Error::GeometryOverlap(overlap));
        }
        info!(
            "drew {} nodes / {} directed edges in {:?}",
            result.graph.node_count(),
            result.graph.edge_count(),
            start.elapsed()
        );
        Ok(result)
    }

    /// Alternative high-degree pipeline that keeps every node in the SAT
    /// encoding: parallel edges at a high-degree node collapse into one
    /// virtual direction. The cycle list starts from all simple cycles,
    /// and the result is returned without refinement, compaction or the
    /// geometric overlap check, since collapsed edges may share tracks.
    pub fn draw_collapsed(mut self) -> Result<DrawingResult, Error> {
        let mut rng = self.rng();
        let mut limiter = BendLimiter::new(self.max_bends);
        if self.graph.max_degree() <= 4 {
            return self.draw();
        }
        let mut cycles = algo::all_cycles(self.graph);
        incremental(
            self.graph,
            &mut cycles,
            &mut self.solver,
            &mut rng,
            &mut limiter,
            Pipeline::Collapsed,
        )
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Pipeline {
    /// Exact encoding, refinement and compaction.
    LowDegree,
    /// Collapsed encoding, raw coordinates.
    Collapsed,
}

type ShapeSynthesis<S> = fn(
    &mut Graph,
    &mut GraphAttributes,
    &mut Vec<Vec<NodeId>>,
    &mut S,
    &mut StdRng,
    &mut BendLimiter,
) -> Result<Shape, Error>;

fn draw_low_degree<S: SatSolver>(
    graph: &Graph,
    solver: &mut S,
    rng: &mut StdRng,
    limiter: &mut BendLimiter,
) -> Result<DrawingResult, Error> {
    let mut cycles = algo::cycle_basis(graph);
    incremental(graph, &mut cycles, solver, rng, limiter, Pipeline::LowDegree)
}

/// One full shape/coordinates loop over an augmented copy of `graph`.
fn incremental<S: SatSolver>(
    graph: &Graph,
    cycles: &mut Vec<Vec<NodeId>>,
    solver: &mut S,
    rng: &mut StdRng,
    limiter: &mut BendLimiter,
    pipeline: Pipeline,
) -> Result<DrawingResult, Error> {
    if !algo::is_undirected(graph) {
        return Err(Error::MalformedInput("graph is not undirected".into()));
    }
    if !algo::is_connected(graph) {
        return Err(Error::MalformedInput("graph is not connected".into()));
    }
    if pipeline == Pipeline::LowDegree && graph.max_degree() > 4 {
        return Err(Error::MalformedInput(
            "low-degree pipeline requires maximum degree four".into(),
        ));
    }

    let mut augmented = Graph::new();
    let mut attributes = GraphAttributes::new();
    for node in graph.node_ids() {
        augmented.add_node_with_id(node)?;
        attributes.set_node_color(node, Color::Black)?;
    }
    for (_, from, to) in graph.edges() {
        augmented.add_edge(from, to)?;
    }

    let initial_cycle_count = cycles.len();
    let synthesize_shape: ShapeSynthesis<S> = match pipeline {
        Pipeline::LowDegree => build_shape::<S>,
        Pipeline::Collapsed => build_shape_any_degree::<S>,
    };
    let mut shape = synthesize_shape(&mut augmented, &mut attributes, cycles, solver, rng, limiter)?;
    let mut outcome = synthesize_coordinates(&shape, &augmented)?;
    let mut added_cycle_count = 0;
    while let CoordinateSynthesis::CyclesToAdd(lifted) = outcome {
        added_cycle_count += lifted.len();
        cycles.extend(lifted);
        shape = synthesize_shape(&mut augmented, &mut attributes, cycles, solver, rng, limiter)?;
        outcome = synthesize_coordinates(&shape, &augmented)?;
    }
    let CoordinateSynthesis::Placed(mut positions) = outcome else {
        unreachable!("loop above drains every lifted cycle");
    };

    let mut removed_bend_count = 0;
    if pipeline == Pipeline::LowDegree {
        removed_bend_count =
            refine::remove_useless_bends(&mut augmented, &attributes, &mut shape, &mut positions)?;
        let CoordinateSynthesis::Placed(rederived) =
            synthesize_coordinates(&shape, &augmented)?
        else {
            return Err(Error::ShapeInvariant(
                "refined shape lost realisability".into(),
            ));
        };
        positions = rederived;
        positions = compact::compact_x(&augmented, &shape, &positions)?;
        positions = compact::compact_y(&augmented, &shape, &positions)?;
    }

    Ok(DrawingResult {
        graph: augmented,
        attributes,
        shape,
        positions,
        initial_cycle_count,
        added_cycle_count,
        removed_bend_count,
    })
}

/// The extract-and-splice path for graphs with high-degree nodes: draw a
/// maximal degree-4 subgraph per connected component, merge the component
/// drawings side by side, then splice every removed edge back in as a bend
/// chain.
fn draw_any_degree<S: SatSolver>(
    graph: &Graph,
    solver: &mut S,
    rng: &mut StdRng,
    limiter: &mut BendLimiter,
) -> Result<DrawingResult, Error> {
    if !algo::is_undirected(graph) {
        return Err(Error::MalformedInput("graph is not undirected".into()));
    }
    if !algo::is_connected(graph) {
        return Err(Error::MalformedInput("graph is not connected".into()));
    }
    let (subgraph, removed) = rewire::extract_max_degree_4_subgraph(graph)?;
    let components = algo::connected_components(&subgraph)?;
    let mut results = Vec::with_capacity(components.len());
    for component in &components {
        results.push(draw_low_degree(component, solver, rng, limiter)?);
    }
    let mut result = merge_component_drawings(results)?;
    let mut chain_bends = 0;
    for &edge in &removed {
        rewire::splice_removed_edge(
            &mut result.graph,
            &mut result.attributes,
            &mut result.shape,
            &mut result.positions,
            edge,
            &mut chain_bends,
        )?;
    }
    info!(
        "spliced {} removed edges back with {} chain bends",
        removed.len(),
        chain_bends
    );
    Ok(result)
}

/// Places component drawings side by side along x, one empty column
/// between neighbors. Bend nodes were numbered per component, so ids that
/// clash with already-merged nodes are renamed to fresh ones.
fn merge_component_drawings(mut results: Vec<DrawingResult>) -> Result<DrawingResult, Error> {
    if results.is_empty() {
        return Err(Error::MalformedInput("graph has no components".into()));
    }
    let mut merged = results.remove(0);
    for result in results {
        let offset = merged
            .positions
            .iter()
            .map(|(_, point)| point.x)
            .max()
            .map_or(0, |max_x| max_x + 2);
        let mut next_fresh = merged
            .graph
            .node_ids()
            .last()
            .map_or(0, |id| id + 1)
            .max(result.graph.node_ids().last().map_or(0, |id| id + 1));
        let mut rename: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        for node in result.graph.node_ids() {
            let target = if merged.graph.has_node(node) {
                let fresh = next_fresh;
                next_fresh += 1;
                fresh
            } else {
                node
            };
            rename.insert(node, target);
            merged.graph.add_node_with_id(target)?;
            merged
                .attributes
                .set_node_color(target, result.attributes.node_color(node)?)?;
        }
        for (_, from, to) in result.graph.edges() {
            merged.graph.add_edge(rename[&from], rename[&to])?;
        }
        for ((from, to), direction) in result.shape.iter() {
            merged
                .shape
                .set_direction(rename[&from], rename[&to], direction)?;
        }
        for (node, point) in result.positions.iter() {
            merged
                .positions
                .set(rename[&node], point.x + offset, point.y)?;
        }
        merged.initial_cycle_count += result.initial_cycle_count;
        merged.added_cycle_count += result.added_cycle_count;
        merged.removed_bend_count += result.removed_bend_count;
    }
    Ok(merged)
}
