//! Shape synthesis: the loop around the SAT solver.
//!
//! Each round encodes the current augmented graph and cycle list, asks the
//! solver for a model and reads the shape off it. On UNSAT the proof is
//! scanned backwards for unit clauses over standard variables: a literal
//! forced by unit propagation late in the proof marks the edge whose
//! orientation constraint pinched. That edge is subdivided with a red bend
//! node, which buys one degree of orthogonal freedom, and the encoding is
//! retried.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use ortho_graph::{Color, Graph, GraphAttributes, NodeId};

use crate::sat::clauses;
use crate::sat::cnf::CnfBuilder;
use crate::sat::solver::{ProofLine, SatOutcome, SatSolver};
use crate::sat::variables::Variables;
use crate::shape::Shape;
use crate::Error;

/// Caps the number of bend insertions of one `draw` call.
#[derive(Debug)]
pub struct BendLimiter {
    limit: usize,
    used: usize,
}

impl BendLimiter {
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    fn spend(&mut self) -> Result<(), Error> {
        if self.used >= self.limit {
            return Err(Error::ShapeInfeasible { limit: self.limit });
        }
        self.used += 1;
        Ok(())
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Encoding {
    /// Exact per-node constraints; every node must have degree at most four.
    Exact,
    /// High-degree nodes stay in the encoding with collapsed directions and
    /// special-variable pairs.
    Collapsed,
}

/// Synthesizes a shape for a graph of maximum degree four, subdividing
/// edges until the constraints are satisfiable.
pub fn build_shape<S: SatSolver>(
    graph: &mut Graph,
    attributes: &mut GraphAttributes,
    cycles: &mut Vec<Vec<NodeId>>,
    solver: &mut S,
    rng: &mut StdRng,
    limiter: &mut BendLimiter,
) -> Result<Shape, Error> {
    run(graph, attributes, cycles, solver, rng, limiter, Encoding::Exact)
}

/// Shape synthesis that keeps high-degree nodes in the encoding via
/// special variables.
pub fn build_shape_any_degree<S: SatSolver>(
    graph: &mut Graph,
    attributes: &mut GraphAttributes,
    cycles: &mut Vec<Vec<NodeId>>,
    solver: &mut S,
    rng: &mut StdRng,
    limiter: &mut BendLimiter,
) -> Result<Shape, Error> {
    run(
        graph,
        attributes,
        cycles,
        solver,
        rng,
        limiter,
        Encoding::Collapsed,
    )
}

fn run<S: SatSolver>(
    graph: &mut Graph,
    attributes: &mut GraphAttributes,
    cycles: &mut Vec<Vec<NodeId>>,
    solver: &mut S,
    rng: &mut StdRng,
    limiter: &mut BendLimiter,
    encoding: Encoding,
) -> Result<Shape, Error> {
    loop {
        if let Some(shape) = attempt(graph, attributes, cycles, solver, rng, limiter, encoding)? {
            info!(
                "shape synthesized after {} bend insertions ({} directed edges)",
                limiter.used(),
                graph.edge_count()
            );
            return Ok(shape);
        }
    }
}

/// One solver round: either a finished shape or `None` after a repair
/// subdivision.
fn attempt<S: SatSolver>(
    graph: &mut Graph,
    attributes: &mut GraphAttributes,
    cycles: &mut Vec<Vec<NodeId>>,
    solver: &mut S,
    rng: &mut StdRng,
    limiter: &mut BendLimiter,
    encoding: Encoding,
) -> Result<Option<Shape>, Error> {
    let mut variables = Variables::new(graph);
    let mut cnf = CnfBuilder::new();
    cnf.add_comment("one direction per edge");
    clauses::one_direction_per_edge(graph, &mut cnf, &variables)?;
    cnf.add_comment("node constraints");
    match encoding {
        Encoding::Exact => clauses::node_constraints(graph, &mut cnf, &variables)?,
        Encoding::Collapsed => {
            clauses::node_constraints_any_degree(graph, &mut cnf, &variables)?;
            cnf.add_comment("special edge pairs");
            clauses::special_edge_constraints(graph, &mut cnf, &mut variables)?;
        }
    }
    cnf.add_comment("cycle constraints");
    match encoding {
        Encoding::Exact => clauses::cycle_constraints(&mut cnf, &variables, cycles)?,
        Encoding::Collapsed => {
            clauses::cycle_constraints_any_degree(graph, &mut cnf, &variables, cycles)?
        }
    }

    match solver.solve(&cnf)? {
        SatOutcome::Sat(model) => {
            for literal in model {
                variables.set_value(literal.abs(), literal > 0)?;
            }
            Ok(Some(shape_from_model(graph, &variables)?))
        }
        SatOutcome::Unsat(proof) => {
            limiter.spend()?;
            let variable = pick_subdivision_variable(&proof, rng, &variables)?;
            let (from, to) = variables.edge_of(variable)?;
            let bend = subdivide_edge(graph, attributes, cycles, from, to)?;
            debug!("unsatisfiable; subdividing edge ({from}, {to}) with bend {bend}");
            Ok(None)
        }
    }
}

/// Reads the direction of every directed edge off the loaded model.
fn shape_from_model(graph: &Graph, variables: &Variables) -> Result<Shape, Error> {
    let mut shape = Shape::new();
    for node in graph.node_ids() {
        for neighbor in graph.neighbors(node) {
            let direction = variables.direction_of_edge(node, neighbor)?;
            shape.set_direction(node, neighbor, direction)?;
        }
    }
    Ok(shape)
}

/// Scans the proof backwards for unit clauses over standard variables and
/// picks one of the first two uniformly at random.
fn pick_subdivision_variable(
    proof: &[ProofLine],
    rng: &mut StdRng,
    variables: &Variables,
) -> Result<i32, Error> {
    let mut units = Vec::new();
    for line in proof.iter().rev() {
        if line.literals.len() == 1 && variables.is_standard(line.literals[0].abs()) {
            units.push(line.literals[0]);
        }
    }
    if units.is_empty() {
        return Err(Error::SolverFailure(
            "unsatisfiability proof has no unit clause over a standard variable".into(),
        ));
    }
    let pick = rng.gen_range(0..units.len().min(2));
    Ok(units[pick].abs())
}

/// Replaces the undirected edge `(from, to)` with a two-edge chain through
/// a fresh red bend node and splices the bend into every cycle that runs
/// through the edge.
fn subdivide_edge(
    graph: &mut Graph,
    attributes: &mut GraphAttributes,
    cycles: &mut [Vec<NodeId>],
    from: NodeId,
    to: NodeId,
) -> Result<NodeId, Error> {
    let bend = graph.add_node();
    attributes.set_node_color(bend, Color::Red)?;
    graph.remove_undirected_edge(from, to)?;
    graph.add_undirected_edge(from, bend)?;
    graph.add_undirected_edge(to, bend)?;
    for cycle in cycles.iter_mut() {
        for position in 0..cycle.len() {
            let a = cycle[position];
            let b = cycle[(position + 1) % cycle.len()];
            if (a == from && b == to) || (a == to && b == from) {
                cycle.insert(position + 1, bend);
                break;
            }
        }
    }
    Ok(bend)
}
