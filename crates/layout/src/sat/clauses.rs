//! The clause families of the shape encoding.
//!
//! Four families constrain a drawing: every edge carries exactly one
//! direction, the edges around a node spread over distinct directions, and
//! every cycle turns through all four compass directions. High-degree nodes
//! get a relaxed per-node family plus the special-variable machinery that
//! models the virtual direction an incident edge pair is collapsed into.

use ortho_graph::{EdgeId, Graph, NodeId};

use crate::sat::cnf::CnfBuilder;
use crate::sat::variables::Variables;
use crate::shape::Direction;
use crate::Error;

/// At most one of four literals is true: for every pair, one is false.
fn at_most_one_of_four(cnf: &mut CnfBuilder, literals: [i32; 4]) {
    let [a, b, c, d] = literals;
    cnf.add_clause(vec![-a, -b]);
    cnf.add_clause(vec![-a, -c]);
    cnf.add_clause(vec![-a, -d]);
    cnf.add_clause(vec![-b, -c]);
    cnf.add_clause(vec![-b, -d]);
    cnf.add_clause(vec![-c, -d]);
}

/// Every undirected edge carries exactly one direction.
pub fn one_direction_per_edge(
    graph: &Graph,
    cnf: &mut CnfBuilder,
    variables: &Variables,
) -> Result<(), Error> {
    for node in graph.node_ids() {
        for neighbor in graph.neighbors(node) {
            if node > neighbor {
                continue;
            }
            let up = variables.variable(node, neighbor, Direction::Up)?;
            let down = variables.variable(node, neighbor, Direction::Down)?;
            let left = variables.variable(node, neighbor, Direction::Left)?;
            let right = variables.variable(node, neighbor, Direction::Right)?;
            cnf.add_clause(vec![up, down, right, left]);
            at_most_one_of_four(cnf, [up, down, left, right]);
        }
    }
    Ok(())
}

/// At least one edge leaves `node` in `direction`.
fn at_least_one_in_direction(
    cnf: &mut CnfBuilder,
    variables: &Variables,
    graph: &Graph,
    node: NodeId,
    direction: Direction,
) -> Result<(), Error> {
    let mut clause = Vec::with_capacity(graph.degree(node));
    for neighbor in graph.neighbors(node) {
        clause.push(variables.variable(node, neighbor, direction)?);
    }
    cnf.add_clause(clause);
    Ok(())
}

fn node_direction_clauses(
    cnf: &mut CnfBuilder,
    variables: &Variables,
    graph: &Graph,
    node: NodeId,
    direction: Direction,
) -> Result<(), Error> {
    let degree = graph.degree(node);
    match degree {
        4 => at_least_one_in_direction(cnf, variables, graph, node, direction)?,
        3 => {
            let literals: Vec<i32> = graph
                .neighbors(node)
                .map(|neighbor| variables.variable(node, neighbor, direction))
                .collect::<Result<_, _>>()?;
            cnf.add_clause(vec![-literals[0], -literals[1]]);
            cnf.add_clause(vec![-literals[0], -literals[2]]);
            cnf.add_clause(vec![-literals[1], -literals[2]]);
        }
        2 => {
            let clause: Vec<i32> = graph
                .neighbors(node)
                .map(|neighbor| variables.variable(node, neighbor, direction).map(|v| -v))
                .collect::<Result<_, _>>()?;
            cnf.add_clause(clause);
        }
        0 | 1 => {}
        _ => {
            return Err(Error::ShapeInvariant(format!(
                "node {node} has degree {degree} in the low-degree encoding"
            )))
        }
    }
    Ok(())
}

/// Per-node constraints for graphs of maximum degree four: the incident
/// edges of a node point in pairwise distinct directions.
pub fn node_constraints(
    graph: &Graph,
    cnf: &mut CnfBuilder,
    variables: &Variables,
) -> Result<(), Error> {
    for node in graph.node_ids() {
        for direction in Direction::ALL {
            node_direction_clauses(cnf, variables, graph, node, direction)?;
        }
    }
    Ok(())
}

/// Per-node constraints when high-degree nodes stay in the encoding: low
/// degrees keep the exact constraints, high degrees only demand at least
/// one incident edge per direction and let several edges collapse into the
/// same one.
pub fn node_constraints_any_degree(
    graph: &Graph,
    cnf: &mut CnfBuilder,
    variables: &Variables,
) -> Result<(), Error> {
    for node in graph.node_ids() {
        if graph.degree(node) <= 4 {
            for direction in Direction::ALL {
                node_direction_clauses(cnf, variables, graph, node, direction)?;
            }
        } else {
            for direction in Direction::ALL {
                at_least_one_in_direction(cnf, variables, graph, node, direction)?;
            }
        }
    }
    Ok(())
}

/// An orthogonal cycle must have at least one segment in every compass
/// direction.
pub fn cycle_constraints(
    cnf: &mut CnfBuilder,
    variables: &Variables,
    cycles: &[Vec<NodeId>],
) -> Result<(), Error> {
    for cycle in cycles {
        for direction in Direction::ALL {
            let mut clause = Vec::with_capacity(cycle.len());
            for position in 0..cycle.len() {
                let from = cycle[position];
                let to = cycle[(position + 1) % cycle.len()];
                clause.push(variables.variable(from, to, direction)?);
            }
            cnf.add_clause(clause);
        }
    }
    Ok(())
}

/// Ties a special-variable pair to the requirement that both edges carry
/// one of two given directions, via four Tseitin auxiliaries:
/// `special_1 ∨ special_2  ↔  (both edges dir_1) ∨ (both edges dir_2)`,
/// encoded one implication at a time.
fn special_implies_same_directions(
    variables: &mut Variables,
    cnf: &mut CnfBuilder,
    special_1: i32,
    special_2: i32,
    edge_1_dir_1: i32,
    edge_1_dir_2: i32,
    edge_2_dir_1: i32,
    edge_2_dir_2: i32,
) {
    let any_special = variables.fresh_auxiliary();
    let both_dir_1 = variables.fresh_auxiliary();
    let both_dir_2 = variables.fresh_auxiliary();
    let either_pair = variables.fresh_auxiliary();

    cnf.add_clause(vec![-any_special, special_1, special_2]);
    cnf.add_clause(vec![-special_1, any_special]);
    cnf.add_clause(vec![-special_2, any_special]);

    cnf.add_clause(vec![-both_dir_1, edge_1_dir_1]);
    cnf.add_clause(vec![-both_dir_1, edge_2_dir_1]);
    cnf.add_clause(vec![both_dir_1, -edge_1_dir_1, -edge_2_dir_1]);

    cnf.add_clause(vec![-both_dir_2, edge_1_dir_2]);
    cnf.add_clause(vec![-both_dir_2, edge_2_dir_2]);
    cnf.add_clause(vec![both_dir_2, -edge_1_dir_2, -edge_2_dir_2]);

    cnf.add_clause(vec![-either_pair, both_dir_1, both_dir_2]);
    cnf.add_clause(vec![-both_dir_1, either_pair]);
    cnf.add_clause(vec![-both_dir_2, either_pair]);

    cnf.add_clause(vec![-any_special, either_pair]);
}

fn special_pair_clauses(
    graph: &Graph,
    cnf: &mut CnfBuilder,
    variables: &mut Variables,
    edge_1: EdgeId,
    edge_2: EdgeId,
) -> Result<(), Error> {
    let (from_1, to_1) = graph.edge_endpoints(edge_1)?;
    let (from_2, to_2) = graph.edge_endpoints(edge_2)?;
    if from_1 != from_2 {
        return Err(Error::ShapeInvariant(format!(
            "edges {edge_1} and {edge_2} do not share a source node"
        )));
    }
    // Two incident edges leaving in the same direction force the node to be
    // split perpendicularly, and vice versa.
    for direction in Direction::ALL {
        let perpendicular = direction.rotated();
        let edge_1_var = variables.variable(from_1, to_1, direction)?;
        let edge_2_var = variables.variable(from_2, to_2, direction)?;
        let special_1 = variables.special_variable(edge_1, edge_2, perpendicular)?;
        let special_2 =
            variables.special_variable(edge_1, edge_2, perpendicular.opposite())?;
        cnf.add_clause(vec![-edge_1_var, -edge_2_var, special_1, special_2]);
    }

    let special_right = variables.special_variable(edge_1, edge_2, Direction::Right)?;
    let special_left = variables.special_variable(edge_1, edge_2, Direction::Left)?;
    let special_up = variables.special_variable(edge_1, edge_2, Direction::Up)?;
    let special_down = variables.special_variable(edge_1, edge_2, Direction::Down)?;
    at_most_one_of_four(cnf, [special_right, special_left, special_up, special_down]);

    let edge_1_down = variables.variable(from_1, to_1, Direction::Down)?;
    let edge_1_up = variables.variable(from_1, to_1, Direction::Up)?;
    let edge_2_down = variables.variable(from_2, to_2, Direction::Down)?;
    let edge_2_up = variables.variable(from_2, to_2, Direction::Up)?;
    special_implies_same_directions(
        variables,
        cnf,
        special_right,
        special_left,
        edge_1_down,
        edge_1_up,
        edge_2_down,
        edge_2_up,
    );
    let edge_1_right = variables.variable(from_1, to_1, Direction::Right)?;
    let edge_1_left = variables.variable(from_1, to_1, Direction::Left)?;
    let edge_2_right = variables.variable(from_2, to_2, Direction::Right)?;
    let edge_2_left = variables.variable(from_2, to_2, Direction::Left)?;
    special_implies_same_directions(
        variables,
        cnf,
        special_up,
        special_down,
        edge_1_right,
        edge_1_left,
        edge_2_right,
        edge_2_left,
    );
    Ok(())
}

/// Special-variable constraints for every pair of edges incident to a
/// high-degree node.
pub fn special_edge_constraints(
    graph: &Graph,
    cnf: &mut CnfBuilder,
    variables: &mut Variables,
) -> Result<(), Error> {
    for node in graph.node_ids() {
        if graph.degree(node) <= 4 {
            continue;
        }
        let edges: Vec<EdgeId> = graph.out_edges(node).collect();
        for (position, &first) in edges.iter().enumerate() {
            for &second in &edges[position + 1..] {
                let (edge_1, edge_2) = if first < second {
                    (first, second)
                } else {
                    (second, first)
                };
                special_pair_clauses(graph, cnf, variables, edge_1, edge_2)?;
            }
        }
    }
    Ok(())
}

/// Cycle constraints that let a cycle turn "through" a high-degree node:
/// the special variables of the two cycle edges at such a node join the
/// at-least-one clause of every direction.
pub fn cycle_constraints_any_degree(
    graph: &Graph,
    cnf: &mut CnfBuilder,
    variables: &Variables,
    cycles: &[Vec<NodeId>],
) -> Result<(), Error> {
    for cycle in cycles {
        let mut clauses: [Vec<i32>; 4] = Default::default();
        for position in 0..cycle.len() {
            let from = cycle[position];
            let to = cycle[(position + 1) % cycle.len()];
            for (slot, direction) in Direction::ALL.into_iter().enumerate() {
                clauses[slot].push(variables.variable(from, to, direction)?);
            }
        }
        for position in 0..cycle.len() {
            let node = cycle[position];
            if graph.degree(node) <= 4 {
                continue;
            }
            let previous = cycle[(position + cycle.len() - 1) % cycle.len()];
            let next = cycle[(position + 1) % cycle.len()];
            let mut edge_1 = graph.edge_id(node, previous)?;
            let mut edge_2 = graph.edge_id(node, next)?;
            if edge_1 > edge_2 {
                std::mem::swap(&mut edge_1, &mut edge_2);
            }
            for (slot, direction) in Direction::ALL.into_iter().enumerate() {
                clauses[slot].push(variables.special_variable(edge_1, edge_2, direction)?);
            }
        }
        for clause in clauses {
            cnf.add_clause(clause);
        }
    }
    Ok(())
}
