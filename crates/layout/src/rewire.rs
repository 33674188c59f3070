//! High-degree rewiring.
//!
//! A node with more than four incident edges cannot be drawn orthogonally
//! as-is. The any-degree path extracts a maximal subgraph of degree at most
//! four, draws it, and splices every removed edge back in as a chain of
//! two or three red bends. Room for a chain is made by shifting whole
//! half-planes of the existing layout by one unit, so no shift can cross
//! the new chain.

use std::collections::BTreeSet;

use log::debug;

use ortho_graph::{chain_key, Color, Graph, GraphAttributes, NodeId};

use crate::positions::{Point, Positions};
use crate::shape::{Direction, Shape};
use crate::Error;

/// Accepts edges in deterministic order as long as both endpoints still
/// have degree below four; everything else is reported as removed, each
/// undirected pair once with the smaller endpoint first.
pub fn extract_max_degree_4_subgraph(
    graph: &Graph,
) -> Result<(Graph, Vec<(NodeId, NodeId)>), Error> {
    let mut subgraph = Graph::new();
    for node in graph.node_ids() {
        subgraph.add_node_with_id(node)?;
    }
    let mut removed = Vec::new();
    for node in graph.node_ids() {
        for neighbor in graph.neighbors(node) {
            if subgraph.has_edge(node, neighbor) {
                continue;
            }
            if removed.contains(&(node.min(neighbor), node.max(neighbor))) {
                continue;
            }
            if subgraph.degree(node) < 4 && subgraph.degree(neighbor) < 4 {
                subgraph.add_undirected_edge(node, neighbor)?;
            } else {
                removed.push((node.min(neighbor), node.max(neighbor)));
            }
        }
    }
    debug!(
        "degree-4 extraction kept {} directed edges, removed {} undirected edges",
        subgraph.edge_count(),
        removed.len()
    );
    Ok((subgraph, removed))
}

/// Whether the open interval `(low, high)` of rows or columns is unused.
fn segment_is_free(low: i32, high: i32, used: &BTreeSet<i32>) -> bool {
    used.range(low + 1..high).next().is_none()
}

/// Splices one removed edge `(i, j)` back into the drawing as a bend
/// chain, then translates the layout back into the positive quadrant.
pub fn splice_removed_edge(
    graph: &mut Graph,
    attributes: &mut GraphAttributes,
    shape: &mut Shape,
    positions: &mut Positions,
    edge: (NodeId, NodeId),
    bends: &mut usize,
) -> Result<(), Error> {
    let (i, j) = if edge.0 < edge.1 {
        edge
    } else {
        (edge.1, edge.0)
    };
    let mut used_x = BTreeSet::new();
    let mut used_y = BTreeSet::new();
    for (_, point) in positions.iter() {
        used_x.insert(point.x);
        used_y.insert(point.y);
    }

    let pi = positions.point(i)?;
    let pj = positions.point(j)?;
    use Direction::{Down, Left, Right, Up};
    if pi.x > pj.x && pi.y > pj.y {
        if segment_is_free(pj.x, pi.x, &used_x) {
            split_and_rewire(i, j, Left, Down, Corridor::X, graph, attributes, shape, positions, bends)?;
        } else if segment_is_free(pj.y, pi.y, &used_y) {
            split_and_rewire(i, j, Down, Left, Corridor::Y, graph, attributes, shape, positions, bends)?;
        } else {
            split_and_rewire(i, j, Down, Left, Corridor::None, graph, attributes, shape, positions, bends)?;
        }
    } else if pi.x < pj.x && pi.y < pj.y {
        if segment_is_free(pi.x, pj.x, &used_x) {
            split_and_rewire(i, j, Right, Up, Corridor::X, graph, attributes, shape, positions, bends)?;
        } else if segment_is_free(pi.y, pj.y, &used_y) {
            split_and_rewire(i, j, Up, Right, Corridor::Y, graph, attributes, shape, positions, bends)?;
        } else {
            split_and_rewire(i, j, Up, Right, Corridor::None, graph, attributes, shape, positions, bends)?;
        }
    } else if pi.x > pj.x && pi.y < pj.y {
        if segment_is_free(pj.x, pi.x, &used_x) {
            split_and_rewire(i, j, Left, Up, Corridor::X, graph, attributes, shape, positions, bends)?;
        } else if segment_is_free(pi.y, pj.y, &used_y) {
            split_and_rewire(i, j, Up, Left, Corridor::Y, graph, attributes, shape, positions, bends)?;
        } else {
            split_and_rewire(i, j, Left, Up, Corridor::None, graph, attributes, shape, positions, bends)?;
        }
    } else if pi.x < pj.x && pi.y > pj.y {
        if segment_is_free(pi.x, pj.x, &used_x) {
            split_and_rewire(i, j, Right, Down, Corridor::X, graph, attributes, shape, positions, bends)?;
        } else if segment_is_free(pj.y, pi.y, &used_y) {
            split_and_rewire(i, j, Down, Right, Corridor::Y, graph, attributes, shape, positions, bends)?;
        } else {
            split_and_rewire(i, j, Right, Down, Corridor::None, graph, attributes, shape, positions, bends)?;
        }
    } else if pi.y == pj.y && pi.x < pj.x {
        split_and_rewire(i, j, Up, Right, Corridor::Aligned, graph, attributes, shape, positions, bends)?;
    } else if pi.y == pj.y && pi.x > pj.x {
        split_and_rewire(i, j, Up, Left, Corridor::Aligned, graph, attributes, shape, positions, bends)?;
    } else if pi.x == pj.x && pi.y < pj.y {
        split_and_rewire(i, j, Right, Up, Corridor::Aligned, graph, attributes, shape, positions, bends)?;
    } else if pi.x == pj.x && pi.y > pj.y {
        split_and_rewire(i, j, Right, Down, Corridor::Aligned, graph, attributes, shape, positions, bends)?;
    }

    positions.normalize();
    Ok(())
}

/// How the chain can travel between the endpoints.
#[derive(Clone, Copy, PartialEq)]
enum Corridor {
    /// The columns strictly between the endpoints are unused.
    X,
    /// The rows strictly between the endpoints are unused.
    Y,
    /// Neither corridor is free; the chain takes a fourth segment.
    None,
    /// The endpoints share a row or column.
    Aligned,
}

/// Inserts the bend chain for edge `(i, j)`.
///
/// `toward_i` is the direction of the chain's first segment as seen from
/// the far side, `across` the direction of the middle segment. Existing
/// coordinates shift by one in the half-plane behind the chain so the
/// freed row or column can host it.
#[allow(clippy::too_many_arguments)]
fn split_and_rewire(
    i: NodeId,
    j: NodeId,
    toward_i: Direction,
    across: Direction,
    corridor: Corridor,
    graph: &mut Graph,
    attributes: &mut GraphAttributes,
    shape: &mut Shape,
    positions: &mut Positions,
    bends: &mut usize,
) -> Result<(), Error> {
    let first = graph.add_node();
    attributes.set_node_color(first, Color::Red)?;
    let second = graph.add_node();
    attributes.set_node_color(second, Color::Red)?;
    let third = if corridor == Corridor::None {
        let third = graph.add_node();
        attributes.set_node_color(third, Color::Red)?;
        Some(third)
    } else {
        None
    };
    *bends += if third.is_some() { 3 } else { 2 };

    let pi = positions.point(i)?;
    let pj = positions.point(j)?;
    let anchor_first = pi;
    let mut anchor_second = pj;
    let anchor_third = pj;

    match corridor {
        Corridor::Aligned => match toward_i {
            Direction::Up => positions.shift_down_upto(pi.y),
            Direction::Right => positions.shift_left_upto(pi.x),
            _ => {}
        },
        _ => match toward_i {
            Direction::Left => {
                anchor_second = Point { x: pi.x, y: pj.y };
                positions.shift_right_from(pi.x);
                if across == Direction::Up {
                    positions.shift_up_from(pj.y);
                } else {
                    positions.shift_down_upto(pj.y);
                }
            }
            Direction::Up => {
                anchor_second = Point { x: pj.x, y: pi.y };
                if across == Direction::Right {
                    positions.shift_right_from(pj.x);
                } else {
                    positions.shift_left_upto(pj.x);
                }
                positions.shift_down_upto(pi.y);
            }
            Direction::Right => {
                anchor_second = Point { x: pi.x, y: pj.y };
                positions.shift_left_upto(pi.x);
                if across == Direction::Down {
                    positions.shift_down_upto(pj.y);
                } else {
                    positions.shift_up_from(pj.y);
                }
            }
            Direction::Down => {
                anchor_second = Point { x: pj.x, y: pi.y };
                positions.shift_up_from(pi.y);
                if across == Direction::Left {
                    positions.shift_left_upto(pj.x);
                } else {
                    positions.shift_right_from(pj.x);
                }
            }
        },
    }

    positions.set(first, anchor_first.x, anchor_first.y)?;
    match corridor {
        Corridor::Aligned => {
            positions.set(second, anchor_second.x, anchor_second.y)?;
        }
        Corridor::Y => {
            let x = positions.x(j)?;
            positions.set(second, x, anchor_second.y)?;
        }
        Corridor::X => {
            let y = positions.y(j)?;
            positions.set(second, anchor_second.x, y)?;
        }
        Corridor::None => {
            positions.set(second, anchor_second.x, anchor_second.y)?;
            let third = third.expect("fourth segment allocates a third bend");
            positions.set(third, anchor_third.x, anchor_third.y)?;
        }
    }

    let mut chain = vec![i, first, second];
    if let Some(third) = third {
        chain.push(third);
    }
    chain.push(j);
    let key = chain_key(i, j);
    for window in chain.windows(2) {
        let (from, to) = (window[0], window[1]);
        graph.add_undirected_edge(from, to)?;
        let direction = direction_between(positions.point(from)?, positions.point(to)?)?;
        shape.set_direction(from, to, direction)?;
        shape.set_direction(to, from, direction.opposite())?;
        attributes.push_chain_edge(key, (from, to));
    }
    Ok(())
}

/// Direction of the axis-aligned segment from one point to another.
fn direction_between(from: Point, to: Point) -> Result<Direction, Error> {
    if from.y == to.y && to.x > from.x {
        Ok(Direction::Right)
    } else if from.y == to.y && to.x < from.x {
        Ok(Direction::Left)
    } else if from.x == to.x && to.y > from.y {
        Ok(Direction::Up)
    } else if from.x == to.x && to.y < from.y {
        Ok(Direction::Down)
    } else {
        Err(Error::ShapeInvariant(format!(
            "segment from ({}, {}) to ({}, {}) is not axis-aligned",
            from.x, from.y, to.x, to.y
        )))
    }
}
