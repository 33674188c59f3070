//! Coordinate synthesis: class-ordering graphs, realisability check and
//! integer coordinates.
//!
//! Each axis gets a directed graph over class ids. A shape edge pointing
//! right adds an arc between the two x-classes, an edge pointing up adds
//! one between the y-classes. Acyclic orderings are topologically sorted
//! and a class's coordinate is its position in the sort; a cycle proves the
//! shape unrealisable and is lifted back to the input graph so the shape
//! builder can constrain it away.

use fxhash::{FxHashMap, FxHashSet};
use log::debug;

use ortho_graph::{algo, Graph, GraphAttributes, NodeId};

use crate::classes::{build_equivalence_classes, EquivalenceClasses};
use crate::positions::Positions;
use crate::shape::{Direction, Shape};
use crate::Error;

/// Outcome of one coordinate-synthesis round.
#[derive(Debug)]
pub enum CoordinateSynthesis {
    /// Both orderings were acyclic; every node has a position.
    Placed(Positions),
    /// At least one ordering was cyclic; the lifted cycles must be added to
    /// the shape constraints before retrying.
    CyclesToAdd(Vec<Vec<NodeId>>),
}

/// Derives positions from a shape, or reports the cycles that prove the
/// shape unrealisable.
pub fn synthesize_coordinates(
    shape: &Shape,
    graph: &Graph,
) -> Result<CoordinateSynthesis, Error> {
    let (classes_x, classes_y) = build_equivalence_classes(shape, graph)?;
    let (ordering_x, labels_x) =
        build_ordering(&classes_x, graph, shape, Direction::Right)?;
    let (ordering_y, labels_y) = build_ordering(&classes_y, graph, shape, Direction::Up)?;

    let cycle_x = algo::find_cycle_directed(&ordering_x);
    let cycle_y = algo::find_cycle_directed(&ordering_y);
    if cycle_x.is_some() || cycle_y.is_some() {
        let lifted = match cycle_x {
            Some(cycle) => lift_cycle(graph, shape, &cycle, &ordering_x, &labels_x, false)?,
            None => {
                let cycle = cycle_y.expect("one ordering is cyclic");
                lift_cycle(graph, shape, &cycle, &ordering_y, &labels_y, true)?
            }
        };
        debug!("ordering graph is cyclic; lifted cycle {lifted:?}");
        return Ok(CoordinateSynthesis::CyclesToAdd(vec![lifted]));
    }

    let order_x = algo::topological_order(&ordering_x)?;
    let order_y = algo::topological_order(&ordering_y)?;
    let mut x_of: FxHashMap<NodeId, i32> = FxHashMap::default();
    for (coordinate, &class) in order_x.iter().enumerate() {
        for &node in classes_x.members(class)? {
            x_of.insert(node, coordinate as i32);
        }
    }
    let mut y_of: FxHashMap<NodeId, i32> = FxHashMap::default();
    for (coordinate, &class) in order_y.iter().enumerate() {
        for &node in classes_y.members(class)? {
            y_of.insert(node, coordinate as i32);
        }
    }
    let mut positions = Positions::new();
    for node in graph.node_ids() {
        let x = x_of
            .get(&node)
            .copied()
            .ok_or(Error::MissingPosition(node))?;
        let y = y_of
            .get(&node)
            .copied()
            .ok_or(Error::MissingPosition(node))?;
        positions.set(node, x, y)?;
    }
    Ok(CoordinateSynthesis::Placed(positions))
}

/// Builds the ordering graph of one axis. Every arc carries the backing
/// graph edge in the attribute table, so a cycle among classes can be
/// lifted back to graph nodes.
fn build_ordering(
    classes: &EquivalenceClasses,
    graph: &Graph,
    shape: &Shape,
    forward: Direction,
) -> Result<(Graph, GraphAttributes), Error> {
    let mut ordering = Graph::new();
    let mut labels = GraphAttributes::new();
    for class in classes.class_ids() {
        ordering.add_node_with_id(class)?;
    }
    for node in graph.node_ids() {
        for neighbor in graph.neighbors(node) {
            if shape.direction(node, neighbor)? != forward {
                continue;
            }
            let from_class = classes.class_of(node)?;
            let to_class = classes.class_of(neighbor)?;
            if from_class == to_class || ordering.has_edge(from_class, to_class) {
                continue;
            }
            let edge = ordering.add_edge(from_class, to_class)?;
            labels.set_edge_label(edge, (node, neighbor))?;
        }
    }
    Ok((ordering, labels))
}

/// Lifts a cycle over class ids back to a node cycle of the input graph:
/// each ordering arc contributes its backing edge, and consecutive backing
/// edges are bridged by a path inside the shared class (over vertical edges
/// in an x-class, horizontal ones in a y-class).
fn lift_cycle(
    graph: &Graph,
    shape: &Shape,
    cycle: &[usize],
    ordering: &Graph,
    labels: &GraphAttributes,
    horizontal: bool,
) -> Result<Vec<NodeId>, Error> {
    let mut lifted = Vec::new();
    for position in 0..cycle.len() {
        let class = cycle[position];
        let next_class = cycle[(position + 1) % cycle.len()];
        let edge = ordering.edge_id(class, next_class)?;
        let (from, to) = labels.edge_label(edge)?;
        lifted.push(from);
        let after_next = cycle[(position + 2) % cycle.len()];
        let next_edge = ordering.edge_id(next_class, after_next)?;
        let (next_from, _) = labels.edge_label(next_edge)?;
        if to != next_from {
            let path = path_in_class(graph, to, next_from, shape, horizontal)?;
            lifted.extend_from_slice(&path[..path.len() - 1]);
        }
    }
    Ok(lifted)
}

/// Finds a simple path between two members of one class, walking only
/// edges of the class's orientation. Nodes are released again on
/// backtracking so another branch may pass through them.
fn path_in_class(
    graph: &Graph,
    from: NodeId,
    to: NodeId,
    shape: &Shape,
    horizontal: bool,
) -> Result<Vec<NodeId>, Error> {
    if from == to {
        return Ok(vec![from]);
    }
    struct Frame {
        node: NodeId,
        neighbors: Vec<NodeId>,
        next: usize,
    }
    let mut stack = vec![Frame {
        node: from,
        neighbors: graph.neighbors(from).collect(),
        next: 0,
    }];
    let mut on_path: FxHashSet<NodeId> = FxHashSet::default();
    on_path.insert(from);
    while !stack.is_empty() {
        let top = stack.len() - 1;
        let candidate = {
            let frame = &mut stack[top];
            if frame.next < frame.neighbors.len() {
                frame.next += 1;
                Some(frame.neighbors[frame.next - 1])
            } else {
                None
            }
        };
        match candidate {
            None => {
                let frame = stack.pop().expect("non-empty stack");
                on_path.remove(&frame.node);
            }
            Some(neighbor) => {
                if on_path.contains(&neighbor) {
                    continue;
                }
                if shape.is_horizontal(stack[top].node, neighbor)? != horizontal {
                    continue;
                }
                if neighbor == to {
                    let mut path: Vec<NodeId> =
                        stack.iter().map(|frame| frame.node).collect();
                    path.push(to);
                    return Ok(path);
                }
                on_path.insert(neighbor);
                stack.push(Frame {
                    node: neighbor,
                    neighbors: graph.neighbors(neighbor).collect(),
                    next: 0,
                });
            }
        }
    }
    Err(Error::ShapeInvariant(format!(
        "no in-class path from {from} to {to}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undirected(edges: &[(NodeId, NodeId)]) -> Graph {
        let mut graph = Graph::new();
        let max = edges.iter().map(|&(a, b)| a.max(b)).max().unwrap_or(0);
        for id in 0..=max {
            graph.add_node_with_id(id).unwrap();
        }
        for &(a, b) in edges {
            graph.add_undirected_edge(a, b).unwrap();
        }
        graph
    }

    fn with_direction(shape: &mut Shape, from: NodeId, to: NodeId, direction: Direction) {
        shape.set_direction(from, to, direction).unwrap();
        shape.set_direction(to, from, direction.opposite()).unwrap();
    }

    #[test]
    fn l_shaped_path_is_placed() {
        let graph = undirected(&[(0, 1), (1, 2)]);
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 1, Direction::Right);
        with_direction(&mut shape, 1, 2, Direction::Up);

        let CoordinateSynthesis::Placed(positions) =
            synthesize_coordinates(&shape, &graph).unwrap()
        else {
            panic!("expected a placement");
        };
        assert_eq!(positions.point(0).unwrap(), crate::Point { x: 0, y: 0 });
        assert_eq!(positions.point(1).unwrap(), crate::Point { x: 1, y: 0 });
        assert_eq!(positions.point(2).unwrap(), crate::Point { x: 1, y: 1 });
    }

    #[test]
    fn square_shape_is_placed_on_a_unit_square() {
        let graph = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 1, Direction::Right);
        with_direction(&mut shape, 1, 2, Direction::Up);
        with_direction(&mut shape, 2, 3, Direction::Left);
        with_direction(&mut shape, 3, 0, Direction::Down);

        let CoordinateSynthesis::Placed(positions) =
            synthesize_coordinates(&shape, &graph).unwrap()
        else {
            panic!("expected a placement");
        };
        let points: Vec<crate::Point> = (0..4)
            .map(|node| positions.point(node).unwrap())
            .collect();
        assert_eq!(points[0], crate::Point { x: 0, y: 0 });
        assert_eq!(points[1], crate::Point { x: 1, y: 0 });
        assert_eq!(points[2], crate::Point { x: 1, y: 1 });
        assert_eq!(points[3], crate::Point { x: 0, y: 1 });
    }

    #[test]
    fn staircase_cycle_is_lifted_back_to_the_graph() {
        // A 4-cycle whose shape never turns back: right, up, right, up.
        // The x-ordering holds both "left of" arcs between the two classes.
        let graph = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 1, Direction::Right);
        with_direction(&mut shape, 1, 2, Direction::Up);
        with_direction(&mut shape, 2, 3, Direction::Right);
        with_direction(&mut shape, 3, 0, Direction::Up);

        let CoordinateSynthesis::CyclesToAdd(cycles) =
            synthesize_coordinates(&shape, &graph).unwrap()
        else {
            panic!("expected a lifted cycle");
        };
        assert_eq!(cycles.len(), 1);
        let mut cycle = cycles[0].clone();
        cycle.sort_unstable();
        assert_eq!(cycle, vec![0, 1, 2, 3]);
    }

    #[test]
    fn path_in_class_releases_dead_ends() {
        // 0 - 1 - 2 vertically, with a horizontal stub 1 - 3 that must not
        // trap the search.
        let graph = undirected(&[(0, 1), (1, 2), (1, 3)]);
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 1, Direction::Up);
        with_direction(&mut shape, 1, 2, Direction::Up);
        with_direction(&mut shape, 1, 3, Direction::Right);

        let path = path_in_class(&graph, 0, 2, &shape, false).unwrap();
        assert_eq!(path, vec![0, 1, 2]);
    }
}
