//! Drops bends that do not turn.
//!
//! A red node has exactly two incident edges. When both carry the same
//! orientation the bend is useless: the node is removed and its neighbors
//! are joined directly with the direction the chain already had.

use log::info;

use ortho_graph::{Color, Graph, GraphAttributes, NodeId};

use crate::positions::Positions;
use crate::shape::Shape;
use crate::Error;

/// Removes every useless red bend and returns how many were dropped.
/// Idempotent: a second pass finds nothing left to remove.
pub fn remove_useless_bends(
    graph: &mut Graph,
    attributes: &GraphAttributes,
    shape: &mut Shape,
    positions: &mut Positions,
) -> Result<usize, Error> {
    let mut candidates = Vec::new();
    for node in graph.node_ids() {
        if attributes.node_color(node)? == Color::Black {
            continue;
        }
        let (first, second) = bend_neighbors(graph, node)?;
        if shape.is_horizontal(node, first)? == shape.is_horizontal(node, second)? {
            candidates.push(node);
        }
    }
    for &node in &candidates {
        // Neighbors are re-read here: removing an adjacent useless bend
        // re-wires this one onto the replacement edge.
        let (first, second) = bend_neighbors(graph, node)?;
        let direction = shape.direction(first, node)?;
        graph.remove_node(node)?;
        graph.add_undirected_edge(first, second)?;
        shape.remove_direction(node, first)?;
        shape.remove_direction(node, second)?;
        shape.remove_direction(first, node)?;
        shape.remove_direction(second, node)?;
        shape.set_direction(first, second, direction)?;
        shape.set_direction(second, first, direction.opposite())?;
        positions.remove(node)?;
    }
    if !candidates.is_empty() {
        info!("removed {} useless bends", candidates.len());
    }
    Ok(candidates.len())
}

fn bend_neighbors(graph: &Graph, node: NodeId) -> Result<(NodeId, NodeId), Error> {
    let neighbors: Vec<NodeId> = graph.neighbors(node).collect();
    if neighbors.len() != 2 {
        return Err(Error::ShapeInvariant(format!(
            "bend node {node} has {} incident edges instead of two",
            neighbors.len()
        )));
    }
    Ok((neighbors[0], neighbors[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Direction;

    fn with_direction(shape: &mut Shape, from: NodeId, to: NodeId, direction: Direction) {
        shape.set_direction(from, to, direction).unwrap();
        shape.set_direction(to, from, direction.opposite()).unwrap();
    }

    /// 0 -right- 2 -right- 1 with 2 red: a bend that does not turn.
    fn flat_bend() -> (Graph, GraphAttributes, Shape, Positions) {
        let mut graph = Graph::new();
        let mut attributes = GraphAttributes::new();
        for (id, color) in [(0, Color::Black), (1, Color::Black), (2, Color::Red)] {
            graph.add_node_with_id(id).unwrap();
            attributes.set_node_color(id, color).unwrap();
        }
        graph.add_undirected_edge(0, 2).unwrap();
        graph.add_undirected_edge(2, 1).unwrap();
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 2, Direction::Right);
        with_direction(&mut shape, 2, 1, Direction::Right);
        let mut positions = Positions::new();
        positions.set(0, 0, 0).unwrap();
        positions.set(2, 1, 0).unwrap();
        positions.set(1, 2, 0).unwrap();
        (graph, attributes, shape, positions)
    }

    #[test]
    fn flat_bend_is_removed() {
        let (mut graph, attributes, mut shape, mut positions) = flat_bend();
        let removed =
            remove_useless_bends(&mut graph, &attributes, &mut shape, &mut positions).unwrap();
        assert_eq!(removed, 1);
        assert!(!graph.has_node(2));
        assert!(graph.has_edge(0, 1));
        assert_eq!(shape.direction(0, 1).unwrap(), Direction::Right);
        assert_eq!(shape.direction(1, 0).unwrap(), Direction::Left);
        assert!(!positions.has(2));
    }

    #[test]
    fn refinement_is_idempotent() {
        let (mut graph, attributes, mut shape, mut positions) = flat_bend();
        remove_useless_bends(&mut graph, &attributes, &mut shape, &mut positions).unwrap();
        let removed_again =
            remove_useless_bends(&mut graph, &attributes, &mut shape, &mut positions).unwrap();
        assert_eq!(removed_again, 0);
    }

    #[test]
    fn turning_bend_is_kept() {
        let mut graph = Graph::new();
        let mut attributes = GraphAttributes::new();
        for (id, color) in [(0, Color::Black), (1, Color::Black), (2, Color::Red)] {
            graph.add_node_with_id(id).unwrap();
            attributes.set_node_color(id, color).unwrap();
        }
        graph.add_undirected_edge(0, 2).unwrap();
        graph.add_undirected_edge(2, 1).unwrap();
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 2, Direction::Right);
        with_direction(&mut shape, 2, 1, Direction::Up);
        let mut positions = Positions::new();
        positions.set(0, 0, 0).unwrap();
        positions.set(2, 1, 0).unwrap();
        positions.set(1, 1, 1).unwrap();

        let removed =
            remove_useless_bends(&mut graph, &attributes, &mut shape, &mut positions).unwrap();
        assert_eq!(removed, 0);
        assert!(graph.has_node(2));
    }

    #[test]
    fn chain_of_flat_bends_collapses() {
        // 0 -right- 2 -right- 3 -right- 1 with 2 and 3 red.
        let mut graph = Graph::new();
        let mut attributes = GraphAttributes::new();
        for (id, color) in [
            (0, Color::Black),
            (1, Color::Black),
            (2, Color::Red),
            (3, Color::Red),
        ] {
            graph.add_node_with_id(id).unwrap();
            attributes.set_node_color(id, color).unwrap();
        }
        graph.add_undirected_edge(0, 2).unwrap();
        graph.add_undirected_edge(2, 3).unwrap();
        graph.add_undirected_edge(3, 1).unwrap();
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 2, Direction::Right);
        with_direction(&mut shape, 2, 3, Direction::Right);
        with_direction(&mut shape, 3, 1, Direction::Right);
        let mut positions = Positions::new();
        positions.set(0, 0, 0).unwrap();
        positions.set(2, 1, 0).unwrap();
        positions.set(3, 2, 0).unwrap();
        positions.set(1, 3, 0).unwrap();

        let removed =
            remove_useless_bends(&mut graph, &attributes, &mut shape, &mut positions).unwrap();
        assert_eq!(removed, 2);
        assert!(graph.has_edge(0, 1));
        assert_eq!(shape.direction(0, 1).unwrap(), Direction::Right);
        assert_eq!(graph.node_count(), 2);
    }
}
