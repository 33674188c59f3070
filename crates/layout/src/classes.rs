//! Equivalence classes of collinear nodes.
//!
//! An x-class is a connected component of the subgraph induced by the
//! vertical shape edges: all of its members must share an x coordinate.
//! The y-classes are built symmetrically from the horizontal edges. Every
//! node belongs to exactly one class per axis.

use fxhash::FxHashMap;

use ortho_graph::{Graph, NodeId};

use crate::shape::Shape;
use crate::Error;

/// A partition of node ids into dense class ids `0..class_count`.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceClasses {
    class_of: FxHashMap<NodeId, usize>,
    members: Vec<Vec<NodeId>>,
}

impl EquivalenceClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, node: NodeId, class: usize) -> Result<(), Error> {
        if self.class_of.contains_key(&node) {
            return Err(Error::ShapeInvariant(format!(
                "node {node} is already assigned to a class"
            )));
        }
        if class >= self.members.len() {
            self.members.resize(class + 1, Vec::new());
        }
        self.class_of.insert(node, class);
        self.members[class].push(node);
        Ok(())
    }

    pub fn has(&self, node: NodeId) -> bool {
        self.class_of.contains_key(&node)
    }

    pub fn class_of(&self, node: NodeId) -> Result<usize, Error> {
        self.class_of.get(&node).copied().ok_or_else(|| {
            Error::ShapeInvariant(format!("node {node} has no assigned class"))
        })
    }

    pub fn members(&self, class: usize) -> Result<&[NodeId], Error> {
        self.members
            .get(class)
            .map(|members| members.as_slice())
            .ok_or_else(|| Error::ShapeInvariant(format!("class {class} does not exist")))
    }

    pub fn class_count(&self) -> usize {
        self.members.len()
    }

    pub fn class_ids(&self) -> impl Iterator<Item = usize> {
        0..self.members.len()
    }
}

/// Floods from `root` over edges whose orientation matches `horizontal`,
/// assigning every reached node to `class`.
fn expand_class(
    shape: &Shape,
    graph: &Graph,
    root: NodeId,
    class: usize,
    horizontal: bool,
    classes: &mut EquivalenceClasses,
) -> Result<(), Error> {
    classes.assign(root, class)?;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for neighbor in graph.neighbors(node) {
            if classes.has(neighbor) {
                continue;
            }
            if shape.is_horizontal(node, neighbor)? != horizontal {
                continue;
            }
            classes.assign(neighbor, class)?;
            stack.push(neighbor);
        }
    }
    Ok(())
}

/// Builds both partitions in one pass over the nodes.
pub fn build_equivalence_classes(
    shape: &Shape,
    graph: &Graph,
) -> Result<(EquivalenceClasses, EquivalenceClasses), Error> {
    let mut classes_x = EquivalenceClasses::new();
    let mut classes_y = EquivalenceClasses::new();
    let mut next_x = 0;
    let mut next_y = 0;
    for node in graph.node_ids() {
        if !classes_y.has(node) {
            expand_class(shape, graph, node, next_y, true, &mut classes_y)?;
            next_y += 1;
        }
        if !classes_x.has(node) {
            expand_class(shape, graph, node, next_x, false, &mut classes_x)?;
            next_x += 1;
        }
    }
    Ok((classes_x, classes_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Direction;

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
    fn l_shaped_path_classes() {
        // 0 -right- 1 -up- 2
        let graph = undirected(&[(0, 1), (1, 2)]);
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 1, Direction::Right);
        with_direction(&mut shape, 1, 2, Direction::Up);

        let (classes_x, classes_y) = build_equivalence_classes(&shape, &graph).unwrap();

        // 1 and 2 share an x; 0 and 1 share a y.
        assert_eq!(
            classes_x.class_of(1).unwrap(),
            classes_x.class_of(2).unwrap()
        );
        assert_ne!(
            classes_x.class_of(0).unwrap(),
            classes_x.class_of(1).unwrap()
        );
        assert_eq!(
            classes_y.class_of(0).unwrap(),
            classes_y.class_of(1).unwrap()
        );
        assert_ne!(
            classes_y.class_of(1).unwrap(),
            classes_y.class_of(2).unwrap()
        );
        assert_eq!(classes_x.class_count(), 2);
        assert_eq!(classes_y.class_count(), 2);
    }

    #[test]
    fn every_node_lands_in_one_class_per_axis() {
        let graph = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let mut shape = Shape::new();
        with_direction(&mut shape, 0, 1, Direction::Right);
        with_direction(&mut shape, 1, 2, Direction::Up);
        with_direction(&mut shape, 2, 3, Direction::Left);
        with_direction(&mut shape, 3, 0, Direction::Down);

        let (classes_x, classes_y) = build_equivalence_classes(&shape, &graph).unwrap();
        for node in graph.node_ids() {
            assert!(classes_x.class_of(node).is_ok());
            assert!(classes_y.class_of(node).is_ok());
        }
        let x_total: usize = classes_x
            .class_ids()
            .map(|class| classes_x.members(class).unwrap().len())
            .sum();
        assert_eq!(x_total, 4);
        assert_eq!(classes_x.class_count(), 2);
        assert_eq!(classes_y.class_count(), 2);
    }

    #[test]
    fn assigning_twice_fails() {
        let mut classes = EquivalenceClasses::new();
        classes.assign(0, 0).unwrap();
        assert!(classes.assign(0, 1).is_err());
    }
}
