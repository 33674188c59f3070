use fxhash::FxHashMap;

use crate::graph::{EdgeId, NodeId};
use crate::Error;

/// Colour of a node of the augmented graph. `Black` marks an original vertex,
/// `Red` a bend inserted during shape repair or high-degree rewiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
}

/// Key under which the bend chain of a reinserted edge `(i, j)` is stored.
pub fn chain_key(i: NodeId, j: NodeId) -> usize {
    (i << 16) ^ j
}

/// Per-id side table for node and edge attributes.
///
/// One typed map per attribute kind. Writing an already-set entry and reading
/// an unset one are invariant violations and fail.
#[derive(Debug, Clone, Default)]
pub struct GraphAttributes {
    node_colors: FxHashMap<NodeId, Color>,
    edge_labels: FxHashMap<EdgeId, (NodeId, NodeId)>,
    chain_edges: FxHashMap<usize, Vec<(NodeId, NodeId)>>,
}

impl GraphAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_node_color(&mut self, node: NodeId, color: Color) -> Result<(), Error> {
        if self.node_colors.contains_key(&node) {
            return Err(Error::AttributeAlreadySet(node));
        }
        self.node_colors.insert(node, color);
        Ok(())
    }

    pub fn node_color(&self, node: NodeId) -> Result<Color, Error> {
        self.node_colors
            .get(&node)
            .copied()
            .ok_or(Error::AttributeNotSet(node))
    }

    pub fn node_colors(&self) -> impl Iterator<Item = (NodeId, Color)> + '_ {
        self.node_colors.iter().map(|(&node, &color)| (node, color))
    }

    /// Attaches the backing graph edge to an ordering-graph edge.
    pub fn set_edge_label(&mut self, edge: EdgeId, label: (NodeId, NodeId)) -> Result<(), Error> {
        if self.edge_labels.contains_key(&edge) {
            return Err(Error::AttributeAlreadySet(edge));
        }
        self.edge_labels.insert(edge, label);
        Ok(())
    }

    pub fn edge_label(&self, edge: EdgeId) -> Result<(NodeId, NodeId), Error> {
        self.edge_labels
            .get(&edge)
            .copied()
            .ok_or(Error::AttributeNotSet(edge))
    }

    /// Appends one segment to the bend chain stored under `key`.
    pub fn push_chain_edge(&mut self, key: usize, segment: (NodeId, NodeId)) {
        self.chain_edges.entry(key).or_default().push(segment);
    }

    pub fn chain_edges(&self, key: usize) -> Result<&[(NodeId, NodeId)], Error> {
        self.chain_edges
            .get(&key)
            .map(|segments| segments.as_slice())
            .ok_or(Error::AttributeNotSet(key))
    }

    pub fn has_chain(&self, key: usize) -> bool {
        self.chain_edges.contains_key(&key)
    }

    /// Chain keys in ascending order.
    pub fn chain_keys(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.chain_edges.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_written_once() {
        let mut attributes = GraphAttributes::new();
        attributes.set_node_color(0, Color::Black).unwrap();
        assert!(matches!(
            attributes.set_node_color(0, Color::Red),
            Err(Error::AttributeAlreadySet(0))
        ));
        assert_eq!(attributes.node_color(0).unwrap(), Color::Black);
    }

    #[test]
    fn reading_unset_color_fails() {
        let attributes = GraphAttributes::new();
        assert!(matches!(
            attributes.node_color(3),
            Err(Error::AttributeNotSet(3))
        ));
    }

    #[test]
    fn chain_edges_accumulate_in_order() {
        let mut attributes = GraphAttributes::new();
        let key = chain_key(1, 2);
        attributes.push_chain_edge(key, (1, 9));
        attributes.push_chain_edge(key, (9, 10));
        attributes.push_chain_edge(key, (10, 2));
        assert_eq!(
            attributes.chain_edges(key).unwrap(),
            &[(1, 9), (9, 10), (10, 2)]
        );
        assert!(!attributes.has_chain(chain_key(2, 1)));
    }
}
