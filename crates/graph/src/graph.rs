use fxhash::FxHashMap;

use crate::Error;

/// Stable identifier of a node. Ids are never reused, even after removal.
pub type NodeId = usize;

/// Stable identifier of a directed edge. Ids are never reused.
pub type EdgeId = usize;

#[derive(Debug, Clone, Default)]
struct NodeSlot {
    /// Outgoing edge ids in insertion order.
    out: Vec<EdgeId>,
    /// Incoming edge ids in insertion order.
    inc: Vec<EdgeId>,
    /// Neighbor id to the id of the edge pointing at it.
    edge_to: FxHashMap<NodeId, EdgeId>,
}

/// An undirected multigraph with stable integer ids.
///
/// Every undirected edge is represented by two opposite directed edges.
/// Node slots are indexed by id and tombstoned on removal, so iteration
/// order is the id order and stays stable across mutations.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Option<NodeSlot>>,
    edges: Vec<Option<(NodeId, NodeId)>>,
    node_count: usize,
    edge_count: usize,
    next_node_id: NodeId,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the smallest unused id and returns it.
    pub fn add_node(&mut self) -> NodeId {
        while self.has_node(self.next_node_id) {
            self.next_node_id += 1;
        }
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.insert_node_slot(id);
        id
    }

    /// Adds a node with the given id. Ids may be non-contiguous.
    pub fn add_node_with_id(&mut self, id: NodeId) -> Result<(), Error> {
        if self.has_node(id) {
            return Err(Error::DuplicateNode(id));
        }
        self.insert_node_slot(id);
        Ok(())
    }

    fn insert_node_slot(&mut self, id: NodeId) {
        if id >= self.nodes.len() {
            self.nodes.resize(id + 1, None);
        }
        self.nodes[id] = Some(NodeSlot::default());
        self.node_count += 1;
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|slot| slot.is_some())
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of directed edges; twice the undirected edge count.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|_| id))
    }

    /// First node id, if any.
    pub fn first_node(&self) -> Option<NodeId> {
        self.node_ids().next()
    }

    fn slot(&self, id: NodeId) -> Result<&NodeSlot, Error> {
        self.nodes
            .get(id)
            .and_then(|slot| slot.as_ref())
            .ok_or(Error::MissingNode(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> Result<&mut NodeSlot, Error> {
        self.nodes
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or(Error::MissingNode(id))
    }

    /// Adds a directed edge and returns its id.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, Error> {
        if from == to {
            return Err(Error::SelfLoop(from));
        }
        if !self.has_node(from) {
            return Err(Error::MissingNode(from));
        }
        if !self.has_node(to) {
            return Err(Error::MissingNode(to));
        }
        if self.has_edge(from, to) {
            return Err(Error::DuplicateEdge(from, to));
        }
        let id = self.edges.len();
        self.edges.push(Some((from, to)));
        self.edge_count += 1;
        let from_slot = self.slot_mut(from)?;
        from_slot.out.push(id);
        from_slot.edge_to.insert(to, id);
        self.slot_mut(to)?.inc.push(id);
        Ok(id)
    }

    pub fn add_undirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), Error> {
        self.add_edge(a, b)?;
        self.add_edge(b, a)?;
        Ok(())
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.slot(from)
            .map(|slot| slot.edge_to.contains_key(&to))
            .unwrap_or(false)
    }

    pub fn edge_id(&self, from: NodeId, to: NodeId) -> Result<EdgeId, Error> {
        self.slot(from)?
            .edge_to
            .get(&to)
            .copied()
            .ok_or(Error::MissingEdge(from, to))
    }

    /// Endpoints `(from, to)` of a directed edge.
    pub fn edge_endpoints(&self, edge: EdgeId) -> Result<(NodeId, NodeId), Error> {
        self.edges
            .get(edge)
            .and_then(|slot| *slot)
            .ok_or(Error::MissingEdgeId(edge))
    }

    /// Directed edges as `(edge_id, from, to)` in edge-id order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, NodeId, NodeId)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.map(|(from, to)| (id, from, to)))
    }

    /// Outgoing edge ids of a node in insertion order.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.nodes
            .get(node)
            .and_then(|slot| slot.as_ref())
            .map(|slot| slot.out.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Outgoing neighbors of a node in edge-insertion order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node)
            .map(|edge| self.edges[edge].expect("live edge").1)
    }

    /// Outgoing degree; for undirected graphs this is the node degree.
    pub fn degree(&self, node: NodeId) -> usize {
        self.nodes
            .get(node)
            .and_then(|slot| slot.as_ref())
            .map_or(0, |slot| slot.out.len())
    }

    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), Error> {
        let id = self.edge_id(from, to)?;
        self.edges[id] = None;
        self.edge_count -= 1;
        let from_slot = self.slot_mut(from)?;
        from_slot.out.retain(|&e| e != id);
        from_slot.edge_to.remove(&to);
        self.slot_mut(to)?.inc.retain(|&e| e != id);
        Ok(())
    }

    pub fn remove_undirected_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), Error> {
        self.remove_edge(a, b)?;
        self.remove_edge(b, a)?;
        Ok(())
    }

    /// Removes a node together with all of its incident edges.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), Error> {
        let out_neighbors: Vec<NodeId> = self.neighbors(id).collect();
        for neighbor in out_neighbors {
            self.remove_edge(id, neighbor)?;
        }
        let in_neighbors: Vec<NodeId> = self
            .slot(id)?
            .inc
            .iter()
            .map(|&edge| self.edges[edge].expect("live edge").0)
            .collect();
        for neighbor in in_neighbors {
            self.remove_edge(neighbor, id)?;
        }
        self.nodes[id] = None;
        self.node_count -= 1;
        Ok(())
    }

    /// Largest degree over all nodes, or zero for an empty graph.
    pub fn max_degree(&self) -> usize {
        self.node_ids().map(|id| self.degree(id)).max().unwrap_or(0)
    }
}
