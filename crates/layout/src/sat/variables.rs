//! Bijection between shape decisions and SAT variables.
//!
//! Every undirected edge `(u, v)` with `u < v` owns four consecutive
//! *standard* variables, one per direction, starting at id 1. The opposite
//! orientation aliases onto the same ids with flipped directions, so
//! `var(v, u, UP) == var(u, v, DOWN)`. Around every node of degree greater
//! than four, each unordered pair of incident edges additionally owns four
//! *special* variables encoding the virtual direction the node sees the
//! pair as carrying. Tseitin encodings mint *auxiliary* variables on
//! demand.

use fxhash::FxHashMap;

use ortho_graph::{EdgeId, Graph, NodeId};

use crate::shape::Direction;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Standard,
    SpecialEdge,
    Auxiliary,
}

fn index(direction: Direction) -> usize {
    match direction {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    }
}

/// Allocates and resolves the variables of one SAT query, and carries the
/// model after a satisfiable call.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    standard: [FxHashMap<(NodeId, NodeId), i32>; 4],
    special: [FxHashMap<(EdgeId, EdgeId), i32>; 4],
    kinds: FxHashMap<i32, VariableKind>,
    edge_of: FxHashMap<i32, (NodeId, NodeId)>,
    values: FxHashMap<i32, bool>,
    next: i32,
}

impl Variables {
    /// Pre-allocates the standard variables of every undirected edge and
    /// the special variables of every high-degree incident edge pair.
    /// Id 0 stays reserved.
    pub fn new(graph: &Graph) -> Self {
        let mut variables = Variables {
            next: 1,
            ..Variables::default()
        };
        for node in graph.node_ids() {
            for neighbor in graph.neighbors(node) {
                if node > neighbor {
                    continue;
                }
                variables.add_standard_edge(node, neighbor);
            }
            if graph.degree(node) > 4 {
                variables.add_high_degree_pairs(graph, node);
            }
        }
        variables
    }

    fn allocate(&mut self, kind: VariableKind) -> i32 {
        let id = self.next;
        self.next += 1;
        self.kinds.insert(id, kind);
        id
    }

    fn add_standard_edge(&mut self, from: NodeId, to: NodeId) {
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            let id = self.allocate(VariableKind::Standard);
            self.standard[index(direction)].insert((from, to), id);
            self.edge_of.insert(id, (from, to));
        }
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            let id = self.standard[index(direction)][&(from, to)];
            self.standard[index(direction.opposite())].insert((to, from), id);
        }
    }

    fn add_high_degree_pairs(&mut self, graph: &Graph, node: NodeId) {
        let edges: Vec<EdgeId> = graph.out_edges(node).collect();
        for (position, &first) in edges.iter().enumerate() {
            for &second in &edges[position + 1..] {
                let pair = if first < second {
                    (first, second)
                } else {
                    (second, first)
                };
                for direction in Direction::ALL {
                    let id = self.allocate(VariableKind::SpecialEdge);
                    self.special[index(direction)].insert(pair, id);
                }
            }
        }
    }

    /// Mints one more auxiliary variable.
    pub fn fresh_auxiliary(&mut self) -> i32 {
        self.allocate(VariableKind::Auxiliary)
    }

    /// Standard variable of the directed edge `(from, to)` in `direction`.
    pub fn variable(
        &self,
        from: NodeId,
        to: NodeId,
        direction: Direction,
    ) -> Result<i32, Error> {
        self.standard[index(direction)]
            .get(&(from, to))
            .copied()
            .ok_or_else(|| {
                Error::ShapeInvariant(format!(
                    "no {direction} variable for edge ({from}, {to})"
                ))
            })
    }

    /// Special variable of the incident edge pair in `direction`. The pair
    /// must be given with the smaller edge id first.
    pub fn special_variable(
        &self,
        first: EdgeId,
        second: EdgeId,
        direction: Direction,
    ) -> Result<i32, Error> {
        self.special[index(direction)]
            .get(&(first, second))
            .copied()
            .ok_or_else(|| {
                Error::ShapeInvariant(format!(
                    "no special {direction} variable for edge pair ({first}, {second})"
                ))
            })
    }

    pub fn is_standard(&self, variable: i32) -> bool {
        self.kinds.get(&variable) == Some(&VariableKind::Standard)
    }

    /// Endpoints of the undirected edge a standard variable belongs to.
    pub fn edge_of(&self, variable: i32) -> Result<(NodeId, NodeId), Error> {
        self.edge_of.get(&variable).copied().ok_or_else(|| {
            Error::ShapeInvariant(format!("variable {variable} has no backing edge"))
        })
    }

    /// Loads one model value. Each variable may be set only once.
    pub fn set_value(&mut self, variable: i32, value: bool) -> Result<(), Error> {
        if self.values.contains_key(&variable) {
            return Err(Error::ShapeInvariant(format!(
                "variable {variable} already has a value"
            )));
        }
        self.values.insert(variable, value);
        Ok(())
    }

    pub fn value(&self, variable: i32) -> Result<bool, Error> {
        self.values.get(&variable).copied().ok_or_else(|| {
            Error::ShapeInvariant(format!("variable {variable} has no value"))
        })
    }

    /// The unique direction whose standard variable is true on the loaded
    /// model.
    pub fn direction_of_edge(&self, from: NodeId, to: NodeId) -> Result<Direction, Error> {
        for direction in Direction::ALL {
            if self.value(self.variable(from, to, direction)?)? {
                return Ok(direction);
            }
        }
        Err(Error::ShapeInvariant(format!(
            "no direction is true for edge ({from}, {to})"
        )))
    }

    pub fn variable_count(&self) -> i32 {
        self.next - 1
    }
}
