//! Graph algorithms used by the layout pipeline: connectivity checks,
//! connected components, a fundamental cycle basis, simple-cycle
//! enumeration, directed cycle search and topological ordering.
//!
//! All traversals use explicit stacks so deep graphs cannot overflow the
//! call stack.

use std::collections::VecDeque;

use fxhash::{FxHashMap, FxHashSet};

use crate::graph::{Graph, NodeId};
use crate::Error;

/// Whether every node is reachable from the first node via outgoing edges.
/// The empty graph counts as connected.
pub fn is_connected(graph: &Graph) -> bool {
    let Some(root) = graph.first_node() else {
        return true;
    };
    let mut visited = FxHashSet::default();
    let mut stack = vec![root];
    visited.insert(root);
    while let Some(node) = stack.pop() {
        for neighbor in graph.neighbors(node) {
            if visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }
    visited.len() == graph.node_count()
}

/// Whether every directed edge has its opposite.
pub fn is_undirected(graph: &Graph) -> bool {
    graph.edges().all(|(_, from, to)| graph.has_edge(to, from))
}

/// Splits an undirected graph into its connected components. Node ids are
/// preserved.
pub fn connected_components(graph: &Graph) -> Result<Vec<Graph>, Error> {
    if !is_undirected(graph) {
        return Err(Error::NotUndirected);
    }
    let mut visited = FxHashSet::default();
    let mut components = Vec::new();
    for root in graph.node_ids() {
        if visited.contains(&root) {
            continue;
        }
        let mut component = Graph::new();
        component.add_node_with_id(root)?;
        let mut stack = vec![root];
        visited.insert(root);
        while let Some(node) = stack.pop() {
            for neighbor in graph.neighbors(node) {
                if !component.has_node(neighbor) {
                    component.add_node_with_id(neighbor)?;
                }
                if !component.has_edge(node, neighbor) {
                    component.add_undirected_edge(node, neighbor)?;
                }
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        components.push(component);
    }
    Ok(components)
}

/// Computes a fundamental cycle basis from a BFS spanning tree.
///
/// For every non-tree edge `(u, v)` with `u < v` the emitted cycle runs
/// from the lowest common ancestor down to `u`, across the non-tree edge
/// and back up from `v`. A connected graph yields exactly
/// `|E| - |V| + 1` independent cycles.
pub fn cycle_basis(graph: &Graph) -> Vec<Vec<NodeId>> {
    let Some(root) = graph.first_node() else {
        return Vec::new();
    };
    let mut parent: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    parent.insert(root, root);
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        for neighbor in graph.neighbors(node) {
            if !parent.contains_key(&neighbor) {
                parent.insert(neighbor, node);
                queue.push_back(neighbor);
            }
        }
    }

    let path_from_root = |node: NodeId| -> Vec<NodeId> {
        let mut path = vec![node];
        let mut current = node;
        while parent[&current] != current {
            current = parent[&current];
            path.push(current);
        }
        path.reverse();
        path
    };

    let mut cycles = Vec::new();
    for node in graph.node_ids() {
        for neighbor in graph.neighbors(node) {
            if node > neighbor {
                continue;
            }
            if !parent.contains_key(&node) || !parent.contains_key(&neighbor) {
                continue;
            }
            if parent[&node] == neighbor || parent[&neighbor] == node {
                continue;
            }
            let path_u = path_from_root(node);
            let path_v = path_from_root(neighbor);
            let mut ancestor_depth = 0;
            while ancestor_depth + 1 < path_u.len()
                && ancestor_depth + 1 < path_v.len()
                && path_u[ancestor_depth + 1] == path_v[ancestor_depth + 1]
            {
                ancestor_depth += 1;
            }
            let mut cycle: Vec<NodeId> = path_u[ancestor_depth..].to_vec();
            cycle.extend(path_v[ancestor_depth + 1..].iter().rev());
            cycles.push(cycle);
        }
    }
    cycles
}

/// Finds one cycle in a directed graph, if any, via a white/gray/black DFS.
/// The returned list starts at the node where the back-edge closes.
pub fn find_cycle_directed(graph: &Graph) -> Option<Vec<NodeId>> {
    const ON_STACK: u8 = 1;
    const DONE: u8 = 2;
    let mut state: FxHashMap<NodeId, u8> = FxHashMap::default();
    for root in graph.node_ids() {
        if state.contains_key(&root) {
            continue;
        }
        let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> =
            vec![(root, graph.neighbors(root).collect(), 0)];
        state.insert(root, ON_STACK);
        while !stack.is_empty() {
            let top = stack.len() - 1;
            let next = {
                let frame = &mut stack[top];
                if frame.2 < frame.1.len() {
                    frame.2 += 1;
                    Some(frame.1[frame.2 - 1])
                } else {
                    None
                }
            };
            match next {
                None => {
                    let (node, _, _) = stack.pop().expect("non-empty stack");
                    state.insert(node, DONE);
                }
                Some(neighbor) => match state.get(&neighbor).copied() {
                    None => {
                        state.insert(neighbor, ON_STACK);
                        let neighbors = graph.neighbors(neighbor).collect();
                        stack.push((neighbor, neighbors, 0));
                    }
                    Some(ON_STACK) => {
                        let start = stack
                            .iter()
                            .position(|(node, _, _)| *node == neighbor)
                            .expect("back-edge target is on the stack");
                        return Some(stack[start..].iter().map(|(node, _, _)| *node).collect());
                    }
                    _ => {}
                },
            }
        }
    }
    None
}

/// Kahn topological ordering of a directed acyclic graph.
pub fn topological_order(graph: &Graph) -> Result<Vec<NodeId>, Error> {
    let mut in_degree: FxHashMap<NodeId, usize> = FxHashMap::default();
    for (_, _, to) in graph.edges() {
        *in_degree.entry(to).or_insert(0) += 1;
    }
    let mut queue: VecDeque<NodeId> = graph
        .node_ids()
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for neighbor in graph.neighbors(node) {
            let degree = in_degree.get_mut(&neighbor).expect("counted above");
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(neighbor);
            }
        }
    }
    if order.len() != graph.node_count() {
        return Err(Error::CyclicGraph);
    }
    Ok(order)
}

/// Enumerates every simple cycle of an undirected graph, each reported once.
///
/// Cycles through already-processed start nodes are suppressed with a taboo
/// set, and each cycle is deduplicated via a canonical rotation, so the two
/// traversal directions collapse into one entry.
pub fn all_cycles(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut cycles = Vec::new();
    let mut seen: FxHashSet<Vec<NodeId>> = FxHashSet::default();
    let mut taboo: FxHashSet<NodeId> = FxHashSet::default();
    for start in graph.node_ids() {
        let mut path = vec![start];
        let mut visited = FxHashSet::default();
        visited.insert(start);
        collect_cycles(
            graph,
            start,
            start,
            &taboo,
            &mut path,
            &mut visited,
            &mut seen,
            &mut cycles,
        );
        taboo.insert(start);
    }
    cycles
}

#[allow(clippy::too_many_arguments)]
fn collect_cycles(
    graph: &Graph,
    current: NodeId,
    start: NodeId,
    taboo: &FxHashSet<NodeId>,
    path: &mut Vec<NodeId>,
    visited: &mut FxHashSet<NodeId>,
    seen: &mut FxHashSet<Vec<NodeId>>,
    cycles: &mut Vec<Vec<NodeId>>,
) {
    for neighbor in graph.neighbors(current) {
        if neighbor == start && path.len() > 2 {
            let cycle = canonical_cycle(path);
            if seen.insert(cycle) {
                cycles.push(path.clone());
            }
        } else if !visited.contains(&neighbor) && !taboo.contains(&neighbor) {
            visited.insert(neighbor);
            path.push(neighbor);
            collect_cycles(graph, neighbor, start, taboo, path, visited, seen, cycles);
            path.pop();
            visited.remove(&neighbor);
        }
    }
}

/// Rotates a cycle so the smallest node comes first and fixes the traversal
/// direction, giving equal cycles equal representations.
fn canonical_cycle(cycle: &[NodeId]) -> Vec<NodeId> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, &node)| node)
        .map(|(index, _)| index)
        .expect("cycle is non-empty");
    let len = cycle.len();
    let forward: Vec<NodeId> = (0..len).map(|k| cycle[(pivot + k) % len]).collect();
    let backward: Vec<NodeId> = (0..len).map(|k| cycle[(pivot + len - k) % len]).collect();
    if forward <= backward {
        forward
    } else {
        backward
    }
}
