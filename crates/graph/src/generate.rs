//! Random and structured graph generators used by the stats harness and
//! the tests.

use rand::Rng;

use crate::graph::{Graph, NodeId};
use crate::Error;

/// Generates a connected random graph in which every node has degree at
/// most four, so the low-degree pipeline applies directly.
///
/// The first `node_count - 1` edges form a random spanning tree; the rest
/// are sampled uniformly among pairs that keep the degree cap.
pub fn random_connected_max_degree_4(
    node_count: usize,
    edge_count: usize,
    rng: &mut impl Rng,
) -> Result<Graph, Error> {
    if edge_count > 2 * node_count {
        return Err(Error::TooManyEdges);
    }
    if node_count < 2 || edge_count < node_count - 1 {
        return Err(Error::TooManyEdges);
    }
    let mut graph = Graph::new();
    for _ in 0..node_count {
        graph.add_node();
    }
    graph.add_undirected_edge(0, 1)?;
    let mut added = 1;
    for node in 2..node_count {
        let mut anchor = rng.gen_range(0..node);
        while graph.degree(anchor) >= 4 {
            anchor = rng.gen_range(0..node);
        }
        graph.add_undirected_edge(node, anchor)?;
        added += 1;
    }
    while added < edge_count {
        let a = rng.gen_range(0..node_count);
        let b = rng.gen_range(0..node_count);
        if a == b || graph.has_edge(a, b) {
            continue;
        }
        if graph.degree(a) >= 4 || graph.degree(b) >= 4 {
            continue;
        }
        graph.add_undirected_edge(a, b)?;
        added += 1;
    }
    Ok(graph)
}

/// Generates the perimeter of an `n` by `m` grid with its boundary rungs,
/// for `n, m > 1`: a ring of `2n + 2m - 4` nodes plus the chords that
/// connect opposite boundary nodes.
pub fn perimeter_grid(n: usize, m: usize) -> Result<Graph, Error> {
    let node_count = 2 * n + 2 * m - 4;
    let mut graph = Graph::new();
    for _ in 0..node_count {
        graph.add_node();
    }
    for node in 0..node_count - 1 {
        graph.add_undirected_edge(node, node + 1)?;
    }
    graph.add_undirected_edge(0, node_count - 1)?;
    for i in 1..n - 1 {
        graph.add_undirected_edge(i, 2 * n + m - i - 3)?;
    }
    let inner = m - 2;
    for i in 0..inner {
        graph.add_undirected_edge(n + i, 2 * n + 2 * inner - i - 1)?;
    }
    Ok(graph)
}

/// Generates a strip of `k` stacked triangles sharing sides, `k > 1`.
pub fn triangle_strip(k: usize) -> Result<Graph, Error> {
    let node_count = 3 * k;
    let mut graph = Graph::new();
    for _ in 0..node_count {
        graph.add_node();
    }
    for node in 0..node_count - 3 {
        if node % 3 == 2 {
            graph.add_undirected_edge(node, node + 3)?;
            graph.add_undirected_edge(node + 3, node - 2)?;
        } else {
            graph.add_undirected_edge(node, node + 3)?;
            graph.add_undirected_edge(node + 1, node + 3)?;
        }
    }
    Ok(graph)
}

/// A simple path `0 - 1 - … - (n-1)`.
pub fn path(node_count: usize) -> Result<Graph, Error> {
    let mut graph = Graph::new();
    for _ in 0..node_count {
        graph.add_node();
    }
    for node in 1..node_count {
        graph.add_undirected_edge(node - 1, node)?;
    }
    Ok(graph)
}

/// A simple cycle on `n >= 3` nodes.
pub fn cycle(node_count: usize) -> Result<Graph, Error> {
    let mut graph = path(node_count)?;
    graph.add_undirected_edge(node_count - 1, 0)?;
    Ok(graph)
}

/// A star with `leaf_count` leaves around centre node `0`.
pub fn star(leaf_count: usize) -> Result<Graph, Error> {
    let mut graph = Graph::new();
    let centre = graph.add_node();
    for _ in 0..leaf_count {
        let leaf = graph.add_node();
        graph.add_undirected_edge(centre, leaf)?;
    }
    Ok(graph)
}
