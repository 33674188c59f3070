//! Geometric validation and drawing metrics.
//!
//! Edge lengths are measured between the original black endpoints: a chain
//! of red bends counts as one logical edge whose length is the sum of its
//! segments' Manhattan lengths. Crossings are counted over directed segment
//! pairs and divided by four to undo the double representation of both
//! edges.

use fxhash::{FxHashMap, FxHashSet};
use itertools::{Itertools, MinMaxResult};

use ortho_graph::{Color, Graph, GraphAttributes, NodeId};

use crate::drawing::DrawingResult;
use crate::positions::Positions;
use crate::Error;

/// The metrics of one finished drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingStats {
    pub crossings: usize,
    pub bends: usize,
    pub area: i64,
    pub total_edge_length: i64,
    pub max_edge_length: i64,
    pub edge_length_stddev: f64,
    pub max_bends_per_edge: usize,
    pub bends_stddev: f64,
}

impl DrawingStats {
    pub fn compute(result: &DrawingResult) -> Result<Self, Error> {
        let chains = logical_edges(&result.graph, &result.attributes)?;
        let lengths: Vec<i64> = chains
            .iter()
            .map(|chain| chain_length(chain, &result.positions))
            .collect::<Result<_, _>>()?;
        let bend_counts: Vec<usize> = chains.iter().map(|chain| chain.len() - 2).collect();
        Ok(DrawingStats {
            crossings: count_crossings(&result.graph, &result.positions)?,
            bends: result
                .attributes
                .node_colors()
                .filter(|&(node, color)| color == Color::Red && result.graph.has_node(node))
                .count(),
            area: bounding_area(&result.graph, &result.positions)?,
            total_edge_length: lengths.iter().sum(),
            max_edge_length: lengths.iter().copied().max().unwrap_or(0),
            edge_length_stddev: stddev(&lengths),
            max_bends_per_edge: bend_counts.iter().copied().max().unwrap_or(0),
            bends_stddev: stddev(
                &bend_counts.iter().map(|&count| count as i64).collect::<Vec<_>>(),
            ),
        })
    }
}

/// Every logical edge as its node chain `black, red*, black`, discovered
/// once from its smaller black endpoint.
fn logical_edges(
    graph: &Graph,
    attributes: &GraphAttributes,
) -> Result<Vec<Vec<NodeId>>, Error> {
    let mut chains = Vec::new();
    for node in graph.node_ids() {
        if attributes.node_color(node)? != Color::Black {
            continue;
        }
        for mut current in graph.neighbors(node) {
            let mut chain = vec![node];
            let mut previous = node;
            while attributes.node_color(current)? == Color::Red {
                chain.push(current);
                let next = graph
                    .neighbors(current)
                    .find(|&neighbor| neighbor != previous)
                    .ok_or_else(|| {
                        Error::ShapeInvariant(format!(
                            "bend {current} does not continue its chain"
                        ))
                    })?;
                previous = current;
                current = next;
            }
            chain.push(current);
            if node < current {
                chains.push(chain);
            }
        }
    }
    Ok(chains)
}

fn chain_length(chain: &[NodeId], positions: &Positions) -> Result<i64, Error> {
    let mut total = 0_i64;
    for window in chain.windows(2) {
        let from = positions.point(window[0])?;
        let to = positions.point(window[1])?;
        total += (from.x - to.x).abs() as i64 + (from.y - to.y).abs() as i64;
    }
    Ok(total)
}

fn bounding_area(graph: &Graph, positions: &Positions) -> Result<i64, Error> {
    let points: Vec<_> = graph
        .node_ids()
        .map(|node| positions.point(node))
        .collect::<Result<_, _>>()?;
    let spread = |values: &mut dyn Iterator<Item = i32>| match values.minmax() {
        MinMaxResult::NoElements => 0,
        MinMaxResult::OneElement(_) => 1,
        MinMaxResult::MinMax(min, max) => i64::from(max - min) + 1,
    };
    let width = spread(&mut points.iter().map(|point| point.x));
    let height = spread(&mut points.iter().map(|point| point.y));
    Ok(width * height)
}

fn stddev(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;
    let variance = values
        .iter()
        .map(|&value| {
            let diff = value as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Whether two axis-aligned segments `(i, j)` and `(k, l)` cross or
/// overlap anywhere.
fn segments_cross(
    positions: &Positions,
    i: NodeId,
    j: NodeId,
    k: NodeId,
    l: NodeId,
) -> Result<bool, Error> {
    let pi = positions.point(i)?;
    let pj = positions.point(j)?;
    let pk = positions.point(k)?;
    let pl = positions.point(l)?;

    let ij_horizontal = pi.y == pj.y;
    let kl_horizontal = pk.y == pl.y;

    if ij_horizontal && kl_horizontal {
        return Ok(pi.y == pk.y
            && ((pi.x <= pk.x && pj.x >= pk.x)
                || (pi.x <= pl.x && pj.x >= pl.x)
                || (pj.x <= pk.x && pi.x >= pk.x)
                || (pj.x <= pl.x && pi.x >= pl.x)));
    }
    if !ij_horizontal && !kl_horizontal {
        return Ok(pi.x == pk.x
            && ((pi.y <= pk.y && pj.y >= pk.y)
                || (pi.y <= pl.y && pj.y >= pl.y)
                || (pj.y <= pk.y && pi.y >= pk.y)
                || (pj.y <= pl.y && pi.y >= pl.y)));
    }
    if !ij_horizontal {
        return segments_cross(positions, k, l, i, j);
    }
    if pk.x < pi.x.min(pj.x) || pk.x > pi.x.max(pj.x) {
        return Ok(false);
    }
    if pi.y < pk.y.min(pl.y) || pi.y > pk.y.max(pl.y) {
        return Ok(false);
    }
    Ok(true)
}

/// Pairwise crossings of edges that share no endpoint. Each undirected
/// edge appears twice, so four directed pairs describe one crossing.
fn count_crossings(graph: &Graph, positions: &Positions) -> Result<usize, Error> {
    let mut total = 0;
    for (edge, i, j) in graph.edges() {
        for (other, k, l) in graph.edges() {
            if edge >= other {
                continue;
            }
            if i == k || i == l || j == k || j == l {
                continue;
            }
            if segments_cross(positions, i, j, k, l)? {
                total += 1;
            }
        }
    }
    Ok(total / 4)
}

/// Checks that no two nodes coincide and no node lies on a non-incident
/// segment. Returns a description of the first violation.
pub fn find_overlap(graph: &Graph, positions: &Positions) -> Result<Option<String>, Error> {
    find_overlap_impl(graph, positions, None)
}

/// The overlap check for drawings with spliced bend chains.
///
/// A chain must reach its high-degree anchor through one of the four
/// compass tracks, all of which the anchor's own edges already occupy, so
/// a chain bend riding on an edge incident to its chain's anchors is
/// unavoidable there. Those junction shares are exempt; every other
/// overlap is still a violation.
pub fn find_overlap_any_degree(
    graph: &Graph,
    positions: &Positions,
    attributes: &GraphAttributes,
) -> Result<Option<String>, Error> {
    find_overlap_impl(graph, positions, Some(attributes))
}

fn find_overlap_impl(
    graph: &Graph,
    positions: &Positions,
    attributes: Option<&GraphAttributes>,
) -> Result<Option<String>, Error> {
    // Chain bend to the two anchors of its chain.
    let mut anchors_of: FxHashMap<NodeId, (NodeId, NodeId)> = FxHashMap::default();
    if let Some(attributes) = attributes {
        for key in attributes.chain_keys() {
            let segments = attributes.chain_edges(key)?;
            let first = segments.first().map(|&(from, _)| from);
            let last = segments.last().map(|&(_, to)| to);
            if let (Some(first), Some(last)) = (first, last) {
                for &(from, to) in segments {
                    for bend in [from, to] {
                        if bend != first && bend != last {
                            anchors_of.insert(bend, (first, last));
                        }
                    }
                }
            }
        }
    }

    let mut seen: FxHashSet<(i32, i32)> = FxHashSet::default();
    for node in graph.node_ids() {
        let point = positions.point(node)?;
        if !seen.insert((point.x, point.y)) {
            return Ok(Some(format!(
                "two nodes share position ({}, {})",
                point.x, point.y
            )));
        }
    }
    for node in graph.node_ids() {
        let point = positions.point(node)?;
        for (_, from, to) in graph.edges() {
            if from == node || to == node {
                continue;
            }
            if let Some(&(first, last)) = anchors_of.get(&node) {
                if from == first || from == last || to == first || to == last {
                    continue;
                }
            }
            let a = positions.point(from)?;
            let b = positions.point(to)?;
            let on_segment = if a.y == b.y {
                point.y == a.y && point.x >= a.x.min(b.x) && point.x <= a.x.max(b.x)
            } else {
                point.x == a.x && point.y >= a.y.min(b.y) && point.y <= a.y.max(b.y)
            };
            if on_segment {
                return Ok(Some(format!(
                    "node {node} lies on edge ({from}, {to})"
                )));
            }
        }
    }
    Ok(None)
}
