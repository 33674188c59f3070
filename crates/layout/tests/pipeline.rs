//! End-to-end pipeline scenarios, driven through the reference solver.

mod common;

use std::collections::HashSet;

use common::ReferenceSolver;

use ortho_graph::{algo, chain_key, generate, Color, Graph};
use ortho_layout::sat::solver::parse_model;
use ortho_layout::sat::variables::Variables;
use ortho_layout::{Direction, DrawingBuilder, DrawingResult, DrawingStats};

fn draw(graph: &Graph) -> DrawingResult {
    DrawingBuilder::new(graph, ReferenceSolver).draw().unwrap()
}

/// The invariants every drawing must satisfy.
fn assert_drawing_invariants(result: &DrawingResult) {
    // Opposite orientations carry opposite directions.
    for ((from, to), direction) in result.shape.iter() {
        assert_eq!(
            result.shape.direction(to, from).unwrap(),
            direction.opposite(),
            "edge ({from}, {to})"
        );
    }
    // Directions around a low-degree node are pairwise distinct.
    for node in result.graph.node_ids() {
        if result.graph.degree(node) <= 4 {
            let mut seen = HashSet::new();
            for neighbor in result.graph.neighbors(node) {
                let direction = result.shape.direction(node, neighbor).unwrap();
                assert!(seen.insert(direction), "node {node} repeats {direction}");
            }
        }
    }
    // No two nodes share a position.
    let mut seen = HashSet::new();
    for node in result.graph.node_ids() {
        let point = result.positions.point(node).unwrap();
        assert!(seen.insert((point.x, point.y)), "node {node} overlaps");
    }
    // A shape edge spans a positive multiple of its direction's unit
    // vector.
    for ((from, to), direction) in result.shape.iter() {
        let a = result.positions.point(from).unwrap();
        let b = result.positions.point(to).unwrap();
        let (unit_x, unit_y) = direction.delta();
        let span = (b.x - a.x) * unit_x + (b.y - a.y) * unit_y;
        assert!(span > 0, "edge ({from}, {to}) runs against {direction}");
        assert_eq!(b.x - a.x, unit_x * span);
        assert_eq!(b.y - a.y, unit_y * span);
    }
    // A bend has exactly two incident edges of different orientations.
    for node in result.graph.node_ids() {
        if result.attributes.node_color(node).unwrap() != Color::Red {
            continue;
        }
        let neighbors: Vec<_> = result.graph.neighbors(node).collect();
        assert_eq!(neighbors.len(), 2, "bend {node} degree");
        let first = result.shape.is_horizontal(node, neighbors[0]).unwrap();
        let second = result.shape.is_horizontal(node, neighbors[1]).unwrap();
        assert_ne!(first, second, "bend {node} does not turn");
    }
}

#[test]
fn single_node_sits_at_the_origin() {
    let mut graph = Graph::new();
    graph.add_node_with_id(0).unwrap();
    let result = draw(&graph);
    let point = result.positions.point(0).unwrap();
    assert_eq!((point.x, point.y), (0, 0));
    let stats = DrawingStats::compute(&result).unwrap();
    assert_eq!(stats.area, 1);
    assert_eq!(stats.bends, 0);
}

#[test]
fn single_edge_spans_one_unit() {
    let graph = generate::path(2).unwrap();
    let result = draw(&graph);
    assert_drawing_invariants(&result);
    let a = result.positions.point(0).unwrap();
    let b = result.positions.point(1).unwrap();
    assert_eq!((a.x - b.x).abs() + (a.y - b.y).abs(), 1);
    let stats = DrawingStats::compute(&result).unwrap();
    assert_eq!(stats.bends, 0);
    assert_eq!(stats.crossings, 0);
    assert_eq!(stats.area, 2);
}

#[test]
fn four_cycle_is_a_unit_square() {
    let graph = generate::cycle(4).unwrap();
    let result = draw(&graph);
    assert_drawing_invariants(&result);
    assert_eq!(result.initial_cycle_count, 1);
    let stats = DrawingStats::compute(&result).unwrap();
    assert_eq!(stats.bends, 0);
    assert_eq!(stats.area, 4);
    assert_eq!(stats.crossings, 0);
}

#[test]
fn triangle_needs_exactly_one_bend() {
    let graph = generate::cycle(3).unwrap();
    let result = draw(&graph);
    assert_drawing_invariants(&result);
    let stats = DrawingStats::compute(&result).unwrap();
    assert_eq!(stats.bends, 1);
    assert_eq!(stats.max_bends_per_edge, 1);
    // One bend turns the triangle into a unit square.
    assert_eq!(result.graph.node_count(), 4);
    assert_eq!(stats.area, 4);
}

#[test]
fn k4_is_drawable_with_few_bends() {
    let mut graph = Graph::new();
    for id in 0..4 {
        graph.add_node_with_id(id).unwrap();
    }
    for (a, b) in [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)] {
        graph.add_undirected_edge(a, b).unwrap();
    }
    let result = draw(&graph);
    assert_drawing_invariants(&result);
    let stats = DrawingStats::compute(&result).unwrap();
    assert!(stats.bends <= 4, "K4 took {} bends", stats.bends);
    assert!(stats.crossings <= 1, "K4 took {} crossings", stats.crossings);
}

#[test]
fn path_of_five_stays_collinear() {
    let graph = generate::path(5).unwrap();
    let result = draw(&graph);
    assert_drawing_invariants(&result);
    let stats = DrawingStats::compute(&result).unwrap();
    assert_eq!(stats.bends, 0);
    assert_eq!(stats.area, 5);
    // All on one axis.
    let on_x = (0..5)
        .map(|node| result.positions.point(node).unwrap().y)
        .collect::<HashSet<_>>()
        .len()
        == 1;
    let on_y = (0..5)
        .map(|node| result.positions.point(node).unwrap().x)
        .collect::<HashSet<_>>()
        .len()
        == 1;
    assert!(on_x || on_y);
}

#[test]
fn degree_five_star_splices_one_chain() {
    let graph = generate::star(5).unwrap();
    let result = draw(&graph);
    assert_drawing_invariants(&result);
    // One edge fell out of the degree-4 subgraph and came back as a chain.
    assert!(result.attributes.has_chain(chain_key(0, 5)));
    let chain = result.attributes.chain_edges(chain_key(0, 5)).unwrap();
    assert!(chain.len() == 3 || chain.len() == 4);
    assert_eq!(chain.first().unwrap().0, 0);
    assert_eq!(chain.last().unwrap().1, 5);
    // Every leaf stays reachable through the augmented graph.
    assert!(algo::is_connected(&result.graph));
    let stats = DrawingStats::compute(&result).unwrap();
    assert_eq!(stats.bends, chain.len() - 1);
}

#[test]
fn collapsed_pipeline_places_a_high_degree_star() {
    let graph = generate::star(5).unwrap();
    let result = DrawingBuilder::new(&graph, ReferenceSolver)
        .draw_collapsed()
        .unwrap();
    assert_eq!(result.positions.len(), 6);
    let mut seen = HashSet::new();
    for node in result.graph.node_ids() {
        let point = result.positions.point(node).unwrap();
        assert!(seen.insert((point.x, point.y)));
        for neighbor in result.graph.neighbors(node) {
            assert!(result.shape.contains(node, neighbor));
        }
    }
}

#[test]
fn random_low_degree_graphs_draw_cleanly() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let mut rng = StdRng::seed_from_u64(7);
    let graph = generate::random_connected_max_degree_4(8, 9, &mut rng).unwrap();
    let result = draw(&graph);
    assert_drawing_invariants(&result);
    let stats = DrawingStats::compute(&result).unwrap();
    assert!(stats.area >= 8);
}

#[test]
fn sorted_model_round_trips_through_the_file_format() {
    let mut graph = Graph::new();
    for id in 0..3 {
        graph.add_node_with_id(id).unwrap();
    }
    graph.add_undirected_edge(0, 1).unwrap();
    graph.add_undirected_edge(1, 2).unwrap();

    // (0, 1) right, (1, 2) up.
    let mut model = vec![-1, -2, -3, 4, 5, -6, -7, -8];
    model.sort_unstable();
    let serialized = model
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
        + " 0";
    let reparsed = parse_model(&serialized).unwrap().unwrap();
    assert_eq!(reparsed.len(), model.len());

    let mut variables = Variables::new(&graph);
    for literal in reparsed {
        variables.set_value(literal.abs(), literal > 0).unwrap();
    }
    assert_eq!(variables.direction_of_edge(0, 1).unwrap(), Direction::Right);
    assert_eq!(variables.direction_of_edge(1, 0).unwrap(), Direction::Left);
    assert_eq!(variables.direction_of_edge(1, 2).unwrap(), Direction::Up);
}
