//! Renders a drawing as a standalone SVG document: axis-aligned lines for
//! edges, linear-scaled rectangles for nodes, bend-chain segments stroked
//! in their own colour.

use std::fs;
use std::path::Path;

use fxhash::FxHashSet;

use ortho_graph::{Color, NodeId};

use crate::drawing::DrawingResult;
use crate::Error;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const NODE_HALF: f64 = 6.0;
const BEND_HALF: f64 = 3.0;

/// Maps one interval linearly onto another.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64, range_start: f64, range_end: f64) -> Self {
        Self {
            domain: (domain_start, domain_end),
            range: (range_start, range_end),
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 {
            return self.range.0;
        }
        let fraction = (value - self.domain.0) / span;
        self.range.0 + fraction * (self.range.1 - self.range.0)
    }
}

/// Renders the drawing into an SVG string.
pub fn render(result: &DrawingResult) -> Result<String, Error> {
    let mut max_x = 0;
    let mut max_y = 0;
    for node in result.graph.node_ids() {
        let point = result.positions.point(node)?;
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    let scale_x = LinearScale::new(0.0, f64::from(max_x + 2), 0.0, WIDTH);
    let scale_y = LinearScale::new(0.0, f64::from(max_y + 2), HEIGHT, 0.0);
    let place = |node: NodeId| -> Result<(f64, f64), Error> {
        let point = result.positions.point(node)?;
        Ok((
            scale_x.map(f64::from(point.x + 1)),
            scale_y.map(f64::from(point.y + 1)),
        ))
    };

    let mut chain_segments: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
    for key in result.attributes.chain_keys() {
        for &(from, to) in result.attributes.chain_edges(key)? {
            chain_segments.insert((from, to));
            chain_segments.insert((to, from));
        }
    }

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\">\n"
    ));
    for (_, from, to) in result.graph.edges() {
        if from > to {
            continue;
        }
        let (x1, y1) = place(from)?;
        let (x2, y2) = place(to)?;
        let stroke = if chain_segments.contains(&(from, to)) {
            "steelblue"
        } else {
            "black"
        };
        svg.push_str(&format!(
            "  <line x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\" \
             stroke=\"{stroke}\" stroke-width=\"2\"/>\n"
        ));
    }
    for node in result.graph.node_ids() {
        let (x, y) = place(node)?;
        match result.attributes.node_color(node)? {
            Color::Black => {
                svg.push_str(&format!(
                    "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{}\" height=\"{}\" fill=\"black\"/>\n",
                    x - NODE_HALF,
                    y - NODE_HALF,
                    NODE_HALF * 2.0,
                    NODE_HALF * 2.0
                ));
                svg.push_str(&format!(
                    "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"dimgray\">{node}</text>\n",
                    x + NODE_HALF + 2.0,
                    y - NODE_HALF - 2.0
                ));
            }
            Color::Red => {
                svg.push_str(&format!(
                    "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{}\" height=\"{}\" fill=\"red\"/>\n",
                    x - BEND_HALF,
                    y - BEND_HALF,
                    BEND_HALF * 2.0,
                    BEND_HALF * 2.0
                ));
            }
        }
    }
    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Renders the drawing and writes it to `path`.
pub fn write(result: &DrawingResult, path: impl AsRef<Path>) -> Result<(), Error> {
    let svg = render(result)?;
    fs::write(path.as_ref(), svg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortho_graph::{Graph, GraphAttributes};

    use crate::positions::Positions;
    use crate::shape::Shape;

    #[test]
    fn scale_maps_linearly() {
        let scale = LinearScale::new(0.0, 10.0, 0.0, 800.0);
        assert_eq!(scale.map(0.0), 0.0);
        assert_eq!(scale.map(5.0), 400.0);
        assert_eq!(scale.map(10.0), 800.0);
    }

    #[test]
    fn renders_nodes_and_edges() {
        let mut graph = Graph::new();
        let mut attributes = GraphAttributes::new();
        for (id, color) in [(0, Color::Black), (1, Color::Black), (2, Color::Red)] {
            graph.add_node_with_id(id).unwrap();
            attributes.set_node_color(id, color).unwrap();
        }
        graph.add_undirected_edge(0, 2).unwrap();
        graph.add_undirected_edge(2, 1).unwrap();
        let mut positions = Positions::new();
        positions.set(0, 0, 0).unwrap();
        positions.set(2, 1, 0).unwrap();
        positions.set(1, 1, 1).unwrap();
        let result = DrawingResult {
            graph,
            attributes,
            shape: Shape::new(),
            positions,
            initial_cycle_count: 0,
            added_cycle_count: 0,
            removed_bend_count: 0,
        };

        let svg = render(&result).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<line").count(), 2);
        assert_eq!(svg.matches("<rect").count(), 3);
        assert_eq!(svg.matches("fill=\"red\"").count(), 1);
        assert!(svg.ends_with("</svg>\n"));
    }
}
