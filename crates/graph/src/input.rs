//! Reads and writes graphs in the two supported text formats.
//!
//! The GML reader is a token-based subset parser: it only recognises
//! top-level `node [ id N ]` and `edge [ source S target T ]` blocks and
//! ignores every other token. The plain-text format is a `nodes:` section
//! with one id per line followed by an `edges:` section with one directed
//! `from to` pair per line.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use log::info;

use crate::graph::Graph;
use crate::Error;

/// Loads an undirected graph from a GML file.
pub fn load_gml(path: impl AsRef<Path>) -> Result<Graph, Error> {
    let start = Instant::now();
    let content = fs::read_to_string(path.as_ref())?;
    let graph = parse_gml(&content)?;
    info!(
        "Loaded GML graph ({} nodes, {} directed edges) in {:?}",
        graph.node_count(),
        graph.edge_count(),
        start.elapsed()
    );
    Ok(graph)
}

pub fn parse_gml(content: &str) -> Result<Graph, Error> {
    #[derive(PartialEq)]
    enum Block {
        None,
        Node,
        Edge,
    }
    let mut graph = Graph::new();
    let mut block = Block::None;
    let mut source: Option<usize> = None;
    let mut target: Option<usize> = None;
    let mut tokens = content.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "node" => {
                block = Block::Node;
            }
            "edge" => {
                block = Block::Edge;
                source = None;
                target = None;
            }
            "id" if block == Block::Node => {
                let id = parse_id(tokens.next(), "node id")?;
                graph.add_node_with_id(id)?;
            }
            "source" if block == Block::Edge => {
                source = Some(parse_id(tokens.next(), "edge source")?);
            }
            "target" if block == Block::Edge => {
                target = Some(parse_id(tokens.next(), "edge target")?);
            }
            "]" => {
                if block == Block::Edge {
                    if let (Some(from), Some(to)) = (source, target) {
                        graph.add_undirected_edge(from, to)?;
                    }
                }
                block = Block::None;
            }
            _ => {}
        }
    }
    Ok(graph)
}

/// Loads a graph from the plain-text format. Edge lines add single directed
/// edges, so an undirected graph lists both orientations.
pub fn load_txt(path: impl AsRef<Path>) -> Result<Graph, Error> {
    let start = Instant::now();
    let content = fs::read_to_string(path.as_ref())?;
    let graph = parse_txt(&content)?;
    info!(
        "Loaded text graph ({} nodes, {} directed edges) in {:?}",
        graph.node_count(),
        graph.edge_count(),
        start.elapsed()
    );
    Ok(graph)
}

pub fn parse_txt(content: &str) -> Result<Graph, Error> {
    enum Section {
        None,
        Nodes,
        Edges,
    }
    let mut graph = Graph::new();
    let mut section = Section::None;
    for line in content.lines() {
        let line = line.trim();
        match line {
            "" => {}
            "nodes:" => section = Section::Nodes,
            "edges:" => section = Section::Edges,
            _ => match section {
                Section::None => {
                    return Err(Error::MalformedFile(format!(
                        "unexpected line before any section: {line:?}"
                    )))
                }
                Section::Nodes => {
                    let id = parse_id(Some(line), "node id")?;
                    graph.add_node_with_id(id)?;
                }
                Section::Edges => {
                    let mut parts = line.split_whitespace();
                    let from = parse_id(parts.next(), "edge source")?;
                    let to = parse_id(parts.next(), "edge target")?;
                    graph.add_edge(from, to)?;
                }
            },
        }
    }
    Ok(graph)
}

/// Writes a graph in the plain-text format.
pub fn save_txt(graph: &Graph, path: impl AsRef<Path>) -> Result<(), Error> {
    let mut file = fs::File::create(path.as_ref())?;
    writeln!(file, "nodes:")?;
    for node in graph.node_ids() {
        writeln!(file, "{node}")?;
    }
    writeln!(file, "edges:")?;
    for (_, from, to) in graph.edges() {
        writeln!(file, "{from} {to}")?;
    }
    Ok(())
}

fn parse_id(token: Option<&str>, what: &str) -> Result<usize, Error> {
    let token = token.ok_or_else(|| Error::MalformedFile(format!("missing {what}")))?;
    token
        .parse::<usize>()
        .map_err(|_| Error::MalformedFile(format!("invalid {what}: {token:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gml_subset_is_parsed() {
        let content = "\
graph [
  directed 0
  node [ id 0 label \"a\" ]
  node [ id 1 ]
  node [ id 4 ]
  edge [ source 0 target 1 ]
  edge [ source 1 target 4 ]
]";
        let graph = parse_gml(content).unwrap();
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![0, 1, 4]);
        assert!(graph.has_edge(0, 1) && graph.has_edge(1, 0));
        assert!(graph.has_edge(4, 1));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn txt_round_trip() {
        let mut graph = Graph::new();
        for id in [0, 1, 2] {
            graph.add_node_with_id(id).unwrap();
        }
        graph.add_undirected_edge(0, 1).unwrap();
        graph.add_undirected_edge(1, 2).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.txt");
        save_txt(&graph, &path).unwrap();
        let reloaded = load_txt(&path).unwrap();

        assert_eq!(reloaded.node_count(), 3);
        assert_eq!(reloaded.edge_count(), 4);
        assert!(reloaded.has_edge(0, 1) && reloaded.has_edge(1, 0));
        assert!(reloaded.has_edge(2, 1) && reloaded.has_edge(1, 2));
    }

    #[test]
    fn malformed_edge_line_is_reported() {
        let content = "nodes:\n0\n1\nedges:\n0\n";
        assert!(matches!(
            parse_txt(content),
            Err(Error::MalformedFile(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_txt("/definitely/not/here.txt"),
            Err(Error::IoError { .. })
        ));
    }
}
