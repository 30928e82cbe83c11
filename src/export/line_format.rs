//! Plain-text `.topo` topology format.
//!
//! ```text
//! # Dragonfly.d_2_a_2_g_3
//! # routers 6 links 6
//! node 0 group=0
//! node 1 group=0
//! edge 0 1 intergroup=false
//! ```
//!
//! Lines starting with `#` are comments. Nodes are written first in id
//! order, then edges in construction order, so output is stable across runs.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::topology::{Edge, GroupId, NodeId, RouterGraph};

/// Renders `graph` in the line format.
pub fn to_topology_string(name: &str, graph: &RouterGraph) -> String {
    let mut lines = vec![
        format!("# {}", name),
        format!("# routers {} links {}", graph.vertex_count(), graph.edge_count()),
    ];

    lines.extend((0..graph.vertex_count() as NodeId).map(|v| match graph.group_of(v) {
        Some(group) => format!("node {} group={}", v, group),
        None => format!("node {}", v),
    }));
    lines.extend(graph.edges().iter().map(|edge| match edge.intergroup {
        Some(intergroup) => format!("edge {} {} intergroup={}", edge.src, edge.dst, intergroup),
        None => format!("edge {} {}", edge.src, edge.dst),
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn write_topology_file(name: &str, graph: &RouterGraph, path: &Path) -> Result<()> {
    fs::write(path, to_topology_string(name, graph))
        .wrap_err_with(|| format!("Failed to write topology file {}", path.display()))
}

/// A node line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
    pub id: NodeId,
    pub group: Option<GroupId>,
}

/// An edge line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub intergroup: Option<bool>,
}

/// Contents of a `.topo` file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTopology {
    /// Comment text with the leading `#` and whitespace stripped.
    pub comments: Vec<String>,
    pub nodes: Vec<ParsedNode>,
    pub edges: Vec<ParsedEdge>,
}

impl ParsedTopology {
    /// Rebuilds a [`RouterGraph`]. Node ids must be exactly `0..n`.
    pub fn to_graph(&self) -> Result<RouterGraph> {
        validate_topology(self).map_err(|e| eyre!("Invalid topology: {}", e))?;

        let mut ids: Vec<NodeId> = self.nodes.iter().map(|node| node.id).collect();
        ids.sort_unstable();
        if ids.iter().enumerate().any(|(i, &id)| i as NodeId != id) {
            return Err(eyre!("Node ids are not contiguous from 0"));
        }

        let groups = if self.nodes.iter().all(|node| node.group.is_some()) && !self.nodes.is_empty() {
            let mut groups = vec![0; self.nodes.len()];
            for node in &self.nodes {
                groups[node.id as usize] = node.group.unwrap_or_default();
            }
            Some(groups)
        } else {
            None
        };

        let edges = self
            .edges
            .iter()
            .map(|edge| Edge { src: edge.src, dst: edge.dst, intergroup: edge.intergroup })
            .collect();
        RouterGraph::from_edges(self.nodes.len(), edges, groups).map_err(|e| eyre!("Invalid topology: {}", e))
    }
}

/// Tokens of one line.
#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Attribute(&'a str, &'a str),
}

fn tokenize(line: &str) -> Vec<Token<'_>> {
    line.split_whitespace()
        .map(|word| match word.split_once('=') {
            Some((key, value)) => Token::Attribute(key, value),
            None => Token::Word(word),
        })
        .collect()
}

/// Line parser, tracking the line number for error messages.
struct Parser {
    line_no: usize,
}

impl Parser {
    fn parse_id(&self, token: Option<&Token<'_>>, what: &str) -> Result<NodeId> {
        match token {
            Some(Token::Word(word)) => word
                .parse::<NodeId>()
                .map_err(|_| eyre!("line {}: invalid {} '{}'", self.line_no, what, word)),
            Some(other) => Err(eyre!("line {}: expected {}, found {:?}", self.line_no, what, other)),
            None => Err(eyre!("line {}: missing {}", self.line_no, what)),
        }
    }

    fn parse_node(&self, tokens: &[Token<'_>]) -> Result<ParsedNode> {
        let id = self.parse_id(tokens.first(), "node id")?;
        let mut group = None;
        for token in &tokens[1..] {
            match token {
                Token::Attribute("group", value) => {
                    group = Some(
                        value
                            .parse::<GroupId>()
                            .map_err(|_| eyre!("line {}: invalid group '{}'", self.line_no, value))?,
                    );
                }
                other => return Err(eyre!("line {}: unexpected {:?} in node", self.line_no, other)),
            }
        }
        Ok(ParsedNode { id, group })
    }

    fn parse_edge(&self, tokens: &[Token<'_>]) -> Result<ParsedEdge> {
        let src = self.parse_id(tokens.first(), "edge source")?;
        let dst = self.parse_id(tokens.get(1), "edge target")?;
        let mut intergroup = None;
        for token in tokens.iter().skip(2) {
            match token {
                Token::Attribute("intergroup", value) => {
                    intergroup = Some(
                        value
                            .parse::<bool>()
                            .map_err(|_| eyre!("line {}: invalid intergroup flag '{}'", self.line_no, value))?,
                    );
                }
                other => return Err(eyre!("line {}: unexpected {:?} in edge", self.line_no, other)),
            }
        }
        Ok(ParsedEdge { src, dst, intergroup })
    }
}

/// Parses the line format from a string.
pub fn parse_topology_str(content: &str) -> Result<ParsedTopology> {
    let mut topology = ParsedTopology::default();

    for (index, raw) in content.lines().enumerate() {
        let parser = Parser { line_no: index + 1 };
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            topology.comments.push(comment.trim().to_string());
            continue;
        }

        let tokens = tokenize(line);
        match tokens.split_first() {
            Some((Token::Word("node"), rest)) => topology.nodes.push(parser.parse_node(rest)?),
            Some((Token::Word("edge"), rest)) => topology.edges.push(parser.parse_edge(rest)?),
            Some((other, _)) => {
                return Err(eyre!("line {}: expected 'node' or 'edge', found {:?}", parser.line_no, other))
            }
            None => {}
        }
    }

    Ok(topology)
}

/// Parses a `.topo` file.
pub fn parse_topology_file(path: &Path) -> Result<ParsedTopology> {
    let content = fs::read_to_string(path)
        .map_err(|e| eyre!("Failed to read topology file '{}': {}", path.display(), e))?;
    parse_topology_str(&content)
}

/// Validate a parsed topology
pub fn validate_topology(topology: &ParsedTopology) -> Result<(), String> {
    // Check for duplicate node IDs
    let mut node_ids = HashSet::new();
    for node in &topology.nodes {
        if !node_ids.insert(node.id) {
            return Err(format!("Duplicate node ID: {}", node.id));
        }
    }

    let mut links = HashSet::new();
    for edge in &topology.edges {
        if !node_ids.contains(&edge.src) {
            return Err(format!("Edge references non-existent source node: {}", edge.src));
        }
        if !node_ids.contains(&edge.dst) {
            return Err(format!("Edge references non-existent target node: {}", edge.dst));
        }
        if edge.src == edge.dst {
            return Err(format!("Self-loop at node {}", edge.src));
        }
        if !links.insert((edge.src.min(edge.dst), edge.src.max(edge.dst))) {
            return Err(format!("Duplicate edge between {} and {}", edge.src, edge.dst));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{DragonflyTopology, NetworkTopology, PolarflyTopology};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_polarfly_output_shape() {
        let pf = PolarflyTopology::from_order(2).unwrap();
        let text = to_topology_string(&pf.name(), pf.graph());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# PolarFly.q_2");
        assert_eq!(lines[1], "# routers 7 links 9");
        assert_eq!(lines[2], "node 0");
        assert_eq!(lines.iter().filter(|l| l.starts_with("edge ")).count(), 9);
        assert!(!text.contains("intergroup"));
    }

    #[test]
    fn test_dragonfly_output_has_tags() {
        let df = DragonflyTopology::new(2, None).unwrap();
        let text = to_topology_string(&df.name(), df.graph());
        assert!(text.contains("node 5 group=2\n"));
        assert!(text.contains("edge 0 1 intergroup=false\n"));
        assert!(text.contains("intergroup=true"));
    }

    #[test]
    fn test_parse_back_to_graph() {
        let df = DragonflyTopology::new(5, None).unwrap();
        let text = to_topology_string(&df.name(), df.graph());

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", text).unwrap();

        let parsed = parse_topology_file(temp_file.path()).unwrap();
        assert_eq!(parsed.comments[0], "Dragonfly.d_5_a_4_g_9");
        assert_eq!(parsed.nodes.len(), 36);
        assert_eq!(&parsed.to_graph().unwrap(), df.graph());
    }

    #[test]
    fn test_parse_simple_topology() {
        let content = r#"
            # tiny
            node 0
            node 1 group=3
            edge 0 1 intergroup=true
        "#;
        let parsed = parse_topology_str(content).unwrap();
        assert_eq!(parsed.comments, vec!["tiny".to_string()]);
        assert_eq!(parsed.nodes[1], ParsedNode { id: 1, group: Some(3) });
        assert_eq!(parsed.edges[0], ParsedEdge { src: 0, dst: 1, intergroup: Some(true) });
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_topology_str("node 0\nedge 0 x\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_topology_str("vertex 0\n").is_err());
        assert!(parse_topology_str("node 0 colour=red\n").is_err());
        assert!(parse_topology_str("edge 0 1 intergroup=maybe\n").is_err());
        assert!(parse_topology_str("edge 0\n").is_err());
    }

    #[test]
    fn test_validate_topology() {
        let valid = parse_topology_str("node 0\nnode 1\nedge 0 1\n").unwrap();
        assert!(validate_topology(&valid).is_ok());

        let duplicate_node = parse_topology_str("node 0\nnode 0\n").unwrap();
        assert!(validate_topology(&duplicate_node).is_err());

        let dangling = parse_topology_str("node 0\nedge 0 999\n").unwrap();
        assert!(validate_topology(&dangling).is_err());

        let self_loop = parse_topology_str("node 0\nedge 0 0\n").unwrap();
        assert!(validate_topology(&self_loop).is_err());

        let duplicate_edge = parse_topology_str("node 0\nnode 1\nedge 0 1\nedge 1 0\n").unwrap();
        assert!(validate_topology(&duplicate_edge).is_err());
    }

    #[test]
    fn test_non_contiguous_ids_rejected() {
        let parsed = parse_topology_str("node 0\nnode 2\nedge 0 2\n").unwrap();
        assert!(parsed.to_graph().is_err());
    }
}
