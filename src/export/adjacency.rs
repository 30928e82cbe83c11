//! Adjacency-list export used by Polarfly tooling (`PolarFly.q_<q>.txt`).
//!
//! The first line holds the vertex and edge counts. Line `v + 1` lists the
//! neighbors of vertex `v`, each followed by a single space.

use std::path::Path;

use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::topology::{NodeId, RouterGraph};

pub fn adjacency_file_name(q: u32) -> String {
    format!("PolarFly.q_{}.txt", q)
}

pub fn to_adjacency_string(graph: &RouterGraph) -> String {
    let mut out = format!("{} {}\n", graph.vertex_count(), graph.edge_count());
    for neighbors in graph.adjacency() {
        for v in neighbors {
            out.push_str(&format!("{} ", v));
        }
        out.push('\n');
    }
    out
}

pub fn write_adjacency_file(graph: &RouterGraph, path: &Path) -> Result<()> {
    std::fs::write(path, to_adjacency_string(graph))
        .wrap_err_with(|| format!("Failed to write adjacency list {}", path.display()))
}

/// Reads an adjacency list back into neighbor lists, checking the header.
pub fn parse_adjacency_str(content: &str) -> Result<Vec<Vec<NodeId>>> {
    let mut lines = content.lines();
    let header = lines.next().ok_or_else(|| eyre!("Empty adjacency list"))?;
    let counts: Vec<usize> = header
        .split_whitespace()
        .map(|field| field.parse::<usize>().map_err(|_| eyre!("Invalid header field '{}'", field)))
        .collect::<Result<_>>()?;
    let [vertices, edges] = counts[..] else {
        return Err(eyre!("Header must hold vertex and edge counts, found '{}'", header));
    };

    let adjacency: Vec<Vec<NodeId>> = lines
        .take(vertices)
        .enumerate()
        .map(|(v, line)| {
            line.split_whitespace()
                .map(|field| {
                    field
                        .parse::<NodeId>()
                        .map_err(|_| eyre!("Invalid neighbor '{}' of vertex {}", field, v))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<_>>()?;

    if adjacency.len() != vertices {
        return Err(eyre!("Expected {} vertex lines, found {}", vertices, adjacency.len()));
    }
    let total: usize = adjacency.iter().map(Vec::len).sum();
    if total != 2 * edges {
        return Err(eyre!("Neighbor lists hold {} entries, expected {}", total, 2 * edges));
    }
    Ok(adjacency)
}
