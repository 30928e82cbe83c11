//! Topology type definitions.
//!
//! Router graphs, edges and routing tables shared by the Polarfly and
//! Dragonfly builders, plus the [`NetworkTopology`] trait the export layer
//! consumes.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};

/// Router identifier.
pub type NodeId = u32;

/// Dragonfly group identifier.
pub type GroupId = u32;

/// An undirected link between two distinct routers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    /// Set for Dragonfly links; `None` for untagged (Polarfly) links.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intergroup: Option<bool>,
}

impl Edge {
    pub fn untagged(src: NodeId, dst: NodeId) -> Self {
        Self { src, dst, intergroup: None }
    }

    pub fn tagged(src: NodeId, dst: NodeId, intergroup: bool) -> Self {
        Self { src, dst, intergroup: Some(intergroup) }
    }

    /// Endpoints ordered as (min, max).
    pub fn key(&self) -> (NodeId, NodeId) {
        (self.src.min(self.dst), self.src.max(self.dst))
    }

    pub fn is_intergroup(&self) -> bool {
        self.intergroup.unwrap_or(false)
    }
}

/// An immutable simple undirected router graph.
///
/// Edges are kept in construction order; adjacency lists are ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterGraph {
    adjacency: Vec<Vec<NodeId>>,
    edges: Vec<Edge>,
    groups: Option<Vec<GroupId>>,
}

impl RouterGraph {
    /// Assembles a graph from an edge list.
    ///
    /// # Errors
    ///
    /// `ConstructionInvariant` if an edge is a self-loop, is a duplicate or
    /// references a router outside `0..vertex_count`, or if `groups` does
    /// not cover every router.
    pub fn from_edges(vertex_count: usize, edges: Vec<Edge>, groups: Option<Vec<GroupId>>) -> Result<Self> {
        if let Some(groups) = &groups {
            if groups.len() != vertex_count {
                return Err(TopologyError::ConstructionInvariant(format!(
                    "{} group assignments for {} routers",
                    groups.len(),
                    vertex_count
                )));
            }
        }

        let mut adjacency = vec![Vec::new(); vertex_count];
        let mut seen = HashSet::with_capacity(edges.len());
        for edge in &edges {
            let (u, v) = edge.key();
            if u == v {
                return Err(TopologyError::ConstructionInvariant(format!("self-loop at router {}", u)));
            }
            if v as usize >= vertex_count {
                return Err(TopologyError::ConstructionInvariant(format!(
                    "edge ({}, {}) references a router outside 0..{}",
                    edge.src, edge.dst, vertex_count
                )));
            }
            if !seen.insert((u, v)) {
                return Err(TopologyError::ConstructionInvariant(format!("duplicate edge ({}, {})", u, v)));
            }
            adjacency[u as usize].push(v);
            adjacency[v as usize].push(u);
        }
        for neighbors in adjacency.iter_mut() {
            neighbors.sort_unstable();
        }

        Ok(Self { adjacency, edges, groups })
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges in construction order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Ascending neighbor list of `v`.
    pub fn neighbors(&self, v: NodeId) -> &[NodeId] {
        &self.adjacency[v as usize]
    }

    pub fn adjacency(&self) -> &[Vec<NodeId>] {
        &self.adjacency
    }

    pub fn degree(&self, v: NodeId) -> usize {
        self.adjacency[v as usize].len()
    }

    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn min_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Sum of all degrees, i.e. twice the edge count.
    pub fn total_degree(&self) -> usize {
        2 * self.edges.len()
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.adjacency
            .get(u as usize)
            .map_or(false, |neighbors| neighbors.binary_search(&v).is_ok())
    }

    /// Group of router `v`, for grouped (Dragonfly) graphs.
    pub fn group_of(&self, v: NodeId) -> Option<GroupId> {
        self.groups.as_ref().and_then(|groups| groups.get(v as usize).copied())
    }

    pub fn groups(&self) -> Option<&[GroupId]> {
        self.groups.as_deref()
    }
}

/// One route between a source and destination, with its traffic share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPath {
    pub weight: f64,
    /// Full router sequence, source first and destination last.
    pub path: Vec<NodeId>,
}

impl WeightedPath {
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Source → destination → weighted paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    routes: BTreeMap<NodeId, BTreeMap<NodeId, Vec<WeightedPath>>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` as the only route from `src` to `dst`, with weight 1.0.
    pub fn insert_single(&mut self, src: NodeId, dst: NodeId, path: Vec<NodeId>) {
        self.routes
            .entry(src)
            .or_default()
            .insert(dst, vec![WeightedPath { weight: 1.0, path }]);
    }

    pub fn paths(&self, src: NodeId, dst: NodeId) -> Option<&[WeightedPath]> {
        self.routes.get(&src)?.get(&dst).map(Vec::as_slice)
    }

    /// All entries in (src, dst) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId, &[WeightedPath])> + '_ {
        self.routes.iter().flat_map(|(&src, dsts)| {
            dsts.iter().map(move |(&dst, paths)| (src, dst, paths.as_slice()))
        })
    }

    /// Number of (src, dst) pairs with at least one entry.
    pub fn pair_count(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    pub fn max_hops(&self) -> usize {
        self.iter()
            .flat_map(|(_, _, paths)| paths.iter().map(WeightedPath::hops))
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// A built topology, as seen by exporters and the simulator boundary.
pub trait NetworkTopology {
    /// File stem used for outputs, e.g. `PolarFly.q_7`.
    fn name(&self) -> String;

    fn graph(&self) -> &RouterGraph;

    /// Endpoints (hosts) attached to each router.
    fn endpoints_per_router(&self) -> u32;

    /// Deterministic single-path routing table over [`Self::graph`].
    fn routing_table(&self) -> Result<RoutingTable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RouterGraph {
        let edges = vec![Edge::untagged(0, 1), Edge::untagged(1, 2), Edge::untagged(0, 2)];
        RouterGraph::from_edges(3, edges, None).unwrap()
    }

    #[test]
    fn test_graph_adjacency_sorted() {
        let graph = triangle();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(0), &[1, 2]);
        assert_eq!(graph.neighbors(2), &[0, 1]);
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(2, 2));
        assert!(!graph.has_edge(7, 1));
        assert_eq!(graph.total_degree(), 6);
        assert_eq!(graph.group_of(0), None);
    }

    #[test]
    fn test_graph_rejects_bad_edges() {
        assert!(RouterGraph::from_edges(2, vec![Edge::untagged(1, 1)], None).is_err());
        assert!(RouterGraph::from_edges(2, vec![Edge::untagged(0, 2)], None).is_err());
        let dup = vec![Edge::untagged(0, 1), Edge::untagged(1, 0)];
        assert!(RouterGraph::from_edges(2, dup, None).is_err());
        assert!(RouterGraph::from_edges(2, vec![], Some(vec![0])).is_err());
    }

    #[test]
    fn test_routing_table_accessors() {
        let mut table = RoutingTable::new();
        assert!(table.is_empty());
        table.insert_single(0, 2, vec![0, 1, 2]);
        table.insert_single(0, 1, vec![0, 1]);

        assert_eq!(table.pair_count(), 2);
        assert_eq!(table.max_hops(), 2);
        let pairs: Vec<(NodeId, NodeId)> = table.iter().map(|(s, d, _)| (s, d)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2)]);
        assert_eq!(table.paths(0, 2).unwrap()[0].weight, 1.0);
        assert!(table.paths(1, 0).is_none());
    }

    #[test]
    fn test_edge_serialization_skips_missing_tag() {
        let json = serde_json::to_string(&Edge::untagged(0, 3)).unwrap();
        assert_eq!(json, r#"{"src":0,"dst":3}"#);
        let json = serde_json::to_string(&Edge::tagged(0, 3, true)).unwrap();
        assert_eq!(json, r#"{"src":0,"dst":3,"intergroup":true}"#);
    }
}
