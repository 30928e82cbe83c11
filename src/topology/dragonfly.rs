//! Dally-style Dragonfly topologies.
//!
//! Routers are split into `g` groups of `a` routers. Each group is a
//! complete graph, and every pair of groups is joined by exactly one global
//! link. With `h` global links per router, the shape is balanced for a
//! target inter-router degree `d`:
//!
//! ```text
//! a = 2(d + 1) / 3,   h = a / 2,   g = a·h + 1,   d = (a - 1) + h
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::ops::Range;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::routing::DragonflyRoutingTableBuilder;
use super::types::{Edge, GroupId, NetworkTopology, NodeId, RouterGraph, RoutingTable};
use crate::error::{Result, TopologyError};

/// Shape parameters derived from the target inter-router degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragonflyShape {
    /// Inter-router ports per router (host ports excluded).
    pub degree: u32,
    /// Routers per group (`a`).
    pub routers_per_group: u32,
    /// Global (inter-group) links per router (`h`).
    pub global_links_per_router: u32,
    /// Number of groups (`g`).
    pub groups: u32,
}

impl DragonflyShape {
    /// Derives `a`, `h` and `g` from `d`.
    ///
    /// # Errors
    ///
    /// `InvalidRadix` if `2(d+1)` is not divisible by 3, if `a` is odd, or if
    /// the resulting router count does not fit in a `u32`.
    pub fn from_degree(degree: u32) -> Result<Self> {
        let radix_error = |reason: String| TopologyError::InvalidRadix { degree, reason };

        let doubled = (degree as u64 + 1) * 2;
        if doubled % 3 != 0 {
            return Err(radix_error(format!(
                "routers per group 2(d+1)/3 = {}/3 is not an integer",
                doubled
            )));
        }
        let a = doubled / 3;
        if a % 2 != 0 {
            return Err(radix_error(format!("routers per group {} is odd, so a/2 is not an integer", a)));
        }
        let h = a / 2;
        let too_many = || radix_error(format!("a = {} gives more routers than fit a router id", a));
        let g = a.checked_mul(h).and_then(|links| links.checked_add(1)).ok_or_else(too_many)?;
        let routers = a.checked_mul(g).ok_or_else(too_many)?;
        if routers > u32::MAX as u64 {
            return Err(radix_error(format!("{} routers do not fit a router id", routers)));
        }

        Ok(Self {
            degree,
            routers_per_group: a as u32,
            global_links_per_router: h as u32,
            groups: g as u32,
        })
    }

    /// Total router count `a·g`.
    pub fn router_count(&self) -> usize {
        self.routers_per_group as usize * self.groups as usize
    }

    /// Outward link budget of one group, `a·h`.
    pub fn global_links_per_group(&self) -> u32 {
        self.routers_per_group * self.global_links_per_router
    }
}

/// Builds a Dragonfly graph for a target degree and optional router count.
#[derive(Debug, Clone, Copy)]
pub struct DragonflyGraphBuilder {
    shape: DragonflyShape,
}

impl DragonflyGraphBuilder {
    /// # Errors
    ///
    /// * `InvalidRadix` if `degree` admits no balanced shape.
    /// * `InvalidConfiguration` if `routers` is given and differs from `a·g`.
    pub fn new(degree: u32, routers: Option<usize>) -> Result<Self> {
        let shape = DragonflyShape::from_degree(degree)?;
        if let Some(routers) = routers {
            if routers != shape.router_count() {
                return Err(TopologyError::InvalidConfiguration(format!(
                    "router count {} does not match degree {}: expected {} ({} groups of {})",
                    routers,
                    degree,
                    shape.router_count(),
                    shape.groups,
                    shape.routers_per_group
                )));
            }
        }
        Ok(Self { shape })
    }

    pub fn shape(&self) -> DragonflyShape {
        self.shape
    }

    /// Builds the intra-group cliques followed by the round-robin global links.
    pub fn build(&self) -> Result<DragonflyGraph> {
        let shape = self.shape;
        let a = shape.routers_per_group;
        let g = shape.groups;
        let router_count = shape.router_count();
        debug!(
            "Building Dragonfly d={}: {} groups of {} routers, {} global links per router",
            shape.degree, g, a, shape.global_links_per_router
        );

        let groups: Vec<GroupId> = (0..router_count as u32).map(|r| r / a).collect();
        let mut edges = Vec::new();

        for group in 0..g {
            let base = group * a;
            for i in 0..a {
                for j in (i + 1)..a {
                    edges.push(Edge::tagged(base + i, base + j, false));
                }
            }
        }

        let budget = shape.global_links_per_group();
        let mut pending: Vec<VecDeque<GroupId>> =
            (0..g).map(|group| (0..g).filter(|&other| other != group).collect()).collect();
        let mut next_router = vec![0u32; g as usize];
        let mut links_used = vec![0u32; g as usize];
        let mut global_links = vec![BTreeMap::new(); router_count];

        for group in 0..g {
            while links_used[group as usize] < budget {
                let Some(target) = pending[group as usize].pop_front() else {
                    break;
                };
                let u = group * a + next_router[group as usize];
                next_router[group as usize] = (next_router[group as usize] + 1) % a;
                let v = target * a + next_router[target as usize];
                next_router[target as usize] = (next_router[target as usize] + 1) % a;

                pending[target as usize].retain(|&other| other != group);
                links_used[group as usize] += 1;
                links_used[target as usize] += 1;

                global_links[u as usize].insert(target, v);
                global_links[v as usize].insert(group, u);
                edges.push(Edge::tagged(u, v, true));
            }
        }

        if let Some(group) = links_used.iter().position(|&used| used != budget) {
            return Err(TopologyError::ConstructionInvariant(format!(
                "group {} used {} global links, budget is {}",
                group, links_used[group], budget
            )));
        }
        if let Some(group) = pending.iter().position(|queue| !queue.is_empty()) {
            return Err(TopologyError::ConstructionInvariant(format!(
                "group {} still lacks links to groups {:?}",
                group, pending[group]
            )));
        }

        let graph = RouterGraph::from_edges(router_count, edges, Some(groups))?;

        // Mean degree must equal d exactly: 2|E| = d·R.
        let expected_total = shape.degree as usize * router_count;
        if graph.total_degree() != expected_total {
            return Err(TopologyError::ConstructionInvariant(format!(
                "mean degree {:.3} differs from target {}",
                graph.total_degree() as f64 / router_count as f64,
                shape.degree
            )));
        }

        info!(
            "Built Dragonfly d={}: {} routers in {} groups, {} links",
            shape.degree,
            router_count,
            g,
            graph.edge_count()
        );
        Ok(DragonflyGraph { shape, global_links, graph })
    }
}

/// A built Dragonfly: full graph plus per-router global link maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragonflyGraph {
    shape: DragonflyShape,
    /// Per router: neighbor group → neighbor router, for global links only.
    global_links: Vec<BTreeMap<GroupId, NodeId>>,
    graph: RouterGraph,
}

impl DragonflyGraph {
    pub fn shape(&self) -> DragonflyShape {
        self.shape
    }

    pub fn graph(&self) -> &RouterGraph {
        &self.graph
    }

    pub fn router_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Group of router `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a router of this graph.
    pub fn group_of(&self, v: NodeId) -> GroupId {
        v / self.shape.routers_per_group
    }

    /// Router ids belonging to `group`.
    pub fn routers_in_group(&self, group: GroupId) -> Range<NodeId> {
        let a = self.shape.routers_per_group;
        group * a..(group + 1) * a
    }

    /// Global links of router `v`, keyed by the neighbor's group.
    pub fn global_links(&self, v: NodeId) -> &BTreeMap<GroupId, NodeId> {
        &self.global_links[v as usize]
    }

    /// The router reached from `v` over its global link into `group`, if any.
    pub fn link_into(&self, v: NodeId, group: GroupId) -> Option<NodeId> {
        self.global_links[v as usize].get(&group).copied()
    }
}

/// Adapter exposing a Dragonfly as a [`NetworkTopology`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragonflyTopology {
    dragonfly: DragonflyGraph,
    hosts_per_router: Option<u32>,
}

impl DragonflyTopology {
    pub fn new(degree: u32, routers: Option<usize>) -> Result<Self> {
        let dragonfly = DragonflyGraphBuilder::new(degree, routers)?.build()?;
        Ok(Self { dragonfly, hosts_per_router: None })
    }

    /// Overrides the balanced endpoints-per-router value.
    pub fn with_hosts_per_router(mut self, hosts_per_router: Option<u32>) -> Self {
        self.hosts_per_router = hosts_per_router;
        self
    }

    pub fn dragonfly(&self) -> &DragonflyGraph {
        &self.dragonfly
    }

    pub fn shape(&self) -> DragonflyShape {
        self.dragonfly.shape()
    }

    /// Balanced endpoints per router: one host per global link (`a = 2p = 2h`).
    pub fn balanced_epr(&self) -> u32 {
        self.shape().global_links_per_router
    }
}

impl NetworkTopology for DragonflyTopology {
    fn name(&self) -> String {
        let shape = self.shape();
        format!("Dragonfly.d_{}_a_{}_g_{}", shape.degree, shape.routers_per_group, shape.groups)
    }

    fn graph(&self) -> &RouterGraph {
        self.dragonfly.graph()
    }

    fn endpoints_per_router(&self) -> u32 {
        self.hosts_per_router.unwrap_or_else(|| self.balanced_epr())
    }

    fn routing_table(&self) -> Result<RoutingTable> {
        DragonflyRoutingTableBuilder::new(&self.dragonfly).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_shape_from_degree() {
        let shape = DragonflyShape::from_degree(5).unwrap();
        assert_eq!(shape.routers_per_group, 4);
        assert_eq!(shape.global_links_per_router, 2);
        assert_eq!(shape.groups, 9);
        assert_eq!(shape.router_count(), 36);

        let shape = DragonflyShape::from_degree(2).unwrap();
        assert_eq!((shape.routers_per_group, shape.global_links_per_router, shape.groups), (2, 1, 3));
    }

    #[test]
    fn test_invalid_radix() {
        for degree in [0, 1, 3, 4, 6, 7] {
            let err = DragonflyShape::from_degree(degree).unwrap_err();
            assert!(matches!(err, TopologyError::InvalidRadix { .. }), "degree {}", degree);
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
    }

    #[test]
    fn test_huge_radix_rejected() {
        // d = 5_999_999 gives a = 4_000_000, so a·g overflows u64; d = 4_499 fits u64 but not u32
        for degree in [5_999_999, u32::MAX - 1, 4_499] {
            let err = DragonflyShape::from_degree(degree).unwrap_err();
            assert!(matches!(err, TopologyError::InvalidRadix { .. }), "degree {}", degree);
        }
    }

    #[test]
    fn test_router_count_must_match_shape() {
        assert!(DragonflyGraphBuilder::new(5, Some(36)).is_ok());
        let err = DragonflyGraphBuilder::new(5, Some(40)).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_every_router_has_target_degree() {
        for degree in [2, 5, 8, 11] {
            let df = DragonflyGraphBuilder::new(degree, None).unwrap().build().unwrap();
            let shape = df.shape();
            let graph = df.graph();
            assert_eq!(graph.total_degree(), degree as usize * df.router_count());
            for v in 0..df.router_count() as NodeId {
                assert_eq!(graph.degree(v), degree as usize);
                assert_eq!(df.global_links(v).len(), shape.global_links_per_router as usize);
            }
        }
    }

    #[test]
    fn test_every_group_pair_joined_once() {
        let df = DragonflyGraphBuilder::new(5, None).unwrap().build().unwrap();
        let g = df.shape().groups;
        let mut joined = vec![vec![0u32; g as usize]; g as usize];
        for edge in df.graph().edges().iter().filter(|e| e.is_intergroup()) {
            let (gu, gv) = (df.group_of(edge.src), df.group_of(edge.dst));
            assert_ne!(gu, gv);
            joined[gu as usize][gv as usize] += 1;
            joined[gv as usize][gu as usize] += 1;
        }
        for x in 0..g as usize {
            for y in 0..g as usize {
                assert_eq!(joined[x][y], if x == y { 0 } else { 1 });
            }
        }
    }

    #[test]
    fn test_intra_group_edges_are_complete_and_tagged() {
        let df = DragonflyGraphBuilder::new(5, None).unwrap().build().unwrap();
        let graph = df.graph();
        for group in 0..df.shape().groups {
            let routers: Vec<NodeId> = df.routers_in_group(group).collect();
            for &u in &routers {
                assert_eq!(graph.group_of(u), Some(group));
                for &v in &routers {
                    if u != v {
                        assert!(graph.has_edge(u, v));
                    }
                }
            }
        }
        let intra = graph.edges().iter().filter(|e| e.intergroup == Some(false)).count();
        assert_eq!(intra, 9 * 6);
        assert!(graph.edges().iter().all(|e| e.intergroup.is_some()));
    }

    #[test]
    fn test_global_link_maps_are_symmetric() {
        let df = DragonflyGraphBuilder::new(8, None).unwrap().build().unwrap();
        for u in 0..df.router_count() as NodeId {
            for (&group, &v) in df.global_links(u) {
                assert_eq!(df.group_of(v), group);
                assert_eq!(df.link_into(v, df.group_of(u)), Some(u));
            }
        }
    }

    #[test]
    fn test_first_global_links_follow_round_robin() {
        let df = DragonflyGraphBuilder::new(5, None).unwrap().build().unwrap();
        // group 0 router 0 -> group 1 router 4, group 0 router 1 -> group 2 router 8
        assert_eq!(df.link_into(0, 1), Some(4));
        assert_eq!(df.link_into(1, 2), Some(8));
        // group 1 already used its router 4 for group 0, so it links to group 2 from router 5
        assert_eq!(df.link_into(5, 2), Some(9));
    }

    #[test]
    fn test_topology_adapter() {
        let topo = DragonflyTopology::new(5, Some(36)).unwrap();
        assert_eq!(topo.name(), "Dragonfly.d_5_a_4_g_9");
        assert_eq!(topo.endpoints_per_router(), 2);
        let topo = topo.with_hosts_per_router(Some(3));
        assert_eq!(topo.endpoints_per_router(), 3);
        assert_eq!(topo.graph().vertex_count(), 36);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = DragonflyGraphBuilder::new(8, None).unwrap().build().unwrap();
        let b = DragonflyGraphBuilder::new(8, None).unwrap().build().unwrap();
        assert_eq!(a, b);
    }
}
