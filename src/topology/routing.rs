//! Deterministic single-path routing table construction.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::dragonfly::DragonflyGraph;
use super::types::{GroupId, NodeId, RouterGraph, RoutingTable};
use crate::error::{Result, TopologyError};

/// All-pairs tables beyond this many entries get a warning before building.
const LARGE_TABLE_PAIRS: usize = 4_000_000;

/// Largest router count for which an all-pairs routing table is built.
///
/// 4096 routers is about 16.7M stored paths. Polarfly up to q = 63 and
/// Dragonfly up to d = 26 fit; larger networks must disable routing.
pub const MAX_ROUTING_ROUTERS: usize = 4096;

/// Checks that an all-pairs table for `routers` routers may be built.
///
/// # Errors
///
/// `UnsupportedFeature` if `routers` exceeds [`MAX_ROUTING_ROUTERS`].
pub fn check_table_size(topology: &str, routers: usize) -> Result<()> {
    if routers > MAX_ROUTING_ROUTERS {
        return Err(TopologyError::UnsupportedFeature(format!(
            "{} routing table for {} routers (limit {}); disable routing for this topology",
            topology, routers, MAX_ROUTING_ROUTERS
        )));
    }
    let pairs = routers.saturating_mul(routers.saturating_sub(1));
    if pairs > LARGE_TABLE_PAIRS {
        warn!(
            "{} routing table covers {} router pairs; this may take a while and a lot of memory",
            topology, pairs
        );
    }
    Ok(())
}

/// Minimal routing for diameter-2 graphs such as Polarfly.
///
/// Adjacent pairs route directly. Otherwise the path goes through the
/// lowest-id neighbor of the source that is adjacent to the destination.
pub struct PolarflyRoutingTableBuilder<'a> {
    graph: &'a RouterGraph,
}

impl<'a> PolarflyRoutingTableBuilder<'a> {
    pub fn new(graph: &'a RouterGraph) -> Self {
        Self { graph }
    }

    /// Minimal path from `src` to `dst`.
    ///
    /// # Errors
    ///
    /// `ConstructionInvariant` if `dst` is more than two hops away.
    pub fn path(&self, src: NodeId, dst: NodeId) -> Result<Vec<NodeId>> {
        if self.graph.has_edge(src, dst) {
            return Ok(vec![src, dst]);
        }
        self.graph
            .neighbors(src)
            .iter()
            .find(|&&mid| self.graph.has_edge(mid, dst))
            .map(|&mid| vec![src, mid, dst])
            .ok_or_else(|| {
                TopologyError::ConstructionInvariant(format!(
                    "router {} cannot reach router {} in two hops",
                    src, dst
                ))
            })
    }

    pub fn build(&self) -> Result<RoutingTable> {
        let n = self.graph.vertex_count() as NodeId;
        check_table_size("Polarfly", n as usize)?;

        let mut table = RoutingTable::new();
        for src in 0..n {
            for dst in (0..n).filter(|&dst| dst != src) {
                table.insert_single(src, dst, self.path(src, dst)?);
            }
        }

        info!(
            "Computed Polarfly routing table: {} pairs, at most {} hops",
            table.pair_count(),
            table.max_hops()
        );
        Ok(table)
    }
}

/// Minimal local-global-local routing for Dragonfly graphs.
///
/// Each group leaves toward another group through a single gateway: the
/// lowest-id router of the group that owns the global link to that target.
pub struct DragonflyRoutingTableBuilder<'a> {
    dragonfly: &'a DragonflyGraph,
    /// Per group: target group → (gateway router, landing router).
    gateways: Vec<BTreeMap<GroupId, (NodeId, NodeId)>>,
}

impl<'a> DragonflyRoutingTableBuilder<'a> {
    pub fn new(dragonfly: &'a DragonflyGraph) -> Self {
        let mut gateways = vec![BTreeMap::new(); dragonfly.shape().groups as usize];
        for u in 0..dragonfly.router_count() as NodeId {
            let group = dragonfly.group_of(u);
            for (&target, &landing) in dragonfly.global_links(u) {
                gateways[group as usize].entry(target).or_insert((u, landing));
            }
        }
        debug!("Indexed Dragonfly gateways for {} groups", gateways.len());
        Self { dragonfly, gateways }
    }

    /// Path from `src` to `dst`, source first and destination last.
    ///
    /// * Same group: the direct local link.
    /// * `src` owns the global link into the destination group: take it, then
    ///   a local hop if the landing router is not `dst`.
    /// * Otherwise: local hop to the group's gateway, the global link, then a
    ///   local hop if needed.
    pub fn path(&self, src: NodeId, dst: NodeId) -> Result<Vec<NodeId>> {
        if src == dst {
            return Err(TopologyError::InvalidConfiguration(format!(
                "no route from router {} to itself",
                src
            )));
        }
        let src_group = self.dragonfly.group_of(src);
        let dst_group = self.dragonfly.group_of(dst);

        if src_group == dst_group {
            return Ok(vec![src, dst]);
        }

        let mut path = vec![src];
        let landing = match self.dragonfly.link_into(src, dst_group) {
            Some(landing) => landing,
            None => {
                let &(gateway, landing) = self.gateways[src_group as usize].get(&dst_group).ok_or_else(|| {
                    TopologyError::ConstructionInvariant(format!(
                        "group {} has no global link to group {}",
                        src_group, dst_group
                    ))
                })?;
                path.push(gateway);
                landing
            }
        };
        path.push(landing);
        if landing != dst {
            path.push(dst);
        }
        Ok(path)
    }

    pub fn build(&self) -> Result<RoutingTable> {
        let n = self.dragonfly.router_count() as NodeId;
        check_table_size("Dragonfly", n as usize)?;

        let mut table = RoutingTable::new();
        for src in 0..n {
            for dst in (0..n).filter(|&dst| dst != src) {
                let path = self.path(src, dst)?;
                if path.len() > 4 {
                    return Err(TopologyError::ConstructionInvariant(format!(
                        "route {} -> {} takes {} hops",
                        src,
                        dst,
                        path.len() - 1
                    )));
                }
                table.insert_single(src, dst, path);
            }
        }

        info!(
            "Computed Dragonfly routing table: {} pairs, at most {} hops",
            table.pair_count(),
            table.max_hops()
        );
        Ok(table)
    }
}
