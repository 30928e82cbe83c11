//! Topology build orchestrator.
//!
//! This module coordinates the overall generation process: finite fields
//! first, then graphs and routing tables, then validation and output files.

use crate::config::TopologyConfig;
use crate::export::{adjacency_file_name, write_adjacency_file, write_topology_file, SimulatorSnapshot};
use crate::field::{FieldCache, GaloisField};
use crate::topology::{
    check_table_size, DragonflyShape, DragonflyTopology, NetworkTopology, PolarflyTopology, RouterGraph, RoutingTable,
};
use crate::utils::validation::{degree_histogram, diameter, validate_routing_table};
use color_eyre::eyre::{eyre, Result, WrapErr};
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A topology ready for validation and export
#[derive(Debug, Clone)]
pub struct BuiltTopology {
    pub config: TopologyConfig,
    pub name: String,
    pub graph: RouterGraph,
    pub routing: Option<RoutingTable>,
    pub endpoints_per_router: u32,
}

impl BuiltTopology {
    fn from_topology<T: NetworkTopology>(config: &TopologyConfig, topology: &T) -> Result<Self> {
        let routing = if config.wants_routing() { Some(topology.routing_table()?) } else { None };
        Ok(Self {
            config: config.clone(),
            name: topology.name(),
            graph: topology.graph().clone(),
            routing,
            endpoints_per_router: topology.endpoints_per_router(),
        })
    }

    pub fn snapshot(&self) -> SimulatorSnapshot {
        SimulatorSnapshot::new(self.name.clone(), &self.graph, self.endpoints_per_router, self.routing.clone())
    }

    /// Largest diameter this kind of topology may have
    fn diameter_bound(&self) -> usize {
        match self.config {
            TopologyConfig::Polarfly(_) => 2,
            TopologyConfig::Dragonfly(_) => 3,
        }
    }
}

/// Build one topology, taking its field from `fields` when cached
pub fn build_topology(config: &TopologyConfig, fields: &FieldCache) -> Result<BuiltTopology> {
    debug!("Building {}", config);
    let built = match config {
        TopologyConfig::Polarfly(pf) => {
            if pf.routing {
                let q = pf.q as usize;
                check_table_size("Polarfly", q.saturating_mul(q).saturating_add(q).saturating_add(1))?;
            }
            let field = match fields.get(pf.q) {
                Some(field) => field,
                None => Arc::new(GaloisField::new(pf.q)?),
            };
            let topology = PolarflyTopology::with_replication(&field, pf.replication)?
                .with_hosts_per_router(pf.hosts_per_router);
            BuiltTopology::from_topology(config, &topology)?
        }
        TopologyConfig::Dragonfly(df) => {
            if df.routing {
                check_table_size("Dragonfly", DragonflyShape::from_degree(df.degree)?.router_count())?;
            }
            let topology = DragonflyTopology::new(df.degree, df.routers)?.with_hosts_per_router(df.hosts_per_router);
            BuiltTopology::from_topology(config, &topology)?
        }
    };

    info!(
        "Built {}: {} routers, {} links, {} endpoints per router",
        built.name,
        built.graph.vertex_count(),
        built.graph.edge_count(),
        built.endpoints_per_router
    );
    Ok(built)
}

/// Build a batch of topologies in parallel, preserving input order
pub fn build_batch(configs: &[TopologyConfig]) -> Result<Vec<BuiltTopology>> {
    let orders: Vec<u32> = configs.iter().filter_map(TopologyConfig::field_order).collect();
    let fields = FieldCache::build_parallel(&orders).wrap_err("Failed to construct finite fields")?;
    debug!("Field cache holds orders {:?}", fields.orders());

    info!("Building {} topologies in parallel", configs.len());
    configs
        .par_iter()
        .map(|config| build_topology(config, &fields).wrap_err_with(|| format!("Failed to build {}", config)))
        .collect()
}

/// Re-check structural properties of a built topology
pub fn validate_built(built: &BuiltTopology) -> Result<()> {
    let measured = diameter(&built.graph).ok_or_else(|| eyre!("{} is disconnected", built.name))?;
    if measured > built.diameter_bound() {
        return Err(eyre!(
            "{} has diameter {}, expected at most {}",
            built.name,
            measured,
            built.diameter_bound()
        ));
    }

    if let Some(routing) = &built.routing {
        validate_routing_table(&built.graph, routing)
            .map_err(|e| eyre!("Invalid routing table for {}: {}", built.name, e))?;
    }

    debug!("{} degree histogram: {:?}", built.name, degree_histogram(&built.graph));
    info!("Validated {}: diameter {}", built.name, measured);
    Ok(())
}

/// Write `<name>.topo`, `<name>.json` and, for Polarfly, the adjacency list
pub fn write_outputs(built: &BuiltTopology, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let topo_path = output_dir.join(format!("{}.topo", built.name));
    write_topology_file(&built.name, &built.graph, &topo_path)?;

    let json_path = output_dir.join(format!("{}.json", built.name));
    built.snapshot().write_json(&json_path)?;

    let mut written = vec![topo_path, json_path];
    if let TopologyConfig::Polarfly(pf) = &built.config {
        let adjacency_path = output_dir.join(adjacency_file_name(pf.q));
        write_adjacency_file(&built.graph, &adjacency_path)?;
        written.push(adjacency_path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DragonflyConfig, PolarflyConfig};
    use tempfile::TempDir;

    #[test]
    fn test_build_topology_polarfly() {
        let config = TopologyConfig::Polarfly(PolarflyConfig::new(3));
        let built = build_topology(&config, &FieldCache::new()).unwrap();
        assert_eq!(built.name, "PolarFly.q_3");
        assert_eq!(built.graph.vertex_count(), 13);
        assert_eq!(built.endpoints_per_router, 2);
        assert!(built.routing.is_some());
        validate_built(&built).unwrap();
    }

    #[test]
    fn test_build_topology_errors() {
        let cache = FieldCache::new();
        assert!(build_topology(&TopologyConfig::Polarfly(PolarflyConfig::new(6)), &cache).is_err());
        assert!(build_topology(&TopologyConfig::Dragonfly(DragonflyConfig::new(4, None)), &cache).is_err());

        let mut replicated = PolarflyConfig::new(3);
        replicated.replication = 1;
        assert!(build_topology(&TopologyConfig::Polarfly(replicated), &cache).is_err());
    }

    #[test]
    fn test_routing_refused_for_large_networks() {
        let cache = FieldCache::new();
        let err = build_topology(&TopologyConfig::Polarfly(PolarflyConfig::new(64)), &cache).unwrap_err();
        assert!(format!("{}", err).contains("routing table for 4161 routers"));
        let err = build_topology(&TopologyConfig::Dragonfly(DragonflyConfig::new(32, None)), &cache).unwrap_err();
        assert!(format!("{}", err).contains("routing table for 5346 routers"));
    }

    #[test]
    fn test_build_batch_preserves_order() {
        let mut no_routing = DragonflyConfig::new(5, Some(36));
        no_routing.routing = false;
        let configs = vec![
            TopologyConfig::Dragonfly(no_routing),
            TopologyConfig::Polarfly(PolarflyConfig::new(4)),
            TopologyConfig::Polarfly(PolarflyConfig::new(2)),
            TopologyConfig::Polarfly(PolarflyConfig::new(4)),
        ];
        let built = build_batch(&configs).unwrap();
        let names: Vec<&str> = built.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Dragonfly.d_5_a_4_g_9", "PolarFly.q_4", "PolarFly.q_2", "PolarFly.q_4"]);
        assert!(built[0].routing.is_none());
        for topology in &built {
            validate_built(topology).unwrap();
        }
    }

    #[test]
    fn test_write_outputs() {
        let dir = TempDir::new().unwrap();
        let built = build_topology(&TopologyConfig::Polarfly(PolarflyConfig::new(2)), &FieldCache::new()).unwrap();
        let written = write_outputs(&built, dir.path()).unwrap();

        assert_eq!(written.len(), 3);
        assert!(dir.path().join("PolarFly.q_2.topo").exists());
        assert!(dir.path().join("PolarFly.q_2.json").exists());
        assert!(dir.path().join("PolarFly.q_2.txt").exists());

        let df = build_topology(&TopologyConfig::Dragonfly(DragonflyConfig::new(2, None)), &FieldCache::new()).unwrap();
        assert_eq!(write_outputs(&df, &dir.path().join("nested")).unwrap().len(), 2);
    }
}
