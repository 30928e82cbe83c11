//! Simulator-facing JSON snapshot of a built topology.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::topology::{Edge, NetworkTopology, RouterGraph, RoutingTable};

/// Everything a simulator needs to instantiate a topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorSnapshot {
    pub name: String,
    pub vertex_count: usize,
    pub endpoints_per_router: u32,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub routing: Option<RoutingTable>,
}

impl SimulatorSnapshot {
    pub fn new(name: impl Into<String>, graph: &RouterGraph, endpoints_per_router: u32, routing: Option<RoutingTable>) -> Self {
        Self {
            name: name.into(),
            vertex_count: graph.vertex_count(),
            endpoints_per_router,
            edges: graph.edges().to_vec(),
            routing,
        }
    }

    /// Snapshot of `topology`, computing its routing table if requested.
    pub fn from_topology<T: NetworkTopology + ?Sized>(topology: &T, with_routing: bool) -> crate::error::Result<Self> {
        let routing = if with_routing { Some(topology.routing_table()?) } else { None };
        Ok(Self::new(topology.name(), topology.graph(), topology.endpoints_per_router(), routing))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).wrap_err("Failed to serialize topology snapshot")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).wrap_err_with(|| format!("Failed to write snapshot to {}", path.display()))
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&content).wrap_err_with(|| format!("Failed to parse snapshot {}", path.display()))
    }
}
