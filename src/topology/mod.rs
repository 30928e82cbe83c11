//! Network topology module.
//!
//! This module contains the router graph types, the Polarfly and Dragonfly
//! graph builders, and their deterministic routing table builders.

pub mod dragonfly;
pub mod polarfly;
pub mod routing;
pub mod types;

// Re-export key types and functions for easier access
pub use dragonfly::{DragonflyGraph, DragonflyGraphBuilder, DragonflyShape, DragonflyTopology};
pub use polarfly::{BrownPolarityGraphBuilder, PolarityGraph, PolarflyTopology, SUPPORTED_POLARFLY_ORDERS};
pub use routing::{check_table_size, DragonflyRoutingTableBuilder, PolarflyRoutingTableBuilder, MAX_ROUTING_ROUTERS};
pub use types::{Edge, GroupId, NetworkTopology, NodeId, RouterGraph, RoutingTable, WeightedPath};
