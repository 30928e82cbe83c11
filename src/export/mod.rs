//! Output formats for built topologies.
//!
//! - `snapshot`: JSON handed to simulators
//! - `line_format`: human-readable `.topo` files and their parser
//! - `adjacency`: Polarfly adjacency lists

pub mod adjacency;
pub mod line_format;
pub mod snapshot;

pub use adjacency::{adjacency_file_name, parse_adjacency_str, to_adjacency_string, write_adjacency_file};
pub use line_format::{
    parse_topology_file, parse_topology_str, to_topology_string, validate_topology, write_topology_file,
    ParsedEdge, ParsedNode, ParsedTopology,
};
pub use snapshot::SimulatorSnapshot;
