//! # Topogen - Low-diameter network topology generator
//!
//! This library builds finite fields and the interconnection topologies that
//! depend on them, and exports them for network simulators.
//!
//! ## Overview
//!
//! Topogen constructs Polarfly networks (Brown polarity graphs over GF(q))
//! and Dally-style Dragonfly networks, together with deterministic minimal
//! routing tables. Every builder is pure: identical parameters always give
//! identical graphs, tables and output bytes.
//!
//! ## Key Features
//!
//! - **Finite Fields**: Table-driven GF(p^n) for every prime power up to 256
//! - **Polarfly**: Diameter-2 graphs on q²+q+1 routers for prime powers q ≤ 128
//! - **Dragonfly**: Balanced groups with one global link per group pair
//! - **Routing**: Single-path minimal routes with 1.0 weights
//! - **Batch Builds**: Independent topologies built in parallel
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `error`: Typed construction errors and their classification
//! - `field`: Polynomial ring, Galois field tables and the field cache
//! - `topology`: Router graphs, Polarfly/Dragonfly builders and routing
//! - `export`: JSON snapshots, `.topo` line format and adjacency lists
//! - `config`: Type-safe configuration structures and YAML parsing
//! - `config_loader`: Configuration file loading
//! - `orchestrator`: High-level orchestration of builds and output
//! - `utils`: Graph and routing validation helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use topogen::{config_loader, orchestrator};
//! use std::path::Path;
//!
//! let config = config_loader::load_config(Path::new("topologies.yaml"))?;
//! let built = orchestrator::build_batch(&config.resolved_topologies()?)?;
//! for topology in &built {
//!     orchestrator::write_outputs(topology, Path::new(config.general().output_dir()))?;
//! }
//! # Ok::<(), color_eyre::Report>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   log_level: info
//!   output_dir: topo_output
//!   validate: true
//!
//! topologies:
//!   - "polarfly:5"
//!   - polarfly:
//!       q: 7
//!       hosts_per_router: 4
//!   - dragonfly:
//!       degree: 5
//!       routers: 36
//! ```

pub mod config;
pub mod config_loader;
pub mod error;
pub mod export;
pub mod field;
pub mod orchestrator;
pub mod topology;
pub mod utils;

pub use error::{ErrorKind, TopologyError};
