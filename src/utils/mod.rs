//! Shared utilities: post-construction graph and routing checks.

pub mod validation;

pub use validation::{degree_histogram, diameter, validate_routing_table};
