//! Finite field construction.
//!
//! This module builds GF(q) for prime powers q up to [`MAX_FIELD_ORDER`]
//! on top of a small polynomial ring over Z/pZ.

pub mod cache;
pub mod galois;
pub mod poly;

// Re-export key types and functions for easier access
pub use cache::FieldCache;
pub use galois::{factor, find_irreducible, is_prime, is_prime_power, FieldElement, GaloisField, MAX_FIELD_ORDER};
pub use poly::{Poly, PolyRing, MAX_EXTENSION_DEGREE, POLY_WIDTH};
