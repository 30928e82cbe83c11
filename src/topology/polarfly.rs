//! Polarfly topologies.
//!
//! A Polarfly network is the Brown polarity graph of the projective plane
//! PG(2, q): routers are the q²+q+1 points (one-dimensional subspaces of
//! GF(q)³) and two routers are linked iff their points are orthogonal under
//! the standard dot product. The q+1 self-orthogonal points (quadrics) lose
//! their would-be self-loop and end up with degree q; every other router has
//! degree q+1. The graph has diameter 2.

use log::{debug, info};

use super::routing::PolarflyRoutingTableBuilder;
use super::types::{Edge, NetworkTopology, NodeId, RouterGraph, RoutingTable};
use crate::error::{Result, TopologyError};
use crate::field::{FieldElement, GaloisField};

/// Prime powers q for which Polarfly construction is supported.
pub const SUPPORTED_POLARFLY_ORDERS: &[u32] = &[
    2, 3, 4, 5, 7, 8, 9, 11, 13, 16, 17, 19, 23, 25, 27, 29, 31, 32, 37, 41, 43, 47, 49, 53, 59,
    61, 64, 67, 71, 73, 79, 81, 83, 89, 97, 101, 103, 107, 109, 113, 121, 125, 127, 128,
];

/// Homogeneous coordinates of a point of PG(2, q).
pub type Point = [FieldElement; 3];

pub fn is_supported_order(q: u32) -> bool {
    SUPPORTED_POLARFLY_ORDERS.binary_search(&q).is_ok()
}

/// Number of routers in the Polarfly of order q.
pub fn vertex_count_for(q: u32) -> usize {
    let q = q as usize;
    q * q + q + 1
}

/// Canonical representatives of the points of PG(2, q), in router-id order:
/// `(d1, d2, 1)` for `d1, d2 in [0, q)` (d1 outer), then `(d1, 1, 0)` for
/// `d1 in [0, q)`, then `(1, 0, 0)`.
pub fn canonical_points(q: u32) -> Vec<Point> {
    let mut points = Vec::with_capacity(vertex_count_for(q));
    for d1 in 0..q {
        for d2 in 0..q {
            points.push([d1, d2, 1]);
        }
    }
    for d1 in 0..q {
        points.push([d1, 1, 0]);
    }
    points.push([1, 0, 0]);
    points
}

/// Builds the polarity graph of PG(2, q) over a given field.
#[derive(Debug, Clone, Copy)]
pub struct BrownPolarityGraphBuilder<'a> {
    field: &'a GaloisField,
}

impl<'a> BrownPolarityGraphBuilder<'a> {
    /// Creates a builder for the plain (non-replicated) construction.
    ///
    /// # Errors
    ///
    /// * `UnsupportedFeature` if `replication` is nonzero; extended
    ///   Polarfly variants are not implemented.
    /// * `UnsupportedFeature` if the field order is not in
    ///   [`SUPPORTED_POLARFLY_ORDERS`].
    pub fn new(field: &'a GaloisField, replication: u32) -> Result<Self> {
        if replication != 0 {
            return Err(TopologyError::UnsupportedFeature(format!(
                "extended Polarfly with replication {} is not implemented",
                replication
            )));
        }
        let q = field.order();
        if !is_supported_order(q) {
            return Err(TopologyError::UnsupportedFeature(format!(
                "Polarfly order q={} is not in the supported list (prime powers up to {})",
                q,
                SUPPORTED_POLARFLY_ORDERS.last().copied().unwrap_or(0)
            )));
        }
        Ok(Self { field })
    }

    fn dot(&self, u: &Point, v: &Point) -> FieldElement {
        let f = self.field;
        let partial = f.add(f.mul(u[0], v[0]), f.mul(u[1], v[1]));
        f.add(partial, f.mul(u[2], v[2]))
    }

    /// Enumerates the points and links every orthogonal pair.
    ///
    /// Pairs are visited as `(i, j > i)`, so the edge list comes out in
    /// lexicographic order.
    pub fn build(&self) -> Result<PolarityGraph> {
        let q = self.field.order();
        let points = canonical_points(q);
        debug!("Enumerated {} points of PG(2, {})", points.len(), q);

        let mut edges = Vec::new();
        for (i, u) in points.iter().enumerate() {
            for (j, v) in points.iter().enumerate().skip(i + 1) {
                if self.dot(u, v) == 0 {
                    edges.push(Edge::untagged(i as NodeId, j as NodeId));
                }
            }
        }

        let quadrics: Vec<NodeId> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.dot(p, p) == 0)
            .map(|(i, _)| i as NodeId)
            .collect();

        let graph = RouterGraph::from_edges(points.len(), edges, None)?;
        let polarity = PolarityGraph { q, points, quadrics, graph };
        polarity.check_structure()?;

        info!(
            "Built Polarfly q={}: {} routers, {} links, network radix {}",
            q,
            polarity.graph.vertex_count(),
            polarity.graph.edge_count(),
            polarity.graph.max_degree()
        );
        Ok(polarity)
    }
}

/// The polarity graph of PG(2, q) together with its point coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolarityGraph {
    q: u32,
    points: Vec<Point>,
    quadrics: Vec<NodeId>,
    graph: RouterGraph,
}

impl PolarityGraph {
    /// Verifies vertex count, quadric count and the per-router degrees.
    fn check_structure(&self) -> Result<()> {
        let q = self.q as usize;
        if self.graph.vertex_count() != vertex_count_for(self.q) {
            return Err(TopologyError::ConstructionInvariant(format!(
                "Polarfly q={} has {} routers, expected {}",
                q,
                self.graph.vertex_count(),
                vertex_count_for(self.q)
            )));
        }
        if self.quadrics.len() != q + 1 {
            return Err(TopologyError::ConstructionInvariant(format!(
                "Polarfly q={} has {} quadrics, expected {}",
                q,
                self.quadrics.len(),
                q + 1
            )));
        }
        for v in 0..self.graph.vertex_count() as NodeId {
            let expected = if self.is_quadric(v) { q } else { q + 1 };
            if self.graph.degree(v) != expected {
                return Err(TopologyError::ConstructionInvariant(format!(
                    "router {} of Polarfly q={} has degree {}, expected {}",
                    v,
                    q,
                    self.graph.degree(v),
                    expected
                )));
            }
        }
        Ok(())
    }

    pub fn order(&self) -> u32 {
        self.q
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Routers whose point is self-orthogonal, ascending.
    pub fn quadrics(&self) -> &[NodeId] {
        &self.quadrics
    }

    pub fn is_quadric(&self, v: NodeId) -> bool {
        self.quadrics.binary_search(&v).is_ok()
    }

    pub fn graph(&self) -> &RouterGraph {
        &self.graph
    }
}

/// Thin adapter exposing a built Polarfly to the rest of the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolarflyTopology {
    polarity: PolarityGraph,
    hosts_per_router: Option<u32>,
}

impl PolarflyTopology {
    /// Builds the plain Polarfly over `field`.
    pub fn new(field: &GaloisField) -> Result<Self> {
        Self::with_replication(field, 0)
    }

    /// Builds a Polarfly with the given replication parameter.
    ///
    /// Only `replication == 0` is implemented.
    pub fn with_replication(field: &GaloisField, replication: u32) -> Result<Self> {
        let polarity = BrownPolarityGraphBuilder::new(field, replication)?.build()?;
        Ok(Self { polarity, hosts_per_router: None })
    }

    /// Builds GF(q) and the Polarfly over it in one step.
    pub fn from_order(q: u32) -> Result<Self> {
        if !is_supported_order(q) {
            return Err(TopologyError::UnsupportedFeature(format!(
                "Polarfly order q={} is not supported",
                q
            )));
        }
        let field = GaloisField::new(q)?;
        Self::new(&field)
    }

    /// Overrides the balanced endpoints-per-router value.
    pub fn with_hosts_per_router(mut self, hosts_per_router: Option<u32>) -> Self {
        self.hosts_per_router = hosts_per_router;
        self
    }

    pub fn order(&self) -> u32 {
        self.polarity.order()
    }

    pub fn vertex_count(&self) -> usize {
        self.polarity.graph().vertex_count()
    }

    pub fn degree(&self, v: NodeId) -> usize {
        self.polarity.graph().degree(v)
    }

    pub fn max_degree(&self) -> usize {
        self.polarity.graph().max_degree()
    }

    /// Default endpoints per router: `floor(max_degree / 2)`.
    pub fn balanced_epr(&self) -> u32 {
        (self.max_degree() / 2) as u32
    }

    pub fn quadrics(&self) -> &[NodeId] {
        self.polarity.quadrics()
    }

    pub fn points(&self) -> &[Point] {
        self.polarity.points()
    }

    pub fn polarity_graph(&self) -> &PolarityGraph {
        &self.polarity
    }
}

impl NetworkTopology for PolarflyTopology {
    fn name(&self) -> String {
        format!("PolarFly.q_{}", self.order())
    }

    fn graph(&self) -> &RouterGraph {
        self.polarity.graph()
    }

    fn endpoints_per_router(&self) -> u32 {
        self.hosts_per_router.unwrap_or_else(|| self.balanced_epr())
    }

    fn routing_table(&self) -> Result<RoutingTable> {
        PolarflyRoutingTableBuilder::new(self.polarity.graph()).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::is_prime_power;

    #[test]
    fn test_supported_orders_are_all_prime_powers_up_to_128() {
        let expected: Vec<u32> = (2..=128).filter(|&q| is_prime_power(q)).collect();
        assert_eq!(SUPPORTED_POLARFLY_ORDERS, expected.as_slice());
    }

    #[test]
    fn test_canonical_points_order() {
        let points = canonical_points(3);
        assert_eq!(points.len(), 13);
        assert_eq!(points[0], [0, 0, 1]);
        assert_eq!(points[1], [0, 1, 1]);
        assert_eq!(points[3], [1, 0, 1]);
        assert_eq!(points[9], [0, 1, 0]);
        assert_eq!(points[12], [1, 0, 0]);
    }

    #[test]
    fn test_small_polarfly_sizes() {
        for (q, vertices) in [(2u32, 7usize), (3, 13), (5, 31)] {
            let pf = PolarflyTopology::from_order(q).unwrap();
            assert_eq!(pf.vertex_count(), vertices);
            assert_eq!(pf.max_degree(), (q + 1) as usize);
            assert_eq!(pf.quadrics().len(), (q + 1) as usize);

            let q = q as usize;
            assert_eq!(pf.graph().edge_count(), q * (q + 1) * (q + 1) / 2);
            for v in 0..vertices as NodeId {
                let expected = if pf.polarity_graph().is_quadric(v) { q } else { q + 1 };
                assert_eq!(pf.degree(v), expected);
            }
        }
    }

    #[test]
    fn test_q5_vertex_zero_neighbors() {
        let pf = PolarflyTopology::from_order(5).unwrap();
        let neighbors = pf.graph().neighbors(0);
        assert_eq!(neighbors.len(), 6);
        assert!(!neighbors.contains(&0));
        // (0, 0, 1) is orthogonal to exactly the points with last coordinate 0
        assert_eq!(neighbors, &[25, 26, 27, 28, 29, 30]);
    }

    #[test]
    fn test_extension_field_polarfly() {
        let pf = PolarflyTopology::from_order(4).unwrap();
        assert_eq!(pf.vertex_count(), 21);
        assert_eq!(pf.max_degree(), 5);
        assert_eq!(pf.balanced_epr(), 2);
    }

    #[test]
    fn test_replication_is_rejected() {
        let field = GaloisField::new(3).unwrap();
        let err = PolarflyTopology::with_replication(&field, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_unsupported_order_is_rejected() {
        let field = GaloisField::new(131).unwrap();
        let err = PolarflyTopology::new(&field).unwrap_err();
        assert!(matches!(err, TopologyError::UnsupportedFeature(_)));
        assert!(PolarflyTopology::from_order(6).is_err());
    }

    #[test]
    fn test_endpoints_per_router() {
        let pf = PolarflyTopology::from_order(5).unwrap();
        assert_eq!(pf.balanced_epr(), 3);
        assert_eq!(pf.endpoints_per_router(), 3);
        let pf = pf.with_hosts_per_router(Some(2));
        assert_eq!(pf.endpoints_per_router(), 2);
        assert_eq!(pf.name(), "PolarFly.q_5");
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = PolarflyTopology::from_order(7).unwrap();
        let b = PolarflyTopology::from_order(7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.graph().edges(), b.graph().edges());
    }
}
