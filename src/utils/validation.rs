//! Graph and routing validation utilities.
//!
//! These checks run after construction, when `general.validate` is set, and
//! back the integration tests.

use crate::topology::{NodeId, RouterGraph, RoutingTable};
use std::collections::{BTreeMap, VecDeque};

/// Compute the diameter of a router graph
///
/// Runs a breadth-first search from every vertex.
///
/// # Arguments
/// * `graph` - The graph to measure
///
/// # Returns
/// * `Some(d)` with the longest shortest-path length
/// * `None` if the graph is disconnected
pub fn diameter(graph: &RouterGraph) -> Option<usize> {
    let n = graph.vertex_count();
    let mut longest = 0;
    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::with_capacity(n);

    for source in 0..n as NodeId {
        dist.iter_mut().for_each(|d| *d = usize::MAX);
        dist[source as usize] = 0;
        queue.push_back(source);
        let mut reached = 1;

        while let Some(u) = queue.pop_front() {
            for &v in graph.neighbors(u) {
                if dist[v as usize] == usize::MAX {
                    dist[v as usize] = dist[u as usize] + 1;
                    longest = longest.max(dist[v as usize]);
                    reached += 1;
                    queue.push_back(v);
                }
            }
        }

        if reached != n {
            return None;
        }
    }

    Some(longest)
}

/// Validate a routing table against the graph it was built for
///
/// Checks that:
/// - Every ordered pair of distinct routers has at least one path
/// - Path weights for a pair sum to 1
/// - Each path starts at the source, ends at the destination and only uses
///   existing links
///
/// # Returns
/// * `Ok(())` if validation succeeds
/// * `Err(String)` describing the first problem found
pub fn validate_routing_table(graph: &RouterGraph, table: &RoutingTable) -> Result<(), String> {
    let n = graph.vertex_count();
    let expected_pairs = n * n.saturating_sub(1);
    if table.pair_count() != expected_pairs {
        return Err(format!(
            "Routing table covers {} pairs, expected {}",
            table.pair_count(),
            expected_pairs
        ));
    }

    for (src, dst, paths) in table.iter() {
        if src == dst {
            return Err(format!("Routing table has an entry from router {} to itself", src));
        }
        if paths.is_empty() {
            return Err(format!("No path from {} to {}", src, dst));
        }

        let total_weight: f64 = paths.iter().map(|p| p.weight).sum();
        if (total_weight - 1.0).abs() > 1e-9 {
            return Err(format!("Weights from {} to {} sum to {}", src, dst, total_weight));
        }

        for weighted in paths {
            let path = &weighted.path;
            if path.first() != Some(&src) || path.last() != Some(&dst) {
                return Err(format!("Path {:?} does not run from {} to {}", path, src, dst));
            }
            if let Some(hop) = path.windows(2).find(|hop| !graph.has_edge(hop[0], hop[1])) {
                return Err(format!(
                    "Path {:?} from {} to {} uses missing link ({}, {})",
                    path, src, dst, hop[0], hop[1]
                ));
            }
        }
    }

    Ok(())
}

/// Count routers by degree, ascending
pub fn degree_histogram(graph: &RouterGraph) -> BTreeMap<usize, usize> {
    let mut histogram = BTreeMap::new();
    for neighbors in graph.adjacency() {
        *histogram.entry(neighbors.len()).or_insert(0) += 1;
    }
    histogram
}
