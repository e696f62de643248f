//! Bounded per-node neighbor lists for the page-rendering layer.

use crate::normalize::Adjacency;
use std::collections::BTreeMap;

/// Up to `max_count` neighbors in normalizer order.
///
/// Truncated, never re-sorted, never sampled. Unknown nodes yield an empty
/// slice. Callers must pass the same normalized instance the metrics
/// engine measured for the run, or navigation and report drift apart.
pub fn neighbors_for<'a>(node: &str, adj: &'a Adjacency, max_count: usize) -> &'a [String] {
    adj.get(node)
        .map(|neighbors| &neighbors[..neighbors.len().min(max_count)])
        .unwrap_or(&[])
}

/// Every node's bounded neighbor list, the page-layer payload.
pub fn link_map(adj: &Adjacency, max_count: usize) -> BTreeMap<String, Vec<String>> {
    adj.keys()
        .map(|node| (node.clone(), neighbors_for(node, adj, max_count).to_vec()))
        .collect()
}
