//! Doctor metrics over the normalized adjacency.
//!
//! Every ratio and mean is finite and in range by construction: zero-node
//! and zero-edge graphs yield 0, never NaN or a division by zero.

use crate::normalize::{Adjacency, symmetry_defects, undirected_edges};
use crate::stable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub const DOCTOR_REPORT_KIND: &str = "geolink.doctor.report.v1";

/// Degree distribution of the graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DegreeSummary {
    /// Stringified degree value → node count. `"0"` is always present so
    /// isolates are visible even when there are none.
    pub histogram: BTreeMap<String, usize>,
    /// Arithmetic mean over all nodes, isolates included.
    pub mean: f64,
}

/// The deterministic snapshot of computed graph metrics for one run.
///
/// Immutable once written; the gate consumes it read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub report_kind: String,
    pub schema: u32,
    pub nodes: usize,
    pub edges: usize,
    pub degrees: DegreeSummary,
    pub component_count: usize,
    pub largest_component_ratio: f64,
    pub cross_cluster_ratio: f64,
    pub asymmetric_pair_count: usize,
    pub graph_hash: String,
}

/// Compute the doctor report for a normalized adjacency and a node→cluster
/// lookup.
pub fn compute_metrics(
    adj: &Adjacency,
    node_to_cluster: &BTreeMap<String, String>,
) -> DoctorReport {
    let nodes = adj.len();
    let edges = undirected_edges(adj);

    let mut histogram: BTreeMap<String, usize> = BTreeMap::new();
    histogram.insert("0".to_string(), 0);
    let mut degree_total = 0usize;
    for neighbors in adj.values() {
        degree_total += neighbors.len();
        *histogram.entry(neighbors.len().to_string()).or_insert(0) += 1;
    }
    let mean = if nodes == 0 {
        0.0
    } else {
        degree_total as f64 / nodes as f64
    };

    let (component_count, largest) = components(adj);
    let largest_component_ratio = if nodes == 0 {
        0.0
    } else {
        largest as f64 / nodes as f64
    };

    let mut cross = 0usize;
    for (u, v) in &edges {
        if let (Some(cu), Some(cv)) = (node_to_cluster.get(u), node_to_cluster.get(v))
            && cu != cv
        {
            cross += 1;
        }
    }
    let cross_cluster_ratio = if edges.is_empty() {
        0.0
    } else {
        cross as f64 / edges.len() as f64
    };

    DoctorReport {
        report_kind: DOCTOR_REPORT_KIND.to_string(),
        schema: 1,
        nodes,
        edges: edges.len(),
        degrees: DegreeSummary { histogram, mean },
        component_count,
        largest_component_ratio,
        cross_cluster_ratio,
        asymmetric_pair_count: symmetry_defects(adj).len(),
        graph_hash: stable::stable_hash(adj),
    }
}

/// Connected components over the either-direction view of the graph.
///
/// A reciprocity defect does not break traversal: `u – v` is walkable when
/// either side lists the other. Neighbors that are not keys are not nodes
/// and are skipped. Discovery order is reproducible: nodes and neighbor
/// sets iterate sorted.
fn components(adj: &Adjacency) -> (usize, usize) {
    let mut undirected: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for node in adj.keys() {
        undirected.entry(node.as_str()).or_default();
    }
    for (node, neighbors) in adj {
        for neighbor in neighbors {
            if adj.contains_key(neighbor) {
                undirected
                    .entry(node.as_str())
                    .or_default()
                    .insert(neighbor.as_str());
                undirected
                    .entry(neighbor.as_str())
                    .or_default()
                    .insert(node.as_str());
            }
        }
    }

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut count = 0usize;
    let mut largest = 0usize;
    for node in adj.keys() {
        if visited.contains(node.as_str()) {
            continue;
        }
        count += 1;
        let mut size = 0usize;
        let mut queue = VecDeque::new();
        visited.insert(node.as_str());
        queue.push_back(node.as_str());
        while let Some(current) = queue.pop_front() {
            size += 1;
            if let Some(neighbors) = undirected.get(current) {
                for &next in neighbors {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        largest = largest.max(size);
    }
    (count, largest)
}
