//! Adjacency normalization and undirected-edge accounting.
//!
//! The normalizer cleans the supplied key set: case folding, neighbor
//! dedup, self-loop removal. It never synthesizes nodes that only appear
//! as neighbors; a caller that needs the full node universe unions the
//! cluster node set in explicitly (see [`crate::pipeline`]).
//!
//! Symmetry is checked, not enforced: `u` listing `v` without `v` listing
//! `u` back is reported by [`symmetry_defects`] and repaired only by the
//! opt-in [`symmetrize`] step.

use crate::error::EngineError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalized adjacency: node slug → neighbor slugs.
///
/// Key iteration is sorted (deterministic traversal); neighbor lists keep
/// their post-dedup input order.
pub type Adjacency = BTreeMap<String, Vec<String>>;

/// Validate the raw adjacency document shape.
///
/// The top level must be an object and every value an array of strings.
/// Entries come back in the document's key order as `serde_json` exposes
/// it (sorted), with array order untouched.
pub fn parse_adjacency(raw: &Value) -> Result<Vec<(String, Vec<String>)>, EngineError> {
    let map = raw
        .as_object()
        .ok_or_else(|| EngineError::input_shape("adjacency", "top level must be an object"))?;

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let list = value.as_array().ok_or_else(|| {
            EngineError::input_shape(
                format!("adjacency.{key}"),
                "neighbor list must be an array",
            )
        })?;
        let mut neighbors = Vec::with_capacity(list.len());
        for (idx, entry) in list.iter().enumerate() {
            let slug = entry.as_str().ok_or_else(|| {
                EngineError::input_shape(
                    format!("adjacency.{key}[{idx}]"),
                    "neighbor must be a string",
                )
            })?;
            neighbors.push(slug.to_string());
        }
        entries.push((key.clone(), neighbors));
    }
    Ok(entries)
}

/// Canonicalize parsed adjacency entries.
///
/// Keys and neighbors are case-folded to lower case before any comparison.
/// Self-references are dropped, duplicate neighbors removed keeping the
/// first occurrence. Keys that collide after case folding merge their
/// lists in encounter order; the input spelled one logical node twice.
pub fn normalize(entries: &[(String, Vec<String>)]) -> Adjacency {
    let mut adj = Adjacency::new();
    for (key, neighbors) in entries {
        let node = key.trim().to_lowercase();
        if node.is_empty() {
            continue;
        }
        let slot = adj.entry(node.clone()).or_default();
        for neighbor in neighbors {
            let neighbor = neighbor.trim().to_lowercase();
            if neighbor.is_empty() || neighbor == node {
                continue;
            }
            if !slot.contains(&neighbor) {
                slot.push(neighbor);
            }
        }
    }
    adj
}

/// Unordered edges under the `u < v` convention.
///
/// An edge is taken from `u`'s own list exactly when `u < v`
/// lexicographically, so the two directed entries of a symmetric edge
/// collapse to one pair.
pub fn undirected_edges(adj: &Adjacency) -> Vec<(String, String)> {
    let mut edges = Vec::new();
    for (node, neighbors) in adj {
        for neighbor in neighbors {
            if node < neighbor {
                edges.push((node.clone(), neighbor.clone()));
            }
        }
    }
    edges
}

/// Count each unordered edge once.
///
/// For a fully symmetric, self-loop-free graph this equals half the degree
/// sum exactly.
pub fn undirected_edge_count(adj: &Adjacency) -> usize {
    adj.iter()
        .map(|(node, neighbors)| neighbors.iter().filter(|n| node < *n).count())
        .sum()
}

/// Reciprocity defects: `u` lists `v` but `v` does not list `u` back.
///
/// A neighbor that is not a key at all is a defect too. Defects are
/// reported in sorted node order, never repaired here.
pub fn symmetry_defects(adj: &Adjacency) -> Vec<(String, String)> {
    let mut defects = Vec::new();
    for (node, neighbors) in adj {
        for neighbor in neighbors {
            let reciprocated = adj
                .get(neighbor)
                .is_some_and(|back| back.contains(node));
            if !reciprocated {
                defects.push((node.clone(), neighbor.clone()));
            }
        }
    }
    defects
}

/// Opt-in symmetry repair: mirror every listed edge between known keys.
///
/// Distinct from normalization: callers choose to run it. Neighbors that
/// are not keys stay unrepaired; the repair never creates nodes.
pub fn symmetrize(adj: &Adjacency) -> Adjacency {
    let mut repaired = adj.clone();
    for (node, neighbors) in adj {
        for neighbor in neighbors {
            if let Some(back) = repaired.get_mut(neighbor)
                && !back.contains(node)
            {
                back.push(node.clone());
            }
        }
    }
    repaired
}
