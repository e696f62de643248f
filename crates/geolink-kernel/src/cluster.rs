//! Cluster definitions and the node→cluster partition.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Top-level shape of the cluster definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterFile {
    pub clusters: Vec<ClusterDef>,
}

/// One named cluster of suburbs.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterDef {
    pub slug: String,
    #[serde(default)]
    pub suburbs: Vec<SuburbRef>,
}

/// Suburb rows appear either as bare slugs or `{ "slug": ... }` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SuburbRef {
    Slug(String),
    Entry { slug: String },
}

impl SuburbRef {
    pub fn slug(&self) -> &str {
        match self {
            Self::Slug(slug) => slug,
            Self::Entry { slug } => slug,
        }
    }
}

/// A suburb assigned to more than one cluster.
///
/// Accepted ambiguity, not an error: [`map_nodes_to_clusters`] keeps the
/// later assignment; callers that care surface these diagnostically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateAssignment {
    pub node: String,
    pub kept: String,
    pub shadowed: String,
}

/// Build the node→cluster-slug lookup.
///
/// Cluster and suburb slugs are case-folded before use; the later cluster
/// in iteration order wins on duplicates.
pub fn map_nodes_to_clusters(clusters: &[ClusterDef]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for cluster in clusters {
        let cluster_slug = cluster.slug.to_lowercase();
        for suburb in &cluster.suburbs {
            map.insert(suburb.slug().to_lowercase(), cluster_slug.clone());
        }
    }
    map
}

/// List duplicate suburb assignments in definition order.
pub fn duplicate_assignments(clusters: &[ClusterDef]) -> Vec<DuplicateAssignment> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let mut duplicates = Vec::new();
    for cluster in clusters {
        let cluster_slug = cluster.slug.to_lowercase();
        for suburb in &cluster.suburbs {
            let node = suburb.slug().to_lowercase();
            if let Some(previous) = seen.insert(node.clone(), cluster_slug.clone())
                && previous != cluster_slug
            {
                duplicates.push(DuplicateAssignment {
                    node,
                    kept: cluster_slug.clone(),
                    shadowed: previous,
                });
            }
        }
    }
    duplicates
}
