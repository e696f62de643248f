//! One engine invocation: explicit context plus a fixed step registry.
//!
//! [`RunContext`] owns all loaded and derived state for a run. It replaces
//! implicit module-level caches: state lives here and dies with the
//! invocation, so repeated in-process runs (tests included) never observe
//! stale data. The metrics engine and the link emitter both read
//! `RunContext::adjacency`: one normalized instance per run, so the
//! report and the emitted navigation can never diverge.
//!
//! Steps resolve by exact identifier against a fixed registry. There is no
//! partial matching; an unknown identifier fails fast.

use crate::cluster::{self, ClusterDef, DuplicateAssignment};
use crate::error::EngineError;
use crate::metrics::{self, DoctorReport};
use crate::normalize::{self, Adjacency};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered step identifiers for a full doctor run.
pub const STEP_IDS: [&str; 4] = ["normalize", "cluster-map", "universe", "metrics"];

type StepFn = fn(&mut RunContext) -> Result<(), EngineError>;

const REGISTRY: [(&str, StepFn); 4] = [
    ("normalize", step_normalize),
    ("cluster-map", step_cluster_map),
    ("universe", step_universe),
    ("metrics", step_metrics),
];

/// All state for one engine invocation.
pub struct RunContext {
    raw_adjacency: Value,
    cluster_defs: Vec<ClusterDef>,
    /// The single normalized graph for this run.
    pub adjacency: Adjacency,
    pub node_to_cluster: BTreeMap<String, String>,
    pub duplicate_clusters: Vec<DuplicateAssignment>,
    pub report: Option<DoctorReport>,
}

impl RunContext {
    pub fn new(raw_adjacency: Value, cluster_defs: Vec<ClusterDef>) -> Self {
        Self {
            raw_adjacency,
            cluster_defs,
            adjacency: Adjacency::new(),
            node_to_cluster: BTreeMap::new(),
            duplicate_clusters: Vec::new(),
            report: None,
        }
    }

    /// Run one registered step by exact identifier.
    pub fn run_step(&mut self, id: &str) -> Result<(), EngineError> {
        let step = REGISTRY
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, step)| *step)
            .ok_or_else(|| EngineError::UnknownStep(id.to_string()))?;
        step(self)
    }

    /// Run the full doctor pipeline in order.
    pub fn run_all(&mut self) -> Result<(), EngineError> {
        for id in STEP_IDS {
            self.run_step(id)?;
        }
        Ok(())
    }
}

fn step_normalize(ctx: &mut RunContext) -> Result<(), EngineError> {
    let entries = normalize::parse_adjacency(&ctx.raw_adjacency)?;
    ctx.adjacency = normalize::normalize(&entries);
    Ok(())
}

fn step_cluster_map(ctx: &mut RunContext) -> Result<(), EngineError> {
    ctx.node_to_cluster = cluster::map_nodes_to_clusters(&ctx.cluster_defs);
    ctx.duplicate_clusters = cluster::duplicate_assignments(&ctx.cluster_defs);
    Ok(())
}

/// Union clustered suburbs into the node universe.
///
/// The normalizer cleans the supplied key set only; a suburb that belongs
/// to a cluster but has no adjacency entry becomes an explicit isolate
/// here, where the caller can see it happen.
fn step_universe(ctx: &mut RunContext) -> Result<(), EngineError> {
    for node in ctx.node_to_cluster.keys() {
        ctx.adjacency.entry(node.clone()).or_default();
    }
    Ok(())
}

fn step_metrics(ctx: &mut RunContext) -> Result<(), EngineError> {
    ctx.report = Some(metrics::compute_metrics(
        &ctx.adjacency,
        &ctx.node_to_cluster,
    ));
    Ok(())
}
