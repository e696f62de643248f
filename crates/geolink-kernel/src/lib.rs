//! # Geolink Kernel
//!
//! Deterministic validation of a site's suburb/cluster link graph:
//! identical input produces a byte-identical report, structural defects
//! (asymmetric edges, self-loops, isolates, disconnected components) are
//! detected rather than papered over, and continuous metrics become
//! discrete pass/warn/fail decisions that can block a deployment.
//!
//! ## Architecture
//!
//! ```text
//! raw adjacency + clusters
//!     │
//! normalize             ← case folding, dedup, self-loop removal
//!     │
//! RunContext            ← one invocation's state, no global caches
//!     ├── metrics       ← degrees, components, ratios → DoctorReport
//!     └── links         ← bounded neighbor lists for the page layer
//!     │
//! stable                ← rounding, sorted keys, content hash
//!     │
//! gate                  ← (policy, report) → PASS / WARN / FAIL
//! ```

pub mod cluster;
pub mod error;
pub mod gate;
pub mod links;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod stable;

pub use cluster::{ClusterDef, ClusterFile, map_nodes_to_clusters};
pub use error::EngineError;
pub use gate::{
    GateOutcome, PromotedShare, UnimplementedPromotedShare, Verdict, evaluate, evaluate_default,
};
pub use metrics::{DoctorReport, compute_metrics};
pub use normalize::{Adjacency, normalize, parse_adjacency, undirected_edge_count};
pub use pipeline::RunContext;
pub use policy::Policy;
pub use stable::{stabilize, stable_hash, stable_json};
