use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "geolink",
    about = "Geolink: deterministic suburb-graph validation and build gating",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the doctor report for the suburb graph and persist it
    Doctor {
        /// Path to the adjacency JSON (node → neighbor list)
        #[arg(long, default_value = "data/adjacency.json")]
        adjacency: String,

        /// Path to the cluster definitions JSON
        #[arg(long, default_value = "data/clusters.json")]
        clusters: String,

        /// Report destination
        #[arg(long, default_value = "reports/doctor-report.json")]
        out: String,

        /// Also render a Markdown summary to this path
        #[arg(long)]
        md: Option<String>,

        /// Write a symmetry-repaired copy of the adjacency to this path
        #[arg(long)]
        repair_symmetry: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Suppress informational lines
        #[arg(long)]
        quiet: bool,

        /// Emit per-step timing diagnostics
        #[arg(long)]
        profile: bool,
    },

    /// Gate the build: compute the report, persist it, evaluate the policy
    Gate {
        /// Path to the adjacency JSON (node → neighbor list)
        #[arg(long, default_value = "data/adjacency.json")]
        adjacency: String,

        /// Path to the cluster definitions JSON
        #[arg(long, default_value = "data/clusters.json")]
        clusters: String,

        /// Path to the gate policy (JSON permitting // and /* */ comments)
        #[arg(long, default_value = "data/gate-policy.jsonc")]
        policy: String,

        /// Report destination
        #[arg(long, default_value = "reports/doctor-report.json")]
        out: String,

        /// Also render a Markdown summary to this path
        #[arg(long)]
        md: Option<String>,

        /// Escalate a WARN verdict to a blocking exit code
        #[arg(long)]
        strict: bool,

        /// Output the verdict as JSON
        #[arg(long)]
        json: bool,

        /// Suppress informational lines
        #[arg(long)]
        quiet: bool,

        /// Emit per-step timing diagnostics
        #[arg(long)]
        profile: bool,
    },

    /// Emit bounded per-node neighbor lists for the page layer
    Links {
        /// Path to the adjacency JSON (node → neighbor list)
        #[arg(long, default_value = "data/adjacency.json")]
        adjacency: String,

        /// Emit a single node's neighbors instead of the full map
        #[arg(long)]
        node: Option<String>,

        /// Maximum neighbors per node
        #[arg(long, default_value_t = 6)]
        max: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
