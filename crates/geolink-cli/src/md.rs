//! Markdown rendering of doctor/gate results.
//!
//! Presentation only: every number comes from the report or the gate
//! outcome, no independent logic.

use geolink_kernel::gate::{GateOutcome, Verdict};
use geolink_kernel::metrics::DoctorReport;

fn badge(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "![PASS](https://img.shields.io/badge/gate-PASS-brightgreen)",
        Verdict::Warn => "![WARN](https://img.shields.io/badge/gate-WARN-yellow)",
        Verdict::Fail => "![FAIL](https://img.shields.io/badge/gate-FAIL-red)",
    }
}

/// Gate summary: verdict badge, metric table, findings.
pub fn render_outcome(outcome: &GateOutcome, report: &DoctorReport) -> String {
    let mut out = String::new();
    out.push_str("# Geo linking gate\n\n");
    out.push_str(badge(outcome.verdict));
    out.push_str("\n\n");
    out.push_str(&metrics_table(report));

    if !outcome.failures.is_empty() {
        out.push_str("\n## Failures\n\n");
        for finding in &outcome.failures {
            out.push_str(&format!("- `{}`: {}\n", finding.class, finding.message));
        }
    }
    if !outcome.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for finding in &outcome.warnings {
            out.push_str(&format!("- `{}`: {}\n", finding.class, finding.message));
        }
    }
    out
}

/// Doctor summary without a verdict.
pub fn render_report(report: &DoctorReport) -> String {
    format!("# Geo linking doctor\n\n{}", metrics_table(report))
}

fn metrics_table(report: &DoctorReport) -> String {
    let isolates = report.degrees.histogram.get("0").copied().unwrap_or(0);
    format!(
        "| Metric | Value |\n\
         |---|---|\n\
         | Nodes | {} |\n\
         | Edges | {} |\n\
         | Mean degree | {:.6} |\n\
         | Isolates | {} |\n\
         | Components | {} |\n\
         | Largest component ratio | {:.6} |\n\
         | Cross-cluster ratio | {:.6} |\n\
         | Asymmetric pairs | {} |\n\
         | Graph hash | `{}` |\n",
        report.nodes,
        report.edges,
        report.degrees.mean,
        isolates,
        report.component_count,
        report.largest_component_ratio,
        report.cross_cluster_ratio,
        report.asymmetric_pair_count,
        report.graph_hash,
    )
}
