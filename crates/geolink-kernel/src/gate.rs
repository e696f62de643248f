//! The policy gate: a pure function of (policy, report) → verdict.
//!
//! A FAIL from any rule overrides a WARN from any other; independent
//! conditions each escalate on their own. Strict-mode escalation of WARN
//! into a blocking exit code is the caller's policy at the process
//! boundary; the gate itself always reports WARN distinctly from FAIL.
//!
//! Malformed policy or report input is a separate, non-retryable failure
//! class reported before any threshold evaluation.

use crate::error::EngineError;
use crate::metrics::DoctorReport;
use crate::policy::Policy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const GATE_CHECK_KIND: &str = "geolink.gate.check.v1";

/// Failure class constants.
pub mod failure_class {
    pub const COMPONENT_RATIO_BELOW_MIN: &str = "gate.graph.component_ratio_below_min";
    pub const ISOLATES_ABOVE_MAX: &str = "gate.graph.isolates_above_max";
    pub const PROMOTED_SHARE_ABOVE_FAIL: &str = "gate.fairness.promoted_share_above_fail";
    pub const CROSS_CLUSTER_ABOVE_MAX: &str = "gate.fairness.cross_cluster_above_max";
}

/// Warning class constants.
pub mod warning_class {
    pub const MEAN_DEGREE_BELOW_MIN: &str = "gate.graph.mean_degree_below_min";
    pub const PROMOTED_SHARE_ABOVE_WARN: &str = "gate.fairness.promoted_share_above_warn";
}

/// Terminal gate verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

/// One threshold violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateFinding {
    pub class: String,
    pub message: String,
}

/// The metrics the gate read, echoed for transparency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GateSummary {
    pub nodes: usize,
    pub edges: usize,
    pub isolates: u64,
    pub mean_degree: f64,
    pub largest_component_ratio: f64,
    pub cross_cluster_ratio: f64,
    pub promoted_share: f64,
}

/// The gate's full result for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GateOutcome {
    pub check_kind: String,
    pub verdict: Verdict,
    pub failure_classes: Vec<String>,
    pub warning_classes: Vec<String>,
    pub failures: Vec<GateFinding>,
    pub warnings: Vec<GateFinding>,
    pub summary: GateSummary,
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// The pluggable "promoted share" fairness metric.
///
/// The upstream data never carried a real implementation; the rule slot is
/// preserved and [`UnimplementedPromotedShare`] holds its place until a
/// real source exists.
pub trait PromotedShare {
    fn promoted_share(&self, report: &DoctorReport) -> f64;
}

/// Placeholder metric: always 0.0.
pub struct UnimplementedPromotedShare;

impl PromotedShare for UnimplementedPromotedShare {
    fn promoted_share(&self, _report: &DoctorReport) -> f64 {
        0.0
    }
}

/// Schema/range validation of a report before any threshold evaluation.
pub fn validate_report(report: &DoctorReport) -> Result<(), EngineError> {
    check_report_ratio(
        "report.largestComponentRatio",
        report.largest_component_ratio,
    )?;
    check_report_ratio("report.crossClusterRatio", report.cross_cluster_ratio)?;
    if !report.degrees.mean.is_finite() || report.degrees.mean < 0.0 {
        return Err(EngineError::input_shape(
            "report.degrees.mean",
            format!(
                "must be finite and non-negative, got {}",
                report.degrees.mean
            ),
        ));
    }
    for key in report.degrees.histogram.keys() {
        if key.parse::<u64>().is_err() {
            return Err(EngineError::input_shape(
                format!("report.degrees.histogram.{key}"),
                "histogram keys must be stringified degree values",
            ));
        }
    }
    Ok(())
}

fn check_report_ratio(field: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EngineError::input_shape(
            field,
            format!("must be a ratio in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

/// Evaluate a report against a policy with the default (placeholder)
/// promoted-share metric.
pub fn evaluate_default(policy: &Policy, report: &DoctorReport) -> Result<GateOutcome, EngineError> {
    evaluate(policy, report, &UnimplementedPromotedShare)
}

/// Evaluate a report against a policy.
///
/// Rule order: component ratio, isolates, mean degree, promoted share,
/// cross-cluster ratio. All rules run; the verdict is FAIL if any failure
/// fired, else WARN if any warning fired, else PASS.
pub fn evaluate(
    policy: &Policy,
    report: &DoctorReport,
    fairness: &dyn PromotedShare,
) -> Result<GateOutcome, EngineError> {
    policy.validate()?;
    validate_report(report)?;

    let isolates = report.degrees.histogram.get("0").copied().unwrap_or(0) as u64;
    let promoted_share = fairness.promoted_share(report);

    let mut failures = Vec::new();
    let mut warnings = Vec::new();

    if report.largest_component_ratio < policy.graph.min_largest_component_ratio {
        failures.push(GateFinding {
            class: failure_class::COMPONENT_RATIO_BELOW_MIN.to_string(),
            message: format!(
                "largest component ratio {} is below the minimum {}",
                report.largest_component_ratio, policy.graph.min_largest_component_ratio
            ),
        });
    }

    if isolates > policy.graph.max_isolates {
        failures.push(GateFinding {
            class: failure_class::ISOLATES_ABOVE_MAX.to_string(),
            message: format!(
                "{isolates} isolated node(s) exceed the maximum {}",
                policy.graph.max_isolates
            ),
        });
    }

    if report.degrees.mean < policy.graph.min_mean_degree {
        warnings.push(GateFinding {
            class: warning_class::MEAN_DEGREE_BELOW_MIN.to_string(),
            message: format!(
                "mean degree {} is below the minimum {}",
                report.degrees.mean, policy.graph.min_mean_degree
            ),
        });
    }

    if promoted_share > policy.fairness.max_promoted_share_fail {
        failures.push(GateFinding {
            class: failure_class::PROMOTED_SHARE_ABOVE_FAIL.to_string(),
            message: format!(
                "promoted share {promoted_share} exceeds the failure threshold {}",
                policy.fairness.max_promoted_share_fail
            ),
        });
    } else if promoted_share > policy.fairness.max_promoted_share_warn {
        warnings.push(GateFinding {
            class: warning_class::PROMOTED_SHARE_ABOVE_WARN.to_string(),
            message: format!(
                "promoted share {promoted_share} exceeds the warning threshold {}",
                policy.fairness.max_promoted_share_warn
            ),
        });
    }

    if report.cross_cluster_ratio > policy.fairness.max_promoted_cross_cluster_ratio {
        failures.push(GateFinding {
            class: failure_class::CROSS_CLUSTER_ABOVE_MAX.to_string(),
            message: format!(
                "cross-cluster ratio {} exceeds the maximum {}",
                report.cross_cluster_ratio, policy.fairness.max_promoted_cross_cluster_ratio
            ),
        });
    }

    let verdict = if !failures.is_empty() {
        Verdict::Fail
    } else if !warnings.is_empty() {
        Verdict::Warn
    } else {
        Verdict::Pass
    };

    Ok(GateOutcome {
        check_kind: GATE_CHECK_KIND.to_string(),
        verdict,
        failure_classes: collect_classes(&failures),
        warning_classes: collect_classes(&warnings),
        failures,
        warnings,
        summary: GateSummary {
            nodes: report.nodes,
            edges: report.edges,
            isolates,
            mean_degree: report.degrees.mean,
            largest_component_ratio: report.largest_component_ratio,
            cross_cluster_ratio: report.cross_cluster_ratio,
            promoted_share,
        },
    })
}

fn collect_classes(findings: &[GateFinding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
