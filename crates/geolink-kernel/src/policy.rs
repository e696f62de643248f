//! Gate policy: thresholds, comment-tolerant parsing, validation.
//!
//! The policy file is JSON permitting `//` line comments and `/* */` block
//! comments; both are stripped string-aware before parsing. Validation
//! failures are configuration errors (the policy, not the measured graph,
//! is broken) and are reported before any threshold evaluation.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Connectivity thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphThresholds {
    pub min_largest_component_ratio: f64,
    pub max_isolates: u64,
    pub min_mean_degree: f64,
}

/// Fairness thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FairnessThresholds {
    pub max_promoted_share_warn: f64,
    pub max_promoted_share_fail: f64,
    pub max_promoted_cross_cluster_ratio: f64,
}

/// The declared threshold policy the gate evaluates a report against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    pub graph: GraphThresholds,
    pub fairness: FairnessThresholds,
}

impl Policy {
    /// Parse a policy document, stripping comments first.
    pub fn parse_jsonc(source: &str) -> Result<Self, EngineError> {
        let stripped = strip_json_comments(source);
        let policy: Self = serde_json::from_str(&stripped)
            .map_err(|e| EngineError::Config(format!("policy does not match schema: {e}")))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reject out-of-range thresholds and a warn/fail ordering under which
    /// the warn band would be unreachable.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_ratio(
            "graph.minLargestComponentRatio",
            self.graph.min_largest_component_ratio,
        )?;
        check_non_negative("graph.minMeanDegree", self.graph.min_mean_degree)?;
        check_ratio(
            "fairness.maxPromotedShareWarn",
            self.fairness.max_promoted_share_warn,
        )?;
        check_ratio(
            "fairness.maxPromotedShareFail",
            self.fairness.max_promoted_share_fail,
        )?;
        check_ratio(
            "fairness.maxPromotedCrossClusterRatio",
            self.fairness.max_promoted_cross_cluster_ratio,
        )?;
        if self.fairness.max_promoted_share_fail < self.fairness.max_promoted_share_warn {
            return Err(EngineError::Config(format!(
                "fairness.maxPromotedShareFail ({}) must not be below \
                 fairness.maxPromotedShareWarn ({})",
                self.fairness.max_promoted_share_fail, self.fairness.max_promoted_share_warn
            )));
        }
        Ok(())
    }
}

fn check_ratio(field: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EngineError::Config(format!(
            "{field} must be a ratio in [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::Config(format!(
            "{field} must be a finite non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Strip `//` line comments and `/* */` block comments from a JSON
/// document. Comment markers inside string literals are preserved.
pub fn strip_json_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' => match chars.peek() {
                Some('/') => {
                    // Drop through end of line, keep the newline.
                    for next in chars.by_ref() {
                        if next == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }
    out
}
