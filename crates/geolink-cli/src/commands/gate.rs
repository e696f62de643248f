use crate::support;
use geolink_kernel::gate::{self, GateOutcome, UnimplementedPromotedShare, Verdict};
use geolink_kernel::policy::Policy;
use serde_json::json;

const TAG: &str = "gate";

pub struct Args {
    pub adjacency: String,
    pub clusters: String,
    pub policy: String,
    pub out: String,
    pub md: Option<String>,
    pub strict: bool,
    pub json: bool,
    pub quiet: bool,
    pub profile: bool,
}

pub fn run(args: Args) {
    // A broken policy is diagnosed before any graph work happens.
    let policy_text = support::read_text_file(&args.policy, "policy")
        .unwrap_or_else(|e| support::input_error(TAG, &e));
    let policy =
        Policy::parse_jsonc(&policy_text).unwrap_or_else(|e| support::input_error(TAG, &e));

    let mut ctx = support::load_context(&args.adjacency, &args.clusters)
        .unwrap_or_else(|e| support::input_error(TAG, &e));
    if let Err(e) = support::run_pipeline(TAG, &mut ctx, args.profile) {
        support::input_error(TAG, &e);
    }
    let report = match ctx.report.as_ref() {
        Some(report) => report.clone(),
        None => {
            eprintln!("[{TAG}] error: pipeline finished without a report");
            std::process::exit(support::EXIT_INPUT);
        }
    };

    // Persist the report first; the gate consumes the same snapshot the
    // file now holds.
    let rendered = support::render_report_json(&report)
        .unwrap_or_else(|e| support::input_error(TAG, &e));
    if let Err(e) = support::write_file_atomic(&args.out, &rendered) {
        support::input_error(TAG, &e);
    }

    let outcome = gate::evaluate(&policy, &report, &UnimplementedPromotedShare)
        .unwrap_or_else(|e| support::input_error(TAG, &e));

    if let Some(md_path) = &args.md {
        let markdown = crate::md::render_outcome(&outcome, &report);
        if let Err(e) = support::write_file_atomic(md_path, &markdown) {
            support::input_error(TAG, &e);
        }
    }

    if args.json {
        let payload = json!({
            "schema": 1,
            "checkKind": gate::GATE_CHECK_KIND,
            "reportPath": args.out,
            "strict": args.strict,
            "verdict": outcome.verdict.as_str(),
            "failureClasses": &outcome.failure_classes,
            "warningClasses": &outcome.warning_classes,
            "failures": &outcome.failures,
            "warnings": &outcome.warnings,
            "summary": &outcome.summary,
        });
        println!("{}", support::render_payload_or_exit(TAG, &payload));
    } else {
        print_outcome(&outcome, args.quiet);
        if args.strict && outcome.verdict == Verdict::Warn && !args.quiet {
            eprintln!("[{TAG}] strict mode: WARN escalated to a blocking failure");
        }
    }

    std::process::exit(exit_code(&outcome, args.strict));
}

/// WARN blocks only under `--strict`; the escalation lives here, at the
/// exit-code boundary, not in the gate.
fn exit_code(outcome: &GateOutcome, strict: bool) -> i32 {
    match outcome.verdict {
        Verdict::Pass => support::EXIT_PASS,
        Verdict::Warn if strict => support::EXIT_WARN_STRICT,
        Verdict::Warn => support::EXIT_PASS,
        Verdict::Fail => support::EXIT_FAIL,
    }
}

fn print_outcome(outcome: &GateOutcome, quiet: bool) {
    if !quiet || outcome.verdict != Verdict::Pass {
        println!(
            "[{TAG}] {} (nodes={}, edges={}, isolates={}, meanDegree={:.3})",
            outcome.verdict.as_str().to_uppercase(),
            outcome.summary.nodes,
            outcome.summary.edges,
            outcome.summary.isolates,
            outcome.summary.mean_degree
        );
    }
    for finding in &outcome.failures {
        println!("  - {} ({})", finding.class, finding.message);
    }
    for finding in &outcome.warnings {
        println!("  - WARN {} ({})", finding.class, finding.message);
    }
}
