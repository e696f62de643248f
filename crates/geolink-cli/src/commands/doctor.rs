use crate::support;
use geolink_kernel::normalize::symmetrize;
use serde_json::json;

const TAG: &str = "doctor";
const CHECK_KIND: &str = "geolink.doctor.v1";

pub struct Args {
    pub adjacency: String,
    pub clusters: String,
    pub out: String,
    pub md: Option<String>,
    pub repair_symmetry: Option<String>,
    pub json: bool,
    pub quiet: bool,
    pub profile: bool,
}

pub fn run(args: Args) {
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

    let rendered = support::render_report_json(&report)
        .unwrap_or_else(|e| support::input_error(TAG, &e));
    if let Err(e) = support::write_file_atomic(&args.out, &rendered) {
        support::input_error(TAG, &e);
    }

    if let Some(repair_path) = &args.repair_symmetry {
        let repaired = symmetrize(&ctx.adjacency);
        let mut document = serde_json::to_string_pretty(&repaired).unwrap_or_else(|error| {
            eprintln!("[{TAG}] error: failed to render repaired adjacency: {error}");
            std::process::exit(support::EXIT_INPUT);
        });
        document.push('\n');
        if let Err(e) = support::write_file_atomic(repair_path, &document) {
            support::input_error(TAG, &e);
        }
        if !args.quiet && !args.json {
            println!("[{TAG}] wrote symmetry-repaired adjacency to {repair_path}");
        }
    }

    if let Some(md_path) = &args.md {
        if let Err(e) = support::write_file_atomic(md_path, &crate::md::render_report(&report)) {
            support::input_error(TAG, &e);
        }
    }

    if !args.quiet {
        for dup in &ctx.duplicate_clusters {
            eprintln!(
                "[{TAG}] warning: suburb `{}` assigned to both `{}` and `{}` (kept `{}`)",
                dup.node, dup.shadowed, dup.kept, dup.kept
            );
        }
    }

    if args.json {
        let payload = json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "reportPath": args.out,
            "report": report,
        });
        println!("{}", support::render_payload_or_exit(TAG, &payload));
    } else if !args.quiet {
        let isolates = report.degrees.histogram.get("0").copied().unwrap_or(0);
        println!(
            "[{TAG}] ok (nodes={}, edges={}, components={}, isolates={}, asymmetric={})",
            report.nodes,
            report.edges,
            report.component_count,
            isolates,
            report.asymmetric_pair_count
        );
    }
}
