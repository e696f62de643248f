use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "geolink-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_geolink<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_geolink");
    Command::new(bin)
        .args(args)
        .output()
        .expect("geolink command should execute")
}

fn assert_exit_code(output: &Output, expected: i32) {
    assert_eq!(
        output.status.code(),
        Some(expected),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_json(path: &Path, value: &Value) {
    fs::write(
        path,
        serde_json::to_vec_pretty(value).expect("fixture should serialize"),
    )
    .expect("fixture should be written");
}

/// Three mutually-linked suburbs in one cluster.
fn write_connected_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let adjacency_path = dir.join("adjacency.json");
    let clusters_path = dir.join("clusters.json");
    write_json(
        &adjacency_path,
        &serde_json::json!({
            "subiaco": ["nedlands", "claremont"],
            "nedlands": ["subiaco"],
            "claremont": ["subiaco"]
        }),
    );
    write_json(
        &clusters_path,
        &serde_json::json!({
            "clusters": [
                {"slug": "inner-west", "suburbs": ["subiaco", "nedlands", "claremont"]}
            ]
        }),
    );
    (adjacency_path, clusters_path)
}

/// The connected trio plus an isolated suburb.
fn write_fragmented_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let adjacency_path = dir.join("adjacency.json");
    let clusters_path = dir.join("clusters.json");
    write_json(
        &adjacency_path,
        &serde_json::json!({
            "subiaco": ["nedlands", "claremont"],
            "nedlands": ["subiaco"],
            "claremont": ["subiaco"],
            "fremantle": []
        }),
    );
    write_json(
        &clusters_path,
        &serde_json::json!({
            "clusters": [
                {"slug": "inner-west", "suburbs": ["subiaco", "nedlands", "claremont"]},
                {"slug": "port", "suburbs": ["fremantle"]}
            ]
        }),
    );
    (adjacency_path, clusters_path)
}

const PASS_POLICY: &str = r#"
// Gate policy used by the build.
{
    "graph": {
        /* connectivity */
        "minLargestComponentRatio": 0.9,
        "maxIsolates": 0,
        "minMeanDegree": 1.0
    },
    "fairness": {
        "maxPromotedShareWarn": 1.0,
        "maxPromotedShareFail": 1.0,
        "maxPromotedCrossClusterRatio": 1.0 // inclusive bound
    }
}
"#;

const WARN_POLICY: &str = r#"
{
    "graph": {
        "minLargestComponentRatio": 0.9,
        "maxIsolates": 0,
        "minMeanDegree": 2.0
    },
    "fairness": {
        "maxPromotedShareWarn": 1.0,
        "maxPromotedShareFail": 1.0,
        "maxPromotedCrossClusterRatio": 1.0
    }
}
"#;

const BROKEN_POLICY: &str = r#"
{
    "graph": {
        "minLargestComponentRatio": 0.9,
        "maxIsolates": 0,
        "minMeanDegree": 1.0
    },
    "fairness": {
        "maxPromotedShareWarn": 0.5,
        "maxPromotedShareFail": 0.4,
        "maxPromotedCrossClusterRatio": 1.0
    }
}
"#;

fn write_policy(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("gate-policy.jsonc");
    fs::write(&path, contents).expect("policy should be written");
    path
}

fn gate_args(
    adjacency: &Path,
    clusters: &Path,
    policy: &Path,
    out: &Path,
    extra: &[&str],
) -> Vec<String> {
    let mut args = vec![
        "gate".to_string(),
        "--adjacency".to_string(),
        adjacency.display().to_string(),
        "--clusters".to_string(),
        clusters.display().to_string(),
        "--policy".to_string(),
        policy.display().to_string(),
        "--out".to_string(),
        out.display().to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    args
}

#[test]
fn gate_pass_smoke() {
    let tmp = TempDirGuard::new("gate-pass");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let policy = write_policy(tmp.path(), PASS_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&adjacency, &clusters, &policy, &out, &[]));
    assert_exit_code(&output, 0);
    assert!(String::from_utf8_lossy(&output.stdout).contains("[gate] PASS"));
    assert!(out.exists(), "gate should persist the doctor report");
}

#[test]
fn gate_pass_json_smoke() {
    let tmp = TempDirGuard::new("gate-pass-json");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let policy = write_policy(tmp.path(), PASS_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&adjacency, &clusters, &policy, &out, &["--json"]));
    assert_exit_code(&output, 0);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["schema"], 1);
    assert_eq!(payload["checkKind"], "geolink.gate.check.v1");
    assert_eq!(payload["verdict"], "pass");
    assert_eq!(payload["strict"], false);
    assert_eq!(payload["failureClasses"], serde_json::json!([]));
    assert_eq!(payload["summary"]["nodes"], 3);
    assert_eq!(payload["summary"]["isolates"], 0);
}

#[test]
fn gate_fail_smoke() {
    let tmp = TempDirGuard::new("gate-fail");
    let (adjacency, clusters) = write_fragmented_inputs(tmp.path());
    let policy = write_policy(tmp.path(), PASS_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&adjacency, &clusters, &policy, &out, &["--json"]));
    assert_exit_code(&output, 1);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["verdict"], "fail");
    assert_eq!(
        payload["failureClasses"],
        serde_json::json!([
            "gate.graph.component_ratio_below_min",
            "gate.graph.isolates_above_max"
        ])
    );
}

#[test]
fn gate_warn_exits_zero_without_strict() {
    let tmp = TempDirGuard::new("gate-warn");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let policy = write_policy(tmp.path(), WARN_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&adjacency, &clusters, &policy, &out, &["--json"]));
    assert_exit_code(&output, 0);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["verdict"], "warn");
    assert_eq!(
        payload["warningClasses"],
        serde_json::json!(["gate.graph.mean_degree_below_min"])
    );
}

#[test]
fn gate_warn_blocks_under_strict() {
    let tmp = TempDirGuard::new("gate-warn-strict");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let policy = write_policy(tmp.path(), WARN_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&adjacency, &clusters, &policy, &out, &["--strict"]));
    assert_exit_code(&output, 2);
    assert!(String::from_utf8_lossy(&output.stdout).contains("[gate] WARN"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("strict mode"));
}

#[test]
fn gate_rejects_inconsistent_policy() {
    let tmp = TempDirGuard::new("gate-broken-policy");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let policy = write_policy(tmp.path(), BROKEN_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&adjacency, &clusters, &policy, &out, &[]));
    assert_exit_code(&output, 3);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[gate] error:"));
    assert!(stderr.contains("configuration error"));
    assert!(!out.exists(), "no report should be written for a broken policy");
}

#[test]
fn gate_rejects_missing_adjacency() {
    let tmp = TempDirGuard::new("gate-missing-input");
    let policy = write_policy(tmp.path(), PASS_POLICY);
    let clusters = tmp.path().join("clusters.json");
    write_json(&clusters, &serde_json::json!({"clusters": []}));
    let missing = tmp.path().join("missing.json");
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&missing, &clusters, &policy, &out, &[]));
    assert_exit_code(&output, 3);
    assert!(String::from_utf8_lossy(&output.stderr).contains("I/O error"));
}

#[test]
fn gate_profile_emits_step_timings() {
    let tmp = TempDirGuard::new("gate-profile");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let policy = write_policy(tmp.path(), PASS_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(gate_args(&adjacency, &clusters, &policy, &out, &["--profile"]));
    assert_exit_code(&output, 0);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("profile: normalize"));
    assert!(stderr.contains("profile: metrics"));
}

#[test]
fn gate_writes_markdown_with_badge() {
    let tmp = TempDirGuard::new("gate-md");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let policy = write_policy(tmp.path(), PASS_POLICY);
    let out = tmp.path().join("reports/doctor-report.json");
    let md = tmp.path().join("reports/doctor-report.md");

    let md_arg = md.display().to_string();
    let output = run_geolink(gate_args(
        &adjacency,
        &clusters,
        &policy,
        &out,
        &["--md", md_arg.as_str()],
    ));
    assert_exit_code(&output, 0);
    let markdown = fs::read_to_string(&md).expect("markdown should be written");
    assert!(markdown.contains("gate-PASS"));
    assert!(markdown.contains("| Nodes | 3 |"));
}

#[test]
fn doctor_writes_a_deterministic_report() {
    let tmp = TempDirGuard::new("doctor-deterministic");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let out = tmp.path().join("reports/doctor-report.json");

    let doctor = |out_path: &Path| {
        run_geolink(vec![
            "doctor".to_string(),
            "--adjacency".to_string(),
            adjacency.display().to_string(),
            "--clusters".to_string(),
            clusters.display().to_string(),
            "--out".to_string(),
            out_path.display().to_string(),
        ])
    };

    let output = doctor(&out);
    assert_exit_code(&output, 0);
    let first = fs::read(&out).expect("report should be written");

    let output = doctor(&out);
    assert_exit_code(&output, 0);
    let second = fs::read(&out).expect("report should be rewritten");

    assert_eq!(first, second, "identical input must produce identical bytes");

    let report: Value = serde_json::from_slice(&first).expect("report should be valid JSON");
    assert_eq!(report["reportKind"], "geolink.doctor.report.v1");
    assert_eq!(report["nodes"], 3);
    assert_eq!(report["edges"], 2);
    // 4/3, rounded at six digits by stabilization.
    assert_eq!(report["degrees"]["mean"], serde_json::json!(1.333333));
}

#[test]
fn doctor_json_smoke() {
    let tmp = TempDirGuard::new("doctor-json");
    let (adjacency, clusters) = write_connected_inputs(tmp.path());
    let out = tmp.path().join("reports/doctor-report.json");

    let output = run_geolink(vec![
        "doctor".to_string(),
        "--adjacency".to_string(),
        adjacency.display().to_string(),
        "--clusters".to_string(),
        clusters.display().to_string(),
        "--out".to_string(),
        out.display().to_string(),
        "--json".to_string(),
    ]);
    assert_exit_code(&output, 0);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["schema"], 1);
    assert_eq!(payload["checkKind"], "geolink.doctor.v1");
    assert_eq!(payload["report"]["nodes"], 3);
    assert_eq!(payload["report"]["componentCount"], 1);
}

#[test]
fn doctor_repair_symmetry_writes_mirrored_adjacency() {
    let tmp = TempDirGuard::new("doctor-repair");
    let adjacency = tmp.path().join("adjacency.json");
    let clusters = tmp.path().join("clusters.json");
    write_json(&adjacency, &serde_json::json!({"a": ["b"], "b": []}));
    write_json(&clusters, &serde_json::json!({"clusters": []}));
    let out = tmp.path().join("reports/doctor-report.json");
    let repaired_path = tmp.path().join("adjacency.repaired.json");

    let output = run_geolink(vec![
        "doctor".to_string(),
        "--adjacency".to_string(),
        adjacency.display().to_string(),
        "--clusters".to_string(),
        clusters.display().to_string(),
        "--out".to_string(),
        out.display().to_string(),
        "--repair-symmetry".to_string(),
        repaired_path.display().to_string(),
    ]);
    assert_exit_code(&output, 0);

    let repaired: Value =
        serde_json::from_slice(&fs::read(&repaired_path).expect("repaired adjacency should exist"))
            .expect("repaired adjacency should be valid JSON");
    assert_eq!(repaired["b"], serde_json::json!(["a"]));

    // The report still describes the unrepaired graph.
    let report: Value = serde_json::from_slice(&fs::read(&out).expect("report should exist"))
        .expect("report should be valid JSON");
    assert_eq!(report["asymmetricPairCount"], 1);
}

#[test]
fn links_json_smoke() {
    let tmp = TempDirGuard::new("links-json");
    let (adjacency, _) = write_connected_inputs(tmp.path());

    let output = run_geolink(vec![
        "links".to_string(),
        "--adjacency".to_string(),
        adjacency.display().to_string(),
        "--max".to_string(),
        "1".to_string(),
        "--json".to_string(),
    ]);
    assert_exit_code(&output, 0);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["linksKind"], "geolink.links.v1");
    assert_eq!(payload["maxPerNode"], 1);
    assert_eq!(payload["links"]["subiaco"], serde_json::json!(["nedlands"]));
}

#[test]
fn links_single_node_json_smoke() {
    let tmp = TempDirGuard::new("links-node-json");
    let (adjacency, _) = write_connected_inputs(tmp.path());

    let output = run_geolink(vec![
        "links".to_string(),
        "--adjacency".to_string(),
        adjacency.display().to_string(),
        "--node".to_string(),
        "Subiaco".to_string(),
        "--json".to_string(),
    ]);
    assert_exit_code(&output, 0);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["node"], "subiaco");
    assert_eq!(
        payload["neighbors"],
        serde_json::json!(["nedlands", "claremont"])
    );
}
