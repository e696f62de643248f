//! Shared command plumbing: classified file loading, the pipeline runner,
//! atomic report writes, exit codes.

use geolink_kernel::cluster::ClusterFile;
use geolink_kernel::metrics::DoctorReport;
use geolink_kernel::pipeline::{RunContext, STEP_IDS};
use geolink_kernel::{EngineError, stabilize};
use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Reserved exit codes, four outcomes.
pub const EXIT_PASS: i32 = 0;
pub const EXIT_FAIL: i32 = 1;
pub const EXIT_WARN_STRICT: i32 = 2;
pub const EXIT_INPUT: i32 = 3;

/// Print a one-line tagged diagnostic and exit with the malformed-input
/// code.
pub fn input_error(tag: &str, error: &EngineError) -> ! {
    eprintln!("[{tag}] error: {error}");
    std::process::exit(EXIT_INPUT);
}

pub fn read_json_file(path: &str, label: &str) -> Result<Value, EngineError> {
    let bytes = fs::read(path)
        .map_err(|e| EngineError::io(path, format!("failed to read {label}: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| EngineError::input_shape(label, format!("{path}: {e}")))
}

pub fn read_text_file(path: &str, label: &str) -> Result<String, EngineError> {
    fs::read_to_string(path)
        .map_err(|e| EngineError::io(path, format!("failed to read {label}: {e}")))
}

/// Load the adjacency and cluster files into a fresh run context.
pub fn load_context(adjacency_path: &str, clusters_path: &str) -> Result<RunContext, EngineError> {
    let raw_adjacency = read_json_file(adjacency_path, "adjacency")?;
    let clusters_value = read_json_file(clusters_path, "clusters")?;
    let cluster_file: ClusterFile = serde_json::from_value(clusters_value)
        .map_err(|e| EngineError::input_shape("clusters", format!("{clusters_path}: {e}")))?;
    Ok(RunContext::new(raw_adjacency, cluster_file.clusters))
}

/// Run every pipeline step in order, timing each one to stderr when asked.
pub fn run_pipeline(tag: &str, ctx: &mut RunContext, profile: bool) -> Result<(), EngineError> {
    for id in STEP_IDS {
        let started = Instant::now();
        ctx.run_step(id)?;
        if profile {
            eprintln!(
                "[{tag}] profile: {id} {:.3}ms",
                started.elapsed().as_secs_f64() * 1000.0
            );
        }
    }
    Ok(())
}

/// Stabilized, key-sorted, pretty-printed report document.
///
/// Semantically-equal reports render byte-identically.
pub fn render_report_json(report: &DoctorReport) -> Result<String, EngineError> {
    let value = serde_json::to_value(report)
        .map_err(|e| EngineError::input_shape("report", e.to_string()))?;
    let mut rendered = serde_json::to_string_pretty(&stabilize(&value))
        .map_err(|e| EngineError::input_shape("report", e.to_string()))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Write a file via a temporary path and an atomic rename, so a
/// concurrently-running reader never observes a partial document.
pub fn write_file_atomic(path: &str, contents: &str) -> Result<(), EngineError> {
    let path = Path::new(path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| EngineError::io(parent.display().to_string(), e.to_string()))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), EngineError> {
        let file = File::create(&tmp_path)
            .map_err(|e| EngineError::io(tmp_path.display().to_string(), e.to_string()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(contents.as_bytes())
            .map_err(|e| EngineError::io(tmp_path.display().to_string(), e.to_string()))?;
        writer
            .flush()
            .map_err(|e| EngineError::io(tmp_path.display().to_string(), e.to_string()))?;
        let file = writer
            .into_inner()
            .map_err(|e| EngineError::io(tmp_path.display().to_string(), e.to_string()))?;
        file.sync_all()
            .map_err(|e| EngineError::io(tmp_path.display().to_string(), e.to_string()))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EngineError::io(path.display().to_string(), e.to_string())
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent)
            .map_err(|e| EngineError::io(parent.display().to_string(), e.to_string()))?;
        dir.sync_all()
            .map_err(|e| EngineError::io(parent.display().to_string(), e.to_string()))?;
    }

    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

/// Render a JSON payload for stdout, exiting on the (unlikely) serializer
/// failure.
pub fn render_payload_or_exit(tag: &str, payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
        eprintln!("[{tag}] error: failed to render payload: {error}");
        std::process::exit(EXIT_INPUT);
    })
}
