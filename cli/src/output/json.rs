//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout: a run report, a config summary, or the error object below.

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::domain::{DeployConfig, DeployError, RegionOutcome, RegionReport, RunReport, SyncMode};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Code for the error object: the [`DeployError`] kind when the chain
/// carries one, `"error"` otherwise.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DeployError>())
        .map_or("error", |e| e.kind().code())
}

/// Machine-readable form of a run.
#[must_use]
pub fn run_report(report: &RunReport, mode: SyncMode) -> Value {
    json!({
        "command": mode.command(),
        "success": report.is_success(),
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
        "regions": report.regions.iter().map(region_report).collect::<Vec<_>>(),
        "skipped": report.skipped,
    })
}

fn region_report(report: &RegionReport) -> Value {
    let mut obj = json!({
        "region": report.region,
        "target": report.target,
    });
    let detail = match &report.outcome {
        RegionOutcome::Synced { built, destroyed } => json!({
            "status": "synced",
            "built": built,
            "removed": destroyed,
        }),
        RegionOutcome::Planned { partition, drift } => json!({
            "status": "planned",
            "new": partition.new,
            "changed": partition.changed,
            "removed": partition.removed,
            "repo_drift": drift,
        }),
        RegionOutcome::Inspected { services } => json!({
            "status": "inspected",
            "services": services,
        }),
        RegionOutcome::Failed { stage, error } => json!({
            "status": "failed",
            "stage": stage.as_str(),
            "error": error_object(error),
        }),
    };
    if let (Value::Object(base), Value::Object(extra)) = (&mut obj, detail) {
        base.extend(extra);
    }
    obj
}

fn error_object(error: &DeployError) -> Value {
    json!({
        "message": error.to_string(),
        "code": error.kind().code(),
    })
}

/// Summary printed by `validate --json`.
#[must_use]
pub fn config_summary(config: &DeployConfig) -> Value {
    json!({
        "valid": true,
        "domain_name": config.domain_name,
        "projects": config.projects.iter().map(|p| json!({
            "subdomain": p.subdomain,
            "repo": p.repo_url,
            "extra_traefik_labels": p.extra_traefik_labels,
        })).collect::<Vec<_>>(),
        "regions": config.regions.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
    })
}

/// Renders to stdout as JSON.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_run(&self, report: &RunReport, mode: SyncMode) -> Result<()> {
        print_pretty(&run_report(report, mode))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &DeployConfig) -> Result<()> {
        print_pretty(&config_summary(config))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print_pretty(&json!({ "version": version }))
    }
}

fn print_pretty(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("JSON serialization failed")?
    );
    Ok(())
}
