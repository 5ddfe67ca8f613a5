use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use minijinja::{Environment, context};
use serde::Serialize;
use wapispec_core::failure::ReportContext;
use wapispec_core::{FailureRecord, FailureReport};

use crate::output::create_dir;

const FAILURES_TEMPLATE: &str = include_str!("../templates/failures.log.j2");

/// Files written for a run with failures.
#[derive(Debug)]
pub struct FailureArtifacts {
    pub log: PathBuf,
    pub json: PathBuf,
}

#[derive(Serialize)]
struct StatusCount {
    status: String,
    count: usize,
}

#[derive(Serialize)]
struct FailureLine<'a> {
    object_type: &'a str,
    group: &'a str,
    status: String,
    url: &'a str,
    message: &'a str,
}

/// One console warning per failure.
pub fn log_failures(failures: &[FailureRecord]) {
    warn!("Failed to process {} objects:", failures.len());
    for failure in failures {
        warn!(
            "  - {}: {} - {}",
            failure.object_type,
            failure.status,
            failure.short_message()
        );
    }
}

/// Render the human-readable failure log.
pub fn render_log(
    report: &FailureReport,
    failures: &[FailureRecord],
    username: &str,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("failures.log.j2", FAILURES_TEMPLATE)?;
    let tmpl = env.get_template("failures.log.j2")?;

    let summary: Vec<StatusCount> = report
        .metadata
        .summary_by_status
        .iter()
        .map(|(status, count)| StatusCount {
            status: status.clone(),
            count: *count,
        })
        .collect();
    let lines: Vec<FailureLine<'_>> = failures
        .iter()
        .map(|f| FailureLine {
            object_type: &f.object_type,
            group: &f.group,
            status: f.status.to_string(),
            url: &f.url,
            message: &f.message,
        })
        .collect();

    tmpl.render(context! {
        wapi_version => report.metadata.wapi_version.clone(),
        hostname => report.metadata.hostname.clone(),
        username => username,
        total_failures => report.metadata.total_failures,
        summary => summary,
        failures => lines,
        heavy_rule => "=".repeat(50),
        light_rule => "-".repeat(50),
    })
}

/// Write `failed_objects_{timestamp}.{log,json}` under `dir`.
pub fn write_failure_report(
    dir: &Path,
    failures: &[FailureRecord],
    processed: usize,
    context: ReportContext,
    username: &str,
) -> Result<FailureArtifacts> {
    create_dir(dir)?;

    let stem = format!("failed_objects_{}", context.timestamp);
    let report = FailureReport::new(failures, processed, context);

    let log = dir.join(format!("{stem}.log"));
    let text = render_log(&report, failures, username).context("failed to render failure log")?;
    fs::write(&log, text).with_context(|| format!("failed to write {}", log.display()))?;

    let json = dir.join(format!("{stem}.json"));
    let content = serde_json::to_string_pretty(&report)?;
    fs::write(&json, content).with_context(|| format!("failed to write {}", json.display()))?;

    Ok(FailureArtifacts { log, json })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wapispec_core::SourceError;

    fn failures() -> Vec<FailureRecord> {
        vec![
            FailureRecord::from_source_error(
                "foo",
                "ipam",
                "https://gm/wapi/v2.13/foo".to_string(),
                &SourceError::Status {
                    code: 404,
                    body: "Unknown object type".to_string(),
                },
            ),
            FailureRecord::from_source_error(
                "bar",
                "dns",
                "https://gm/wapi/v2.13/bar".to_string(),
                &SourceError::Network("connection refused".to_string()),
            ),
        ]
    }

    fn context() -> ReportContext {
        ReportContext {
            timestamp: "20240102_030405".to_string(),
            wapi_version: "2.13".to_string(),
            hostname: "gm".to_string(),
        }
    }

    #[test]
    fn test_render_log() {
        let failures = failures();
        let report = FailureReport::new(&failures, 3, context());
        let text = render_log(&report, &failures, "admin").unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "=== FAILED OBJECTS SUMMARY (2 objects) ===");
        assert_eq!(lines[1], "WAPI Version: 2.13");
        assert_eq!(lines[2], "Hostname: gm");
        assert_eq!(lines[3], "Username: admin");
        assert_eq!(lines[4], "=".repeat(50));
        assert!(lines.contains(&"FAILURES BY STATUS CODE:"));
        assert!(lines.contains(&"404: 1 objects"));
        assert!(lines.contains(&"Network Error: 1 objects"));
        assert!(lines.contains(&"Object Type: foo"));
        assert!(lines.contains(&"Group: ipam"));
        assert!(lines.contains(&"Status Code: 404"));
        assert!(lines.contains(&"URL: https://gm/wapi/v2.13/bar"));
        assert!(lines.contains(&"Error Message: connection refused"));
        assert_eq!(lines.iter().filter(|l| **l == "-".repeat(50)).count(), 2);
    }

    #[test]
    fn test_log_header_matches_json_total() {
        let mut failures = failures();
        failures.push(FailureRecord::unprocessable(
            "foo",
            "ipam",
            "https://gm/wapi/v2.13/foo".to_string(),
        ));
        let report = FailureReport::new(&failures, 3, context());
        assert_eq!(report.metadata.total_failures, 2);

        let text = render_log(&report, &failures, "admin").unwrap();
        assert_eq!(
            text.lines().next(),
            Some("=== FAILED OBJECTS SUMMARY (2 objects) ===")
        );
    }

    #[test]
    fn test_write_failure_report() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let artifacts =
            write_failure_report(&logs, &failures(), 3, context(), "admin").unwrap();

        assert_eq!(artifacts.log, logs.join("failed_objects_20240102_030405.log"));
        assert_eq!(artifacts.json, logs.join("failed_objects_20240102_030405.json"));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&artifacts.json).unwrap()).unwrap();
        assert_eq!(value["metadata"]["total_objects_processed"], 5);
        assert_eq!(value["metadata"]["failure_rate"], "40.00%");
        assert_eq!(value["failures"]["bar"]["status_code"], "Network Error");
        assert!(fs::read_to_string(&artifacts.log).unwrap().contains("Object Type: bar"));
    }
}
