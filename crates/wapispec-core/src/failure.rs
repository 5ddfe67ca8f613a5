//! Per-object failure tracking and the aggregate failure report.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::SourceError;

/// Classification of why an object type produced no schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureStatus {
    /// The source answered with a non-success HTTP status.
    Http(u16),
    Network,
    DataProcessing,
    /// The payload decoded but held no usable schema.
    Processing,
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStatus::Http(code) => write!(f, "{code}"),
            FailureStatus::Network => f.write_str("Network Error"),
            FailureStatus::DataProcessing => f.write_str("Data Processing Error"),
            FailureStatus::Processing => f.write_str("Processing Error"),
        }
    }
}

/// HTTP codes serialize as numbers, everything else as its label.
impl Serialize for FailureStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FailureStatus::Http(code) => serializer.serialize_u16(*code),
            other => serializer.collect_str(other),
        }
    }
}

/// One object type that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub object_type: String,
    pub group: String,
    pub status: FailureStatus,
    pub message: String,
    pub url: String,
}

impl FailureRecord {
    /// Record a failed fetch.
    pub fn from_source_error(object_type: &str, group: &str, url: String, err: &SourceError) -> Self {
        let (status, message) = match err {
            SourceError::Network(message) => (FailureStatus::Network, message.clone()),
            SourceError::Status { code, body } => {
                let body = body.trim();
                let message = if body.is_empty() {
                    "No error message provided".to_string()
                } else {
                    body.to_string()
                };
                (FailureStatus::Http(*code), message)
            }
            SourceError::Decode(message) => (FailureStatus::DataProcessing, message.clone()),
        };
        Self {
            object_type: object_type.to_string(),
            group: group.to_string(),
            status,
            message,
            url,
        }
    }

    /// Record a schema that was fetched but could not be normalized.
    pub fn unprocessable(object_type: &str, group: &str, url: String) -> Self {
        Self {
            object_type: object_type.to_string(),
            group: group.to_string(),
            status: FailureStatus::Processing,
            message: "Failed to process schema data".to_string(),
            url,
        }
    }

    /// The message shortened for console output.
    pub fn short_message(&self) -> String {
        truncate(&self.message, 100)
    }
}

/// Cut `message` to at most `limit` characters, marking the cut with `...`.
pub fn truncate(message: &str, limit: usize) -> String {
    match message.char_indices().nth(limit) {
        Some((at, _)) => format!("{}...", &message[..at]),
        None => message.to_string(),
    }
}

/// Run details recorded alongside the failures.
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    pub timestamp: String,
    pub wapi_version: String,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureMetadata {
    pub timestamp: String,
    pub wapi_version: String,
    pub hostname: String,
    pub total_objects_processed: usize,
    pub total_failures: usize,
    pub failure_rate: String,
    pub summary_by_status: IndexMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEntry {
    pub status_code: FailureStatus,
    pub message: String,
    pub url: String,
}

/// The machine-readable failure report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub metadata: FailureMetadata,
    pub failures: IndexMap<String, FailureEntry>,
}

impl FailureReport {
    /// Aggregate `failures` over a run that produced `processed` schemas.
    pub fn new(failures: &[FailureRecord], processed: usize, context: ReportContext) -> Self {
        let mut entries = IndexMap::new();
        for record in failures {
            entries.insert(
                record.object_type.clone(),
                FailureEntry {
                    status_code: record.status.clone(),
                    message: record.message.clone(),
                    url: record.url.clone(),
                },
            );
        }

        let mut summary_by_status: IndexMap<String, usize> = IndexMap::new();
        for entry in entries.values() {
            *summary_by_status
                .entry(entry.status_code.to_string())
                .or_default() += 1;
        }

        let total_failures = entries.len();
        let total = processed + total_failures;

        Self {
            metadata: FailureMetadata {
                timestamp: context.timestamp,
                wapi_version: context.wapi_version,
                hostname: context.hostname,
                total_objects_processed: total,
                total_failures,
                failure_rate: failure_rate(total_failures, total),
                summary_by_status,
            },
            failures: entries,
        }
    }
}

fn failure_rate(failures: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.2}%", failures as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(object_type: &str, err: SourceError) -> FailureRecord {
        FailureRecord::from_source_error(
            object_type,
            "dns",
            format!("https://gm/wapi/v2.13/{object_type}"),
            &err,
        )
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(FailureStatus::Http(404).to_string(), "404");
        assert_eq!(FailureStatus::Network.to_string(), "Network Error");
        assert_eq!(FailureStatus::DataProcessing.to_string(), "Data Processing Error");
        assert_eq!(FailureStatus::Processing.to_string(), "Processing Error");
    }

    #[test]
    fn test_from_source_error() {
        let r = record("foo", SourceError::Status { code: 404, body: "  \n".to_string() });
        assert_eq!(r.status, FailureStatus::Http(404));
        assert_eq!(r.message, "No error message provided");

        let r = record("bar", SourceError::Decode("expected value".to_string()));
        assert_eq!(r.status, FailureStatus::DataProcessing);
        assert_eq!(r.message, "expected value");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 100), "short");
        let long = "x".repeat(150);
        assert_eq!(truncate(&long, 100), format!("{}...", "x".repeat(100)));
        assert_eq!(truncate("ééé", 2), "éé...");
    }

    #[test]
    fn test_report_shape() {
        let failures = vec![
            record("foo", SourceError::Status { code: 404, body: "Unknown object type".to_string() }),
            record("bar", SourceError::Network("timed out".to_string())),
            record("baz", SourceError::Status { code: 404, body: String::new() }),
        ];
        let report = FailureReport::new(
            &failures,
            5,
            ReportContext {
                timestamp: "20240101_120000".to_string(),
                wapi_version: "2.13".to_string(),
                hostname: "gm".to_string(),
            },
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value["metadata"],
            json!({
                "timestamp": "20240101_120000",
                "wapi_version": "2.13",
                "hostname": "gm",
                "total_objects_processed": 8,
                "total_failures": 3,
                "failure_rate": "37.50%",
                "summary_by_status": {"404": 2, "Network Error": 1},
            })
        );
        assert_eq!(
            value["failures"]["foo"],
            json!({
                "status_code": 404,
                "message": "Unknown object type",
                "url": "https://gm/wapi/v2.13/foo",
            })
        );
        assert_eq!(value["failures"]["bar"]["status_code"], "Network Error");
    }

    #[test]
    fn test_empty_report_rate() {
        let report = FailureReport::new(&[], 0, ReportContext::default());
        assert_eq!(report.metadata.failure_rate, "0%");
        assert_eq!(report.metadata.total_failures, 0);
    }
}
