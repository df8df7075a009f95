//! JSON output formatter for machine processing
//!
//! Results and summary are serialized as-is, so field names follow the
//! camelCase naming of the data model.

use crate::domain::{PackageReference, ScanResult, ScanSummary};
use crate::output::{OutputFormatter, ScanReport};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    summary: &'a ScanSummary,
    results: &'a [ScanResult],
}

/// JSON representation of a dry run
#[derive(Serialize)]
struct JsonDetected<'a> {
    count: usize,
    packages: &'a [PackageReference],
}

fn write_pretty<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ScanReport, writer: &mut dyn Write) -> std::io::Result<()> {
        write_pretty(
            &JsonOutput {
                summary: &report.summary,
                results: &report.results,
            },
            writer,
        )
    }

    fn format_summary(
        &self,
        summary: &ScanSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_pretty(summary, writer)
    }

    fn format_detected(
        &self,
        references: &[PackageReference],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_pretty(
            &JsonDetected {
                count: references.len(),
                packages: references,
            },
            writer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PackageMetadata, Severity, Vulnerability};

    fn create_test_report() -> ScanReport {
        let mut lodash = ScanResult::pending(PackageReference::new("lodash", "4.17.20"));
        lodash.succeed(
            PackageMetadata {
                deprecated: false,
                license: "MIT".to_string(),
            },
            vec![Vulnerability::new(
                "GHSA-35jh-r3h4-6jhm",
                "Command Injection in lodash",
                Severity::High,
            )],
        );

        let mut ghost = ScanResult::pending(PackageReference::latest("ghost"));
        ghost.fail("scan task failed unexpectedly");

        ScanReport::new(vec![lodash, ghost])
    }

    fn render(formatter: &JsonFormatter, report: &ScanReport) -> serde_json::Value {
        let mut output = Vec::new();
        formatter.format(report, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_format_json() {
        let parsed = render(&JsonFormatter::new(), &create_test_report());

        assert_eq!(parsed["summary"]["totalPackages"], 2);
        assert_eq!(parsed["summary"]["vulnerablePackages"], 1);
        assert_eq!(parsed["summary"]["highSeverityCount"], 1);
        assert_eq!(parsed["results"][0]["reference"]["name"], "lodash");
        assert_eq!(parsed["results"][0]["reference"]["versionSpec"], "4.17.20");
        assert_eq!(parsed["results"][0]["status"], "success");
        assert_eq!(parsed["results"][0]["vulnerabilities"][0]["severity"], "HIGH");
        assert!(parsed["results"][0].get("errorMessage").is_none());
    }

    #[test]
    fn test_format_json_error_result() {
        let parsed = render(&JsonFormatter::new(), &create_test_report());

        assert_eq!(parsed["results"][1]["status"], "error");
        assert_eq!(
            parsed["results"][1]["errorMessage"],
            "scan task failed unexpectedly"
        );
        assert_eq!(parsed["results"][1]["vulnerabilities"], serde_json::json!([]));
    }

    #[test]
    fn test_format_summary() {
        let mut output = Vec::new();
        JsonFormatter::new()
            .format_summary(&create_test_report().summary, &mut output)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["totalPackages"], 2);
        assert_eq!(parsed["deprecatedPackages"], 0);
    }

    #[test]
    fn test_format_detected() {
        let references = vec![
            PackageReference::new("react", "18.2.0"),
            PackageReference::latest("express"),
        ];
        let mut output = Vec::new();
        JsonFormatter::new()
            .format_detected(&references, &mut output)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["count"], 2);
        assert_eq!(parsed["packages"][1]["versionSpec"], "latest");
    }
}
