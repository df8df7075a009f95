//! Aggregation and classification over settled scan results
//!
//! Everything here is pure: the same results, in any order, give the same answers.

use crate::domain::{ScanResult, ScanSummary, Severity, SeverityCounts};
use serde::Serialize;

/// Summarize a completed scan
///
/// Failed results count toward `total_packages` only; their vulnerability
/// and deprecation state is unknown, not clean.
pub fn summarize(results: &[ScanResult]) -> ScanSummary {
    debug_assert!(
        results.iter().all(|r| r.status.is_terminal()),
        "summarize called before every result settled"
    );

    results
        .iter()
        .fold(
            ScanSummary {
                total_packages: results.len(),
                ..ScanSummary::default()
            },
            |mut summary, result| {
                if result.is_success() {
                    if result.has_vulnerabilities() {
                        summary.vulnerable_packages += 1;
                    }
                    if result.deprecated {
                        summary.deprecated_packages += 1;
                    }
                }
                summary.high_severity_count += result.count_severity(Severity::High);
                summary.critical_severity_count += result.count_severity(Severity::Critical);
                summary
            },
        )
}

/// Group one result's advisories by severity, unknown values included
pub fn severity_counts(result: &ScanResult) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for vulnerability in &result.vulnerabilities {
        counts.record(vulnerability.severity);
    }
    counts
}

/// Returns true if any `Success` result carries a finding at or above `threshold`
pub fn exceeds_threshold(results: &[ScanResult], threshold: Severity) -> bool {
    results
        .iter()
        .filter(|r| r.is_success())
        .filter_map(ScanResult::max_severity)
        .any(|severity| severity >= threshold)
}

/// Display tier of a single result, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskTier {
    /// The scan itself failed
    Failed,
    /// Deprecated, or carries a CRITICAL advisory
    Critical,
    /// Carries a HIGH advisory
    High,
    /// Carries any other advisory
    Vulnerable,
    /// Nothing found
    Clean,
}

impl RiskTier {
    /// Classify a settled result
    pub fn classify(result: &ScanResult) -> Self {
        if result.is_error() {
            return RiskTier::Failed;
        }
        let counts = severity_counts(result);
        if result.deprecated || counts.critical > 0 {
            RiskTier::Critical
        } else if counts.high > 0 {
            RiskTier::High
        } else if counts.total() > 0 {
            RiskTier::Vulnerable
        } else {
            RiskTier::Clean
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Failed => "failed",
            RiskTier::Critical => "critical",
            RiskTier::High => "high",
            RiskTier::Vulnerable => "vulnerable",
            RiskTier::Clean => "clean",
        }
    }
}

/// Advisory fields forwarded to an explanation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryFinding {
    pub id: String,
    pub summary: String,
    pub severity: Severity,
}

/// One successfully scanned package as seen by an explanation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageFinding {
    pub package: String,
    pub version: String,
    pub vulnerabilities: Vec<AdvisoryFinding>,
    pub deprecated: bool,
    pub license: String,
}

/// Payload for a downstream explanation service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationRequest {
    pub scan_results: Vec<PackageFinding>,
}

impl ExplanationRequest {
    pub fn is_empty(&self) -> bool {
        self.scan_results.is_empty()
    }
}

/// Build the explanation payload from `Success` results only, in scan order
pub fn explanation_request(results: &[ScanResult]) -> ExplanationRequest {
    let scan_results = results
        .iter()
        .filter(|r| r.is_success())
        .map(|r| PackageFinding {
            package: r.reference.name.clone(),
            version: r.reference.version_spec.clone(),
            vulnerabilities: r
                .vulnerabilities
                .iter()
                .map(|v| AdvisoryFinding {
                    id: v.id.clone(),
                    summary: v.summary.clone(),
                    severity: v.severity,
                })
                .collect(),
            deprecated: r.deprecated,
            license: r.license.clone(),
        })
        .collect();

    ExplanationRequest { scan_results }
}
