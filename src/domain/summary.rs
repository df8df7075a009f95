//! Scan-wide summary and per-result severity counts
//!
//! Both are purely derived from settled [`ScanResult`](super::ScanResult)s;
//! see [`crate::aggregate`] for how they are computed.

use super::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate statistics over a completed scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Number of results, whatever their status
    pub total_packages: usize,
    /// Successful results with at least one advisory
    pub vulnerable_packages: usize,
    /// Successful results marked deprecated
    pub deprecated_packages: usize,
    /// HIGH advisories across all results
    pub high_severity_count: usize,
    /// CRITICAL advisories across all results
    pub critical_severity_count: usize,
}

impl ScanSummary {
    /// Returns true if nothing in the scan needs attention
    pub fn is_clean(&self) -> bool {
        self.vulnerable_packages == 0 && self.deprecated_packages == 0
    }
}

/// Advisory counts per severity bucket for a single result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

impl SeverityCounts {
    /// Adds one advisory to its bucket
    pub fn record(&mut self, severity: Severity) {
        *self.bucket_mut(severity) += 1;
    }

    /// Count for a single bucket
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Unknown => self.unknown,
        }
    }

    fn bucket_mut(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
            Severity::Unknown => &mut self.unknown,
        }
    }

    /// Total across all buckets
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.unknown
    }

    /// Non-empty buckets, most severe first
    pub fn non_empty(&self) -> impl Iterator<Item = (Severity, usize)> + '_ {
        Severity::ALL
            .into_iter()
            .map(|severity| (severity, self.get(severity)))
            .filter(|(_, count)| *count > 0)
    }
}

/// Compact badge form, e.g. `2 CRITICAL, 1 HIGH`
impl fmt::Display for SeverityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .non_empty()
            .map(|(severity, count)| format!("{} {}", count, severity))
            .collect();
        f.write_str(&parts.join(", "))
    }
}
