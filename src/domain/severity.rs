//! Severity buckets used for counting and display

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Advisory severity bucket
///
/// Ordered from least to most severe, with `Unknown` below `Low` so that
/// threshold comparisons never treat an unrecognized label as serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Unrecognized or missing severity label
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All buckets, most severe first (display order)
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Unknown,
    ];

    /// Classify a free-form label; anything unrecognized is `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Severity::Low,
            "MEDIUM" | "MODERATE" => Severity::Medium,
            "HIGH" => Severity::High,
            "CRITICAL" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }

    /// Upper-case label as shown in reports
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Unknown => "UNKNOWN",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict parse used for CLI thresholds, where a typo should be rejected
impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Severity::from_label(s) {
            Severity::Unknown if !s.trim().eq_ignore_ascii_case("unknown") => Err(format!(
                "invalid severity '{}': expected low, medium, high, critical or unknown",
                s
            )),
            severity => Ok(severity),
        }
    }
}
