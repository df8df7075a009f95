//! Per-package scan result types

use super::{PackageReference, Severity, Vulnerability};
use serde::{Deserialize, Serialize};
use std::fmt;

/// License shown when the registry did not provide one
pub const UNKNOWN_LICENSE: &str = "Unknown";

/// Message recorded on slots that were still pending when a scan was aborted
pub const ABORTED_MESSAGE: &str = "aborted";

/// Lifecycle state of a [`ScanResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Dispatched, not yet settled
    Pending,
    /// Settled; metadata and advisories are whatever could be obtained
    Success,
    /// Settled with a task-fatal error; vulnerability state is unknown
    Error,
}

impl ScanStatus {
    /// Returns true for `Success` and `Error`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanStatus::Pending)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Pending => write!(f, "pending"),
            ScanStatus::Success => write!(f, "success"),
            ScanStatus::Error => write!(f, "error"),
        }
    }
}

/// Registry facts about one package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub deprecated: bool,
    pub license: String,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self {
            deprecated: false,
            license: UNKNOWN_LICENSE.to_string(),
        }
    }
}

/// Outcome of scanning a single package reference
///
/// Created as `Pending` at dispatch time and settled exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// The reference that was scanned
    pub reference: PackageReference,
    /// Advisories in the order the advisory service returned them
    pub vulnerabilities: Vec<Vulnerability>,
    /// Whether the registry marks this version as deprecated
    pub deprecated: bool,
    /// Declared license, or [`UNKNOWN_LICENSE`]
    pub license: String,
    /// Lifecycle state
    pub status: ScanStatus,
    /// Set only when `status` is `Error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ScanResult {
    /// Creates a pending result with default field values
    pub fn pending(reference: PackageReference) -> Self {
        let metadata = PackageMetadata::default();
        Self {
            reference,
            vulnerabilities: Vec::new(),
            deprecated: metadata.deprecated,
            license: metadata.license,
            status: ScanStatus::Pending,
            error_message: None,
        }
    }

    /// Settles this result as `Success`
    pub fn succeed(&mut self, metadata: PackageMetadata, vulnerabilities: Vec<Vulnerability>) {
        debug_assert_eq!(self.status, ScanStatus::Pending, "result settled twice");
        self.deprecated = metadata.deprecated;
        self.license = metadata.license;
        self.vulnerabilities = vulnerabilities;
        self.status = ScanStatus::Success;
        self.error_message = None;
    }

    /// Settles this result as `Error`, discarding any vulnerabilities
    pub fn fail(&mut self, message: impl Into<String>) {
        debug_assert_eq!(self.status, ScanStatus::Pending, "result settled twice");
        self.vulnerabilities.clear();
        self.status = ScanStatus::Error;
        self.error_message = Some(message.into());
    }

    /// Forces a still-pending result into the aborted error state
    ///
    /// Returns true if the result was pending.
    pub fn abort_if_pending(&mut self) -> bool {
        if self.status == ScanStatus::Pending {
            self.fail(ABORTED_MESSAGE);
            true
        } else {
            false
        }
    }

    /// Returns true if this result settled successfully
    pub fn is_success(&self) -> bool {
        self.status == ScanStatus::Success
    }

    /// Returns true if this result settled with an error
    pub fn is_error(&self) -> bool {
        self.status == ScanStatus::Error
    }

    /// Returns true if any advisory was found
    pub fn has_vulnerabilities(&self) -> bool {
        !self.vulnerabilities.is_empty()
    }

    /// Number of advisories with exactly the given severity
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Highest severity among the advisories, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.vulnerabilities.iter().map(|v| v.severity).max()
    }
}
