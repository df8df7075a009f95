//! Core domain models for pkgscan
//!
//! This module contains the fundamental types shared by the parser,
//! orchestrator and aggregator:
//! - Package references extracted from input text
//! - Severity buckets and vulnerability records
//! - Per-package scan results and their lifecycle
//! - Scan-wide summary and per-result severity counts

mod package_ref;
mod scan_result;
mod severity;
mod summary;
mod vulnerability;

pub use package_ref::{PackageReference, LATEST};
pub use scan_result::{PackageMetadata, ScanResult, ScanStatus, ABORTED_MESSAGE, UNKNOWN_LICENSE};
pub use severity::Severity;
pub use summary::{ScanSummary, SeverityCounts};
pub use vulnerability::Vulnerability;
