//! CSV output formatter
//!
//! One row per result under a fixed header. Fields containing a comma,
//! quote or line break are quoted with embedded quotes doubled.

use crate::domain::{PackageReference, ScanSummary, Severity};
use crate::output::{OutputFormatter, ScanReport};
use std::borrow::Cow;
use std::io::Write;

/// Column header for scan results
pub const RESULT_HEADER: [&str; 7] = [
    "Package",
    "Version",
    "Vulnerabilities Count",
    "Deprecated",
    "License",
    "High Severity",
    "Critical Severity",
];

const SUMMARY_HEADER: [&str; 5] = [
    "Total Packages",
    "Vulnerable Packages",
    "Deprecated Packages",
    "High Severity",
    "Critical Severity",
];

/// CSV formatter
#[derive(Debug, Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    /// Create a new CSV formatter
    pub fn new() -> Self {
        Self
    }
}

/// Quote a field when it would otherwise break the row
fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_row<S: AsRef<str>>(writer: &mut dyn Write, fields: &[S]) -> std::io::Result<()> {
    let row: Vec<Cow<'_, str>> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(writer, "{}", row.join(","))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

impl OutputFormatter for CsvFormatter {
    fn format(&self, report: &ScanReport, writer: &mut dyn Write) -> std::io::Result<()> {
        write_row(writer, &RESULT_HEADER)?;
        for result in &report.results {
            write_row(
                writer,
                &[
                    result.reference.name.clone(),
                    result.reference.version_spec.clone(),
                    result.vulnerabilities.len().to_string(),
                    yes_no(result.deprecated).to_string(),
                    result.license.clone(),
                    result.count_severity(Severity::High).to_string(),
                    result.count_severity(Severity::Critical).to_string(),
                ],
            )?;
        }
        Ok(())
    }

    fn format_summary(
        &self,
        summary: &ScanSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_row(writer, &SUMMARY_HEADER)?;
        write_row(
            writer,
            &[
                summary.total_packages.to_string(),
                summary.vulnerable_packages.to_string(),
                summary.deprecated_packages.to_string(),
                summary.high_severity_count.to_string(),
                summary.critical_severity_count.to_string(),
            ],
        )
    }

    fn format_detected(
        &self,
        references: &[PackageReference],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_row(writer, &["Package", "Version"])?;
        for reference in references {
            write_row(writer, &[&reference.name, &reference.version_spec])?;
        }
        Ok(())
    }
}
