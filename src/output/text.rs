//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One row per package, coloured by risk tier
//! - Per-package severity badges (e.g. `2 CRITICAL, 1 HIGH`)
//! - Advisory and error details in verbose mode
//! - Summary with counts of vulnerable, deprecated and failed packages

use crate::aggregate::{severity_counts, RiskTier};
use crate::domain::{PackageReference, ScanResult, ScanSummary};
use crate::output::{OutputFormatter, ScanReport, Verbosity};
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Row marker for a tier
    fn marker(tier: RiskTier) -> &'static str {
        match tier {
            RiskTier::Failed => "✗",
            RiskTier::Critical => "‼",
            RiskTier::High => "!",
            RiskTier::Vulnerable => "•",
            RiskTier::Clean => "✓",
        }
    }

    /// Apply the tier colour when colours are enabled
    fn paint(&self, text: &str, tier: RiskTier) -> String {
        if !self.color {
            return text.to_string();
        }
        let painted: ColoredString = match tier {
            RiskTier::Failed => text.red().dimmed(),
            RiskTier::Critical => text.red().bold(),
            RiskTier::High => text.bright_red(),
            RiskTier::Vulnerable => text.yellow(),
            RiskTier::Clean => text.green(),
        };
        painted.to_string()
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Calculate the maximum `name@version` length for alignment
    fn max_label_length(results: &[ScanResult]) -> usize {
        results
            .iter()
            .map(|r| r.reference.to_string().chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Format a single result row
    fn format_row(
        &self,
        result: &ScanResult,
        width: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let tier = RiskTier::classify(result);
        let label = format!("{:width$}", result.reference.to_string(), width = width);
        let marker = self.paint(Self::marker(tier), tier);

        if result.is_error() {
            let message = result.error_message.as_deref().unwrap_or_default();
            return writeln!(
                writer,
                "  {} {}  {}",
                marker,
                self.paint(&label, tier),
                self.paint(&format!("failed: {}", message), tier)
            );
        }

        let count = result.vulnerabilities.len();
        let mut findings = format!(
            "{} {}",
            count,
            if count == 1 {
                "vulnerability"
            } else {
                "vulnerabilities"
            }
        );
        let badge = severity_counts(result);
        if badge.total() > 0 {
            findings.push_str(&format!(" ({})", badge));
        }

        let deprecated = if result.deprecated {
            format!("  {}", self.paint("deprecated", RiskTier::Critical))
        } else {
            String::new()
        };

        writeln!(
            writer,
            "  {} {}  {}  {}{}",
            marker,
            label,
            self.paint(&findings, tier),
            self.dim(&result.license),
            deprecated
        )?;

        if self.verbosity == Verbosity::Verbose {
            for vulnerability in &result.vulnerabilities {
                writeln!(
                    writer,
                    "      {} [{}] {}",
                    vulnerability.id,
                    vulnerability.severity,
                    self.dim(&vulnerability.summary)
                )?;
            }
        }

        Ok(())
    }

    /// Counts line for the failed results, if any
    fn format_failed(&self, failed: usize, writer: &mut dyn Write) -> std::io::Result<()> {
        if failed > 0 {
            let line = format!("  {} package(s) could not be scanned", failed);
            writeln!(writer, "{}", self.paint(&line, RiskTier::Failed))?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &ScanReport, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&report.summary, writer);
        }

        if !report.results.is_empty() {
            let width = Self::max_label_length(&report.results).max(20);
            for result in &report.results {
                self.format_row(result, width, writer)?;
            }
            writeln!(writer)?;
        }

        self.format_summary(&report.summary, writer)?;
        self.format_failed(report.failed_count(), writer)
    }

    fn format_summary(
        &self,
        summary: &ScanSummary,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            if summary.is_clean() {
                return writeln!(
                    writer,
                    "{} scanned, {}",
                    summary.total_packages,
                    self.paint("no issues found", RiskTier::Clean)
                );
            }
            return writeln!(
                writer,
                "{} scanned, {} vulnerable, {} deprecated",
                summary.total_packages, summary.vulnerable_packages, summary.deprecated_packages
            );
        }

        writeln!(writer, "{}:", self.bold("Summary"))?;
        writeln!(writer, "  {} package(s) scanned", summary.total_packages)?;

        let vulnerable_tier = if summary.vulnerable_packages > 0 {
            RiskTier::Vulnerable
        } else {
            RiskTier::Clean
        };
        writeln!(
            writer,
            "  {} vulnerable",
            self.paint(&summary.vulnerable_packages.to_string(), vulnerable_tier)
        )?;

        let deprecated_tier = if summary.deprecated_packages > 0 {
            RiskTier::Critical
        } else {
            RiskTier::Clean
        };
        writeln!(
            writer,
            "  {} deprecated",
            self.paint(&summary.deprecated_packages.to_string(), deprecated_tier)
        )?;

        if summary.critical_severity_count > 0 || summary.high_severity_count > 0 {
            writeln!(
                writer,
                "  {} critical, {} high severity finding(s)",
                self.paint(
                    &summary.critical_severity_count.to_string(),
                    RiskTier::Critical
                ),
                self.paint(&summary.high_severity_count.to_string(), RiskTier::High)
            )?;
        }

        Ok(())
    }

    fn format_detected(
        &self,
        references: &[PackageReference],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let noun = if references.len() == 1 {
            "package"
        } else {
            "packages"
        };
        writeln!(writer, "{} {} detected", references.len(), noun)?;

        if self.verbosity != Verbosity::Quiet {
            for reference in references {
                writeln!(writer, "  {}", reference)?;
            }
        }
        Ok(())
    }
}
