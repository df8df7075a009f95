//! Progress display for scans
//!
//! Provides visual feedback while a scan runs using indicatif. The bar is
//! driven by the orchestrator through [`ScanObserver`] and draws to stderr.

use crate::domain::ScanResult;
use crate::orchestrator::ScanObserver;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str = "{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})";

/// Progress reporter for a scan
pub struct ScanProgress {
    bar: ProgressBar,
}

impl ScanProgress {
    /// Create a new progress reporter; a disabled one draws nothing
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("█▓▒░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Number of settled packages so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish and clear the bar
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScanObserver for ScanProgress {
    fn on_dispatch(&self, results: &[ScanResult]) {
        self.bar.set_length(results.len() as u64);
        self.bar.set_message("Scanning packages");
    }

    fn on_settled(&self, _index: usize, result: &ScanResult) {
        self.bar.inc(1);
        self.bar.set_message(format!("Scanned {}", result.reference.name));
    }
}
