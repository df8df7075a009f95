//! CLI argument parsing module for pkgscan

use crate::config::ConfigOverrides;
use crate::domain::Severity;
use crate::error::IoError;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Marker for reading the dependency list from stdin
pub const STDIN_MARKER: &str = "-";

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Single-line human readable
    #[default]
    Compact,
    /// Multi-line human readable
    Pretty,
    /// JSON lines
    Json,
}

/// npm dependency vulnerability scanner
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pkgscan",
    version,
    about = "Scan npm dependencies for known vulnerabilities, deprecation and licenses"
)]
pub struct CliArgs {
    /// package.json, a dependency list, or `-` for stdin
    #[arg(default_value = STDIN_MARKER)]
    pub input: String,

    /// Parse only and list detected packages without any network access
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Output results in CSV format
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,

    /// Exit with status 1 when any finding is at or above this severity
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,

    // Scan settings
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Delay between consecutive request starts, in milliseconds
    #[arg(long, value_name = "MS")]
    pub stagger_ms: Option<u64>,

    /// Timeout for each registry or advisory request, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    // Logging
    /// Log filter used when RUST_LOG is unset (e.g. warn, debug, pkgscan=trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CliArgs {
    /// Check if input comes from stdin
    pub fn reads_stdin(&self) -> bool {
        self.input == STDIN_MARKER
    }

    /// Read the whole input, from stdin or the given file
    pub fn read_input(&self) -> Result<String, IoError> {
        if self.reads_stdin() {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| IoError::generic(STDIN_MARKER, e))?;
            return Ok(raw);
        }

        let path = Path::new(&self.input);
        std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                IoError::file_not_found(path)
            } else {
                IoError::generic(path, e)
            }
        })
    }

    /// Scan settings given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            stagger_ms: self.stagger_ms,
            fetch_timeout_secs: self.timeout_secs,
        }
    }
}
