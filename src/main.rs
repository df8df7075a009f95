//! pkgscan - npm dependency vulnerability scanner CLI tool
//!
//! Reads a `package.json` or a free-form dependency list and reports, per
//! package, known vulnerabilities, deprecation and license.

use clap::Parser;
use pkgscan::aggregate::exceeds_threshold;
use pkgscan::cli::CliArgs;
use pkgscan::config::ScanConfig;
use pkgscan::logging::init_tracing;
use pkgscan::orchestrator::Scanner;
use pkgscan::output::{create_formatter, OutputConfig, ScanReport};
use pkgscan::parser::parse;
use pkgscan::progress::ScanProgress;
use std::io::{self, Write};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// A `--fail-on` threshold was reached
const EXIT_THRESHOLD: u8 = 1;
/// At least one package could not be scanned
const EXIT_PARTIAL: u8 = 2;
/// Nothing could be scanned: unreadable, empty or unparsable input, or bad configuration
const EXIT_NO_INPUT: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = init_tracing(&args.log_level, args.log_format) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_NO_INPUT);
    }

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_NO_INPUT)
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("pkgscan v{}", env!("CARGO_PKG_VERSION"));
        eprintln!(
            "Input: {}",
            if args.reads_stdin() {
                "stdin"
            } else {
                &args.input
            }
        );
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let raw = args.read_input()?;
    let references = parse(&raw);
    if references.is_empty() {
        eprintln!("No packages found in input");
        return Ok(ExitCode::from(EXIT_NO_INPUT));
    }

    let output_config = OutputConfig::from_cli(args.json, args.csv, args.verbose, args.quiet);
    let formatter = create_formatter(output_config);

    if args.dry_run {
        let mut stdout = io::stdout().lock();
        formatter.format_detected(&references, &mut stdout)?;
        stdout.flush()?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = ScanConfig::resolve(args.config.as_deref(), args.overrides())?;
    let scanner = Scanner::from_config(&config)?;

    // Ctrl-C aborts the scan; unsettled packages are reported as aborted
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, aborting scan");
            interrupt.cancel();
        }
    });

    let progress = ScanProgress::new(!args.quiet);
    let results = scanner.scan_with(references, cancel, &progress).await;
    progress.finish_and_clear();

    let report = ScanReport::new(results);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    // Print failures in verbose mode
    let failed = report.failed_count();
    if args.verbose && failed > 0 {
        eprintln!();
        eprintln!("Errors encountered:");
        for result in report.results.iter().filter(|r| r.is_error()) {
            eprintln!(
                "  - {}: {}",
                result.reference,
                result.error_message.as_deref().unwrap_or_default()
            );
        }
    }

    if failed > 0 {
        // Partial success - some packages could not be scanned
        Ok(ExitCode::from(EXIT_PARTIAL))
    } else if args
        .fail_on
        .is_some_and(|threshold| exceeds_threshold(&report.results, threshold))
    {
        Ok(ExitCode::from(EXIT_THRESHOLD))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
