//! pkgscan - npm dependency vulnerability scanner library
//!
//! This library provides the core functionality for scanning a pasted
//! dependency list or `package.json`:
//! - Parsing free-form input into package references
//! - Concurrent, staggered lookups against a package registry and an advisory service
//! - Per-package results with deprecation, license and known vulnerabilities
//! - Scan-wide summaries and per-package severity badges

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod registry;
