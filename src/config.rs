//! Scan configuration
//!
//! Settings come from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config`)
//! 3. Command-line overrides

use crate::error::ConfigError;
use crate::registry::{
    DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, NPM_REGISTRY_URL, OSV_QUERY_URL,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default per-index dispatch delay in milliseconds
pub const DEFAULT_STAGGER_MS: u64 = 200;

/// Upper bound for the per-index dispatch delay
pub const MAX_STAGGER_MS: u64 = 10_000;

/// Default advisory ecosystem tag
pub const DEFAULT_ECOSYSTEM: &str = "npm";

/// Settings for one scan session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Linear per-index dispatch delay
    pub stagger_ms: u64,
    /// Timeout for each HTTP attempt; a fetch may retry up to `max_retries` times
    pub fetch_timeout_secs: u64,
    /// HTTP retry attempts for 429 and transport errors
    pub max_retries: u32,
    /// Package metadata registry base URL
    pub registry_url: String,
    /// Advisory query endpoint
    pub advisory_url: String,
    /// Advisory ecosystem tag
    pub ecosystem: String,
    /// User-Agent sent to both services
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            stagger_ms: DEFAULT_STAGGER_MS,
            fetch_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_retries: DEFAULT_MAX_RETRIES,
            registry_url: NPM_REGISTRY_URL.to_string(),
            advisory_url: OSV_QUERY_URL.to_string(),
            ecosystem: DEFAULT_ECOSYSTEM.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub stagger_ms: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
}

impl ScanConfig {
    /// Build the effective configuration from an optional file plus overrides
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Apply command-line values on top of the current settings
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(stagger_ms) = overrides.stagger_ms {
            self.stagger_ms = stagger_ms;
        }
        if let Some(timeout) = overrides.fetch_timeout_secs {
            self.fetch_timeout_secs = timeout;
        }
    }

    /// Check every setting is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stagger_ms > MAX_STAGGER_MS {
            return Err(ConfigError::invalid_value(
                "stagger_ms",
                format!("must be at most {} (got {})", MAX_STAGGER_MS, self.stagger_ms),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "fetch_timeout_secs",
                "must be at least 1",
            ));
        }
        validate_url("registry_url", &self.registry_url)?;
        validate_url("advisory_url", &self.advisory_url)?;
        if self.ecosystem.trim().is_empty() {
            return Err(ConfigError::invalid_value("ecosystem", "must not be empty"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid_value("user_agent", "must not be empty"));
        }
        Ok(())
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn validate_url(key: &str, url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            key,
            format!("expected an http(s) URL, got '{}'", url),
        ))
    }
}
