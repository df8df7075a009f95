//! Upstream service adapters
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - The package metadata and advisory service abstractions
//! - npm registry adapter (deprecation, license)
//! - OSV adapter (known vulnerabilities)

mod client;
mod npm;
mod osv;

pub use client::{HttpClient, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use npm::{NpmRegistry, NPM_REGISTRY_URL};
pub use osv::{OsvAdvisories, OSV_QUERY_URL};

use crate::domain::Vulnerability;
use crate::error::RegistryError;
use async_trait::async_trait;

/// Registry facts for one version; absent fields were not provided upstream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub deprecated: Option<bool>,
    pub license: Option<String>,
}

/// Advisory lookup key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryQuery {
    /// Ecosystem tag, e.g. `npm`
    pub ecosystem: String,
    /// Package name
    pub package: String,
    /// Exact version filter; `None` asks for advisories across all versions
    pub version: Option<String>,
}

impl AdvisoryQuery {
    pub fn new(
        ecosystem: impl Into<String>,
        package: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            ecosystem: ecosystem.into(),
            package: package.into(),
            version,
        }
    }
}

/// Package metadata service (a registry)
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Get the service name used in errors and logs
    fn source_name(&self) -> &'static str;

    /// Fetch the version document for `version`, which may be `latest`
    async fn version_info(&self, package: &str, version: &str) -> Result<VersionInfo, RegistryError>;
}

/// Vulnerability advisory service
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    /// Get the service name used in errors and logs
    fn source_name(&self) -> &'static str;

    /// Fetch advisories matching the query, in service order
    async fn query_advisories(
        &self,
        query: &AdvisoryQuery,
    ) -> Result<Vec<Vulnerability>, RegistryError>;
}
