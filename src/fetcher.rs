//! Per-reference fetchers over the upstream services
//!
//! Both fetchers apply a per-call timeout and absorb every upstream failure:
//! - metadata failures yield [`Fetched::Unavailable`]
//! - advisory failures yield an empty vulnerability list
//!
//! Neither returns an error to the caller; task-fatal failures are the
//! orchestrator's concern.

use crate::domain::{PackageMetadata, PackageReference, Vulnerability, UNKNOWN_LICENSE};
use crate::error::RegistryError;
use crate::registry::{AdvisoryQuery, AdvisorySource, MetadataSource};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a lookup that degrades instead of failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The upstream answered
    Available(T),
    /// The upstream failed, timed out or had no record
    Unavailable,
}

impl<T> Fetched<T> {
    /// Returns the data, or `default` when unavailable
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Fetched::Available(value) => value,
            Fetched::Unavailable => default,
        }
    }
}

impl<T: Default> Fetched<T> {
    /// Returns the data, or `T::default()` when unavailable
    pub fn unwrap_or_default(self) -> T {
        self.unwrap_or(T::default())
    }
}

/// Await an upstream call under a deadline, folding elapsed time into the error type
async fn with_timeout<T, F>(
    limit: Duration,
    call: F,
    package: &str,
    source: &str,
) -> Result<T, RegistryError>
where
    F: Future<Output = Result<T, RegistryError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RegistryError::timeout(package, source)),
    }
}

/// Fetches deprecation and license facts for one reference
#[derive(Clone)]
pub struct MetadataFetcher {
    source: Arc<dyn MetadataSource>,
    timeout: Duration,
}

impl MetadataFetcher {
    pub fn new(source: Arc<dyn MetadataSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Look up `reference`; `latest` resolves against the registry's latest tag
    pub async fn fetch(&self, reference: &PackageReference) -> Fetched<PackageMetadata> {
        let source_name = self.source.source_name();
        let call = self
            .source
            .version_info(&reference.name, &reference.version_spec);

        match with_timeout(self.timeout, call, &reference.name, source_name).await {
            Ok(info) => Fetched::Available(PackageMetadata {
                deprecated: info.deprecated.unwrap_or(false),
                license: info
                    .license
                    .unwrap_or_else(|| UNKNOWN_LICENSE.to_string()),
            }),
            Err(e) => {
                debug!(%reference, error = %e, "metadata unavailable");
                Fetched::Unavailable
            }
        }
    }
}

/// Fetches known vulnerabilities for one reference
#[derive(Clone)]
pub struct VulnerabilityFetcher {
    source: Arc<dyn AdvisorySource>,
    ecosystem: String,
    timeout: Duration,
}

impl VulnerabilityFetcher {
    pub fn new(source: Arc<dyn AdvisorySource>, ecosystem: impl Into<String>, timeout: Duration) -> Self {
        Self {
            source,
            ecosystem: ecosystem.into(),
            timeout,
        }
    }

    /// Build the advisory query; `latest` omits the version filter
    pub fn query_for(&self, reference: &PackageReference) -> AdvisoryQuery {
        let version = (!reference.is_latest()).then(|| reference.version_spec.clone());
        AdvisoryQuery::new(&self.ecosystem, &reference.name, version)
    }

    /// Look up advisories for `reference`, degrading to an empty list
    pub async fn fetch(&self, reference: &PackageReference) -> Vec<Vulnerability> {
        let query = self.query_for(reference);
        let source_name = self.source.source_name();
        let call = self.source.query_advisories(&query);

        match with_timeout(self.timeout, call, &reference.name, source_name).await {
            Ok(vulnerabilities) => vulnerabilities,
            Err(e) => {
                warn!(%reference, error = %e, "advisory lookup degraded to empty result");
                Vec::new()
            }
        }
    }
}
