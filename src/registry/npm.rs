//! npm Registry adapter
//!
//! Fetches deprecation and license facts for a single package version.
//! API endpoint: https://registry.npmjs.org/{package}/{version|latest}

use crate::error::RegistryError;
use crate::registry::{HttpClient, MetadataSource, VersionInfo};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// npm registry base URL
pub const NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// npm Registry adapter
pub struct NpmRegistry {
    client: HttpClient,
    base_url: String,
}

/// npm version document (the subset we read)
#[derive(Debug, Default, Deserialize)]
struct NpmVersionDocument {
    /// Deprecation message, or occasionally a boolean
    #[serde(default)]
    deprecated: Option<Value>,
    /// SPDX string or legacy `{ "type": ... }` object
    #[serde(default)]
    license: Option<Value>,
    /// Legacy license array
    #[serde(default)]
    licenses: Option<Vec<Value>>,
}

impl NpmVersionDocument {
    fn into_version_info(self) -> VersionInfo {
        let deprecated = self.deprecated.as_ref().map(is_deprecation_marker);
        let license = self.license.as_ref().and_then(license_name).or_else(|| {
            self.licenses
                .as_ref()
                .and_then(|entries| entries.iter().find_map(license_name))
        });
        VersionInfo {
            deprecated,
            license,
        }
    }
}

/// A non-empty message or `true` marks the version deprecated
fn is_deprecation_marker(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(message) => !message.trim().is_empty(),
        _ => false,
    }
}

fn license_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(s) => s.as_str(),
        Value::Object(object) => object.get("type")?.as_str()?,
        _ => return None,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

impl NpmRegistry {
    /// Create a new npm adapter against the registry or a mirror at `base_url`
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the version document URL; the scope separator is percent-encoded
    fn build_url(&self, package: &str, version: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            package.replace('/', "%2F"),
            version
        )
    }
}

#[async_trait]
impl MetadataSource for NpmRegistry {
    fn source_name(&self) -> &'static str {
        "npm"
    }

    async fn version_info(&self, package: &str, version: &str) -> Result<VersionInfo, RegistryError> {
        let url = self.build_url(package, version);
        let document: NpmVersionDocument = self
            .client
            .get_json(&url, package, self.source_name())
            .await?;
        Ok(document.into_version_info())
    }
}
