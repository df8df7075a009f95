//! Package reference extracted from free-form input

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel version meaning "whatever the registry tags as latest"
pub const LATEST: &str = "latest";

/// A `(name, versionSpec)` pair extracted from arbitrary input text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageReference {
    /// Package name, including the `@scope/` prefix for scoped packages
    pub name: String,
    /// Cleaned version, or [`LATEST`]
    pub version_spec: String,
}

impl PackageReference {
    /// Creates a new reference; an empty version becomes [`LATEST`]
    pub fn new(name: impl Into<String>, version_spec: impl Into<String>) -> Self {
        let version_spec = version_spec.into();
        let version_spec = if version_spec.trim().is_empty() {
            LATEST.to_string()
        } else {
            version_spec
        };
        Self {
            name: name.into(),
            version_spec,
        }
    }

    /// Creates a name-only reference resolving to [`LATEST`]
    pub fn latest(name: impl Into<String>) -> Self {
        Self::new(name, LATEST)
    }

    /// Returns true if this reference targets the registry's latest tag
    pub fn is_latest(&self) -> bool {
        self.version_spec == LATEST
    }

    /// Returns true if the name is usable for a lookup
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version_spec)
    }
}
