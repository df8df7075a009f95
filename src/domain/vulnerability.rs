//! Known-vulnerability record

use super::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single advisory affecting a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    /// Advisory identifier (e.g. `GHSA-xxxx-xxxx-xxxx`)
    pub id: String,
    /// One-line summary
    pub summary: String,
    /// Severity bucket
    pub severity: Severity,
    /// First publication time, when the advisory carries a parsable one
    pub published_at: Option<DateTime<Utc>>,
    /// Last modification time
    pub modified_at: Option<DateTime<Utc>>,
    /// Alternative identifiers (CVE ids and the like)
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Vulnerability {
    /// Creates a vulnerability with no timestamps or aliases
    pub fn new(id: impl Into<String>, summary: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            severity,
            published_at: None,
            modified_at: None,
            aliases: Vec::new(),
        }
    }

    /// Sets the alias list (builder pattern)
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Sets publication and modification times (builder pattern)
    pub fn with_dates(
        mut self,
        published_at: Option<DateTime<Utc>>,
        modified_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.published_at = published_at;
        self.modified_at = modified_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder() {
        let published = Utc.with_ymd_and_hms(2021, 2, 15, 0, 0, 0).unwrap();
        let vuln = Vulnerability::new("GHSA-35jh-r3h4-6jhm", "Command Injection", Severity::High)
            .with_aliases(vec!["CVE-2021-23337".to_string()])
            .with_dates(Some(published), None);

        assert_eq!(vuln.id, "GHSA-35jh-r3h4-6jhm");
        assert_eq!(vuln.severity, Severity::High);
        assert_eq!(vuln.aliases, vec!["CVE-2021-23337"]);
        assert_eq!(vuln.published_at, Some(published));
        assert!(vuln.modified_at.is_none());
    }

    #[test]
    fn test_serde_field_names() {
        let vuln = Vulnerability::new("GHSA-1", "x", Severity::Low);
        let json = serde_json::to_string(&vuln).unwrap();
        assert!(json.contains("\"publishedAt\":null"));
        assert!(json.contains("\"severity\":\"LOW\""));
    }
}
