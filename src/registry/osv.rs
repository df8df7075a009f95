//! OSV advisory adapter
//!
//! Queries known vulnerabilities for a package in an ecosystem.
//! API endpoint: POST https://api.osv.dev/v1/query

use crate::domain::{Severity, Vulnerability};
use crate::error::RegistryError;
use crate::registry::{AdvisoryQuery, AdvisorySource, HttpClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OSV query endpoint
pub const OSV_QUERY_URL: &str = "https://api.osv.dev/v1/query";

/// OSV advisory adapter
pub struct OsvAdvisories {
    client: HttpClient,
    query_url: String,
}

#[derive(Debug, Serialize)]
struct OsvQueryBody<'a> {
    package: OsvPackage<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OsvPackage<'a> {
    name: &'a str,
    ecosystem: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct OsvQueryResponse {
    #[serde(default)]
    vulns: Vec<OsvVulnerability>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    modified: Option<String>,
    #[serde(default)]
    database_specific: Option<Value>,
}

impl OsvVulnerability {
    fn into_vulnerability(self) -> Vulnerability {
        let severity = self
            .database_specific
            .as_ref()
            .and_then(|db| db.get("severity"))
            .and_then(Value::as_str)
            .map(Severity::from_label)
            .unwrap_or(Severity::Unknown);

        let summary = self
            .summary
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.details
                    .as_deref()
                    .and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        Vulnerability::new(self.id, summary, severity)
            .with_aliases(self.aliases)
            .with_dates(
                parse_timestamp(self.published.as_deref()),
                parse_timestamp(self.modified.as_deref()),
            )
    }
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value?.parse::<DateTime<Utc>>().ok()
}

impl OsvAdvisories {
    /// Create a new adapter against an OSV-compatible query endpoint
    pub fn with_query_url(client: HttpClient, query_url: impl Into<String>) -> Self {
        Self {
            client,
            query_url: query_url.into(),
        }
    }
}

fn build_body<'a>(query: &'a AdvisoryQuery) -> OsvQueryBody<'a> {
    OsvQueryBody {
        package: OsvPackage {
            name: &query.package,
            ecosystem: &query.ecosystem,
        },
        version: query.version.as_deref(),
    }
}

fn decode_response(response: OsvQueryResponse) -> Vec<Vulnerability> {
    response
        .vulns
        .into_iter()
        .map(OsvVulnerability::into_vulnerability)
        .collect()
}

#[async_trait]
impl AdvisorySource for OsvAdvisories {
    fn source_name(&self) -> &'static str {
        "OSV"
    }

    async fn query_advisories(
        &self,
        query: &AdvisoryQuery,
    ) -> Result<Vec<Vulnerability>, RegistryError> {
        let body = build_body(query);
        let response: OsvQueryResponse = self
            .client
            .post_json(&self.query_url, &body, &query.package, self.source_name())
            .await?;
        Ok(decode_response(response))
    }
}
