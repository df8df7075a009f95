//! Scan orchestrator
//!
//! This module provides:
//! - One concurrent task per reference, started on a linear per-index stagger
//! - Results in a pre-sized, index-addressed arena; each task settles one slot
//! - Panic isolation: a task that dies settles only its own slot as `Error`
//! - Cooperative cancellation: unsettled slots are forced to `Error("aborted")`

use crate::config::{ScanConfig, DEFAULT_ECOSYSTEM, DEFAULT_STAGGER_MS};
use crate::domain::{PackageMetadata, PackageReference, ScanResult, Vulnerability};
use crate::error::{RegistryError, ScanError};
use crate::fetcher::{MetadataFetcher, VulnerabilityFetcher};
use crate::registry::{
    AdvisorySource, HttpClient, MetadataSource, NpmRegistry, OsvAdvisories, DEFAULT_TIMEOUT,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Start delay policy for dispatched tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaggerPolicy {
    step: Duration,
}

impl StaggerPolicy {
    /// Task `i` starts `i * step` after dispatch
    pub fn linear(step: Duration) -> Self {
        Self { step }
    }

    /// Start every task immediately
    pub fn none() -> Self {
        Self::linear(Duration::ZERO)
    }

    /// Start delay for the task at `index`
    pub fn delay(&self, index: usize) -> Duration {
        let factor = u32::try_from(index).unwrap_or(u32::MAX);
        self.step.saturating_mul(factor)
    }
}

impl Default for StaggerPolicy {
    fn default() -> Self {
        Self::linear(Duration::from_millis(DEFAULT_STAGGER_MS))
    }
}

/// Receives progress while a scan runs
pub trait ScanObserver: Send + Sync {
    /// Every slot has been allocated as `Pending`
    fn on_dispatch(&self, _results: &[ScanResult]) {}

    /// The slot at `index` reached a terminal state
    fn on_settled(&self, _index: usize, _result: &ScanResult) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Runs scans against injected metadata and advisory services
pub struct Scanner {
    metadata: Arc<dyn MetadataSource>,
    advisories: Arc<dyn AdvisorySource>,
    ecosystem: String,
    fetch_timeout: Duration,
    stagger: StaggerPolicy,
}

impl Scanner {
    /// Create a scanner over the given services with default settings
    pub fn new(metadata: Arc<dyn MetadataSource>, advisories: Arc<dyn AdvisorySource>) -> Self {
        Self {
            metadata,
            advisories,
            ecosystem: DEFAULT_ECOSYSTEM.to_string(),
            fetch_timeout: DEFAULT_TIMEOUT,
            stagger: StaggerPolicy::default(),
        }
    }

    /// Create a scanner backed by the npm registry and OSV
    pub fn from_config(config: &ScanConfig) -> Result<Self, RegistryError> {
        let client = HttpClient::with_config(config.fetch_timeout(), &config.user_agent)?
            .with_max_retries(config.max_retries);
        // Each fetch may spend its full retry schedule before it is cut off
        let deadline = client.deadline();

        let metadata = NpmRegistry::with_base_url(client.clone(), &config.registry_url);
        let advisories = OsvAdvisories::with_query_url(client, &config.advisory_url);

        Ok(Self::new(Arc::new(metadata), Arc::new(advisories))
            .with_ecosystem(&config.ecosystem)
            .with_fetch_timeout(deadline)
            .with_stagger(StaggerPolicy::linear(config.stagger())))
    }

    pub fn with_stagger(mut self, stagger: StaggerPolicy) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_ecosystem(mut self, ecosystem: impl Into<String>) -> Self {
        self.ecosystem = ecosystem.into();
        self
    }

    /// Scan every reference; the output matches the input one-to-one and in order
    pub async fn scan(&self, references: Vec<PackageReference>) -> Vec<ScanResult> {
        self.scan_with(references, CancellationToken::new(), &NoopObserver)
            .await
    }

    /// Scan with cooperative cancellation and progress observation
    ///
    /// Returns once every slot is terminal. If `cancel` fires first, the
    /// remaining tasks are aborted and their slots settle as `aborted` errors.
    pub async fn scan_with(
        &self,
        references: Vec<PackageReference>,
        cancel: CancellationToken,
        observer: &dyn ScanObserver,
    ) -> Vec<ScanResult> {
        let mut results: Vec<ScanResult> = references
            .iter()
            .cloned()
            .map(ScanResult::pending)
            .collect();
        observer.on_dispatch(&results);
        info!(packages = results.len(), "scan started");

        let metadata = MetadataFetcher::new(Arc::clone(&self.metadata), self.fetch_timeout);
        let advisories = VulnerabilityFetcher::new(
            Arc::clone(&self.advisories),
            self.ecosystem.clone(),
            self.fetch_timeout,
        );

        let mut tasks = JoinSet::new();
        let mut slots: HashMap<task::Id, usize> = HashMap::with_capacity(references.len());

        for (index, reference) in references.into_iter().enumerate() {
            if !reference.is_valid() {
                let error = ScanError::invalid_reference(&reference.name, "package name is empty");
                warn!(index, error = %error, "skipping reference");
                results[index].fail(error.to_string());
                observer.on_settled(index, &results[index]);
                continue;
            }

            let delay = self.stagger.delay(index);
            let metadata = metadata.clone();
            let advisories = advisories.clone();
            let handle = tasks.spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                scan_one(&metadata, &advisories, &reference).await
            });
            slots.insert(handle.id(), index);
        }

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(unsettled = tasks.len(), "scan aborted");
                    tasks.abort_all();
                    break;
                }
                joined = tasks.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    let (id, outcome) = match joined {
                        Ok((id, found)) => (id, Ok(found)),
                        Err(e) => (e.id(), Err(task_failure(e))),
                    };
                    let Some(&index) = slots.get(&id) else {
                        continue;
                    };

                    match outcome {
                        Ok((metadata, vulnerabilities)) => {
                            results[index].succeed(metadata, vulnerabilities);
                        }
                        Err(error) => {
                            warn!(index, reference = %results[index].reference, error = %error, "scan task failed");
                            results[index].fail(error.to_string());
                        }
                    }
                    observer.on_settled(index, &results[index]);
                }
            }
        }

        for (index, result) in results.iter_mut().enumerate() {
            if result.abort_if_pending() {
                observer.on_settled(index, result);
            }
        }

        let failed = results.iter().filter(|r| r.is_error()).count();
        info!(packages = results.len(), failed, "scan finished");
        results
    }
}

/// Fetch metadata then advisories for one reference
async fn scan_one(
    metadata: &MetadataFetcher,
    advisories: &VulnerabilityFetcher,
    reference: &PackageReference,
) -> (PackageMetadata, Vec<Vulnerability>) {
    debug!(%reference, "scanning");
    let metadata = metadata.fetch(reference).await.unwrap_or_default();
    let vulnerabilities = advisories.fetch(reference).await;
    (metadata, vulnerabilities)
}

/// Convert a dead task into its error, keeping a string panic payload
fn task_failure(error: JoinError) -> ScanError {
    match error.try_into_panic() {
        Ok(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            ScanError::task_failed(message)
        }
        Err(_) => ScanError::task_failed(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScanStatus, Severity, ABORTED_MESSAGE, UNKNOWN_LICENSE};
    use crate::registry::{AdvisoryQuery, VersionInfo};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Metadata fake with per-package latency, optional panic and start log
    #[derive(Default)]
    struct FakeMetadata {
        latency: HashMap<String, Duration>,
        panic_on: Option<String>,
        deprecated: Vec<String>,
        starts: Mutex<Vec<(String, Instant)>>,
    }

    #[async_trait]
    impl MetadataSource for FakeMetadata {
        fn source_name(&self) -> &'static str {
            "fake"
        }

        async fn version_info(
            &self,
            package: &str,
            _version: &str,
        ) -> Result<VersionInfo, RegistryError> {
            self.starts
                .lock()
                .unwrap()
                .push((package.to_string(), Instant::now()));
            if let Some(delay) = self.latency.get(package) {
                tokio::time::sleep(*delay).await;
            }
            if self.panic_on.as_deref() == Some(package) {
                panic!("registry exploded for {}", package);
            }
            Ok(VersionInfo {
                deprecated: Some(self.deprecated.iter().any(|d| d == package)),
                license: Some("MIT".to_string()),
            })
        }
    }

    /// Advisory fake returning a fixed list per package
    #[derive(Default)]
    struct FakeAdvisories {
        findings: HashMap<String, Vec<Vulnerability>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl AdvisorySource for FakeAdvisories {
        fn source_name(&self) -> &'static str {
            "fake"
        }

        async fn query_advisories(
            &self,
            query: &AdvisoryQuery,
        ) -> Result<Vec<Vulnerability>, RegistryError> {
            if self.fail_on.as_deref() == Some(query.package.as_str()) {
                return Err(RegistryError::network_error(&query.package, "fake", "down"));
            }
            Ok(self.findings.get(&query.package).cloned().unwrap_or_default())
        }
    }

    fn refs(names: &[&str]) -> Vec<PackageReference> {
        names.iter().map(|n| PackageReference::latest(*n)).collect()
    }

    fn scanner(metadata: FakeMetadata, advisories: FakeAdvisories) -> Scanner {
        Scanner::new(Arc::new(metadata), Arc::new(advisories)).with_stagger(StaggerPolicy::none())
    }

    #[derive(Default)]
    struct RecordingObserver {
        dispatched: Mutex<usize>,
        settled: Mutex<Vec<usize>>,
    }

    impl ScanObserver for RecordingObserver {
        fn on_dispatch(&self, results: &[ScanResult]) {
            assert!(results.iter().all(|r| r.status == ScanStatus::Pending));
            *self.dispatched.lock().unwrap() = results.len();
        }

        fn on_settled(&self, index: usize, result: &ScanResult) {
            assert!(result.status.is_terminal());
            self.settled.lock().unwrap().push(index);
        }
    }

    #[test]
    fn test_stagger_delay_is_linear() {
        let policy = StaggerPolicy::linear(Duration::from_millis(200));
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(5), Duration::from_secs(1));
        assert_eq!(StaggerPolicy::none().delay(100), Duration::ZERO);
        assert_eq!(StaggerPolicy::default().delay(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_scan_empty_input() {
        let results = scanner(FakeMetadata::default(), FakeAdvisories::default())
            .scan(Vec::new())
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_scan_preserves_order_under_reversed_latency() {
        let names = ["a", "b", "c", "d", "e"];
        let mut metadata = FakeMetadata::default();
        for (i, name) in names.iter().enumerate() {
            let delay = Duration::from_millis(20 * (names.len() - i) as u64);
            metadata.latency.insert(name.to_string(), delay);
        }

        let results = scanner(metadata, FakeAdvisories::default())
            .scan(refs(&names))
            .await;

        let scanned: Vec<_> = results.iter().map(|r| r.reference.name.as_str()).collect();
        assert_eq!(scanned, names);
        assert!(results.iter().all(ScanResult::is_success));
    }

    #[tokio::test]
    async fn test_scan_keeps_duplicates() {
        let results = scanner(FakeMetadata::default(), FakeAdvisories::default())
            .scan(refs(&["react", "react"]))
            .await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.reference.name == "react"));
    }

    #[tokio::test]
    async fn test_scan_fills_metadata_and_vulnerabilities() {
        let metadata = FakeMetadata {
            deprecated: vec!["request".to_string()],
            ..FakeMetadata::default()
        };
        let mut advisories = FakeAdvisories::default();
        advisories.findings.insert(
            "lodash".to_string(),
            vec![
                Vulnerability::new("GHSA-1", "Prototype pollution", Severity::Critical),
                Vulnerability::new("GHSA-2", "ReDoS", Severity::Medium),
            ],
        );

        let results = scanner(metadata, advisories)
            .scan(refs(&["lodash", "request"]))
            .await;

        assert_eq!(results[0].vulnerabilities.len(), 2);
        assert_eq!(results[0].vulnerabilities[0].id, "GHSA-1");
        assert_eq!(results[0].license, "MIT");
        assert!(!results[0].deprecated);
        assert!(results[1].deprecated);
        assert!(results[1].vulnerabilities.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_task_is_isolated() {
        let metadata = FakeMetadata {
            panic_on: Some("bad".to_string()),
            ..FakeMetadata::default()
        };

        let results = scanner(metadata, FakeAdvisories::default())
            .scan(refs(&["good-1", "bad", "good-2"]))
            .await;

        assert_eq!(results[0].status, ScanStatus::Success);
        assert_eq!(results[2].status, ScanStatus::Success);
        assert_eq!(results[1].status, ScanStatus::Error);
        assert!(results[1].vulnerabilities.is_empty());
        assert_eq!(
            results[1].error_message.as_deref(),
            Some("registry exploded for bad")
        );
    }

    #[tokio::test]
    async fn test_advisory_failure_degrades_to_clean_success() {
        let advisories = FakeAdvisories {
            fail_on: Some("flaky".to_string()),
            ..FakeAdvisories::default()
        };

        let results = scanner(FakeMetadata::default(), advisories)
            .scan(refs(&["flaky"]))
            .await;

        assert_eq!(results[0].status, ScanStatus::Success);
        assert!(results[0].vulnerabilities.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_timeout_uses_defaults() {
        let mut metadata = FakeMetadata::default();
        metadata
            .latency
            .insert("slow".to_string(), Duration::from_millis(300));

        let results = scanner(metadata, FakeAdvisories::default())
            .with_fetch_timeout(Duration::from_millis(20))
            .scan(refs(&["slow"]))
            .await;

        assert_eq!(results[0].status, ScanStatus::Success);
        assert_eq!(results[0].license, UNKNOWN_LICENSE);
        assert!(!results[0].deprecated);
    }

    #[tokio::test]
    async fn test_empty_name_settles_as_invalid_reference() {
        let references = vec![
            PackageReference::latest("react"),
            PackageReference::latest(""),
        ];

        let results = scanner(FakeMetadata::default(), FakeAdvisories::default())
            .scan(references)
            .await;

        assert_eq!(results[0].status, ScanStatus::Success);
        assert_eq!(results[1].status, ScanStatus::Error);
        assert!(results[1]
            .error_message
            .as_deref()
            .unwrap()
            .contains("invalid package reference"));
    }

    #[tokio::test]
    async fn test_abort_leaves_no_pending_slots() {
        let mut metadata = FakeMetadata::default();
        metadata
            .latency
            .insert("hang".to_string(), Duration::from_secs(30));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let results = scanner(metadata, FakeAdvisories::default())
            .scan_with(refs(&["fast", "hang"]), cancel, &NoopObserver)
            .await;

        assert!(results.iter().all(|r| r.status != ScanStatus::Pending));
        assert_eq!(results[0].status, ScanStatus::Success);
        assert_eq!(results[1].error_message.as_deref(), Some(ABORTED_MESSAGE));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_aborts_everything() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = scanner(FakeMetadata::default(), FakeAdvisories::default())
            .with_stagger(StaggerPolicy::linear(Duration::from_millis(50)))
            .scan_with(refs(&["a", "b", "c"]), cancel, &NoopObserver)
            .await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(ScanResult::is_error));
    }

    #[tokio::test]
    async fn test_stagger_delays_later_tasks() {
        let metadata = Arc::new(FakeMetadata::default());
        let scanner = Scanner::new(metadata.clone(), Arc::new(FakeAdvisories::default()))
            .with_stagger(StaggerPolicy::linear(Duration::from_millis(40)));

        scanner.scan(refs(&["a", "b", "c"])).await;

        let starts = metadata.starts.lock().unwrap();
        let start_of = |name: &str| starts.iter().find(|(n, _)| n == name).unwrap().1;
        assert!(start_of("c") - start_of("a") >= Duration::from_millis(70));
        assert!(start_of("b") - start_of("a") >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_observer_sees_every_slot_once() {
        let observer = RecordingObserver::default();
        let metadata = FakeMetadata {
            panic_on: Some("b".to_string()),
            ..FakeMetadata::default()
        };

        scanner(metadata, FakeAdvisories::default())
            .scan_with(refs(&["a", "b", "c"]), CancellationToken::new(), &observer)
            .await;

        assert_eq!(*observer.dispatched.lock().unwrap(), 3);
        let mut settled = observer.settled.lock().unwrap().clone();
        settled.sort_unstable();
        assert_eq!(settled, vec![0, 1, 2]);
    }

    #[test]
    fn test_task_failure_generic_message() {
        assert_eq!(
            ScanError::task_failed("").to_string(),
            ScanError::GENERIC_FAILURE
        );
    }

    #[test]
    fn test_from_config_builds_scanner() {
        let config = ScanConfig {
            stagger_ms: 5,
            ..ScanConfig::default()
        };
        let scanner = Scanner::from_config(&config).unwrap();
        assert_eq!(scanner.stagger.delay(2), Duration::from_millis(10));
        assert_eq!(scanner.ecosystem, "npm");
    }

    #[test]
    fn test_from_config_fetch_deadline_covers_retries() {
        let config = ScanConfig {
            fetch_timeout_secs: 3,
            max_retries: 2,
            ..ScanConfig::default()
        };
        let scanner = Scanner::from_config(&config).unwrap();
        // three 3s attempts plus 100ms and 200ms of backoff
        assert_eq!(scanner.fetch_timeout, Duration::from_millis(9_300));

        let no_retry = ScanConfig {
            fetch_timeout_secs: 3,
            max_retries: 0,
            ..ScanConfig::default()
        };
        let scanner = Scanner::from_config(&no_retry).unwrap();
        assert_eq!(scanner.fetch_timeout, Duration::from_secs(3));
    }
}
