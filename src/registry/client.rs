//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry on rate limiting and transport errors
//! - JSON GET and POST helpers mapping failures onto [`RegistryError`]

use crate::error::RegistryError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("pkgscan/", env!("CARGO_PKG_VERSION"));

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client; `timeout` bounds each attempt, not the whole retry loop
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            timeout,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Longest a request can take with every retry and backoff sleep spent
    pub fn deadline(&self) -> Duration {
        self.timeout
            .saturating_mul(self.max_retries.saturating_add(1))
            .saturating_add(backoff_total(self.max_retries))
    }

    /// Perform a GET request and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self
            .send_with_retry(|| self.client.get(url), package, registry)
            .await?;
        decode_json(response, package, registry).await
    }

    /// Perform a POST request with a JSON body and decode the JSON response
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let response = self
            .send_with_retry(|| self.client.post(url).json(body), package, registry)
            .await?;
        decode_json(response, package, registry).await
    }

    /// Send a request, retrying on 429 and transport errors
    async fn send_with_retry<F>(
        &self,
        build: F,
        package: &str,
        registry: &str,
    ) -> Result<Response, RegistryError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match build().send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(RegistryError::rate_limit_exceeded(registry));
                    } else if status == StatusCode::NOT_FOUND {
                        return Err(RegistryError::package_not_found(package, registry));
                    } else if !status.is_success() {
                        return Err(RegistryError::network_error(
                            package,
                            registry,
                            format!("HTTP {}", status),
                        ));
                    } else {
                        return Ok(response);
                    }
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        RegistryError::timeout(package, registry)
                    } else {
                        RegistryError::network_error(package, registry, e.to_string())
                    });
                }
            }

            if attempt < self.max_retries {
                debug!(package, registry, attempt, delay_ms = delay, "retrying request");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay = delay.saturating_mul(2);
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::network_error(package, registry, "unknown error")))
    }
}

/// Sum of the backoff sleeps taken between `max_retries + 1` attempts
fn backoff_total(max_retries: u32) -> Duration {
    let mut total: u64 = 0;
    let mut delay = BASE_DELAY_MS;
    for _ in 0..max_retries {
        total = total.saturating_add(delay);
        delay = delay.saturating_mul(2);
    }
    Duration::from_millis(total)
}

async fn decode_json<T: DeserializeOwned>(
    response: Response,
    package: &str,
    registry: &str,
) -> Result<T, RegistryError> {
    response.json::<T>().await.map_err(|e| {
        RegistryError::invalid_response(package, registry, format!("failed to parse JSON: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_with_config() {
        let client = HttpClient::with_config(Duration::from_secs(60), "test-agent/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_max_retries() {
        let client = HttpClient::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
            .unwrap()
            .with_max_retries(5);
        assert_eq!(client.max_retries, 5);
    }

    #[test]
    fn test_backoff_total() {
        assert_eq!(backoff_total(0), Duration::ZERO);
        assert_eq!(backoff_total(1), Duration::from_millis(100));
        assert_eq!(backoff_total(3), Duration::from_millis(700));
        assert!(backoff_total(u32::MAX) > Duration::from_secs(1));
    }

    #[test]
    fn test_deadline_leaves_room_for_every_retry() {
        let client = HttpClient::with_config(Duration::from_secs(2), "test-agent/1.0")
            .unwrap()
            .with_max_retries(2);
        assert_eq!(client.deadline(), Duration::from_millis(6_300));

        let single = client.with_max_retries(0);
        assert_eq!(single.deadline(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(10));
        assert!(DEFAULT_USER_AGENT.starts_with("pkgscan/"));
        assert_eq!(DEFAULT_MAX_RETRIES, 2);
        assert_eq!(BASE_DELAY_MS, 100);
    }

    #[tokio::test]
    async fn test_unreachable_host_maps_to_network_error() {
        let client = HttpClient::with_config(Duration::from_secs(2), "test-agent/1.0")
            .unwrap()
            .with_max_retries(0);
        // Port 9 on localhost (discard) is closed in test environments
        let result: Result<serde_json::Value, _> = client
            .get_json("http://127.0.0.1:9/lodash", "lodash", "npm")
            .await;
        assert!(matches!(
            result,
            Err(RegistryError::NetworkError { .. }) | Err(RegistryError::Timeout { .. })
        ));
    }
}
