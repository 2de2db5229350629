//! Shared HTTP plumbing for the token minter and both pagers.

use crate::config::AuditConfig;
use crate::error::{ConfigurationError, FetchError};
use log::warn;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Bounded retry with exponential backoff.
///
/// Only connection failures, timeouts, HTTP 429 and HTTP 5xx are retried.
/// Any other response is returned to the caller untouched, so each pager
/// keeps its own policy for non-success statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every following retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    fn is_retryable_error(error: &reqwest::Error) -> bool {
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

/// HTTP client bound to one API root.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    api_base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Build a client with the timeout, user agent and retry policy of `config`.
    pub fn from_config(config: &AuditConfig) -> Result<Self, ConfigurationError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ConfigurationError::HttpClient)?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
        })
    }

    /// The underlying reqwest client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Absolute URL for a path below the API root.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Send a request, retrying transient failures.
    ///
    /// `endpoint` only labels log lines and errors.
    pub async fn send_with_retry(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<Response, FetchError> {
        let mut attempt = 0;

        loop {
            // Streaming bodies cannot be cloned; such requests get one attempt.
            let Some(current) = request.try_clone() else {
                return request
                    .send()
                    .await
                    .map_err(|e| FetchError::transport(endpoint, e));
            };

            let can_retry = attempt < self.retry.max_retries;

            match current.send().await {
                Ok(response) => {
                    let status = response.status();
                    if !(can_retry && RetryPolicy::is_retryable_status(status)) {
                        return Ok(response);
                    }
                    warn!(
                        "{} returned HTTP {}, retrying ({}/{})",
                        endpoint,
                        status,
                        attempt + 1,
                        self.retry.max_retries
                    );
                }
                Err(error) => {
                    if !(can_retry && RetryPolicy::is_retryable_error(&error)) {
                        return Err(FetchError::transport(endpoint, error));
                    }
                    warn!(
                        "Request to {} failed: {}, retrying ({}/{})",
                        endpoint,
                        error,
                        attempt + 1,
                        self.retry.max_retries
                    );
                }
            }

            attempt += 1;
            tokio::time::sleep(self.retry.delay_for(attempt)).await;
        }
    }
}
