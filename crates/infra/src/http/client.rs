//! Retrying HTTP client used by outbound integrations

use std::time::Duration;

use chatcal_domain::constants::{DEFAULT_ANALYZER_MAX_ATTEMPTS, DEFAULT_ANALYZER_TIMEOUT_SECS};
use chatcal_domain::{ChatCalError, Result};
use reqwest::{Client as ReqwestClient, Response, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::InfraError;

/// HTTP client with per-request timeout and retry on transient failures.
///
/// Server errors (5xx), timeouts and connection failures are retried with
/// exponential backoff; anything else is returned on the first attempt.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// POST `body` as JSON and require a 2xx response.
    ///
    /// # Errors
    /// `ChatCalError::Network` for transport failures and non-2xx statuses
    /// once retries are exhausted, `ChatCalError::Config` for a malformed URL
    /// and `ChatCalError::Internal` if the body cannot be serialized.
    pub async fn post_json<B>(&self, url: &str, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|err| ChatCalError::Internal(format!("failed to encode request body: {err}")))?;
        let url = Url::parse(url)
            .map_err(|err| ChatCalError::Config(format!("invalid URL '{url}': {err}")))?;

        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(attempt, %url, bytes = payload.len(), "sending HTTP request");

            let outcome = self
                .client
                .post(url.clone())
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload.clone())
                .send()
                .await;
            let retries_left = attempt < attempts;

            match outcome {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if status.is_server_error() && retries_left {
                        warn!(attempt, %url, %status, "server error, retrying");
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return response
                        .error_for_status()
                        .map_err(|err| ChatCalError::from(InfraError::from(err)));
                }
                Err(err) => {
                    if retries_left && should_retry_error(&err) {
                        warn!(attempt, %url, error = %err, "HTTP request failed, retrying");
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }
                    return Err(InfraError::from(err).into());
                }
            }
        }
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_ANALYZER_TIMEOUT_SECS),
            max_attempts: DEFAULT_ANALYZER_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(250),
            user_agent: concat!("chatcal/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(|err| ChatCalError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
