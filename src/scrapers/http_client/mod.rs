//! HTTP transport with retry on transient failures.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use super::error::TransportError;
use super::Transport;

/// Base delay for exponential retry backoff.
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

/// HTTP client used for both the bootstrap fetch and page requests.
///
/// Keeps a cookie store so session cookies set by the landing page are
/// replayed on the listing endpoint. Retries never come sooner than the
/// configured request delay.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
    max_retries: u32,
    retry_base: Duration,
}

impl HttpClient {
    /// Create a client.
    /// - None: default user agent
    /// - Some("impersonate"): random real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(
        user_agent_config: Option<&str>,
        timeout: Duration,
        request_delay: Duration,
        max_retries: u32,
    ) -> Result<Self, TransportError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            request_delay,
            max_retries,
            retry_base: RETRY_BASE_DELAY,
        })
    }

    #[cfg(test)]
    fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    /// Delay before retry number `attempt + 1`, floored at the request delay.
    fn retry_delay(&self, attempt: u32) -> Duration {
        backoff_delay(self.retry_base.max(self.request_delay), attempt)
    }

    /// Send a request, retrying retryable failures with exponential backoff.
    async fn send<F>(&self, url: &str, build: F) -> Result<String, TransportError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            match self.send_once(url, &build).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_delay(attempt);
                    attempt += 1;
                    warn!(
                        url,
                        attempt,
                        max_retries = self.max_retries,
                        "Retrying after {:?}: {}",
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<F>(&self, url: &str, build: &F) -> Result<String, TransportError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = build(&self.client).send().await?;
        let status = response.status();
        debug!(url, status = status.as_u16(), "Response received");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        self.send(url, |client| client.get(url)).await
    }

    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
        referer: Option<&str>,
    ) -> Result<String, TransportError> {
        self.send(url, |client| {
            let mut request = client.post(url).form(fields);
            if let Some(referer) = referer {
                request = request.header(reqwest::header::REFERER, referer);
            }
            request
        })
        .await
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.min(16)))
}
