//! `reqwest`-backed [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{FetchRequest, RawFetchResult, Transport};
use crate::error::TransportBuildError;
use crate::rate_limit::retry_with_backoff;

/// HTTP transport for price sources.
///
/// Each request carries its own timeout. Network errors, HTTP 429 and 5xx
/// responses are retried only when `max_retries > 0`; the default single
/// attempt keeps a failed fetch final for the run.
pub struct HttpTransport {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl HttpTransport {
    /// Creates a transport with a default `User-Agent` and retry policy.
    ///
    /// Requests may still override the `User-Agent` header.
    ///
    /// # Errors
    ///
    /// Returns [`TransportBuildError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, TransportBuildError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    async fn fetch_once(&self, request: &FetchRequest) -> RawFetchResult {
        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = if e.is_timeout() { "timeout" } else { "request failed" };
                // reqwest errors embed the full URL; keep query-string secrets out.
                return RawFetchResult::network_error(format!(
                    "{kind} for {}: {}",
                    request.display_url(),
                    e.without_url()
                ));
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return RawFetchResult::network_error(format!(
                    "failed to read body from {}: {}",
                    request.display_url(),
                    e.without_url()
                ));
            }
        };

        if !status.is_success() {
            return RawFetchResult::http_error(status.as_u16(), body);
        }

        RawFetchResult::success(body, content_type.as_deref())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> RawFetchResult {
        tracing::debug!(url = request.display_url(), "fetching");
        retry_with_backoff(self.max_retries, self.backoff_base_secs, move || {
            self.fetch_once(request)
        })
        .await
    }
}
