//! HTTP transport seam.
//!
//! Adapters only see [`Transport`]; the production implementation is
//! [`HttpTransport`], tests substitute in-memory fakes.

mod http;

use std::time::Duration;

use async_trait::async_trait;

pub use self::http::HttpTransport;

/// A single GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl FetchRequest {
    #[must_use]
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// URL without its query string, safe to log. API keys travel as query
    /// params on some sources.
    #[must_use]
    pub fn display_url(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(base, _)| base)
    }

    /// Value of the first header named `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    /// Response received with a non-2xx status.
    HttpError(u16),
    /// No response: connect failure, TLS error, timeout, unreadable body.
    NetworkError(String),
}

/// What came back from one fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFetchResult {
    pub status: FetchStatus,
    pub body: String,
    pub content_type: Option<String>,
}

impl RawFetchResult {
    #[must_use]
    pub fn success(body: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            status: FetchStatus::Success,
            body: body.into(),
            content_type: content_type.map(str::to_owned),
        }
    }

    #[must_use]
    pub fn http_error(code: u16, body: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::HttpError(code),
            body: body.into(),
            content_type: None,
        }
    }

    #[must_use]
    pub fn network_error(message: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::NetworkError(message.into()),
            body: String::new(),
            content_type: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }
}

/// Fetch capability consumed by the source adapters.
///
/// Implementations must return within `request.timeout` (plus any explicit
/// retry policy) and must never panic on network failures.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> RawFetchResult;
}
