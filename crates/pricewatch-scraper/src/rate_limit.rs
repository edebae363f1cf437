//! Opt-in retry policy for the HTTP transport.
//!
//! The default policy is a single attempt: a failed fetch is reported as a
//! transport failure for that product. When retries are configured, only
//! transient conditions (network errors, 429, 5xx) are retried, with
//! exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::transport::{FetchStatus, RawFetchResult};

/// Returns `true` if `result` represents a transient condition that may
/// succeed after a backoff delay.
///
/// - [`FetchStatus::NetworkError`]: connection reset, timeout, etc.
/// - HTTP 429: the server asked us to back off.
/// - HTTP 5xx: server-side trouble.
///
/// Everything else (2xx, 4xx other than 429) is final.
fn is_retriable(result: &RawFetchResult) -> bool {
    match result.status {
        FetchStatus::Success => false,
        FetchStatus::NetworkError(_) => true,
        FetchStatus::HttpError(code) => code == 429 || (500..=599).contains(&code),
    }
}

/// Runs `operation` once, then up to `max_retries` more times while the
/// result is transient, sleeping `backoff_base_secs * 2^attempt` seconds
/// before each retry (1 s, 2 s, 4 s, ... with a base of 1). The last result
/// is returned as-is.
pub(crate) async fn retry_with_backoff<F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> RawFetchResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RawFetchResult>,
{
    let mut attempt = 0u32;

    loop {
        let result = operation().await;
        if !is_retriable(&result) || attempt >= max_retries {
            return result;
        }

        // Cap the shift to prevent overflow on extreme configs.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            status = ?result.status,
            "transient fetch failure, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    async fn run_with(
        max_retries: u32,
        responses: Vec<RawFetchResult>,
    ) -> (RawFetchResult, u32) {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(max_retries, 0, || {
            let cc = Arc::clone(&cc);
            let responses = responses.clone();
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst) as usize;
                responses[n.min(responses.len() - 1)].clone()
            }
        })
        .await;
        (result, call_count.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let (result, calls) = run_with(3, vec![RawFetchResult::success("ok", None)]).await;
        assert!(result.is_success());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let (result, calls) = run_with(0, vec![RawFetchResult::network_error("reset")]).await;
        assert!(matches!(result.status, FetchStatus::NetworkError(_)));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let (result, calls) = run_with(
            3,
            vec![
                RawFetchResult::http_error(429, ""),
                RawFetchResult::http_error(503, ""),
                RawFetchResult::success("ok", None),
            ],
        )
        .await;
        assert!(result.is_success());
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn returns_last_failure_after_exhausting_retries() {
        let (result, calls) = run_with(2, vec![RawFetchResult::network_error("reset")]).await;
        // max_retries=2 → 3 total attempts
        assert_eq!(calls, 3);
        assert!(matches!(result.status, FetchStatus::NetworkError(_)));
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let (result, calls) = run_with(3, vec![RawFetchResult::http_error(404, "")]).await;
        assert_eq!(calls, 1);
        assert_eq!(result.status, FetchStatus::HttpError(404));
    }
}
