//! Resilient HTTP fetch
//!
//! One request with a per-attempt deadline and a fixed number of retries
//! on transient failure. Cancellation is honored in addition to the
//! deadline and always fails immediately: it means the caller no longer
//! wants the result, not "try again".

use crate::error::{Result, ServiceError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry budget for one logical fetch.
///
/// Delay is constant across retries; the two named budgets below are the
/// observable contract and must stay distinct.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Per-attempt deadline.
    pub timeout: Duration,
    /// Wait between attempts.
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    /// Generic budget for well-behaved endpoints.
    fn default() -> Self {
        Self {
            max_retries: 2,
            timeout: Duration::from_secs(8),
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl FetchPolicy {
    /// Aggressive budget for the catalog search endpoint, which is less
    /// reliable than a well-behaved API and worth retrying harder.
    pub fn catalog_search() -> Self {
        Self {
            max_retries: 5,
            timeout: Duration::from_secs(5),
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Execute a request with the given retry policy.
///
/// Each attempt races the per-attempt deadline and the caller's
/// cancellation token. A transient failure (connect error, non-transport
/// send failure, deadline elapsed) is retried after `retry_delay` with
/// identical parameters until the budget is exhausted, then surfaced as
/// [`ServiceError::UpstreamUnavailable`] carrying the last error. The
/// retry wait itself is interruptible by cancellation.
pub async fn fetch_with_retry(
    request: reqwest::RequestBuilder,
    policy: FetchPolicy,
    cancel: &CancellationToken,
) -> Result<reqwest::Response> {
    let mut remaining = policy.max_retries;
    let mut attempts: u32 = 0;

    loop {
        let attempt = request
            .try_clone()
            .ok_or_else(|| ServiceError::BadUpstreamResponse {
                message: "request is not retryable (streaming body)".to_string(),
            })?;

        attempts += 1;

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
            outcome = tokio::time::timeout(policy.timeout, attempt.send()) => outcome,
        };

        let last_error = match outcome {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("attempt deadline of {:?} elapsed", policy.timeout),
        };

        // The send future can fail with a transport error as a side effect
        // of the caller tearing the connection down; classify by token, not
        // by the error itself.
        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        if remaining == 0 {
            return Err(ServiceError::UpstreamUnavailable {
                attempts,
                message: last_error,
            });
        }

        tracing::warn!(
            remaining,
            error = %last_error,
            "upstream attempt failed, retrying"
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
            _ = tokio::time::sleep(policy.retry_delay) => {}
        }

        remaining -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy(max_retries: u32) -> FetchPolicy {
        FetchPolicy {
            max_retries,
            timeout: Duration::from_secs(2),
            retry_delay: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let cancel = CancellationToken::new();
        let response = fetch_with_retry(
            client.get(format!("{}/ok", server.uri())),
            fast_policy(2),
            &cancel,
        )
        .await
        .unwrap();

        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_max_retries_2_makes_exactly_3_attempts() {
        // Every attempt trips the per-attempt deadline; the mock's expect(3)
        // verifies the server saw exactly 1 + 2 retries, no more.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .expect(3)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let cancel = CancellationToken::new();
        let policy = FetchPolicy {
            max_retries: 2,
            timeout: Duration::from_millis(50),
            retry_delay: Duration::from_millis(10),
        };
        let err = fetch_with_retry(
            client.get(format!("{}/slow", server.uri())),
            policy,
            &cancel,
        )
        .await
        .unwrap_err();

        match err {
            ServiceError::UpstreamUnavailable { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected UpstreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_external_cancellation_classified_as_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        // Deadline far beyond the cancellation point: the token must win
        // and classify the outcome as Cancelled, not UpstreamUnavailable.
        let policy = FetchPolicy {
            max_retries: 2,
            timeout: Duration::from_secs(60),
            retry_delay: Duration::from_millis(10),
        };
        let err = fetch_with_retry(client.get(server.uri()), policy, &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_cancellation_is_never_retried() {
        let uri = {
            let dead = MockServer::start().await;
            dead.uri()
        };

        let client = reqwest::Client::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = fetch_with_retry(client.get(format!("{uri}/x")), fast_policy(5), &cancel)
            .await
            .unwrap_err();

        assert!(err.is_cancelled(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failures() {
        // First two attempts hit a 1s delay that trips the 100ms deadline,
        // the third attempt gets a fast response.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(1)))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let cancel = CancellationToken::new();
        let policy = FetchPolicy {
            max_retries: 3,
            timeout: Duration::from_millis(100),
            retry_delay: Duration::from_millis(10),
        };

        let response = fetch_with_retry(client.get(server.uri()), policy, &cancel)
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}
