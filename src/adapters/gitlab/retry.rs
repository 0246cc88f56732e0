//! Bounded retry with exponential backoff for tracker calls.
//!
//! Retries on transient failures only: network errors, HTTP 429 and
//! 5xx. Client errors (4xx) fail immediately. The default policy is a
//! single retry, after which the caller degrades per the pipeline's
//! error policy.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::domain::errors::{EtlError, EtlResult};
use crate::domain::models::HttpConfig;

/// Retry policy applied to every outbound tracker call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// Execute `operation`, retrying transient failures with doubling
    /// backoff until `max_retries` is exhausted.
    pub async fn execute<F, Fut, T>(&self, context: &str, mut operation: F) -> EtlResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EtlResult<T>>,
    {
        let mut backoff_ms = self.initial_backoff_ms;
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && is_transient(&err) => {
                    warn!(
                        context,
                        attempt,
                        backoff_ms,
                        error = %err,
                        "transient tracker failure, retrying"
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(self.max_backoff_ms);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Whether an error is worth retrying.
fn is_transient(err: &EtlError) -> bool {
    match err {
        EtlError::TrackerRequest { .. } => true,
        EtlError::TrackerStatus { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn transient_error() -> EtlError {
        EtlError::TrackerStatus {
            status: 503,
            context: "test".to_string(),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn success_passes_through_without_retry() {
        let policy = RetryPolicy::new(2, 1, 4);
        let calls = AtomicU32::new(0);

        let result = policy
            .execute("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let policy = RetryPolicy::new(2, 1, 4);
        let calls = AtomicU32::new(0);

        let result = policy
            .execute("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(transient_error())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let policy = RetryPolicy::new(1, 1, 4);
        let calls = AtomicU32::new(0);

        let result: EtlResult<()> = policy
            .execute("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient_error()) }
            })
            .await;

        assert!(result.is_err());
        // One initial attempt plus one retry.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let policy = RetryPolicy::new(3, 1, 4);
        let calls = AtomicU32::new(0);

        let result: EtlResult<()> = policy
            .execute("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(EtlError::TrackerStatus {
                        status: 404,
                        context: "test".to_string(),
                        body: String::new(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
