// /////////////////////////////////////////////////////////////////////////////
// Migration Engine
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `withRetry` composition (§9): wraps a Source/Target call with the domain
//! Retry Policy (C7) so every call site gets the same backoff behavior
//! instead of reimplementing it ad hoc.

use std::future::Future;
use std::time::Duration;

use migration_domain::retry::{RetryableKind, RetryPolicy};
use migration_domain::{MigrationError, MigrationResult};

/// Classifies a `MigrationError` the way infrastructure adapters map their
/// concrete `reqwest`/`sqlx` errors onto the domain's closed retry-kind set.
fn classify(err: &MigrationError) -> (Option<RetryableKind>, Option<u16>) {
    match err {
        MigrationError::TimeoutError(_) => (Some(RetryableKind::Timeout), None),
        MigrationError::IoError(_) => (Some(RetryableKind::ConnectionError), None),
        MigrationError::ResourceExhausted(_) => (Some(RetryableKind::PoolTimeout), None),
        _ => (None, None),
    }
}

/// Retries `operation` per `policy` (§4.7), sleeping `policy.delay(attempt)`
/// seconds between attempts. Returns the last error once retries are
/// exhausted.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, metrics: Option<&crate::infrastructure::metrics::MetricsService>, label: &str, mut operation: F) -> MigrationResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = MigrationResult<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let (kind, status) = classify(&err);
                if !policy.should_retry(attempt, kind, status) {
                    return Err(err);
                }
                if let Some(metrics) = metrics {
                    metrics.record_retry(label);
                }
                tracing::warn!(label, attempt, error = %err, "retrying after transient failure");
                tokio::time::sleep(Duration::from_secs_f64(policy.delay(attempt))).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy::new(3, 0.001, 1.0);
        let attempts = AtomicU32::new(0);
        let result = with_retry(&policy, None, "test_op", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(MigrationError::TimeoutError("slow".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_on_non_retryable_error() {
        let policy = RetryPolicy::default();
        let result: MigrationResult<()> = with_retry(&policy, None, "test_op", || async { Err(MigrationError::ValidationFailed("bad data".into())) }).await;
        assert!(result.is_err());
    }
}
