//! Retry Policy (C7, §4.7): transient-failure classification shared by every
//! Source/Target client call site.

use std::collections::HashSet;

/// A coarse classification of a failure, used in place of the wire-level
/// exception hierarchy the original system inspects (timeouts, connection
/// errors, chunked-encoding errors, etc.) - infrastructure maps its concrete
/// `reqwest`/`sqlx` errors onto this set at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableKind {
    Timeout,
    ConnectionError,
    HttpError,
    ChunkedEncodingError,
    TooManyRedirects,
    PoolTimeout,
    ProtocolError,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: f64,
    pub backoff_factor: f64,
    pub retry_status_codes: HashSet<u16>,
    pub retry_kinds: HashSet<RetryableKindDiscriminant>,
}

/// `RetryableKind` has no meaningful payload, but deriving `Hash` on an enum
/// with closures elsewhere in this crate is awkward; keep a plain
/// discriminant set instead of re-deriving Hash piecemeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryableKindDiscriminant {
    Timeout,
    ConnectionError,
    HttpError,
    ChunkedEncodingError,
    TooManyRedirects,
    PoolTimeout,
    ProtocolError,
}

impl From<RetryableKind> for RetryableKindDiscriminant {
    fn from(kind: RetryableKind) -> Self {
        match kind {
            RetryableKind::Timeout => Self::Timeout,
            RetryableKind::ConnectionError => Self::ConnectionError,
            RetryableKind::HttpError => Self::HttpError,
            RetryableKind::ChunkedEncodingError => Self::ChunkedEncodingError,
            RetryableKind::TooManyRedirects => Self::TooManyRedirects,
            RetryableKind::PoolTimeout => Self::PoolTimeout,
            RetryableKind::ProtocolError => Self::ProtocolError,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: 1.0,
            backoff_factor: 2.0,
            retry_status_codes: [429, 500, 502, 503, 504].into_iter().collect(),
            retry_kinds: [
                RetryableKindDiscriminant::Timeout,
                RetryableKindDiscriminant::ConnectionError,
                RetryableKindDiscriminant::HttpError,
                RetryableKindDiscriminant::ChunkedEncodingError,
                RetryableKindDiscriminant::TooManyRedirects,
                RetryableKindDiscriminant::PoolTimeout,
                RetryableKindDiscriminant::ProtocolError,
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: f64, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            initial_delay,
            backoff_factor,
            ..Default::default()
        }
    }

    /// Adds an application-specific retryable kind to the default set.
    pub fn with_extra_kind(mut self, kind: RetryableKind) -> Self {
        self.retry_kinds.insert(kind.into());
        self
    }

    /// §4.7: `attempt < max_retries` AND (status code retryable OR kind retryable).
    pub fn should_retry(&self, attempt: u32, kind: Option<RetryableKind>, status_code: Option<u16>) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        let status_retryable = status_code.is_some_and(|code| self.retry_status_codes.contains(&code));
        let kind_retryable = kind.is_some_and(|k| self.retry_kinds.contains(&k.into()));
        status_retryable || kind_retryable
    }

    /// §4.7: `delay(attempt) = initial_delay * backoff_factor^attempt`.
    pub fn delay(&self, attempt: u32) -> f64 {
        self.initial_delay * self.backoff_factor.powi(attempt as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scenario_d() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, 1.0);
        assert_eq!(policy.backoff_factor, 2.0);
        assert!(policy.retry_status_codes.contains(&429));
        assert!(policy.retry_status_codes.contains(&503));
    }

    #[test]
    fn should_retry_respects_attempt_ceiling() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0, None, Some(503)));
        assert!(policy.should_retry(2, None, Some(503)));
        assert!(!policy.should_retry(3, None, Some(503)));
    }

    #[test]
    fn should_retry_requires_retryable_cause() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(0, None, Some(404)));
        assert!(policy.should_retry(0, Some(RetryableKind::Timeout), None));
    }

    #[test]
    fn delay_follows_exponential_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), 1.0);
        assert_eq!(policy.delay(1), 2.0);
        assert_eq!(policy.delay(2), 4.0);
    }
}
