//! Bounded retry with exponential backoff for archive requests.

use reqwest::StatusCode;
use std::time::Duration;

/// Longest single pause between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Decides whether a failed request is tried again and how long to wait first.
///
/// The pause before retry `n` (1-based) is zero for the first retry and
/// `backoff_factor * 2^(n - 1)` seconds afterwards, capped at two minutes.
/// With the defaults (5 retries, factor 0.2) that is 0, 0.4, 0.8, 1.6 and 3.2 s.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    retries: u32,
    backoff_factor: f64,
    retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, 0.2, default_retry_statuses())
    }
}

pub(crate) fn default_retry_statuses() -> Vec<StatusCode> {
    vec![
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::BAD_GATEWAY,
        StatusCode::GATEWAY_TIMEOUT,
    ]
}

impl RetryPolicy {
    pub fn new(retries: u32, backoff_factor: f64, retry_statuses: Vec<StatusCode>) -> Self {
        Self {
            retries,
            backoff_factor: backoff_factor.max(0.0),
            retry_statuses,
        }
    }

    /// Number of retries after the first attempt.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Total attempts, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Connection failures and timeouts are worth retrying; malformed requests are not.
    pub fn is_retryable_error(&self, error: &reqwest::Error) -> bool {
        error.is_connect() || error.is_timeout()
    }

    /// A body that breaks off mid-read (reset, truncated or timed out) is retried like a
    /// failed connection.
    pub fn is_retryable_read_error(&self, error: &reqwest::Error) -> bool {
        error.is_body() || error.is_decode() || self.is_retryable_error(error)
    }

    /// Pause before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs >= MAX_BACKOFF.as_secs_f64() {
            return MAX_BACKOFF;
        }
        Duration::from_secs_f64(secs)
    }
}
