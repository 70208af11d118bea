//! Retry policy and transient-failure classification for completion calls.

use std::time::Duration;

use strum::Display;

use super::ProviderError;

/// Maximum number of retry attempts for transient API errors.
pub const MAX_RETRIES: u32 = 3;

/// Initial backoff delay between retries.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(2);

/// Maximum backoff delay between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Exponential backoff schedule for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Retries without waiting. Used by tests.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff)
    }

    /// Whether a failure on retry number `attempt` should be retried.
    pub fn should_retry(&self, err: &ProviderError, attempt: u32) -> bool {
        attempt < self.max_retries && Transient::classify(err).is_some()
    }
}

/// Kinds of failure that are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Transient {
    #[strum(to_string = "rate limited")]
    RateLimited,
    #[strum(to_string = "service unavailable")]
    Unavailable,
    #[strum(to_string = "endpoint overloaded")]
    Overloaded,
    #[strum(to_string = "gateway error")]
    Gateway,
    #[strum(to_string = "request timed out")]
    Timeout,
    #[strum(to_string = "connection error")]
    Connection,
    #[strum(to_string = "temporary error")]
    Temporary,
}

/// Lowercase markers per kind, checked in order.
const MARKERS: &[(Transient, &[&str])] = &[
    (Transient::RateLimited, &["429", "rate limit", "too many requests"]),
    (Transient::Unavailable, &["503", "service unavailable"]),
    (Transient::Overloaded, &["529", "overloaded"]),
    (Transient::Gateway, &["502", "bad gateway"]),
    (Transient::Timeout, &["timeout", "timed out"]),
    (Transient::Connection, &["connection"]),
    (Transient::Temporary, &["temporarily", "try again"]),
];

impl Transient {
    /// Classify an error message. Configuration errors are never transient.
    pub fn classify(err: &ProviderError) -> Option<Self> {
        let ProviderError::ApiError(message) = err else {
            return None;
        };
        let message = message.to_lowercase();
        MARKERS
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| message.contains(n)))
            .map(|(kind, _)| *kind)
    }
}
