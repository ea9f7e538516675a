//! Retry policy with linear backoff.
//!
//! Attempt `n` (1-based) that fails with a retryable error is followed by a
//! wait of `n * backoff_unit`. With the defaults this is 500ms after the first
//! failure and 1000ms after the second, for three attempts in total.

use std::time::Duration;

use crate::domain::CachePolicy;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Linear backoff unit.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_policy(&CachePolicy::default())
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    #[must_use]
    pub const fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    /// Derives the policy from the pipeline limits.
    #[must_use]
    pub const fn from_policy(policy: &CachePolicy) -> Self {
        Self::new(policy.max_attempts, policy.backoff_unit)
    }

    /// A single attempt with no retries.
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay to wait after `attempt` (1-based) failed.
    #[must_use]
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt)
    }

    /// Returns true if another attempt is allowed after `attempt` (1-based).
    #[must_use]
    pub const fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_unit, Duration::from_millis(500));
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_after(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(1500));
    }

    #[test]
    fn test_attempt_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.has_attempts_left(1));
        assert!(policy.has_attempts_left(2));
        assert!(!policy.has_attempts_left(3));

        let single = RetryPolicy::single_attempt();
        assert!(!single.has_attempts_left(1));
    }
}
