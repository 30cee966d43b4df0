//! Retry policy for reconciliation attempts.
//!
//! Only "not provisioned yet" is worth another attempt. The budget is an
//! attempt count, not elapsed time: changing the delay changes how long a
//! timeout takes to arrive.

use std::time::Duration;

use super::attempt::AttemptOutcome;
use crate::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, ReconcileConfig};

/// What to do after an attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule another attempt after `delay`.
    Retry { delay: Duration },
    /// Budget used up while the account was still missing.
    Exhausted,
    /// Terminal outcome; no more attempts.
    Stop,
}

/// Fixed-interval retry policy with an attempt ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    max_attempts: u32,
    retry_delay: Duration,
}

impl AttemptPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Whether another attempt should follow `attempts_made` attempts ending in `outcome`.
    pub fn should_retry(&self, outcome: &AttemptOutcome, attempts_made: u32) -> bool {
        outcome.is_not_yet_provisioned() && attempts_made < self.max_attempts
    }

    pub fn decide(&self, outcome: &AttemptOutcome, attempts_made: u32) -> RetryDecision {
        if self.should_retry(outcome, attempts_made) {
            RetryDecision::Retry {
                delay: self.retry_delay,
            }
        } else if outcome.is_not_yet_provisioned() {
            RetryDecision::Exhausted
        } else {
            RetryDecision::Stop
        }
    }
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> AttemptOutcome {
        AttemptOutcome::HardFailure {
            message: "boom".into(),
        }
    }

    #[test]
    fn retries_not_provisioned_below_ceiling() {
        let policy = AttemptPolicy::default();
        for attempts in 1..20 {
            assert!(policy.should_retry(&AttemptOutcome::NotYetProvisioned, attempts));
        }
        assert!(!policy.should_retry(&AttemptOutcome::NotYetProvisioned, 20));
    }

    #[test]
    fn never_retries_hard_failure() {
        let policy = AttemptPolicy::default();
        assert!(!policy.should_retry(&failure(), 1));
        assert_eq!(policy.decide(&failure(), 1), RetryDecision::Stop);
    }

    #[test]
    fn decide_reports_exhaustion() {
        let policy = AttemptPolicy::default();
        assert_eq!(
            policy.decide(&AttemptOutcome::NotYetProvisioned, 19),
            RetryDecision::Retry {
                delay: Duration::from_millis(500)
            }
        );
        assert_eq!(
            policy.decide(&AttemptOutcome::NotYetProvisioned, 20),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn zero_budget_clamped() {
        let policy = AttemptPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(
            policy.decide(&AttemptOutcome::NotYetProvisioned, 1),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn built_from_config() {
        let config = ReconcileConfig {
            max_attempts: 3,
            retry_delay: Duration::from_millis(10),
            ..Default::default()
        };
        let policy = AttemptPolicy::from_config(&config);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.retry_delay(), Duration::from_millis(10));
    }
}
