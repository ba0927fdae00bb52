//! Retry policy for transient directory failures.

use std::time::Duration;

use directory_resolver_sdk::DirectoryResolverError;

use crate::config::RetryConfig;

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: config.delay,
        }
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a call that failed with `error` on zero-based `attempt`
    /// should be attempted again.
    #[must_use]
    pub fn should_retry(&self, error: &DirectoryResolverError, attempt: u32) -> bool {
        error.is_transient() && attempt < self.max_retries
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn retries_transient_errors_up_to_bound() {
        let policy = RetryPolicy::new(&RetryConfig {
            max_retries: 2,
            delay: Duration::from_millis(10),
        });
        let err = DirectoryResolverError::Connection("refused".to_owned());

        assert!(policy.should_retry(&err, 0));
        assert!(policy.should_retry(&err, 1));
        assert!(!policy.should_retry(&err, 2));
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let policy = RetryPolicy::new(&RetryConfig::default());

        for err in [
            DirectoryResolverError::BindRejected("rc=49".to_owned()),
            DirectoryResolverError::Misconfigured("empty host".to_owned()),
            DirectoryResolverError::Query("rc=1".to_owned()),
            DirectoryResolverError::CircuitOpen,
        ] {
            assert!(!policy.should_retry(&err, 0), "{err} must not be retried");
        }
    }
}
