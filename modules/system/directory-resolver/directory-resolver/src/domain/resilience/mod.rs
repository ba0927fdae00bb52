//! Resilience policy provider: retry + circuit breaker around directory calls.
//!
//! One provider instance guards every call a resolver process makes, so the
//! breaker state reflects the health of the directory as a whole.

mod breaker;
mod retry;

use std::future::Future;

use directory_resolver_sdk::DirectoryResolverError;
use tracing::debug;

use crate::config::ResilienceConfig;

pub use breaker::{Admission, CircuitBreaker, CircuitState};
pub use retry::RetryPolicy;

/// Owns the retry and circuit-breaker policies.
///
/// The breaker wraps the retried call: a call counts once toward the failure
/// threshold, after its retries are exhausted. The HalfOpen trial is a single
/// attempt.
#[derive(Debug)]
pub struct ResiliencePolicyProvider {
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl ResiliencePolicyProvider {
    #[must_use]
    pub fn new(config: &ResilienceConfig) -> Self {
        Self {
            retry: RetryPolicy::new(&config.retry),
            breaker: CircuitBreaker::new(&config.circuit_breaker),
        }
    }

    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.breaker.consecutive_failures()
    }

    /// Run `operation` under both policies.
    ///
    /// `operation` is invoked once per attempt; it is never invoked while the
    /// circuit is open.
    ///
    /// # Errors
    ///
    /// - `CircuitOpen` if the breaker refused the call
    /// - the operation's own error once it is permanent or retries are exhausted
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, DirectoryResolverError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DirectoryResolverError>>,
    {
        let operation = &mut operation;
        self.breaker
            .call(|admission| async move {
                let mut attempt: u32 = 0;
                loop {
                    match operation().await {
                        Ok(value) => return Ok(value),
                        Err(error)
                            if admission == Admission::Regular
                                && self.retry.should_retry(&error, attempt) =>
                        {
                            attempt += 1;
                            debug!(
                                attempt,
                                max_retries = self.retry.max_retries(),
                                delay = ?self.retry.delay(),
                                error = %error,
                                "retrying directory call after transient failure"
                            );
                            tokio::time::sleep(self.retry.delay()).await;
                        }
                        Err(error) => return Err(error),
                    }
                }
            })
            .await
    }
}
