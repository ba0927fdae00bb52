//! Circuit breaker guarding directory calls.
//!
//! ```text
//! Closed   -> Open:     failure_threshold consecutive failed calls
//! Open     -> HalfOpen: cooldown elapsed, next call becomes the trial
//! HalfOpen -> Closed:   trial succeeded (failure counter reset)
//! HalfOpen -> Open:     trial failed or was abandoned (cooldown restarts)
//! ```

use std::future::Future;
use std::time::Duration;

use directory_resolver_sdk::DirectoryResolverError;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CircuitBreakerConfig;

/// How a call was let through the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed.
    Regular,
    /// The single HalfOpen trial.
    Trial,
}

/// Circuit state shared by every call through one breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

/// Consecutive-failure circuit breaker.
///
/// State lives behind a single mutex that is never held across an await.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold.max(1),
            cooldown: config.cooldown,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Current state. An open circuit whose cooldown elapsed still reports
    /// `Open` until the next call turns it into the trial.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    /// Run `operation` as one call under breaker protection. Its final
    /// outcome is recorded once.
    ///
    /// # Errors
    ///
    /// `CircuitOpen` without invoking `operation` while the circuit is open
    /// (or a trial is already in flight); otherwise the operation's own error.
    pub async fn call<T, F, Fut>(&self, operation: F) -> Result<T, DirectoryResolverError>
    where
        F: FnOnce(Admission) -> Fut,
        Fut: Future<Output = Result<T, DirectoryResolverError>>,
    {
        let permit = self.admit()?;
        let admission = if permit.trial {
            Admission::Trial
        } else {
            Admission::Regular
        };
        let outcome = operation(admission).await;
        permit.settle(outcome.as_ref().err());
        outcome
    }

    fn admit(&self) -> Result<Permit<'_>, DirectoryResolverError> {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Ok(Permit::new(self, false)),
            CircuitState::Open => {
                let cooled_down = inner
                    .opened_at
                    .is_none_or(|opened_at| opened_at.elapsed() >= self.cooldown);
                if !cooled_down {
                    debug!("directory circuit open, call short-circuited");
                    return Err(DirectoryResolverError::CircuitOpen);
                }
                inner.state = CircuitState::HalfOpen;
                inner.trial_in_flight = true;
                info!("directory circuit half-open, admitting trial call");
                Ok(Permit::new(self, true))
            }
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    debug!("directory circuit half-open with trial in flight, call short-circuited");
                    return Err(DirectoryResolverError::CircuitOpen);
                }
                inner.trial_in_flight = true;
                Ok(Permit::new(self, true))
            }
        }
    }

    fn record_success(&self, trial: bool) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => inner.consecutive_failures = 0,
            CircuitState::HalfOpen if trial => {
                inner.state = CircuitState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                inner.trial_in_flight = false;
                info!("directory circuit closed after successful trial call");
            }
            // Late results of calls admitted before the circuit opened
            // cannot close it; only the trial can.
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    fn record_failure(&self, trial: bool) {
        let mut inner = self.inner.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
        match inner.state {
            CircuitState::Closed if inner.consecutive_failures >= self.failure_threshold => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                warn!(
                    failures = inner.consecutive_failures,
                    cooldown = ?self.cooldown,
                    "directory circuit opened"
                );
            }
            CircuitState::HalfOpen if trial => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.trial_in_flight = false;
                warn!(
                    cooldown = ?self.cooldown,
                    "directory trial call failed, circuit re-opened"
                );
            }
            CircuitState::Closed | CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }
}

/// Admission ticket for a single attempt.
///
/// A trial permit dropped before it is settled (the caller abandoned the
/// attempt) counts as a failed trial.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            settled: false,
        }
    }

    fn settle(mut self, error: Option<&DirectoryResolverError>) {
        self.settled = true;
        match error {
            Some(e) if e.trips_breaker() => self.breaker.record_failure(self.trial),
            // The directory answered.
            _ => self.breaker.record_success(self.trial),
        }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.record_failure(true);
        }
    }
}
