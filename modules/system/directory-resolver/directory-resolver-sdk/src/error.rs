//! Error types for the directory resolver module.

use thiserror::Error;

/// Errors raised by directory connection providers and the resilience layer.
///
/// `Connection`, `BindRejected` and `Misconfigured` form the connection-error
/// family; only `Connection` is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryResolverError {
    /// Network-level failure while reaching the directory.
    #[error("directory connection failed: {0}")]
    Connection(String),

    /// The directory refused the configured bind credentials.
    #[error("directory bind rejected: {0}")]
    BindRejected(String),

    /// Connection settings cannot be used to reach a directory.
    #[error("directory misconfigured: {0}")]
    Misconfigured(String),

    /// The operation exceeded its deadline.
    #[error("directory operation timed out: {0}")]
    Timeout(String),

    /// The circuit breaker refused to attempt the call.
    #[error("directory circuit is open")]
    CircuitOpen,

    /// Malformed filter or unexpected directory response.
    #[error("directory query failed: {0}")]
    Query(String),
}

impl DirectoryResolverError {
    /// Whether retrying the same call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    /// Whether this error belongs to the connection-error family.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::BindRejected(_) | Self::Misconfigured(_)
        )
    }

    /// Whether this outcome counts as a failed attempt for the circuit breaker.
    ///
    /// A `Query` error means the directory answered, so it does not count.
    #[must_use]
    pub const fn trips_breaker(&self) -> bool {
        self.is_connection_error() || matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert!(DirectoryResolverError::Connection("refused".to_owned()).is_transient());
        assert!(DirectoryResolverError::Timeout("5s".to_owned()).is_transient());
        assert!(!DirectoryResolverError::BindRejected("rc=49".to_owned()).is_transient());
        assert!(!DirectoryResolverError::Misconfigured("empty host".to_owned()).is_transient());
        assert!(!DirectoryResolverError::CircuitOpen.is_transient());
        assert!(!DirectoryResolverError::Query("bad filter".to_owned()).is_transient());

        assert!(DirectoryResolverError::BindRejected("rc=49".to_owned()).is_connection_error());
        assert!(!DirectoryResolverError::Timeout("5s".to_owned()).is_connection_error());
    }

    #[test]
    fn breaker_counts_only_availability_failures() {
        assert!(DirectoryResolverError::Connection("refused".to_owned()).trips_breaker());
        assert!(DirectoryResolverError::Timeout("5s".to_owned()).trips_breaker());
        assert!(DirectoryResolverError::BindRejected("rc=49".to_owned()).trips_breaker());
        assert!(DirectoryResolverError::Misconfigured("empty host".to_owned()).trips_breaker());
        assert!(!DirectoryResolverError::CircuitOpen.trips_breaker());
        assert!(!DirectoryResolverError::Query("bad filter".to_owned()).trips_breaker());
    }
}
