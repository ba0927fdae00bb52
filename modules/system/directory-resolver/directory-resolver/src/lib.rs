//! Directory Resolver Module
//!
//! Resolves and searches identity-provider users held in an external
//! directory. Every directory call goes through the resilience policy
//! provider (retry + circuit breaker); failures are contained at the
//! client boundary.
//!
//! Provides the `DirectoryResolverClient` implementation consumed by the
//! identity provider's user store, and the `UserProfileService` built on it.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use domain::resilience::{CircuitState, ResiliencePolicyProvider};
pub use module::DirectoryResolver;
