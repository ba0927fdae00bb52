//! Public API trait for the directory resolver.
//!
//! This trait defines the interface the identity provider's user store uses
//! to look up and search users held in the external directory.

use async_trait::async_trait;

use crate::models::ResolvedUser;

/// Public API trait for the directory resolver.
///
/// Neither method returns an error. Directory failures (timeouts, an open
/// circuit, rejected binds) are absorbed by the implementation:
///
/// - `find_by_subject_id` answers `None`, exactly as for an unknown user
/// - `search_users` answers an empty list
///
/// Callers therefore cannot observe whether the directory is reachable.
#[async_trait]
pub trait DirectoryResolverClient: Send + Sync {
    /// Resolve a user by its domain-qualified subject identifier
    /// (`DOMAIN\username`).
    async fn find_by_subject_id(&self, subject_id: &str) -> Option<ResolvedUser>;

    /// Search users whose first name, last name or `first.last` login starts
    /// with `query_text`.
    async fn search_users(&self, query_text: &str) -> Vec<ResolvedUser>;
}
