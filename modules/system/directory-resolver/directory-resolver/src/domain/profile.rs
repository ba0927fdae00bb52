//! Profile service for the identity provider.
//!
//! Answers "which claims does this subject have" and "is this subject still
//! active" on top of any `DirectoryResolverClient`.

use std::sync::Arc;

use directory_resolver_sdk::{Claim, DirectoryResolverClient};
use tracing::debug;

/// User profile service backed by the directory resolver.
#[derive(Clone)]
pub struct UserProfileService {
    resolver: Arc<dyn DirectoryResolverClient>,
}

impl UserProfileService {
    #[must_use]
    pub fn new(resolver: Arc<dyn DirectoryResolverClient>) -> Self {
        Self { resolver }
    }

    /// Claims of `subject_id` whose type is in `requested_claim_types`,
    /// in record order.
    ///
    /// The directory is not queried when nothing is requested.
    pub async fn profile_claims(
        &self,
        subject_id: &str,
        requested_claim_types: &[String],
    ) -> Vec<Claim> {
        if requested_claim_types.is_empty() {
            return Vec::new();
        }

        let Some(user) = self.resolver.find_by_subject_id(subject_id).await else {
            debug!(subject = subject_id, "no profile for subject");
            return Vec::new();
        };

        let claims: Vec<Claim> = user
            .claims
            .into_iter()
            .filter(|claim| requested_claim_types.contains(&claim.claim_type))
            .collect();
        debug!(
            subject = subject_id,
            issued = claims.len(),
            "issued profile claims"
        );
        claims
    }

    /// A subject is active while the directory resolves it.
    pub async fn is_active(&self, subject_id: &str) -> bool {
        let active = self.resolver.find_by_subject_id(subject_id).await.is_some();
        debug!(subject = subject_id, active, "checked subject activity");
        active
    }
}
