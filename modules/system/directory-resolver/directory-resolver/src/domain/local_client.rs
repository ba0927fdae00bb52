//! Local (in-process) client for the directory resolver.

use std::sync::Arc;

use async_trait::async_trait;
use directory_resolver_sdk::{DirectoryResolverClient, ResolvedUser};

use super::{DomainError, Service};

/// Local client wrapping the service.
///
/// Every failure is contained here: lookups degrade to `None` and searches to
/// an empty list, so an unavailable directory looks exactly like an unknown
/// user to the identity provider.
pub struct DirectoryResolverLocalClient {
    svc: Arc<Service>,
}

impl DirectoryResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_degraded(op: &str, e: &DomainError) {
    match e {
        DomainError::InvalidSubjectId(_) => {
            tracing::warn!(operation = op, error = %e, "rejected directory request");
        }
        DomainError::Directory(_) => {
            tracing::warn!(operation = op, error = %e, "directory_resolver call failed, degrading");
        }
    }
}

#[async_trait]
impl DirectoryResolverClient for DirectoryResolverLocalClient {
    async fn find_by_subject_id(&self, subject_id: &str) -> Option<ResolvedUser> {
        self.svc
            .find_by_subject_id(subject_id, None)
            .await
            .unwrap_or_else(|e| {
                log_degraded("find_by_subject_id", &e);
                None
            })
    }

    async fn search_users(&self, query_text: &str) -> Vec<ResolvedUser> {
        self.svc
            .search_users(query_text, None)
            .await
            .unwrap_or_else(|e| {
                log_degraded("search_users", &e);
                Vec::new()
            })
    }
}
