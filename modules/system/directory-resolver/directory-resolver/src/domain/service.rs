//! Directory resolver service.

use std::sync::Arc;

use directory_resolver_sdk::{
    DirectoryConnector, DirectoryEntry, DirectoryResolverError, DirectorySettings, ResolvedUser,
    SearchRequest, SubjectId,
};
use tokio::time::Instant;
use tracing::debug;

use super::mapper::EntryMapper;
use super::query::QueryBuilder;
use super::resilience::{CircuitState, ResiliencePolicyProvider};
use super::DomainError;
use crate::config::DirectoryResolverConfig;

/// Resolves users through a connection provider guarded by the resilience
/// policies.
///
/// Holds no call-spanning mutable state of its own; the only shared state is
/// the circuit breaker inside the policy provider.
pub struct Service {
    connector: Arc<dyn DirectoryConnector>,
    policies: Arc<ResiliencePolicyProvider>,
    queries: QueryBuilder,
    mapper: EntryMapper,
}

impl Service {
    #[must_use]
    pub fn new(
        connector: Arc<dyn DirectoryConnector>,
        policies: Arc<ResiliencePolicyProvider>,
        settings: &DirectorySettings,
        cfg: &DirectoryResolverConfig,
    ) -> Self {
        Self {
            connector,
            policies,
            queries: QueryBuilder::new(settings, cfg),
            mapper: EntryMapper::new(settings, cfg),
        }
    }

    /// Look up a subject (`DOMAIN\username`).
    ///
    /// Returns `Ok(None)` when no entry matches, or without a directory call
    /// when the identifier names a domain other than this directory's
    /// (compared case-insensitively). A bare login carries no domain.
    ///
    /// # Errors
    ///
    /// - `InvalidSubjectId` if the identifier has no username
    /// - `Directory` if the directory call failed
    pub async fn find_by_subject_id(
        &self,
        subject_id: &str,
        deadline: Option<Instant>,
    ) -> Result<Option<ResolvedUser>, DomainError> {
        let subject: SubjectId = subject_id.parse()?;
        if let Some(domain) = &subject.domain {
            if !domain.eq_ignore_ascii_case(self.mapper.domain()) {
                debug!(subject = %subject, "subject belongs to another domain");
                return Ok(None);
            }
        }
        let request = self.queries.find_subject(&subject.username);

        let entries = self.run(&request, deadline).await?;
        debug!(subject = %subject, matches = entries.len(), "subject lookup finished");

        Ok(entries.first().map(|entry| self.mapper.map(entry)))
    }

    /// Search users by first name, last name or `first.last` prefix.
    ///
    /// Blank query text matches nothing and does not reach the directory.
    ///
    /// # Errors
    ///
    /// `Directory` if the directory call failed.
    pub async fn search_users(
        &self,
        query_text: &str,
        deadline: Option<Instant>,
    ) -> Result<Vec<ResolvedUser>, DomainError> {
        let text = query_text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let request = self.queries.search_users(text);

        let entries = self.run(&request, deadline).await?;
        debug!(query = text, matches = entries.len(), "user search finished");

        Ok(entries.iter().map(|entry| self.mapper.map(entry)).collect())
    }

    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.policies.circuit_state()
    }

    /// One resilient search: each attempt acquires its own connection and
    /// releases it before returning.
    async fn run(
        &self,
        request: &SearchRequest,
        deadline: Option<Instant>,
    ) -> Result<Vec<DirectoryEntry>, DirectoryResolverError> {
        self.policies
            .execute(|| {
                let connector = Arc::clone(&self.connector);
                let request = request.clone();
                async move {
                    let attempt = search_once(connector, request);
                    match deadline {
                        Some(deadline) => tokio::time::timeout_at(deadline, attempt)
                            .await
                            .unwrap_or_else(|_| {
                                Err(DirectoryResolverError::Timeout(
                                    "caller deadline elapsed".to_owned(),
                                ))
                            }),
                        None => attempt.await,
                    }
                }
            })
            .await
    }
}

async fn search_once(
    connector: Arc<dyn DirectoryConnector>,
    request: SearchRequest,
) -> Result<Vec<DirectoryEntry>, DirectoryResolverError> {
    let mut connection = connector.acquire().await?;
    let result = connection.search(&request).await;
    connection.release().await;
    result
}
