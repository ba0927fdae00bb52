//! Directory resolver module.

use std::sync::Arc;

use directory_resolver_sdk::{DirectoryConnector, DirectoryResolverClient, DirectorySettings};
use tracing::info;

use crate::config::DirectoryResolverConfig;
use crate::domain::resilience::ResiliencePolicyProvider;
use crate::domain::{DirectoryResolverLocalClient, Service, UserProfileService};

/// Directory resolver module.
///
/// Wires a connection provider, the process-wide resilience policies and the
/// resolver service, and exposes the `DirectoryResolverClient` consumed by
/// the identity provider.
pub struct DirectoryResolver {
    service: Arc<Service>,
    client: Arc<dyn DirectoryResolverClient>,
}

impl DirectoryResolver {
    /// Initialize with a fresh resilience policy provider.
    #[must_use]
    pub fn init(
        settings: &DirectorySettings,
        cfg: &DirectoryResolverConfig,
        connector: Arc<dyn DirectoryConnector>,
    ) -> Self {
        let policies = Arc::new(ResiliencePolicyProvider::new(&cfg.resilience));
        Self::with_policies(settings, cfg, connector, policies)
    }

    /// Initialize with an existing policy provider, sharing its circuit state.
    #[must_use]
    #[tracing::instrument(skip_all, fields(base_dn = %settings.base_dn))]
    pub fn with_policies(
        settings: &DirectorySettings,
        cfg: &DirectoryResolverConfig,
        connector: Arc<dyn DirectoryConnector>,
        policies: Arc<ResiliencePolicyProvider>,
    ) -> Self {
        info!(
            user_object_class = %cfg.user_object_class,
            max_retries = cfg.resilience.retry.max_retries,
            failure_threshold = cfg.resilience.circuit_breaker.failure_threshold,
            cooldown = ?cfg.resilience.circuit_breaker.cooldown,
            "Initializing directory_resolver"
        );

        let svc = Arc::new(Service::new(connector, policies, settings, cfg));
        let client: Arc<dyn DirectoryResolverClient> =
            Arc::new(DirectoryResolverLocalClient::new(Arc::clone(&svc)));

        Self {
            service: svc,
            client,
        }
    }

    /// Client with the degrade-on-failure contract.
    #[must_use]
    pub fn client(&self) -> Arc<dyn DirectoryResolverClient> {
        Arc::clone(&self.client)
    }

    /// Underlying fallible service.
    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    #[must_use]
    pub fn profiles(&self) -> UserProfileService {
        UserProfileService::new(self.client())
    }
}
