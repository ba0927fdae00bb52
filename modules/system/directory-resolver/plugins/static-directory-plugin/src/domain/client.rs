//! `DirectoryConnector` implementation for the static directory plugin.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use directory_resolver_sdk::{
    DirectoryConnection, DirectoryConnector, DirectoryEntry, DirectoryResolverError,
    SearchRequest,
};

use super::service::{self, Service};

#[async_trait]
impl DirectoryConnector for Service {
    async fn acquire(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryResolverError> {
        let entries = self.snapshot();
        self.open_connections.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(entries = entries.len(), "static directory connection acquired");

        Ok(Box::new(StaticConnection {
            entries,
            _open: OpenGuard(Arc::clone(&self.open_connections)),
        }))
    }
}

/// Connection over a fixed snapshot of the directory.
pub struct StaticConnection {
    entries: Arc<Vec<DirectoryEntry>>,
    _open: OpenGuard,
}

#[async_trait]
impl DirectoryConnection for StaticConnection {
    async fn search(
        &mut self,
        request: &SearchRequest,
    ) -> Result<Vec<DirectoryEntry>, DirectoryResolverError> {
        let found = service::search(&self.entries, request);
        tracing::debug!(
            base_dn = %request.base_dn,
            found = found.len(),
            "static directory search"
        );
        Ok(found)
    }

    async fn release(self: Box<Self>) {}
}

struct OpenGuard(Arc<AtomicUsize>);

impl Drop for OpenGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{StaticDirectoryPluginConfig, StaticUser};
    use directory_resolver_sdk::Filter;

    fn service() -> Service {
        Service::from_config(&StaticDirectoryPluginConfig {
            users: vec![StaticUser::new("test", "user")],
            ..StaticDirectoryPluginConfig::default()
        })
    }

    #[tokio::test]
    async fn connection_sees_snapshot_taken_at_acquire() {
        let svc = service();
        let mut conn = svc.acquire().await.unwrap();
        svc.remove_entry("cn=test.user,dc=example,dc=org");

        let request = SearchRequest {
            base_dn: "dc=example,dc=org".to_owned(),
            filter: Filter::equals("cn", "test.user"),
            attributes: vec![],
            size_limit: 10,
        };
        assert_eq!(conn.search(&request).await.unwrap().len(), 1);
        conn.release().await;

        let mut conn = svc.acquire().await.unwrap();
        assert!(conn.search(&request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_connections_tracks_release_and_drop() {
        let svc = service();
        let first = svc.acquire().await.unwrap();
        let second = svc.acquire().await.unwrap();
        assert_eq!(svc.open_connections(), 2);

        first.release().await;
        assert_eq!(svc.open_connections(), 1);

        drop(second);
        assert_eq!(svc.open_connections(), 0);
        assert_eq!(svc.acquisitions(), 2);
    }
}
