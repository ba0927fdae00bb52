//! LDAP connection provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use directory_resolver_sdk::{
    DirectoryConnection, DirectoryConnector, DirectoryEntry, DirectoryResolverError,
    DirectorySettings, SearchRequest,
};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry, SearchOptions};
use secrecy::ExposeSecret;

use super::filter::render_filter;

const RC_SUCCESS: u32 = 0;
const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;
const RC_NO_SUCH_OBJECT: u32 = 32;
const RC_INVALID_CREDENTIALS: u32 = 49;
const RC_INSUFFICIENT_ACCESS: u32 = 50;

/// Opens one bound LDAP session per resolver call.
#[derive(Debug, Clone)]
pub struct LdapConnectionProvider {
    settings: Arc<DirectorySettings>,
}

impl LdapConnectionProvider {
    #[must_use]
    pub fn new(settings: Arc<DirectorySettings>) -> Self {
        Self { settings }
    }

    async fn connect_and_bind(&self, url: &str) -> Result<Ldap, DirectoryResolverError> {
        let conn_settings = LdapConnSettings::new().set_conn_timeout(self.settings.connect_timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(conn_settings, url)
            .await
            .map_err(|e| map_connect_error(url, &e))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::debug!(error = %e, "LDAP connection driver stopped");
            }
        });

        // An empty name and password is an anonymous simple bind.
        let result = ldap
            .simple_bind(
                &self.settings.username,
                self.settings.password.expose_secret(),
            )
            .await
            .map_err(|e| map_connect_error(url, &e))?;

        match result.rc {
            RC_SUCCESS => Ok(ldap),
            RC_INVALID_CREDENTIALS | RC_INSUFFICIENT_ACCESS => {
                Err(DirectoryResolverError::BindRejected(format!(
                    "bind as '{}' rejected with code {}: {}",
                    self.settings.username, result.rc, result.text
                )))
            }
            rc => Err(DirectoryResolverError::Connection(format!(
                "bind to {url} failed with code {rc}: {}",
                result.text
            ))),
        }
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnectionProvider {
    #[tracing::instrument(skip_all, fields(host = %self.settings.host, port = self.settings.port))]
    async fn acquire(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryResolverError> {
        if self.settings.host.trim().is_empty() {
            return Err(DirectoryResolverError::Misconfigured(
                "directory host is not configured".to_owned(),
            ));
        }

        let url = self.settings.url();
        let connect_timeout = self.settings.connect_timeout;
        let ldap = tokio::time::timeout(connect_timeout, self.connect_and_bind(&url))
            .await
            .map_err(|_| {
                DirectoryResolverError::Timeout(format!(
                    "connecting to {url} exceeded {connect_timeout:?}"
                ))
            })??;

        tracing::debug!(url = %url, "LDAP session bound");

        Ok(Box::new(LdapScopedConnection {
            ldap,
            operation_timeout: self.settings.operation_timeout,
        }))
    }
}

/// A bound LDAP session owned by a single resolver call.
pub struct LdapScopedConnection {
    ldap: Ldap,
    operation_timeout: Duration,
}

#[async_trait]
impl DirectoryConnection for LdapScopedConnection {
    async fn search(
        &mut self,
        request: &SearchRequest,
    ) -> Result<Vec<DirectoryEntry>, DirectoryResolverError> {
        let filter = render_filter(&request.filter);
        let options =
            SearchOptions::new().sizelimit(i32::try_from(request.size_limit).unwrap_or(i32::MAX));

        tracing::debug!(base_dn = %request.base_dn, filter = %filter, "LDAP search");

        let search = self.ldap.with_search_options(options).search(
            &request.base_dn,
            Scope::Subtree,
            &filter,
            request.attributes.clone(),
        );
        let result = tokio::time::timeout(self.operation_timeout, search)
            .await
            .map_err(|_| {
                DirectoryResolverError::Timeout(format!(
                    "search exceeded {:?}",
                    self.operation_timeout
                ))
            })?
            .map_err(|e| map_search_error(&e))?;

        let ldap3::SearchResult(entries, status) = result;
        match status.rc {
            RC_SUCCESS => Ok(into_entries(entries)),
            RC_SIZE_LIMIT_EXCEEDED => {
                tracing::warn!(
                    size_limit = request.size_limit,
                    returned = entries.len(),
                    "LDAP size limit exceeded, returning partial results"
                );
                Ok(into_entries(entries))
            }
            RC_NO_SUCH_OBJECT => Ok(Vec::new()),
            rc => Err(DirectoryResolverError::Query(format!(
                "search failed with code {rc}: {}",
                status.text
            ))),
        }
    }

    async fn release(self: Box<Self>) {
        let mut this = self;
        match tokio::time::timeout(this.operation_timeout, this.ldap.unbind()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "LDAP unbind failed"),
            Err(_) => tracing::debug!("LDAP unbind timed out"),
        }
    }
}

fn into_entries(entries: Vec<ldap3::ResultEntry>) -> Vec<DirectoryEntry> {
    entries
        .into_iter()
        .map(SearchEntry::construct)
        .map(|entry| DirectoryEntry {
            dn: entry.dn,
            attributes: entry.attrs.into_iter().collect(),
        })
        .collect()
}

fn map_connect_error(url: &str, err: &LdapError) -> DirectoryResolverError {
    match err {
        LdapError::Timeout { .. } => {
            DirectoryResolverError::Timeout(format!("connecting to {url}: {err}"))
        }
        LdapError::UrlParsing { .. } => {
            DirectoryResolverError::Misconfigured(format!("invalid directory url {url}: {err}"))
        }
        _ => DirectoryResolverError::Connection(format!("{url}: {err}")),
    }
}

fn map_search_error(err: &LdapError) -> DirectoryResolverError {
    match err {
        LdapError::Timeout { .. } => DirectoryResolverError::Timeout(err.to_string()),
        LdapError::FilterParsing => DirectoryResolverError::Query(err.to_string()),
        _ => DirectoryResolverError::Connection(err.to_string()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn settings(host: &str, port: u16) -> Arc<DirectorySettings> {
        Arc::new(DirectorySettings {
            host: host.to_owned(),
            port,
            base_dn: "dc=example,dc=org".to_owned(),
            connect_timeout: Duration::from_secs(2),
            ..DirectorySettings::default()
        })
    }

    #[tokio::test]
    async fn empty_host_is_misconfigured() {
        let provider = LdapConnectionProvider::new(settings("  ", 389));
        let err = provider.acquire().await.err().unwrap();
        assert!(matches!(err, DirectoryResolverError::Misconfigured(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn closed_port_is_a_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider = LdapConnectionProvider::new(settings("127.0.0.1", port));
        let err = provider.acquire().await.err().unwrap();
        assert!(
            matches!(
                err,
                DirectoryResolverError::Connection(_) | DirectoryResolverError::Timeout(_)
            ),
            "unexpected error: {err}"
        );
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        // Accepts the TCP connection but never answers the bind.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let mut s = (*settings("127.0.0.1", port)).clone();
        s.connect_timeout = Duration::from_millis(200);
        let provider = LdapConnectionProvider::new(Arc::new(s));

        let err = provider.acquire().await.err().unwrap();
        assert!(matches!(err, DirectoryResolverError::Timeout(_)), "unexpected error: {err}");
    }
}
