//! Identity backend selection.
//!
//! `storage_provider` picks one configurator at startup. Every backend ends
//! up with a directory connection provider for user resolution; the stores
//! themselves only need their settings to be present here.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use directory_resolver_sdk::{DirectoryConnector, DirectorySettings};
use ldap_directory_plugin::LdapConnectionProvider;
use static_directory_plugin::Service as StaticDirectory;
use tracing::info;

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    CouchDb,
    SqlServer,
    InMemory,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown storage provider '{0}' (expected couchdb, sql_server or in_memory)")]
pub struct UnknownStorageProvider(String);

impl FromStr for StorageProvider {
    type Err = UnknownStorageProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        [Self::CouchDb, Self::SqlServer, Self::InMemory]
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownStorageProvider(s.to_owned()))
    }
}

impl StorageProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CouchDb => "couchdb",
            Self::SqlServer => "sql_server",
            Self::InMemory => "in_memory",
        }
    }
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory wiring produced by a backend.
pub struct IdentityBackend {
    pub provider: StorageProvider,
    pub settings: DirectorySettings,
    pub connector: Arc<dyn DirectoryConnector>,
}

pub trait IdentityBackendConfigurator: Send + Sync {
    /// Validate backend settings and wire the directory connection provider.
    ///
    /// # Errors
    ///
    /// Fails when settings the backend depends on are missing.
    fn configure(&self, config: &AppConfig) -> anyhow::Result<IdentityBackend>;
}

/// `couchdb`: documents in `CouchDB`, users in LDAP.
pub struct DocumentBackend;

/// `sql_server`: rows in SQL Server, users in LDAP.
pub struct RelationalBackend;

/// `in_memory`: everything from configuration.
pub struct InMemoryBackend;

impl IdentityBackendConfigurator for DocumentBackend {
    fn configure(&self, config: &AppConfig) -> anyhow::Result<IdentityBackend> {
        let store = config
            .couchdb
            .as_ref()
            .context("storage provider 'couchdb' requires a 'couchdb' section")?;
        info!(url = %store.url, database = %store.database, "using CouchDB document store");
        Ok(ldap_backend(StorageProvider::CouchDb, config))
    }
}

impl IdentityBackendConfigurator for RelationalBackend {
    fn configure(&self, config: &AppConfig) -> anyhow::Result<IdentityBackend> {
        let store = config
            .sql_server
            .as_ref()
            .context("storage provider 'sql_server' requires a 'sql_server' section")?;
        info!(
            host = %store.host,
            port = store.port,
            database = %store.database,
            "using SQL Server relational store"
        );
        Ok(ldap_backend(StorageProvider::SqlServer, config))
    }
}

impl IdentityBackendConfigurator for InMemoryBackend {
    fn configure(&self, config: &AppConfig) -> anyhow::Result<IdentityBackend> {
        let directory = StaticDirectory::from_config(&config.static_directory);
        info!(entries = directory.len(), "using in-memory store and directory");

        // Resolver searches must be scoped to the seeded tree.
        let mut settings = config.directory.clone();
        if settings.base_dn.is_empty() {
            settings.base_dn.clone_from(&config.static_directory.base_dn);
        }

        Ok(IdentityBackend {
            provider: StorageProvider::InMemory,
            settings,
            connector: Arc::new(directory),
        })
    }
}

fn ldap_backend(provider: StorageProvider, config: &AppConfig) -> IdentityBackend {
    let settings = config.directory.clone();
    IdentityBackend {
        provider,
        connector: Arc::new(LdapConnectionProvider::new(Arc::new(settings.clone()))),
        settings,
    }
}

#[must_use]
pub fn configurator_for(provider: StorageProvider) -> Box<dyn IdentityBackendConfigurator> {
    match provider {
        StorageProvider::CouchDb => Box::new(DocumentBackend),
        StorageProvider::SqlServer => Box::new(RelationalBackend),
        StorageProvider::InMemory => Box::new(InMemoryBackend),
    }
}

/// Select and configure the backend named by `storage_provider`.
///
/// # Errors
///
/// Fails on an unknown provider or missing backend settings.
pub fn select(config: &AppConfig) -> anyhow::Result<IdentityBackend> {
    let provider: StorageProvider = config.storage_provider.parse()?;
    configurator_for(provider)
        .configure(config)
        .with_context(|| format!("failed to configure '{provider}' backend"))
}
