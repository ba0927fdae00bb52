//! Application configuration.
//!
//! Loaded once at start: the YAML file (if given), then `IDENTITY__*`
//! environment variables with `__` separating nested keys, e.g.
//! `IDENTITY__DIRECTORY__HOST=ldap.example.org`.

use std::path::Path;

use anyhow::{Context, bail};
use directory_resolver::config::DirectoryResolverConfig;
use directory_resolver_sdk::DirectorySettings;
use directory_resolver_sdk::settings::serialize_redacted;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use static_directory_plugin::config::StaticDirectoryPluginConfig;

use crate::logging::LoggingConfig;

const ENV_PREFIX: &str = "IDENTITY__";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `couchdb`, `sql_server` or `in_memory` (case-insensitive).
    pub storage_provider: String,
    pub directory: DirectorySettings,
    pub resolver: DirectoryResolverConfig,
    pub static_directory: StaticDirectoryPluginConfig,
    pub couchdb: Option<CouchDbSettings>,
    pub sql_server: Option<SqlServerSettings>,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_provider: "in_memory".to_owned(),
            directory: DirectorySettings::default(),
            resolver: DirectoryResolverConfig::default(),
            static_directory: StaticDirectoryPluginConfig::default(),
            couchdb: None,
            sql_server: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Document store used by the `couchdb` backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CouchDbSettings {
    pub url: String,
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret", serialize_with = "serialize_redacted")]
    pub password: SecretString,
}

/// Relational store used by the `sql_server` backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SqlServerSettings {
    pub host: String,
    #[serde(default = "default_sql_server_port")]
    pub port: u16,
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret", serialize_with = "serialize_redacted")]
    pub password: SecretString,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

const fn default_sql_server_port() -> u16 {
    1433
}

impl AppConfig {
    /// Load configuration from `path` (if any) and the environment.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or either source does not match the
    /// configuration schema.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                bail!("configuration file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use secrecy::ExposeSecret;

    use super::*;
    use crate::logging::LogFormat;

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_yaml_file() {
        let file = write_config(
            r#"
storage_provider: CouchDB
directory:
  host: ldap.example.org
  port: 636
  use_ssl: true
  username: "cn=reader,dc=example,dc=org"
  password: s3cret
  base_dn: "dc=example,dc=org"
  connect_timeout: 2s
resolver:
  resilience:
    retry:
      max_retries: 1
    circuit_breaker:
      failure_threshold: 3
      cooldown: 30s
couchdb:
  url: "http://couch.example.org:5984"
  database: identity
logging:
  level: debug
  format: json
"#,
        );

        let cfg = temp_env::with_vars_unset(["IDENTITY__DIRECTORY__HOST"], || {
            AppConfig::load(Some(file.path())).unwrap()
        });

        assert_eq!(cfg.storage_provider, "CouchDB");
        assert_eq!(cfg.directory.url(), "ldaps://ldap.example.org:636");
        assert_eq!(cfg.directory.password.expose_secret(), "s3cret");
        assert_eq!(cfg.directory.connect_timeout, Duration::from_secs(2));
        assert_eq!(cfg.resolver.resilience.retry.max_retries, 1);
        assert_eq!(cfg.resolver.resilience.circuit_breaker.failure_threshold, 3);
        assert_eq!(cfg.couchdb.unwrap().database, "identity");
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn environment_overrides_file() {
        let file = write_config("directory:\n  host: ldap.example.org\n");

        let cfg = temp_env::with_vars(
            [
                ("IDENTITY__DIRECTORY__HOST", Some("ldap.internal")),
                ("IDENTITY__STORAGE_PROVIDER", Some("sql_server")),
            ],
            || AppConfig::load(Some(file.path())).unwrap(),
        );

        assert_eq!(cfg.directory.host, "ldap.internal");
        assert_eq!(cfg.storage_provider, "sql_server");
    }

    #[test]
    fn defaults_without_file() {
        let cfg = temp_env::with_vars_unset(
            ["IDENTITY__DIRECTORY__HOST", "IDENTITY__STORAGE_PROVIDER"],
            || AppConfig::load(None).unwrap(),
        );
        assert_eq!(cfg.storage_provider, "in_memory");
        assert_eq!(cfg.directory.port, 389);
        assert!(cfg.couchdb.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/identity.yaml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config("directory:\n  hostname: ldap.example.org\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn serialized_config_hides_secrets() {
        let cfg = AppConfig {
            sql_server: Some(SqlServerSettings {
                host: "sql.example.org".to_owned(),
                port: 1433,
                database: "identity".to_owned(),
                username: "svc".to_owned(),
                password: SecretString::from("db-secret".to_owned()),
            }),
            ..AppConfig::default()
        };

        let rendered = serde_json::to_string(&cfg).unwrap();
        assert!(!rendered.contains("db-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
