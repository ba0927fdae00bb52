//! Directory connection settings.

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize, Serializer};

/// Connection settings for the external directory.
///
/// Loaded once at process start and shared read-only afterwards.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectorySettings {
    /// Directory host name. Empty means "not configured".
    pub host: String,

    pub port: u16,

    /// Bind DN or bind name. Empty selects an anonymous bind.
    pub username: String,

    #[serde(serialize_with = "serialize_redacted")]
    pub password: SecretString,

    /// Search base, e.g. `dc=example,dc=org`.
    pub base_dn: String,

    /// Connect with `ldaps://` instead of `ldap://`.
    pub use_ssl: bool,

    /// Bound on connecting and binding.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Bound on a single search round-trip.
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 389,
            username: String::new(),
            password: SecretString::from(String::new()),
            base_dn: String::new(),
            use_ssl: false,
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(10),
        }
    }
}

impl DirectorySettings {
    /// `ldap://host:port` or `ldaps://host:port`.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// Domain derived from the first `dc=` component of the base DN,
    /// upper-cased (`dc=example,dc=org` gives `EXAMPLE`).
    #[must_use]
    pub fn base_dn_domain(&self) -> Option<String> {
        self.base_dn.split(',').find_map(|rdn| {
            let (attr, value) = rdn.split_once('=')?;
            let value = value.trim();
            (attr.trim().eq_ignore_ascii_case("dc") && !value.is_empty())
                .then(|| value.to_ascii_uppercase())
        })
    }
}

impl fmt::Debug for DirectorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("base_dn", &self.base_dn)
            .field("use_ssl", &self.use_ssl)
            .field("connect_timeout", &self.connect_timeout)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

/// Serializes any secret as `[REDACTED]`.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize_redacted<S>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str("[REDACTED]")
}
