//! Configuration for the directory resolver.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryResolverConfig {
    /// Object class every user entry carries.
    pub user_object_class: String,

    /// Domain prefix for subject identifiers.
    ///
    /// Derived from the first `dc=` component of the base DN when unset.
    pub domain: Option<String>,

    /// Maximum number of entries a search returns.
    pub search_size_limit: usize,

    /// Directory attribute names used for lookups and mapping.
    pub attributes: AttributeMap,

    pub resilience: ResilienceConfig,
}

impl Default for DirectoryResolverConfig {
    fn default() -> Self {
        Self {
            user_object_class: "person".to_owned(),
            domain: None,
            search_size_limit: 100,
            attributes: AttributeMap::default(),
            resilience: ResilienceConfig::default(),
        }
    }
}

/// Directory attribute names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributeMap {
    /// Login name (`first.last`); the subject id is `DOMAIN\<login>`.
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub display_name: String,
    pub email: String,
    /// Group membership DNs.
    pub member_of: String,
}

impl Default for AttributeMap {
    fn default() -> Self {
        Self {
            login: "cn".to_owned(),
            first_name: "givenName".to_owned(),
            last_name: "sn".to_owned(),
            middle_name: "middleName".to_owned(),
            display_name: "displayName".to_owned(),
            email: "mail".to_owned(),
            member_of: "memberOf".to_owned(),
        }
    }
}

impl AttributeMap {
    /// Attributes requested from the directory for every user search.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        vec![
            self.login.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.middle_name.clone(),
            self.display_name.clone(),
            self.email.clone(),
            self.member_of.clone(),
        ]
    }
}

/// Retry and circuit-breaker settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

/// Retry policy settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Pause between attempts.
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(200),
        }
    }
}

/// Circuit-breaker policy settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed attempts that open the circuit.
    pub failure_threshold: u32,

    /// How long the circuit stays open before admitting a trial call.
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: DirectoryResolverConfig = serde_json::from_value(serde_json::json!({
            "domain": "CORP",
            "attributes": { "login": "sAMAccountName" },
            "resilience": { "circuit_breaker": { "cooldown": "30s" } }
        }))
        .unwrap();

        assert_eq!(cfg.domain.as_deref(), Some("CORP"));
        assert_eq!(cfg.user_object_class, "person");
        assert_eq!(cfg.attributes.login, "sAMAccountName");
        assert_eq!(cfg.attributes.first_name, "givenName");
        assert_eq!(cfg.resilience.circuit_breaker.failure_threshold, 5);
        assert_eq!(
            cfg.resilience.circuit_breaker.cooldown,
            Duration::from_secs(30)
        );
        assert_eq!(cfg.resilience.retry.max_retries, 2);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<DirectoryResolverConfig, _> =
            serde_json::from_value(serde_json::json!({ "vendor": "x" }));
        assert!(result.is_err());
    }
}
