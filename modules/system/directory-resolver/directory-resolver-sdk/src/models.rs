//! Domain models for the directory resolver module.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single claim about a resolved user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim type, e.g. `given_name` or `role`.
    pub claim_type: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    #[must_use]
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// User record resolved from the directory.
///
/// All name fields are total: an attribute missing from the directory entry
/// is represented by an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUser {
    /// Domain-qualified login, e.g. `EXAMPLE\test.user`.
    pub subject_id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    /// Claims in a stable order.
    pub claims: Vec<Claim>,
}

impl ResolvedUser {
    /// Values of all claims with the given type, in record order.
    pub fn claim_values<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}

/// Returned when a subject identifier has no usable username.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid subject identifier '{0}'")]
pub struct ParseSubjectIdError(pub String);

/// Parsed subject identifier: `DOMAIN\username` or a bare `username`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectId {
    pub domain: Option<String>,
    pub username: String,
}

impl FromStr for SubjectId {
    type Err = ParseSubjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (domain, username) = match trimmed.split_once('\\') {
            Some((domain, username)) => {
                let domain = domain.trim();
                (
                    (!domain.is_empty()).then(|| domain.to_owned()),
                    username.trim(),
                )
            }
            None => (None, trimmed),
        };

        if username.is_empty() || username.contains('\\') {
            return Err(ParseSubjectIdError(s.to_owned()));
        }

        Ok(Self {
            domain,
            username: username.to_owned(),
        })
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{domain}\\{}", self.username),
            None => f.write_str(&self.username),
        }
    }
}

/// Raw directory entry.
///
/// Attribute names are compared case-insensitively, as directories do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Distinguished name.
    pub dn: String,
    /// Multi-valued attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Append a value to an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// All values of an attribute.
    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map_or(&[], |(_, values)| values.as_slice())
    }

    /// First value of an attribute.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }
}

/// Typed search filter.
///
/// Connection providers translate it to their own query language; the LDAP
/// plugin renders RFC 4515 strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// Exact (case-insensitive) value match.
    Equals { attribute: String, value: String },
    /// Value starts with the given prefix (case-insensitive).
    Prefix { attribute: String, value: String },
}

impl Filter {
    #[must_use]
    pub fn equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn prefix(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Prefix {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// A read-only subtree search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base_dn: String,
    pub filter: Filter,
    /// Attributes to return.
    pub attributes: Vec<String>,
    /// Maximum number of entries to return; `0` means unlimited.
    pub size_limit: usize,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn subject_id_with_domain() {
        let id: SubjectId = r"EXAMPLE\test.user".parse().unwrap();
        assert_eq!(id.domain.as_deref(), Some("EXAMPLE"));
        assert_eq!(id.username, "test.user");
        assert_eq!(id.to_string(), r"EXAMPLE\test.user");
    }

    #[test]
    fn subject_id_without_domain() {
        let id: SubjectId = "mike.trout".parse().unwrap();
        assert_eq!(id.domain, None);
        assert_eq!(id.username, "mike.trout");
    }

    #[test]
    fn subject_id_with_empty_domain_is_bare() {
        let id: SubjectId = r"\mike.trout".parse().unwrap();
        assert_eq!(id.domain, None);
        assert_eq!(id.username, "mike.trout");
    }

    #[test]
    fn subject_id_rejects_blank_username() {
        assert!("".parse::<SubjectId>().is_err());
        assert!("   ".parse::<SubjectId>().is_err());
        assert!(r"EXAMPLE\".parse::<SubjectId>().is_err());
        assert!(r"EXAMPLE\a\b".parse::<SubjectId>().is_err());
    }

    #[test]
    fn entry_attribute_lookup_ignores_case() {
        let entry = DirectoryEntry::new("cn=test.user,dc=example,dc=org")
            .with_attribute("givenName", "test")
            .with_attribute("memberOf", "cn=admins,dc=example,dc=org")
            .with_attribute("memberOf", "cn=users,dc=example,dc=org");

        assert_eq!(entry.first("givenname"), Some("test"));
        assert_eq!(entry.values("MEMBEROF").len(), 2);
        assert_eq!(entry.first("sn"), None);
        assert!(entry.values("sn").is_empty());
    }

    #[test]
    fn resolved_user_claim_values() {
        let user = ResolvedUser {
            subject_id: r"EXAMPLE\test.user".to_owned(),
            first_name: "test".to_owned(),
            last_name: "user".to_owned(),
            middle_name: String::new(),
            claims: vec![
                Claim::new("role", "admins"),
                Claim::new("email", "test.user@example.org"),
                Claim::new("role", "users"),
            ],
        };

        let roles: Vec<&str> = user.claim_values("role").collect();
        assert_eq!(roles, ["admins", "users"]);
        assert_eq!(user.claim_values("missing").count(), 0);
    }

    #[test]
    fn resolved_user_serializes_with_empty_middle_name() {
        let user = ResolvedUser {
            subject_id: r"EXAMPLE\test.user".to_owned(),
            first_name: "test".to_owned(),
            last_name: "user".to_owned(),
            middle_name: String::new(),
            claims: vec![],
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["middle_name"], "");
        assert_eq!(json["subject_id"], r"EXAMPLE\test.user");
    }
}
