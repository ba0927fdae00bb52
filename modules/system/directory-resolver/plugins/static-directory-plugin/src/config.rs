//! Configuration for the static directory plugin.

use directory_resolver_sdk::DirectoryEntry;
use serde::{Deserialize, Serialize};

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticDirectoryPluginConfig {
    /// Base DN under which `users` are created.
    pub base_dn: String,

    /// Person shorthands.
    pub users: Vec<StaticUser>,

    /// Raw entries, kept as written.
    pub entries: Vec<DirectoryEntry>,
}

impl Default for StaticDirectoryPluginConfig {
    fn default() -> Self {
        Self {
            base_dn: "dc=example,dc=org".to_owned(),
            users: Vec::new(),
            entries: Vec::new(),
        }
    }
}

/// A person entry named `cn=<first>.<last>,<base_dn>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StaticUser {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Group names; stored as `memberOf` DNs under the base DN.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl StaticUser {
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            middle_name: None,
            email: None,
            groups: Vec::new(),
        }
    }

    /// `first.last` login.
    #[must_use]
    pub fn login(&self) -> String {
        format!("{}.{}", self.first_name, self.last_name)
    }

    /// Directory entry for this person.
    #[must_use]
    pub fn to_entry(&self, base_dn: &str) -> DirectoryEntry {
        let login = self.login();
        let mut entry = DirectoryEntry::new(format!("cn={login},{base_dn}"))
            .with_attribute("objectClass", "person")
            .with_attribute("objectClass", "inetOrgPerson")
            .with_attribute("cn", login)
            .with_attribute("givenName", self.first_name.as_str())
            .with_attribute("sn", self.last_name.as_str());
        if let Some(middle_name) = &self.middle_name {
            entry = entry.with_attribute("middleName", middle_name.as_str());
        }
        if let Some(email) = &self.email {
            entry = entry.with_attribute("mail", email.as_str());
        }
        for group in &self.groups {
            entry = entry.with_attribute("memberOf", format!("cn={group},{base_dn}"));
        }
        entry
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn user_shorthand_builds_person_entry() {
        let user = StaticUser {
            email: Some("mike.trout@example.org".to_owned()),
            groups: vec!["players".to_owned()],
            ..StaticUser::new("mike", "trout")
        };

        let entry = user.to_entry("dc=example,dc=org");

        assert_eq!(entry.dn, "cn=mike.trout,dc=example,dc=org");
        assert_eq!(entry.values("objectClass"), ["person", "inetOrgPerson"]);
        assert_eq!(entry.first("cn"), Some("mike.trout"));
        assert_eq!(entry.first("givenName"), Some("mike"));
        assert_eq!(entry.first("sn"), Some("trout"));
        assert_eq!(entry.first("middleName"), None);
        assert_eq!(entry.first("mail"), Some("mike.trout@example.org"));
        assert_eq!(
            entry.first("memberOf"),
            Some("cn=players,dc=example,dc=org")
        );
    }

    #[test]
    fn deserializes_users_and_entries() {
        let cfg: StaticDirectoryPluginConfig = serde_json::from_value(serde_json::json!({
            "users": [{ "first_name": "carlos", "last_name": "beltran" }],
            "entries": [{
                "dn": "cn=svc.backup,dc=example,dc=org",
                "attributes": { "cn": ["svc.backup"] }
            }]
        }))
        .unwrap();

        assert_eq!(cfg.base_dn, "dc=example,dc=org");
        assert_eq!(cfg.users.len(), 1);
        assert_eq!(cfg.users[0].login(), "carlos.beltran");
        assert_eq!(cfg.entries[0].first("cn"), Some("svc.backup"));
    }
}
