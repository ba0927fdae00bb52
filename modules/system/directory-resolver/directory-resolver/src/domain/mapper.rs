//! Mapping of raw directory entries to resolved user records.

use directory_resolver_sdk::{Claim, DirectoryEntry, DirectorySettings, ResolvedUser};

use crate::config::{AttributeMap, DirectoryResolverConfig};

/// Maps directory entries through the configured attribute table.
#[derive(Debug, Clone)]
pub struct EntryMapper {
    attributes: AttributeMap,
    domain: String,
}

impl EntryMapper {
    #[must_use]
    pub fn new(settings: &DirectorySettings, cfg: &DirectoryResolverConfig) -> Self {
        let domain = cfg
            .domain
            .clone()
            .or_else(|| settings.base_dn_domain())
            .unwrap_or_default();
        Self {
            attributes: cfg.attributes.clone(),
            domain,
        }
    }

    /// Domain prefix of produced subject identifiers.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Build a record from an entry. Missing attributes become empty strings.
    #[must_use]
    pub fn map(&self, entry: &DirectoryEntry) -> ResolvedUser {
        let attr = |name: &str| entry.first(name).unwrap_or_default().to_owned();

        let login = entry
            .first(&self.attributes.login)
            .map(str::to_owned)
            .or_else(|| rdn_value(&entry.dn, &self.attributes.login))
            .unwrap_or_default();
        let subject_id = if self.domain.is_empty() {
            login
        } else {
            format!("{}\\{login}", self.domain)
        };

        let first_name = attr(&self.attributes.first_name);
        let last_name = attr(&self.attributes.last_name);
        let middle_name = attr(&self.attributes.middle_name);

        let mut claims = vec![
            Claim::new("sub", subject_id.clone()),
            Claim::new("given_name", first_name.clone()),
            Claim::new("family_name", last_name.clone()),
        ];
        if !middle_name.is_empty() {
            claims.push(Claim::new("middle_name", middle_name.clone()));
        }

        let display_name = match entry.first(&self.attributes.display_name) {
            Some(name) => name.to_owned(),
            None => format!("{first_name} {last_name}").trim().to_owned(),
        };
        if !display_name.is_empty() {
            claims.push(Claim::new("name", display_name));
        }
        if let Some(email) = entry.first(&self.attributes.email) {
            claims.push(Claim::new("email", email));
        }
        claims.extend(
            entry
                .values(&self.attributes.member_of)
                .iter()
                .map(|group_dn| {
                    let group = rdn_value(group_dn, "cn").unwrap_or_else(|| group_dn.clone());
                    Claim::new("role", group)
                }),
        );

        ResolvedUser {
            subject_id,
            first_name,
            last_name,
            middle_name,
            claims,
        }
    }
}

/// Value of the leading RDN of `dn` when its attribute is `attribute`.
fn rdn_value(dn: &str, attribute: &str) -> Option<String> {
    let leading = dn.split(',').next()?;
    let (name, value) = leading.split_once('=')?;
    let value = value.trim();
    (name.trim().eq_ignore_ascii_case(attribute) && !value.is_empty()).then(|| value.to_owned())
}
