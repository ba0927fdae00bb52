//! Directory query construction.

use directory_resolver_sdk::{DirectorySettings, Filter, SearchRequest};

use crate::config::{AttributeMap, DirectoryResolverConfig};

/// Builds the searches the resolver issues.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_dn: String,
    user_object_class: String,
    attributes: AttributeMap,
    size_limit: usize,
}

impl QueryBuilder {
    #[must_use]
    pub fn new(settings: &DirectorySettings, cfg: &DirectoryResolverConfig) -> Self {
        Self {
            base_dn: settings.base_dn.clone(),
            user_object_class: cfg.user_object_class.clone(),
            attributes: cfg.attributes.clone(),
            size_limit: cfg.search_size_limit,
        }
    }

    /// `(&(objectClass=<class>)(<login>=<username>))`
    #[must_use]
    pub fn find_subject(&self, username: &str) -> SearchRequest {
        self.request(Filter::And(vec![
            self.object_class(),
            Filter::equals(&self.attributes.login, username),
        ]))
    }

    /// `(&(objectClass=<class>)(|(<login>=<text>*)(<first>=<text>*)(<last>=<text>*)))`
    ///
    /// The login attribute holds the combined `first.last` form.
    #[must_use]
    pub fn search_users(&self, text: &str) -> SearchRequest {
        self.request(Filter::And(vec![
            self.object_class(),
            Filter::Or(vec![
                Filter::prefix(&self.attributes.login, text),
                Filter::prefix(&self.attributes.first_name, text),
                Filter::prefix(&self.attributes.last_name, text),
            ]),
        ]))
    }

    fn object_class(&self) -> Filter {
        Filter::equals("objectClass", &self.user_object_class)
    }

    fn request(&self, filter: Filter) -> SearchRequest {
        SearchRequest {
            base_dn: self.base_dn.clone(),
            filter,
            attributes: self.attributes.requested(),
            size_limit: self.size_limit,
        }
    }
}
