#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Directory Plugin
//!
//! This plugin provides an in-memory directory seeded from configuration, for
//! development, tests and the in-memory identity backend. It implements the
//! same `DirectoryConnector` contract as the LDAP plugin, evaluating the typed
//! search filter directly against its entries.
//!
//! ## Configuration
//!
//! ```yaml
//! static_directory:
//!   base_dn: "dc=example,dc=org"
//!   users:
//!     - first_name: mike
//!       last_name: trout
//!       email: mike.trout@example.org
//!       groups: ["players"]
//!   entries:
//!     - dn: "cn=svc.backup,dc=example,dc=org"
//!       attributes:
//!         objectClass: ["person"]
//!         cn: ["svc.backup"]
//! ```

pub mod config;
pub mod domain;

pub use domain::Service;
