#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! LDAP Directory Plugin
//!
//! Implements the `DirectoryConnector` contract over `ldap3`. Typed search
//! filters are rendered to RFC 4515 strings with every value escaped.

pub mod domain;

pub use domain::{LdapConnectionProvider, LdapScopedConnection, render_filter};
