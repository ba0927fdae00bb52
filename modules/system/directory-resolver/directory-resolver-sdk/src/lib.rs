//! Directory Resolver SDK
//!
//! This crate provides the public API for the `directory_resolver` module:
//!
//! - [`DirectoryResolverClient`] - Public API trait for consumers
//! - [`DirectoryConnector`] / [`DirectoryConnection`] - Connection provider traits for plugins
//! - [`ResolvedUser`] - Resolved user record returned to the identity provider
//! - [`DirectorySettings`] - Directory connection settings
//! - [`DirectoryResolverError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use directory_resolver_sdk::DirectoryResolverClient;
//!
//! // `None` covers both "unknown user" and "directory unavailable"
//! if let Some(user) = resolver.find_by_subject_id(r"EXAMPLE\test.user").await {
//!     println!("{} {}", user.first_name, user.last_name);
//! }
//!
//! let users = resolver.search_users("mike").await;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod plugin_api;
pub mod settings;

// Re-export main types at crate root
pub use api::DirectoryResolverClient;
pub use error::DirectoryResolverError;
pub use models::{Claim, DirectoryEntry, Filter, ResolvedUser, SearchRequest, SubjectId};
pub use plugin_api::{DirectoryConnection, DirectoryConnector};
pub use settings::DirectorySettings;
