//! Domain layer for the directory resolver.

pub mod error;
pub mod local_client;
pub mod mapper;
pub mod profile;
pub mod query;
pub mod resilience;
pub mod service;

pub use error::DomainError;
pub use local_client::DirectoryResolverLocalClient;
pub use mapper::EntryMapper;
pub use profile::UserProfileService;
pub use query::QueryBuilder;
pub use service::Service;
