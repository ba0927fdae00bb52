//! Domain errors for the directory resolver.

use directory_resolver_sdk::DirectoryResolverError;
use directory_resolver_sdk::models::ParseSubjectIdError;

/// Internal domain errors.
///
/// Never leaves the crate through `DirectoryResolverClient`; the local client
/// turns every variant into "not found" or an empty result.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("invalid subject identifier '{0}'")]
    InvalidSubjectId(String),

    #[error(transparent)]
    Directory(#[from] DirectoryResolverError),
}

impl From<ParseSubjectIdError> for DomainError {
    fn from(e: ParseSubjectIdError) -> Self {
        Self::InvalidSubjectId(e.0)
    }
}
