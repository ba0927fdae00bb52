//! Connection provider traits for directory plugins.
//!
//! Plugins implement [`DirectoryConnector`] to hand out scoped connections to
//! a directory. The resolver never retries or pools at this layer; retry and
//! circuit breaking are applied on top by the resolver's resilience policies.

use async_trait::async_trait;

use crate::error::DirectoryResolverError;
use crate::models::{DirectoryEntry, SearchRequest};

/// Acquires authenticated, call-scoped directory connections.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Open and bind a new connection owned by the caller.
    ///
    /// # Errors
    ///
    /// - `Misconfigured` if the settings cannot describe a reachable directory
    /// - `Connection` if the host is unreachable or the port is closed
    /// - `BindRejected` if the directory refuses the bind credentials
    /// - `Timeout` if connecting or binding exceeds the connect timeout
    async fn acquire(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryResolverError>;
}

/// A live directory session bound to a single logical call.
///
/// Dropping the connection releases it; [`DirectoryConnection::release`]
/// additionally says goodbye to the server.
#[async_trait]
pub trait DirectoryConnection: Send {
    /// Run a read-only subtree search.
    ///
    /// # Errors
    ///
    /// - `Connection` if the session breaks during the search
    /// - `Timeout` if the round-trip exceeds the operation timeout
    /// - `Query` if the directory rejects the search
    async fn search(
        &mut self,
        request: &SearchRequest,
    ) -> Result<Vec<DirectoryEntry>, DirectoryResolverError>;

    /// Release the session.
    async fn release(self: Box<Self>);
}
