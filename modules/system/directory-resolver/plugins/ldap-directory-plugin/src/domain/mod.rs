pub mod connection;
pub mod filter;

pub use connection::{LdapConnectionProvider, LdapScopedConnection};
pub use filter::render_filter;
