//! Sources of the SiteMinder login secret.
//!
//! The canonical provider is [`resolver::SecretResolver`]: Vault KV v2 first,
//! then an environment variable, cached once found.

pub mod env;
pub mod resolver;
pub mod vault;

use std::future::Future;

pub trait CredentialProvider: Send + Sync {
    /// The login secret, or `None` when no source has one.
    fn get_secret(&self) -> impl Future<Output = Option<String>> + Send;
}
