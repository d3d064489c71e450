use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::config::types::CredentialsConfig;
use crate::credentials::env::EnvCredentials;
use crate::credentials::vault::VaultCredentials;
use crate::credentials::CredentialProvider;

/// Vault first, then the environment variable.
///
/// A found secret is kept for the lifetime of the resolver. A miss is not
/// remembered, so a secret that appears later is still picked up.
#[derive(Debug)]
pub struct SecretResolver {
    vault: Option<VaultCredentials>,
    env: EnvCredentials,
    resolved: OnceCell<String>,
}

impl SecretResolver {
    pub fn new(vault: Option<VaultCredentials>, env: EnvCredentials) -> Self {
        Self { vault, env, resolved: OnceCell::new() }
    }

    pub fn from_config(client: &Client, config: &CredentialsConfig) -> Self {
        let vault = config
            .vault
            .clone()
            .map(|vault_config| VaultCredentials::new(client.clone(), vault_config));
        Self::new(vault, EnvCredentials::new(config.env_var.to_owned()))
    }

    async fn resolve(&self) -> Option<String> {
        if let Some(vault) = &self.vault {
            match vault.read_secret().await {
                Ok(Some(secret)) => {
                    info!("Successfully retrieved SiteMinder password from Vault");
                    return Some(secret);
                }
                Ok(None) => warn!(
                    "Field '{}' not found at Vault path '{}'",
                    vault.field(),
                    vault.path()
                ),
                Err(e) => error!("Error retrieving SiteMinder password from Vault: {}", e),
            }
        }

        match self.env.read() {
            Some(secret) => {
                info!("Successfully retrieved SiteMinder password from env var '{}'", self.env.var);
                Some(secret)
            }
            None => {
                warn!("SiteMinder password not found in Vault or env var '{}'; logins will fail", self.env.var);
                None
            }
        }
    }
}

impl CredentialProvider for SecretResolver {
    async fn get_secret(&self) -> Option<String> {
        if let Some(secret) = self.resolved.get() {
            return Some(secret.to_owned());
        }

        let secret = self.resolve().await?;
        let _ = self.resolved.set(secret.clone());
        Some(secret)
    }
}
