use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::types::VaultConfig;
use crate::utils::constants::LOGIN_TIMEOUT_SECS;

/// KV v2 read response: `{"data": {"data": {...}, "metadata": {...}}}`
#[derive(Debug, Deserialize)]
struct KvV2Response {
    data: KvV2Data,
}

#[derive(Debug, Deserialize)]
struct KvV2Data {
    #[serde(default)]
    data: HashMap<String, Value>,
}

/// Reads one field of a Vault KV v2 secret over the HTTP API.
#[derive(Debug, Clone)]
pub struct VaultCredentials {
    client: Client,
    config: VaultConfig,
}

impl VaultCredentials {
    pub fn new(client: Client, config: VaultConfig) -> Self {
        Self { client, config }
    }

    /// `{addr}/v1/{mount}/data/{path}`; a `path` already prefixed with the mount is accepted.
    pub fn secret_url(&self) -> String {
        let mount = self.config.mount.trim_matches('/');
        let path = self.config.path.trim_start_matches('/');
        let path = path
            .strip_prefix(&format!("{}/", mount))
            .unwrap_or(path);
        format!("{}/v1/{}/data/{}", self.config.addr.trim_end_matches('/'), mount, path)
    }

    /// `Ok(None)` when the secret exists but lacks the configured field.
    pub async fn read_secret(&self) -> Result<Option<String>> {
        let url = self.secret_url();
        let response = self
            .client
            .get(&url)
            .header("X-Vault-Token", &self.config.token)
            .timeout(Duration::from_secs(LOGIN_TIMEOUT_SECS))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                return Err(anyhow!("failed to authenticate with Vault ({})", response.status()))
            }
            StatusCode::NOT_FOUND => {
                return Err(anyhow!("no data found at Vault path '{}'", self.config.path))
            }
            status => return Err(anyhow!("Vault read failed: {}", status)),
        }

        let secret: KvV2Response = response.json().await?;
        Ok(secret
            .data
            .data
            .get(&self.config.field)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_owned))
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }

    pub fn field(&self) -> &str {
        &self.config.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(addr: &str, path: &str) -> VaultCredentials {
        VaultCredentials::new(
            Client::new(),
            VaultConfig {
                addr: addr.into(),
                token: "root".into(),
                path: path.into(),
                mount: "secret".into(),
                field: "password".into(),
            },
        )
    }

    #[test]
    fn secret_url_strips_mount_prefix() {
        assert_eq!(
            vault("http://vault:8200/", "secret/siteminder/admin").secret_url(),
            "http://vault:8200/v1/secret/data/siteminder/admin"
        );
        assert_eq!(
            vault("http://vault:8200", "siteminder/admin").secret_url(),
            "http://vault:8200/v1/secret/data/siteminder/admin"
        );
    }
}
