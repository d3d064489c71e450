use serde::{Deserialize, Deserializer};

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{
    DEFAULT_DETAIL_CACHE_CAPACITY, DEFAULT_DETAIL_CACHE_TTL_SECS, DEFAULT_PASSWORD_ENV_VAR,
    DEFAULT_TOKEN_CACHE_CAPACITY, DEFAULT_TOKEN_TTL_SECS, DEFAULT_VAULT_FIELD,
    DEFAULT_VAULT_MOUNT,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub siteminder: SiteminderConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// ================================
/// SiteMinder endpoint
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SiteminderConfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub base_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    /// off by default: policy servers commonly present self-signed certificates
    #[serde(default, deserialize_with = "flexible_bool")]
    pub verify_ssl: bool,
}

/// ================================
/// Credentials
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    #[serde(default = "default_env_var")]
    pub env_var: String,
    pub vault: Option<VaultConfig>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self { env_var: default_env_var(), vault: None }
    }
}

/// Vault KV v2 location of the login password
#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub addr: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub token: String,
    /// secret path, a leading `<mount>/` is tolerated
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,
    #[serde(default = "default_vault_mount")]
    pub mount: String,
    #[serde(default = "default_vault_field")]
    pub field: String,
}

impl VaultConfig {
    pub fn is_complete(&self) -> bool {
        !self.addr.is_empty() && !self.token.is_empty() && !self.path.is_empty()
    }
}

/// ================================
/// Caches
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_token_sizing")]
    pub token: CacheSizing,
    #[serde(default = "default_detail_sizing")]
    pub detail: CacheSizing,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { token: default_token_sizing(), detail: default_detail_sizing() }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CacheSizing {
    pub capacity: usize,
    pub ttl_seconds: u64,
}

fn default_env_var() -> String {
    DEFAULT_PASSWORD_ENV_VAR.to_owned()
}

fn default_vault_mount() -> String {
    DEFAULT_VAULT_MOUNT.to_owned()
}

fn default_vault_field() -> String {
    DEFAULT_VAULT_FIELD.to_owned()
}

fn default_token_sizing() -> CacheSizing {
    CacheSizing { capacity: DEFAULT_TOKEN_CACHE_CAPACITY, ttl_seconds: DEFAULT_TOKEN_TTL_SECS }
}

fn default_detail_sizing() -> CacheSizing {
    CacheSizing { capacity: DEFAULT_DETAIL_CACHE_CAPACITY, ttl_seconds: DEFAULT_DETAIL_CACHE_TTL_SECS }
}

/// An unset `${VAR}` expands to nothing, which YAML reads as null.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a YAML bool or any casing of "true"/"false" from env expansion.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    Ok(match Option::<BoolOrString>::deserialize(deserializer)? {
        Some(BoolOrString::Bool(value)) => value,
        Some(BoolOrString::String(value)) => value.trim().eq_ignore_ascii_case("true"),
        None => false,
    })
}
