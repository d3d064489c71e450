use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::time::Duration;
use tracing::info;

use crate::auth::token_manager::TokenManager;
use crate::cache::detail_cache::DetailCache;
use crate::cache::ttl_cache::BoundedTtlCache;
use crate::config::types::ServiceConfig;
use crate::credentials::resolver::SecretResolver;
use crate::credentials::CredentialProvider;
use crate::error::FetchResult;
use crate::fetch::fetcher::ResilientFetcher;
use crate::fetch::http_client::build_client;
use crate::fetch::policy::PolicyClient;
use crate::utils::constants::TOKEN_CACHE_NAME;

/// Owns both caches and wires them into the token manager and policy client.
pub struct PolicyAgent<P> {
    pub tokens: Arc<TokenManager<P>>,
    pub policy: PolicyClient<P>,
    pub token_cache: Arc<BoundedTtlCache<String>>,
    pub detail_cache: Arc<DetailCache>,
}

impl PolicyAgent<SecretResolver> {
    /// Production wiring: one shared client, Vault/env secret resolution.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = build_client(config.siteminder.verify_ssl)?;
        let credentials = SecretResolver::from_config(&client, &config.credentials);
        Ok(Self::with_credentials(config, client, credentials))
    }
}

impl<P: CredentialProvider> PolicyAgent<P> {
    pub fn with_credentials(config: &ServiceConfig, client: Client, credentials: P) -> Self {
        let token_cache = Arc::new(BoundedTtlCache::new(
            TOKEN_CACHE_NAME,
            config.cache.token.capacity,
            Duration::from_secs(config.cache.token.ttl_seconds),
        ));
        let detail_cache = Arc::new(DetailCache::new(
            config.cache.detail.capacity,
            Duration::from_secs(config.cache.detail.ttl_seconds),
        ));

        let tokens = Arc::new(TokenManager::new(
            client.clone(),
            &config.siteminder.base_url,
            config.siteminder.username.to_owned(),
            credentials,
            token_cache.clone(),
        ));
        let fetcher = ResilientFetcher::new(client, tokens.clone(), config.settings.max_retries());
        let policy = PolicyClient::new(&config.siteminder.base_url, fetcher, detail_cache.clone());

        info!(
            "policy agent ready for {} (token ttl {}s, detail cache {} x {}s)",
            config.siteminder.base_url,
            config.cache.token.ttl_seconds,
            config.cache.detail.capacity,
            config.cache.detail.ttl_seconds
        );

        Self { tokens, policy, token_cache, detail_cache }
    }

    /// Obtains a session key; the status names the login url used.
    pub async fn session_status(&self) -> FetchResult<Value> {
        self.tokens.try_get_token().await?;
        Ok(json!({ "login_url": self.tokens.login_url(), "session": true }))
    }
}
