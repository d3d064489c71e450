use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::cache::ttl_cache::BoundedTtlCache;
use crate::credentials::CredentialProvider;
use crate::error::{FetchError, FetchResult};
use crate::helpers::time::wall_clock_after;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{LOGIN_PATH, LOGIN_TIMEOUT_SECS, TOKEN_CACHE_KEY};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    sessionkey: Option<String>,
}

/// Obtains SiteMinder session keys and keeps the current one in a TTL cache.
///
/// Logins are serialized: a caller that misses the cache waits for any login
/// already in flight and then re-reads the cache, so concurrent misses share
/// one request.
pub struct TokenManager<P> {
    client: Client,
    login_url: String,
    username: String,
    credentials: P,
    cache: Arc<BoundedTtlCache<String>>,
    login_gate: Mutex<()>,
}

impl<P: CredentialProvider> TokenManager<P> {
    pub fn new(
        client: Client,
        base_url: &str,
        username: impl Into<String>,
        credentials: P,
        cache: Arc<BoundedTtlCache<String>>,
    ) -> Self {
        Self {
            client,
            login_url: format!("{}{}", base_url.trim_end_matches('/'), LOGIN_PATH),
            username: username.into(),
            credentials,
            cache,
            login_gate: Mutex::new(()),
        }
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Cached session key, logging in on a miss. Failures are logged and
    /// reported as `None`.
    pub async fn get_token(&self) -> Option<String> {
        self.try_get_token()
            .await
            .inspect_err(|e| error!("Failed to retrieve SiteMinder session token: {}", e))
            .ok()
    }

    pub async fn try_get_token(&self) -> FetchResult<String> {
        if let Some(token) = self.cache.get(TOKEN_CACHE_KEY).await {
            return Ok(token);
        }

        let _gate = self.login_gate.lock().await;
        if let Some(token) = self.cache.get(TOKEN_CACHE_KEY).await {
            debug!("session key was refreshed by a concurrent login");
            return Ok(token);
        }
        self.login().await
    }

    /// Drop the cached session key and log in again.
    pub async fn force_refresh(&self) -> Option<String> {
        self.try_force_refresh()
            .await
            .inspect_err(|e| error!("Failed to refresh SiteMinder session token: {}", e))
            .ok()
    }

    pub async fn try_force_refresh(&self) -> FetchResult<String> {
        let _gate = self.login_gate.lock().await;
        self.cache.remove(TOKEN_CACHE_KEY).await;
        self.login().await
    }

    /// Caller holds `login_gate`.
    async fn login(&self) -> FetchResult<String> {
        let metrics = get_metrics().await;

        let Some(secret) = self.credentials.get_secret().await else {
            error!("SiteMinder password is not available. Cannot retrieve token.");
            metrics.login_failures.with_label_values(&[FetchError::NoCredential.reason()]).inc();
            return Err(FetchError::NoCredential);
        };

        debug!("Attempting login to SiteMinder at {}", self.login_url);
        metrics.login_requests.inc();

        match self.request_session_key(&secret).await {
            Ok(session_key) => {
                self.cache.set(TOKEN_CACHE_KEY, session_key.clone()).await;
                info!(
                    "Retrieved session key ({} chars), cached until {}",
                    session_key.len(),
                    wall_clock_after(self.cache.ttl()).to_rfc3339()
                );
                Ok(session_key)
            }
            Err(e) => {
                metrics.login_failures.with_label_values(&[e.reason()]).inc();
                Err(e)
            }
        }
    }

    async fn request_session_key(&self, secret: &str) -> FetchResult<String> {
        let response = self
            .client
            .post(&self.login_url)
            .basic_auth(&self.username, Some(secret))
            .timeout(Duration::from_secs(LOGIN_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::AuthFailure(format!("login returned {}", status)));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        body.sessionkey
            .filter(|key| !key.is_empty())
            .ok_or_else(|| FetchError::AuthFailure("login response has no sessionkey".to_owned()))
    }
}
