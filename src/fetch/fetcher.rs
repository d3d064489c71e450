use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use crate::auth::token_manager::TokenManager;
use crate::credentials::CredentialProvider;
use crate::error::{FetchError, FetchResult};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::RefreshRetry;
use crate::utils::constants::GET_TIMEOUT_SECS;

/// Authenticated GET with one transparent token refresh on 401.
pub struct ResilientFetcher<P> {
    client: Client,
    tokens: Arc<TokenManager<P>>,
    max_retries: u32,
}

impl<P: CredentialProvider> ResilientFetcher<P> {
    pub fn new(client: Client, tokens: Arc<TokenManager<P>>, max_retries: u32) -> Self {
        Self { client, tokens, max_retries }
    }

    pub fn tokens(&self) -> &Arc<TokenManager<P>> {
        &self.tokens
    }

    /// GET `url` with the configured retry budget; failures are logged and yield `None`.
    pub async fn get(&self, url: &str, token: Option<&str>) -> Option<Value> {
        self.get_with_retries(url, token, self.max_retries).await
    }

    pub async fn get_with_retries(&self, url: &str, token: Option<&str>, max_retries: u32) -> Option<Value> {
        match self.try_get(url, token, max_retries).await {
            Ok(body) => Some(body),
            Err(e) => {
                error!("HTTP GET failed for {}: {}", url, e);
                get_metrics().await.fetch_failures.with_label_values(&[e.reason()]).inc();
                None
            }
        }
    }

    /// Uses `token` when given and non-empty, otherwise the managed session key.
    pub async fn try_get(&self, url: &str, token: Option<&str>, max_retries: u32) -> FetchResult<Value> {
        let token = match token.filter(|t| !t.is_empty()) {
            Some(token) => token.to_owned(),
            None => self.tokens.try_get_token().await?,
        };

        RefreshRetry::new(max_retries)
            .run(
                token,
                move |token| self.attempt(url, token),
                move || async move {
                    get_metrics().await.token_refreshes.inc();
                    self.tokens.try_force_refresh().await
                },
            )
            .await
    }

    async fn attempt(&self, url: &str, token: String) -> FetchResult<Value> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json")
            .timeout(Duration::from_secs(GET_TIMEOUT_SECS))
            .send()
            .await
            .inspect_err(|_| metrics.fetch_attempts.with_label_values(&["error"]).inc())?;

        let status = response.status();
        debug!("GET {} -> {} in {:?}", url, status, start.elapsed());
        metrics.fetch_attempts.with_label_values(&[outcome_label(status.as_u16())]).inc();

        if !status.is_success() {
            return Err(FetchError::HttpStatus { status, url: url.to_owned() });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

fn outcome_label(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        401 => "401",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
