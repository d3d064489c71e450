// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::agent::PolicyAgent;
use crate::config::settings::SettingsConfig;
use crate::config::types::{CacheConfig, CacheSizing, CredentialsConfig, ServiceConfig, SiteminderConfig};
use crate::credentials::CredentialProvider;
use crate::fetch::http_client::build_client;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "s3cret";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Fixed secret, or none at all.
pub struct StaticSecret(pub Option<String>);

impl CredentialProvider for StaticSecret {
    async fn get_secret(&self) -> Option<String> {
        self.0.clone()
    }
}

pub fn basic_auth_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

pub fn test_config(base_url: &str, token_ttl_seconds: u64) -> ServiceConfig {
    ServiceConfig {
        siteminder: SiteminderConfig {
            base_url: base_url.trim_end_matches('/').to_owned(),
            username: USERNAME.to_owned(),
            verify_ssl: false,
        },
        credentials: CredentialsConfig::default(),
        cache: CacheConfig {
            token: CacheSizing { capacity: 1, ttl_seconds: token_ttl_seconds },
            detail: CacheSizing { capacity: 10, ttl_seconds: 300 },
        },
        settings: SettingsConfig::default(),
    }
}

pub fn build_agent(base_url: &str, secret: Option<&str>, token_ttl_seconds: u64) -> PolicyAgent<StaticSecret> {
    let client = build_client(false).expect("reqwest client");
    PolicyAgent::with_credentials(
        &test_config(base_url, token_ttl_seconds),
        client,
        StaticSecret(secret.map(str::to_owned)),
    )
}
