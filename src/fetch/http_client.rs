use anyhow::Result;
use reqwest::Client;
use tracing::warn;

/// Shared client for login, Vault and policy requests. Timeouts are set per call.
pub fn build_client(verify_ssl: bool) -> Result<Client> {
    if !verify_ssl {
        warn!("TLS certificate verification is disabled");
    }
    let client = Client::builder()
        .danger_accept_invalid_certs(!verify_ssl)
        .build()?;
    Ok(client)
}
