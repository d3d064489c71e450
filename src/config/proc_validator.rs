//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks the endpoint, cache sizing and logging invariants

use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::SettingsConfig;
use crate::config::types::{CacheSizing, ServiceConfig, SiteminderConfig};

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_siteminder(&cfg.siteminder, &mut errors);
    validate_cache_sizing("cache.token", &cfg.cache.token, &mut errors);
    validate_cache_sizing("cache.detail", &cfg.cache.detail, &mut errors);
    validate_settings(&cfg.settings, &mut errors);

    if cfg.credentials.env_var.trim().is_empty() {
        errors.push("credentials.env_var must not be empty".to_string());
    }

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_siteminder(cfg: &SiteminderConfig, errors: &mut Vec<String>) {
    if cfg.base_url.is_empty() {
        errors.push("siteminder.base_url is required".to_string());
    } else {
        match Url::parse(&cfg.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(format!(
                "siteminder.base_url has unsupported scheme '{}'",
                url.scheme()
            )),
            Err(e) => errors.push(format!("siteminder.base_url '{}' is invalid: {}", cfg.base_url, e)),
        }
    }

    if cfg.username.trim().is_empty() {
        errors.push("siteminder.username is required".to_string());
    }
}

fn validate_cache_sizing(name: &str, sizing: &CacheSizing, errors: &mut Vec<String>) {
    if sizing.capacity == 0 {
        errors.push(format!("{}.capacity must be > 0", name));
    }
    if sizing.ttl_seconds == 0 {
        errors.push(format!("{}.ttl_seconds must be > 0", name));
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        let level = logging.level.to_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            errors.push(format!("settings.logging.level '{}' is not one of trace|debug|info|warn|error", logging.level));
        }
    }
}
