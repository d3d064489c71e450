use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Login metrics
    pub login_requests: IntCounter,
    pub login_failures: IntCounterVec,

    // Fetch metrics
    pub fetch_attempts: IntCounterVec,
    pub fetch_failures: IntCounterVec,
    pub token_refreshes: IntCounter,

    // Cache metrics
    pub cache_hits: IntCounterVec,
    pub cache_misses: IntCounterVec,
    pub cache_entries: IntGaugeVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("smpolicyagent".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Login
            login_requests: IntCounter::new("login_requests_total", "Login requests sent").unwrap(),
            login_failures: IntCounterVec::new(Opts::new("login_failures_total", "Login failures by reason"),&["reason"],).unwrap(),

            // Fetch
            fetch_attempts: IntCounterVec::new(Opts::new("fetch_attempts_total", "Authenticated GET attempts by status class"),&["outcome"],).unwrap(),
            fetch_failures: IntCounterVec::new(Opts::new("fetch_failures_total", "Fetches that ended without a body, by reason"),&["reason"],).unwrap(),
            token_refreshes: IntCounter::new("token_refreshes_total", "Forced token refreshes after 401").unwrap(),

            // Cache
            cache_hits: IntCounterVec::new(Opts::new("cache_hits_total", "Cache hits"),&["cache"],).unwrap(),
            cache_misses: IntCounterVec::new(Opts::new("cache_misses_total", "Cache misses, expired entries included"),&["cache"],).unwrap(),
            cache_entries: IntGaugeVec::new(Opts::new("cache_entries", "Entries currently stored"),&["cache"],).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.login_requests.clone())).unwrap();
        reg.register(Box::new(metrics.login_failures.clone())).unwrap();
        reg.register(Box::new(metrics.fetch_attempts.clone())).unwrap();
        reg.register(Box::new(metrics.fetch_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.cache_misses.clone())).unwrap();
        reg.register(Box::new(metrics.cache_entries.clone())).unwrap();

        metrics
    }

    /// Prometheus text exposition of everything registered.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
