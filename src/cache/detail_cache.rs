use std::future::Future;

use serde_json::{Map, Value};
use tokio::time::Duration;
use tracing::debug;

use crate::cache::ttl_cache::BoundedTtlCache;

pub const DETAIL_CACHE_NAME: &str = "detail";

/// Memoizes fetched object bodies by href.
///
/// The check, fetch and store steps are not one critical section: two misses
/// on the same href may both fetch, and the later store wins.
#[derive(Debug)]
pub struct DetailCache {
    inner: BoundedTtlCache<Value>,
}

impl DetailCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self { inner: BoundedTtlCache::new(DETAIL_CACHE_NAME, capacity, ttl) }
    }

    /// Cached body for `href`, or the result of `fetch` stored under it.
    /// An absent or empty fetch result is not cached and yields an empty object.
    pub async fn get_detail_cached<F, Fut>(&self, href: &str, fetch: F) -> Value
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Option<Value>>,
    {
        if let Some(body) = self.inner.get(href).await {
            debug!("[CACHE HIT] {}", href);
            return body;
        }

        debug!("[DETAIL] fetching {}", href);
        match fetch(href.to_owned()).await {
            Some(body) if !is_empty_body(&body) => {
                self.inner.set(href, body.clone()).await;
                debug!("[CACHE WRITE] {} (cache size: {})", href, self.inner.len().await);
                body
            }
            _ => {
                debug!("[CACHE SKIP] no valid response for {}", href);
                empty_object()
            }
        }
    }

    pub async fn list_keys(&self) -> Vec<String> {
        self.inner.keys().await
    }

    pub async fn clear(&self) {
        self.inner.clear().await;
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// `null`, `{}` and `[]` carry nothing worth memoizing.
pub fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
