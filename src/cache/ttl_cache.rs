use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::observability::metrics::get_metrics;

/// Cached value with its absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration) -> Self {
        Self { value, expires_at: Instant::now() + ttl }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Capacity-bounded, time-expiring cache with least-recently-used eviction.
///
/// Recency order lives in the `LruCache`; it is used unbounded and trimmed by
/// hand so that each `set` evicts at most one entry. Every operation takes the
/// single mutex, and no guard is held across an await on I/O.
#[derive(Debug)]
pub struct BoundedTtlCache<V> {
    name: &'static str,
    capacity: NonZeroUsize,
    ttl: Duration,
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
}

impl<V: Clone> BoundedTtlCache<V> {
    /// `name` labels log lines and metrics. A zero capacity is raised to one.
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            capacity,
            ttl,
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the value if present and not expired, marking it most recently used.
    /// An expired entry is removed on the way out.
    pub async fn get(&self, key: &str) -> Option<V> {
        let metrics = get_metrics().await;
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let expired = match entries.peek(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                metrics.cache_misses.with_label_values(&[self.name]).inc();
                return None;
            }
        };

        if expired {
            entries.pop(key);
            debug!("[{}] entry '{}' expired, removed", self.name, key);
            metrics.cache_misses.with_label_values(&[self.name]).inc();
            metrics.cache_entries.with_label_values(&[self.name]).set(entries.len() as i64);
            return None;
        }

        metrics.cache_hits.with_label_values(&[self.name]).inc();
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite `key` with a fresh expiry and make it most recently used.
    pub async fn set(&self, key: &str, value: V) {
        let mut entries = self.entries.lock().await;
        entries.push(key.to_owned(), CacheEntry::new(value, self.ttl));

        if entries.len() > self.capacity.get() {
            if let Some((evicted, _)) = entries.pop_lru() {
                debug!("[{}] capacity {} reached, evicted '{}'", self.name, self.capacity, evicted);
            }
        }

        get_metrics()
            .await
            .cache_entries
            .with_label_values(&[self.name])
            .set(entries.len() as i64);
    }

    pub async fn remove(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        entries.pop(key).map(|entry| entry.value)
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        entries.clear();
        get_metrics()
            .await
            .cache_entries
            .with_label_values(&[self.name])
            .set(0);
    }

    /// Number of stored entries, including expired ones not yet collected.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Snapshot of live keys, least recently used first. Recency is left untouched.
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        entries
            .iter()
            .rev()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.to_owned())
            .collect()
    }
}
