//! Generic expiring key/value cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, trace};

/// Entry stored in the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached value.
    pub data: V,

    /// When this entry stops being served.
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(data: V, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Expiring key/value cache.
///
/// TTL is the only reclamation policy: there is no size-based eviction.
/// Expired entries are removed lazily when read through [`TtlCache::get`],
/// and in bulk by [`TtlCache::cleanup`] (or the background sweep spawned by
/// [`TtlCache::spawn_cleanup`]) as a backstop for keys that are never read
/// again.
///
/// Clones share the same underlying map.
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Insert a value under the default TTL.
    pub fn set(&self, key: impl Into<String>, data: V) {
        self.set_with_ttl(key, data, self.default_ttl);
    }

    /// Insert a value with an explicit TTL.
    pub fn set_with_ttl(&self, key: impl Into<String>, data: V, ttl: Duration) {
        let key = key.into();
        trace!(key = %key, ttl_ms = ttl.as_millis() as u64, "cache set");
        self.inner.write().insert(key, CacheEntry::new(data, ttl));
    }

    /// Get a value if present and not expired.
    ///
    /// Reading an expired entry deletes it, so a later [`TtlCache::has`]
    /// will not see it either, regardless of whether a sweep has run.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut map = self.inner.write();
        match map.get(key) {
            None => None,
            Some(entry) if entry.is_expired() => {
                debug!(key = %key, "cache entry expired on read");
                map.remove(key);
                None
            }
            Some(entry) => Some(entry.data.clone()),
        }
    }

    /// Check whether a key is present and not expired.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove a single entry.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner.write().remove(key).map(|e| e.data)
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn clear_by_prefix(&self, prefix: &str) {
        let mut map = self.inner.write();
        map.retain(|key, _| !key.starts_with(prefix));
    }

    /// Remove all expired entries, returning how many were dropped.
    pub fn cleanup(&self) -> usize {
        let mut map = self.inner.write();
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired());
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, "cache sweep removed expired entries");
        }
        removed
    }

    /// Number of stored entries, including any not yet swept.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Spawn a background task sweeping expired entries on a fixed interval.
    ///
    /// The task holds only a clone of the cache; dropping the returned handle
    /// does not stop it, aborting it does.
    pub fn spawn_cleanup(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                cache.cleanup();
            }
        })
    }
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            default_ttl: self.default_ttl,
        }
    }
}

/// Derive a deterministic cache key from a prefix and named parameters.
///
/// Parameters are sorted by name before joining, so argument order never
/// affects the key.
pub fn cache_key(prefix: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return prefix.to_string();
    }
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined: Vec<String> = sorted
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect();
    format!("{}_{}", prefix, joined.join(","))
}
