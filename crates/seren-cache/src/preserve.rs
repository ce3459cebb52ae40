//! Consume-on-read state preservation.
//!
//! Survives full restarts that would otherwise discard in-memory state:
//! a caller preserves a payload under a namespace key before navigating
//! away and restores it once afterwards. A read consumes the entry
//! (at-most-once restoration), and a read past the TTL removes it and
//! returns nothing.
//!
//! Preservation is a best-effort optimization, not a correctness
//! requirement: storage faults are logged and swallowed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DEFAULT_PRESERVE_TTL;
use crate::store::KeyValueStore;

/// Reserved key prefix for preserved entries. The logout sweep removes
/// everything under it.
pub const PRESERVED_PREFIX: &str = "preserved_";

#[derive(Debug, Serialize, Deserialize)]
struct PreservedState {
    data: serde_json::Value,
    saved_at: DateTime<Utc>,
    ttl_ms: u64,
}

impl PreservedState {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.saved_at);
        age.num_milliseconds() < 0 || age.num_milliseconds() as u64 > self.ttl_ms
    }
}

/// Short-lived, key-namespaced persistence over a durable store.
#[derive(Clone)]
pub struct StatePreserver {
    store: Arc<dyn KeyValueStore>,
    default_ttl: Duration,
}

impl StatePreserver {
    /// Create a preserver over the given store with the default TTL.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, DEFAULT_PRESERVE_TTL)
    }

    /// Create a preserver with an explicit default TTL.
    pub fn with_ttl(store: Arc<dyn KeyValueStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Preserve a payload under the default TTL.
    pub fn preserve<T: Serialize>(&self, key: &str, data: &T) {
        self.preserve_with_ttl(key, data, self.default_ttl);
    }

    /// Preserve a payload with an explicit TTL.
    ///
    /// Faults (quota, disabled storage, serialization) are logged and
    /// swallowed; the caller proceeds as if nothing was preserved.
    pub fn preserve_with_ttl<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to serialize preserved state");
                return;
            }
        };

        let state = PreservedState {
            data: value,
            saved_at: Utc::now(),
            ttl_ms: ttl.as_millis() as u64,
        };

        let json = match serde_json::to_string(&state) {
            Ok(json) => json,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to encode preserved state");
                return;
            }
        };

        if let Err(err) = self.store.set(&self.storage_key(key), &json) {
            warn!(key = %key, error = %err, "failed to preserve state");
        }
    }

    /// Restore a payload, consuming the entry.
    ///
    /// Returns `None` for an absent, expired, or unreadable entry; the entry
    /// is removed in every one of those cases so a second read cannot
    /// observe stale data.
    pub fn restore(&self, key: &str) -> Option<serde_json::Value> {
        let storage_key = self.storage_key(key);

        let stored = match self.store.get(&storage_key) {
            Ok(stored) => stored?,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to read preserved state");
                return None;
            }
        };

        // Consume unconditionally: restoration is at-most-once.
        if let Err(err) = self.store.remove(&storage_key) {
            warn!(key = %key, error = %err, "failed to remove preserved state");
        }

        let state: PreservedState = match serde_json::from_str(&stored) {
            Ok(state) => state,
            Err(err) => {
                warn!(key = %key, error = %err, "discarding unreadable preserved state");
                return None;
            }
        };

        if state.is_expired(Utc::now()) {
            debug!(key = %key, "preserved state expired");
            return None;
        }

        Some(state.data)
    }

    /// Restore and deserialize into a concrete type.
    pub fn restore_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.restore(key)?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(key = %key, error = %err, "preserved state has unexpected shape");
                None
            }
        }
    }

    /// Remove every preserved entry. Used on logout so no leftover state
    /// bleeds into a new session.
    pub fn clear_all(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "failed to enumerate preserved state");
                return;
            }
        };

        for key in keys {
            if key.starts_with(PRESERVED_PREFIX) {
                if let Err(err) = self.store.remove(&key) {
                    warn!(key = %key, error = %err, "failed to clear preserved state");
                }
            }
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", PRESERVED_PREFIX, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn preserver() -> StatePreserver {
        StatePreserver::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_restore_consumes_entry() {
        let preserver = preserver();
        preserver.preserve("search", &serde_json::json!({"q": "rent"}));

        let first = preserver.restore("search");
        assert_eq!(first, Some(serde_json::json!({"q": "rent"})));

        // Second read must come up empty.
        assert_eq!(preserver.restore("search"), None);
    }

    #[test]
    fn test_expired_entry_returns_none() {
        let store = Arc::new(MemoryStore::new());
        let preserver = StatePreserver::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        preserver.preserve_with_ttl("form", &42u32, Duration::from_millis(0));

        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(preserver.restore("form"), None);
        // The entry must be gone from the store too.
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_restore_as_typed() {
        let preserver = preserver();
        preserver.preserve("count", &7u32);
        assert_eq!(preserver.restore_as::<u32>("count"), Some(7));
    }

    #[test]
    fn test_clear_all_only_touches_namespace() {
        let store = Arc::new(MemoryStore::new());
        store.set("unrelated", "keep").unwrap();

        let preserver = StatePreserver::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        preserver.preserve("a", &1u32);
        preserver.preserve("b", &2u32);

        preserver.clear_all();

        assert_eq!(preserver.restore("a"), None);
        assert_eq!(preserver.restore("b"), None);
        assert_eq!(store.get("unrelated").unwrap(), Some("keep".to_string()));
    }

    #[test]
    fn test_malformed_entry_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        store.set("preserved_bad", "not json at all").unwrap();

        let preserver = StatePreserver::new(Arc::clone(&store) as Arc<dyn KeyValueStore>);
        assert_eq!(preserver.restore("bad"), None);
        assert_eq!(store.get("preserved_bad").unwrap(), None);
    }
}
