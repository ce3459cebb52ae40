//! Long-lived identity field storage.
//!
//! The credential itself lives in the transport's cookie store; the only
//! identity data the runtime persists are the id and email returned by the
//! login exchange. They are cleared by logout and by terminal auth failure.

use std::sync::Arc;

use tracing::warn;

use seren_cache::{KeyValueStore, MemoryStore};
use seren_types::UserIdentity;

const KEY_USER_ID: &str = "user_id";
const KEY_USER_EMAIL: &str = "user_email";

/// Persists the identity fields in a durable key/value store.
#[derive(Clone)]
pub struct IdentityStore {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityStore {
    /// Create a store over the given backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// In-memory store for tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist the identity fields.
    ///
    /// Storage faults are logged and swallowed: a failed write surfaces
    /// later as a missing identity, which the fail-closed validation pass
    /// resolves to `Anonymous`.
    pub fn save(&self, identity: &UserIdentity) {
        if let Err(err) = self.store.set(KEY_USER_ID, &identity.id) {
            warn!(error = %err, "failed to persist user id");
        }
        if let Err(err) = self.store.set(KEY_USER_EMAIL, &identity.email) {
            warn!(error = %err, "failed to persist user email");
        }
    }

    /// Load the identity, present only when both fields are stored.
    pub fn load(&self) -> Option<UserIdentity> {
        let id = self.store.get(KEY_USER_ID).ok().flatten()?;
        let email = self.store.get(KEY_USER_EMAIL).ok().flatten()?;
        Some(UserIdentity { id, email })
    }

    /// Remove both identity fields.
    pub fn clear(&self) {
        if let Err(err) = self.store.remove(KEY_USER_ID) {
            warn!(error = %err, "failed to clear user id");
        }
        if let Err(err) = self.store.remove(KEY_USER_EMAIL) {
            warn!(error = %err, "failed to clear user email");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let store = IdentityStore::in_memory();
        assert!(store.load().is_none());

        store.save(&UserIdentity::new("7", "a@b.c"));
        let loaded = store.load().unwrap();
        assert_eq!(loaded.id, "7");
        assert_eq!(loaded.email, "a@b.c");

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_partial_identity_is_absent() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("user_id", "7").unwrap();

        let store = IdentityStore::new(backend);
        assert!(store.load().is_none());
    }
}
