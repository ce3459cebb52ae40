//! Session store implementation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info};

use seren_cache::{cache_key, StatePreserver, TtlCache};
use seren_client::ApiClient;
use seren_types::{SessionSnapshot, SessionStatus, UserIdentity};

/// TTL for the cached profile payload.
const PROFILE_TTL: Duration = Duration::from_secs(10 * 60);

/// Process-wide authentication state.
///
/// Starts `Unknown`, and transitions only through [`SessionStore::validate`],
/// [`SessionStore::login`], and [`SessionStore::logout`]. Readers get
/// consistent snapshots; writers cannot interleave because every transition
/// takes the state lock for the whole write.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<SessionSnapshot>,
    /// Single-flight guard: one validation pass in progress at a time.
    validate_lock: tokio::sync::Mutex<()>,
    client: ApiClient,
    preserver: Option<StatePreserver>,
    profile_cache: TtlCache<serde_json::Value>,
}

impl SessionStore {
    /// Create a store in the `Unknown` state.
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(SessionSnapshot::unknown()),
                validate_lock: tokio::sync::Mutex::new(()),
                client,
                preserver: None,
                profile_cache: TtlCache::new(PROFILE_TTL),
            }),
        }
    }

    /// Create a store that sweeps the given preserver on logout.
    pub fn with_preserver(client: ApiClient, preserver: StatePreserver) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(SessionSnapshot::unknown()),
                validate_lock: tokio::sync::Mutex::new(()),
                client,
                preserver: Some(preserver),
                profile_cache: TtlCache::new(PROFILE_TTL),
            }),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.read().clone()
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.inner.state.read().status
    }

    /// Current identity, present only when authenticated.
    pub fn user(&self) -> Option<UserIdentity> {
        self.inner.state.read().user.clone()
    }

    /// Validate the session against the backend.
    ///
    /// Re-enters `Unknown` first so concurrent readers observe "loading"
    /// rather than a stale value, then probes credential validity (with one
    /// transparent refresh on expiry) and requires the locally stored
    /// identity fields. Fail-closed throughout: a network failure and a
    /// rejected credential both land on `Anonymous`.
    ///
    /// A valid credential without local identity fields is treated as an
    /// inconsistent session and cleared rather than repaired from the
    /// server, so an interrupted login never half-authenticates. Known
    /// rough edge: this discards a session a profile fetch could recover.
    ///
    /// Idempotent, and single-flight: concurrent calls queue behind the
    /// in-progress pass.
    pub async fn validate(&self) -> SessionSnapshot {
        let _guard = self.inner.validate_lock.lock().await;

        *self.inner.state.write() = SessionSnapshot::unknown();

        let snapshot = if self.inner.client.check_credential().await {
            match self.inner.client.identity().load() {
                Some(identity) => {
                    debug!(user = %identity.email, "session validated");
                    SessionSnapshot::authenticated(identity)
                }
                None => {
                    debug!("credential valid but identity fields missing, clearing");
                    self.inner.client.identity().clear();
                    SessionSnapshot::anonymous()
                }
            }
        } else {
            debug!("credential check failed, session is anonymous");
            SessionSnapshot::anonymous()
        };

        *self.inner.state.write() = snapshot.clone();
        snapshot
    }

    /// Enter the authenticated state with the identity returned by a
    /// completed login exchange. No network round-trip.
    pub fn login(&self, identity: UserIdentity) {
        info!(user = %identity.email, "logged in");
        self.inner.client.identity().save(&identity);
        *self.inner.state.write() = SessionSnapshot::authenticated(identity);
    }

    /// Clear the local session and re-validate.
    ///
    /// Clears identity fields, preserved state, and cached profile data,
    /// then runs a validation pass so local and server state converge even
    /// when the server-side logout is still in flight. The server-side
    /// logout call itself is the caller's step
    /// ([`seren_client::AuthApi::logout`]).
    pub async fn logout(&self) {
        info!("logging out");
        self.inner.client.identity().clear();
        if let Some(preserver) = &self.inner.preserver {
            preserver.clear_all();
        }
        self.inner.profile_cache.clear();
        *self.inner.state.write() = SessionSnapshot::anonymous();

        self.validate().await;
    }

    /// Fetch the authenticated profile, cached per user.
    ///
    /// Returns `None` when not authenticated or when the fetch fails; the
    /// cached payload is reused until its TTL elapses.
    pub async fn profile(&self) -> Option<serde_json::Value> {
        let user = self.user()?;
        let key = cache_key("profile", &[("user", &user.id)]);

        if let Some(cached) = self.inner.profile_cache.get(&key) {
            debug!(user = %user.id, "profile served from cache");
            return Some(cached);
        }

        let result = self.inner.client.auth().profile().await;
        if !result.ok {
            return None;
        }
        let data = result.data?;
        self.inner.profile_cache.set(key, data.clone());
        Some(data)
    }
}
