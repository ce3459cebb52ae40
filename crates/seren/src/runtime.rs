//! Runtime assembly.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use seren_cache::{CacheConfig, FileStore, KeyValueStore, MemoryStore, StatePreserver, TtlCache};
use seren_client::{ApiClient, ClientBuilder, Connectivity, IdentityStore};
use seren_config::SerenConfig;
use seren_session::SessionStore;

/// Assembled runtime: client, session store, and caches sharing one
/// configuration and one credential context.
///
/// Built once at process start via [`Runtime::init`]; there is no teardown,
/// the runtime lives as long as the process.
pub struct Runtime {
    client: ApiClient,
    session: SessionStore,
    cache: TtlCache<serde_json::Value>,
    preserver: StatePreserver,
    cleanup: tokio::task::JoinHandle<()>,
}

impl Runtime {
    /// Initialize with defaults: file-backed stores in the user data
    /// directory, and a startup validation pass.
    pub async fn init(config: SerenConfig) -> crate::Result<Self> {
        RuntimeBuilder::new(config).init().await
    }

    /// Start building a runtime with overridden stores or probes.
    pub fn builder(config: SerenConfig) -> RuntimeBuilder {
        RuntimeBuilder::new(config)
    }

    /// The request pipeline.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The shared TTL cache for slow-changing data.
    pub fn cache(&self) -> &TtlCache<serde_json::Value> {
        &self.cache
    }

    /// The state preserver.
    pub fn preserver(&self) -> &StatePreserver {
        &self.preserver
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.cleanup.abort();
    }
}

/// Builder for a [`Runtime`].
pub struct RuntimeBuilder {
    config: SerenConfig,
    identity_backing: Option<Arc<dyn KeyValueStore>>,
    state_backing: Option<Arc<dyn KeyValueStore>>,
    connectivity: Option<Arc<dyn Connectivity>>,
}

impl RuntimeBuilder {
    pub fn new(config: SerenConfig) -> Self {
        Self {
            config,
            identity_backing: None,
            state_backing: None,
            connectivity: None,
        }
    }

    /// Override the backing store for identity fields.
    pub fn identity_backing(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.identity_backing = Some(store);
        self
    }

    /// Override the backing store for preserved state.
    pub fn state_backing(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.state_backing = Some(store);
        self
    }

    /// Override the connectivity probe.
    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Assemble the runtime and run the startup validation pass.
    pub async fn init(self) -> crate::Result<Runtime> {
        let tuning = self.config.cache();
        let cache_config = CacheConfig::new()
            .with_default_ttl(Duration::from_secs(tuning.default_ttl_secs))
            .with_cleanup_interval(Duration::from_secs(tuning.cleanup_interval_secs))
            .with_preserve_ttl(Duration::from_secs(tuning.preserve_ttl_secs));

        let identity_backing = self
            .identity_backing
            .unwrap_or_else(|| default_store("identity.json"));
        let state_backing = self
            .state_backing
            .unwrap_or_else(|| default_store("preserved.json"));

        let identity = IdentityStore::new(identity_backing);
        let preserver = StatePreserver::with_ttl(state_backing, cache_config.preserve_ttl);

        let mut builder = ClientBuilder::from_config(&self.config).identity_store(identity);
        if let Some(connectivity) = self.connectivity {
            builder = builder.connectivity(connectivity);
        }
        let client = builder.build()?;

        let session = SessionStore::with_preserver(client.clone(), preserver.clone());

        let cache = TtlCache::new(cache_config.default_ttl);
        let cleanup = cache.spawn_cleanup(cache_config.cleanup_interval);

        debug!(base_url = %client.base_url(), "runtime assembled, validating session");
        session.validate().await;

        Ok(Runtime {
            client,
            session,
            cache,
            preserver,
            cleanup,
        })
    }
}

/// File store in the user data directory, memory store when none exists
/// (containers, test environments).
fn default_store(file_name: &str) -> Arc<dyn KeyValueStore> {
    match dirs::data_dir() {
        Some(dir) => Arc::new(FileStore::new(dir.join("seren").join(file_name))),
        None => Arc::new(MemoryStore::new()),
    }
}
