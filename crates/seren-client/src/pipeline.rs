//! Request pipeline implementation.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use seren_config::{Endpoints, SerenConfig};
use seren_types::{ErrorKind, ErrorRecord};

use crate::api::AuthApi;
use crate::classify::{classify, RawResponse, TransportFailure};
use crate::connectivity::{AlwaysOnline, Connectivity};
use crate::error::{Error, Result};
use crate::identity::IdentityStore;
use crate::types::{CallOptions, CallResult, RetryPolicy};

/// Resilient HTTP client for a cookie-authenticated backend.
///
/// Every call is bounded by a per-attempt timeout, retried with exponential
/// backoff where retrying can help, and (for authenticated calls) carried
/// through one transparent credential refresh cycle on a 401. The credential
/// itself is an httpOnly cookie held by the underlying cookie store; it is
/// attached to every request and never surfaces to application code.
///
/// Cheap to clone; clones share the connection pool and cookie store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    endpoints: Endpoints,
    identity: IdentityStore,
    connectivity: Arc<dyn Connectivity>,
}

impl ApiClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the endpoint table.
    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    /// Get the identity store shared with this client.
    pub fn identity(&self) -> &IdentityStore {
        &self.inner.identity
    }

    /// Access the auth endpoint wrappers.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a request. Never fails: all failure is encoded in the returned
    /// [`CallResult`].
    ///
    /// With `require_auth`, credential validity is checked (and refreshed if
    /// needed) before the request, and a final 401 triggers exactly one
    /// refresh-and-replay cycle. With `skip_retry`, a single attempt is made
    /// with no retry loop.
    pub async fn call(&self, path: &str, options: CallOptions) -> CallResult {
        if options.require_auth && !self.check_credential().await {
            debug!(path, "credential check failed before request");
            return CallResult::failure(
                401,
                classify(None, Some(&RawResponse { status: 401, body: None })),
            );
        }

        let result = self.dispatch(path, &options).await;

        if result.status == StatusCode::UNAUTHORIZED.as_u16() && options.require_auth {
            return self.refresh_and_replay(path, &options, result).await;
        }

        result
    }

    /// The pipeline core: timeout, retry loop, classification. No auth
    /// handling; [`ApiClient::call`] layers the pre-flight and refresh
    /// cycle on top, and the credential sub-protocol comes here directly
    /// so it cannot recurse into them.
    async fn dispatch(&self, path: &str, options: &CallOptions) -> CallResult {
        let url = match self.url(path) {
            Ok(url) => url,
            Err(err) => {
                return CallResult::failure(
                    0,
                    ErrorRecord::new(ErrorKind::Parse, "Invalid Request", err.to_string(), false),
                );
            }
        };

        let outcome = if options.skip_retry {
            self.attempt(&url, options).await
        } else {
            self.attempt_with_retry(&url, options).await
        };

        match outcome {
            Ok(response) => self.finish(response).await,
            Err(failure) => {
                warn!(path, failure = %failure, "request failed without a response");
                CallResult::failure(0, classify(Some(&failure), None))
            }
        }
    }

    /// Single attempt bounded by the per-attempt timeout.
    async fn attempt(
        &self,
        url: &Url,
        options: &CallOptions,
    ) -> std::result::Result<reqwest::Response, TransportFailure> {
        let mut request = self
            .inner
            .http
            .request(options.method.clone(), url.clone())
            .timeout(self.inner.retry.timeout);

        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if options.method != reqwest::Method::GET {
            if let Some(body) = &options.body {
                request = request.json(body);
            }
        }

        request
            .send()
            .await
            .map_err(|err| TransportFailure::from_reqwest(&err, self.inner.connectivity.is_online()))
    }

    /// Retry loop with exponential backoff.
    ///
    /// Terminal without retry: client errors other than 401 (they won't
    /// self-heal) and transport failures while offline. Everything else
    /// (5xx, 401, transport blips while online, timeouts) is retried until
    /// the budget is exhausted. A timed-out attempt counts against the
    /// budget like any other failure.
    async fn attempt_with_retry(
        &self,
        url: &Url,
        options: &CallOptions,
    ) -> std::result::Result<reqwest::Response, TransportFailure> {
        let max_retries = self.inner.retry.max_retries;
        let mut backoff = self.inner.retry.base_delay;
        let mut attempt = 0u32;

        loop {
            match self.attempt(url, options).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if status.is_client_error() && status != StatusCode::UNAUTHORIZED {
                        return Ok(response);
                    }
                    if attempt >= max_retries {
                        return Ok(response);
                    }
                    warn!(
                        status = status.as_u16(),
                        attempt = attempt + 1,
                        max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "request failed, retrying"
                    );
                }
                Err(failure) => {
                    if failure == TransportFailure::Offline {
                        return Err(failure);
                    }
                    if attempt >= max_retries {
                        return Err(failure);
                    }
                    warn!(
                        failure = %failure,
                        attempt = attempt + 1,
                        max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "transport failure, retrying"
                    );
                }
            }

            tokio::time::sleep(backoff).await;
            backoff *= 2;
            attempt += 1;
        }
    }

    /// One refresh cycle, then one replay without further backoff.
    ///
    /// On refresh failure the original 401 result, already classified as
    /// an auth error, is returned as-is.
    async fn refresh_and_replay(
        &self,
        path: &str,
        options: &CallOptions,
        original: CallResult,
    ) -> CallResult {
        if !self.refresh_credential().await {
            return original;
        }

        debug!("credential refreshed, replaying original request");
        let url = match self.url(path) {
            Ok(url) => url,
            Err(err) => {
                return CallResult::failure(
                    0,
                    ErrorRecord::new(ErrorKind::Parse, "Invalid Request", err.to_string(), false),
                );
            }
        };
        match self.attempt(&url, options).await {
            Ok(response) => self.finish(response).await,
            Err(failure) => CallResult::failure(0, classify(Some(&failure), None)),
        }
    }

    /// Decode the terminal response into a result.
    async fn finish(&self, response: reqwest::Response) -> CallResult {
        let status = response.status();
        let code = status.as_u16();
        // A non-JSON body decodes to None; for a success that is tolerated.
        let body = response.json::<serde_json::Value>().await.ok();

        if status.is_success() {
            CallResult::success(code, body)
        } else {
            CallResult::failure(code, classify(None, Some(&RawResponse { status: code, body })))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credential sub-protocol
    // ─────────────────────────────────────────────────────────────────────────

    /// Probe credential validity, refreshing once on a 401.
    ///
    /// Used as the pre-flight for authenticated calls and by the session
    /// store's validation pass. The probe goes through the pipeline core
    /// rather than [`ApiClient::call`], so it cannot recurse into the
    /// refresh cycle. A rejection other than 401 clears the local identity
    /// fields; a transport failure leaves them alone (the session store
    /// fails closed regardless).
    pub async fn check_credential(&self) -> bool {
        let path = self.inner.endpoints.check_auth.clone();
        let result = self
            .dispatch(&path, &CallOptions::get().with_skip_retry())
            .await;

        if result.ok {
            return true;
        }
        if result.status == StatusCode::UNAUTHORIZED.as_u16() {
            debug!("credential rejected, attempting refresh");
            return self.refresh_credential().await;
        }
        debug!(status = result.status, "credential check failed");
        if result.status != 0 {
            self.inner.identity.clear();
        }
        false
    }

    /// Request a new credential from the refresh endpoint.
    ///
    /// The new credential lands in the cookie store; on any failure the
    /// local identity fields are cleared so the session fails closed. The
    /// refresh request itself is never retried and never triggers another
    /// refresh; its own 401 is terminal.
    pub async fn refresh_credential(&self) -> bool {
        let path = self.inner.endpoints.refresh.clone();
        let options = CallOptions {
            method: reqwest::Method::POST,
            ..CallOptions::default()
        }
        .with_skip_retry();
        let result = self.dispatch(&path, &options).await;

        if result.ok {
            debug!("credential refreshed");
            return true;
        }
        warn!(status = result.status, "credential refresh failed");
        self.inner.identity.clear();
        false
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Convenience verbs
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> CallResult {
        self.call(path, CallOptions::get()).await
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> CallResult {
        self.call(path, CallOptions::post(body)).await
    }

    pub async fn put(&self, path: &str, body: serde_json::Value) -> CallResult {
        self.call(path, CallOptions::put(body)).await
    }

    pub async fn delete(&self, path: &str) -> CallResult {
        self.call(path, CallOptions::delete()).await
    }

    pub async fn get_auth(&self, path: &str) -> CallResult {
        self.call(path, CallOptions::get().with_auth()).await
    }

    pub async fn post_auth(&self, path: &str, body: serde_json::Value) -> CallResult {
        self.call(path, CallOptions::post(body).with_auth()).await
    }

    pub async fn put_auth(&self, path: &str, body: serde_json::Value) -> CallResult {
        self.call(path, CallOptions::put(body).with_auth()).await
    }

    pub async fn delete_auth(&self, path: &str) -> CallResult {
        self.call(path, CallOptions::delete().with_auth()).await
    }

    /// Build a URL for an endpoint path (query string allowed).
    fn url(&self, path: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(Error::from)
    }
}

/// Builder for creating an [`ApiClient`].
pub struct ClientBuilder {
    base_url: Option<String>,
    retry: RetryPolicy,
    endpoints: Endpoints,
    identity: Option<IdentityStore>,
    connectivity: Arc<dyn Connectivity>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            retry: RetryPolicy::default(),
            endpoints: Endpoints::default(),
            identity: None,
            connectivity: Arc::new(AlwaysOnline),
            user_agent: None,
        }
    }

    /// Seed the builder from a loaded config.
    pub fn from_config(config: &SerenConfig) -> Self {
        let api = config.api();
        Self::new()
            .base_url(api.base_url)
            .endpoints(api.endpoints)
            .retry_policy(RetryPolicy::from(&config.retry()))
    }

    /// Set the base URL for the backend.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the retry policy.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the endpoint table.
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the identity store (defaults to an in-memory one).
    pub fn identity_store(mut self, identity: IdentityStore) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the connectivity probe (defaults to [`AlwaysOnline`]).
    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Normalize so joining endpoint paths keeps the full base path.
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("seren/{}", env!("CARGO_PKG_VERSION")));

        // The cookie store is the credential context: the backend sets
        // httpOnly cookies and every request carries them back.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                retry: self.retry,
                endpoints: self.endpoints,
                identity: self.identity.unwrap_or_else(IdentityStore::in_memory),
                connectivity: self.connectivity,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
