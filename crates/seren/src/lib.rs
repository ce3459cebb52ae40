//! Seren: resilient session and request runtime.
//!
//! Maintains an authenticated session against a cookie-based backend and
//! shields application views from transient network failure, credential
//! expiry, and inconsistent error payload shapes.
//!
//! [`Runtime`] wires the pieces together: configuration, the request
//! pipeline, the session store, and the two supporting caches. Most
//! applications construct one at startup and hand its parts to their views.
//!
//! # Example
//!
//! ```no_run
//! use seren::Runtime;
//!
//! # async fn example() -> seren::Result<()> {
//! let config = seren_config::load().unwrap_or_default();
//! let runtime = Runtime::init(config).await?;
//!
//! if runtime.session().snapshot().is_authenticated() {
//!     let result = runtime.client().get_auth("/api/auth/user/profile/").await;
//!     println!("{:?}", result.data);
//! }
//! # Ok(())
//! # }
//! ```

mod runtime;

pub use runtime::{Runtime, RuntimeBuilder};

pub use seren_cache::{cache_key, FileStore, KeyValueStore, MemoryStore, StatePreserver, TtlCache};
pub use seren_client::{
    classify, ApiClient, AuthApi, CallOptions, CallResult, ClientBuilder, Connectivity,
    IdentityStore, RetryPolicy,
};
pub use seren_config::SerenConfig;
pub use seren_session::SessionStore;
pub use seren_types::{ErrorKind, ErrorRecord, SessionSnapshot, SessionStatus, UserIdentity};

/// Result type for runtime construction.
pub type Result<T> = std::result::Result<T, seren_client::Error>;
