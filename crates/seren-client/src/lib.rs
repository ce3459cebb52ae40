//! Resilient request pipeline for the Seren client runtime.
//!
//! Issues HTTP calls against a cookie-authenticated backend with a bounded
//! per-attempt timeout, exponential-backoff retry, and one transparent
//! credential refresh cycle on expiry. Every failure is normalized into an
//! [`ErrorRecord`] before it reaches the caller: [`ApiClient::call`] never
//! returns an error, it returns a [`CallResult`] that encodes one.
//!
//! # Example
//!
//! ```no_run
//! use seren_client::{ApiClient, CallOptions};
//!
//! # async fn example() -> seren_client::Result<()> {
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:8000")
//!     .build()?;
//!
//! let result = client.get_auth("/api/auth/user/profile/").await;
//! if result.ok {
//!     println!("profile: {:?}", result.data);
//! } else if let Some(error) = &result.error {
//!     eprintln!("{error}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod classify;
pub mod connectivity;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod types;

pub use api::AuthApi;
pub use classify::{classify, RawResponse, TransportFailure};
pub use connectivity::{AlwaysOnline, Connectivity, SharedFlag};
pub use error::{Error, Result};
pub use identity::IdentityStore;
pub use pipeline::{ApiClient, ClientBuilder};
pub use types::{CallOptions, CallResult, RetryPolicy};

pub use seren_types::{ErrorKind, ErrorRecord, UserIdentity};
