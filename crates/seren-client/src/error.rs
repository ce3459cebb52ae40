//! Internal client error types.
//!
//! These never cross the pipeline surface: [`crate::ApiClient::call`]
//! encodes all failure in its returned [`crate::CallResult`]. The error
//! type here covers the fallible plumbing around it (building a client,
//! joining URLs).

use thiserror::Error;

/// Client construction and plumbing errors.
#[derive(Debug, Error)]
pub enum Error {
    /// URL parsing or joining failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid builder configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for client construction.
pub type Result<T> = std::result::Result<T, Error>;
