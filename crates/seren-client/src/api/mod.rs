//! Typed endpoint wrappers.

mod auth;

pub use auth::AuthApi;
