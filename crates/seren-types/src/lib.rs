//! Shared types for the Seren client runtime.
//!
//! This crate holds the value types that cross crate boundaries: the
//! normalized error record produced by the request pipeline, and the
//! session identity/status types read by application views.

pub mod error;
pub mod session;

pub use error::{ErrorKind, ErrorRecord};
pub use session::{SessionSnapshot, SessionStatus, UserIdentity};
