//! Session state machine for the Seren client runtime.
//!
//! [`SessionStore`] owns the process-wide authentication state: whether a
//! valid credential is present, and who the user is. Views read snapshots;
//! the store is written only by its own operations (`validate`, `login`,
//! `logout`) and fails closed: every ambiguous or failed check collapses
//! to `Anonymous`, never to an error state.

mod store;

pub use store::SessionStore;

pub use seren_types::{SessionSnapshot, SessionStatus, UserIdentity};
