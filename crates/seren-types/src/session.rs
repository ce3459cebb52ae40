//! Session identity and status types.

use serde::{Deserialize, Serialize};

/// Identity fields returned by the login exchange.
///
/// The credential itself (an httpOnly cookie) never passes through
/// application code; these are the only identity fields the runtime holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Backend user id.
    pub id: String,
    /// Account email.
    pub email: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Authentication state of the session.
///
/// `Unknown` is the only initial state, and is re-entered at the start of
/// every validation pass so concurrent readers observe "loading" rather than
/// a stale value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Validation has not completed.
    Unknown,
    /// A valid credential and identity are present.
    Authenticated,
    /// No valid credential.
    Anonymous,
}

/// Read-only view of the session handed to consumers.
///
/// Invariant: `status == Authenticated` exactly when `user` is present.
/// The constructors are the only way to build one, so the invariant cannot
/// be violated by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current authentication state.
    pub status: SessionStatus,
    /// Identity fields, present only when authenticated.
    pub user: Option<UserIdentity>,
}

impl SessionSnapshot {
    /// Initial state at process start.
    pub fn unknown() -> Self {
        Self {
            status: SessionStatus::Unknown,
            user: None,
        }
    }

    /// Authenticated with the given identity.
    pub fn authenticated(user: UserIdentity) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            user: Some(user),
        }
    }

    /// No valid credential.
    pub fn anonymous() -> Self {
        Self {
            status: SessionStatus::Anonymous,
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_invariant() {
        let authed = SessionSnapshot::authenticated(UserIdentity::new("7", "a@b.c"));
        assert!(authed.is_authenticated());
        assert!(authed.user.is_some());

        let anon = SessionSnapshot::anonymous();
        assert!(!anon.is_authenticated());
        assert!(anon.user.is_none());

        let unknown = SessionSnapshot::unknown();
        assert_eq!(unknown.status, SessionStatus::Unknown);
        assert!(unknown.user.is_none());
    }
}
