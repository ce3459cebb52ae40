//! Normalized error taxonomy.
//!
//! Every failure the request pipeline can produce is collapsed into an
//! [`ErrorRecord`]: a taxonomy tag, a short title, a human-readable message,
//! and a retryability flag. Callers render these directly instead of
//! interpreting raw status codes or transport errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error taxonomy tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Connectivity failure: offline, DNS, refused connection.
    Network,
    /// Authentication or authorization failure (401/403).
    Auth,
    /// Client-side request error (4xx other than auth).
    Validation,
    /// Server-side failure (404, 5xx, or unrecognized).
    Server,
    /// The attempt exceeded its time bound.
    Timeout,
    /// A body could not be decoded.
    Parse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Auth => "authentication",
            ErrorKind::Validation => "validation",
            ErrorKind::Server => "server",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Parse => "parse",
        };
        f.write_str(name)
    }
}

/// Normalized error record, created once per failed operation.
///
/// Immutable value type: the pipeline builds it, the presentation layer
/// renders it. `can_retry` tells the caller whether re-issuing the same
/// operation can plausibly succeed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Taxonomy tag.
    pub kind: ErrorKind,
    /// Short title suitable for a heading.
    pub title: String,
    /// Human-readable detail.
    pub message: String,
    /// Whether re-issuing the operation can plausibly succeed.
    pub can_retry: bool,
    /// When the failure was observed.
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        kind: ErrorKind,
        title: impl Into<String>,
        message: impl Into<String>,
        can_retry: bool,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            can_retry,
            timestamp: Utc::now(),
        }
    }

    /// Replace the message, keeping everything else.
    ///
    /// Used when a more specific message was extracted from a response body.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Check if this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::Auth
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_display() {
        let record = ErrorRecord::new(
            ErrorKind::Timeout,
            "Request Timeout",
            "The request took too long. Please try again.",
            true,
        );
        assert_eq!(
            record.to_string(),
            "Request Timeout: The request took too long. Please try again."
        );
        assert!(record.can_retry);
    }

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::Validation).unwrap();
        assert_eq!(json, "\"validation\"");
    }

    #[test]
    fn test_with_message_overrides() {
        let record = ErrorRecord::new(ErrorKind::Validation, "Request Error", "generic", false)
            .with_message("email: This field is required.");
        assert_eq!(record.message, "email: This field is required.");
        assert_eq!(record.title, "Request Error");
    }
}
