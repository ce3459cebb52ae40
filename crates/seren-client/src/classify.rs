//! Error classification.
//!
//! Maps a raw failure (transport error or HTTP response) to a normalized
//! [`ErrorRecord`]. Classification is a total function: it never fails,
//! never panics, and always produces a renderable record.

use seren_types::{ErrorKind, ErrorRecord};

/// Low-level failure observed before any HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The connectivity probe reports the client offline.
    Offline,
    /// The attempt exceeded its time bound.
    Timeout,
    /// Connection-level failure while online (DNS, refused, reset).
    Connect(String),
    /// Unrecognized failure with no response.
    Other(String),
}

impl TransportFailure {
    /// Normalize a `reqwest` error using the connectivity probe's verdict.
    pub fn from_reqwest(err: &reqwest::Error, online: bool) -> Self {
        if !online {
            TransportFailure::Offline
        } else if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() || err.is_request() {
            TransportFailure::Connect(err.to_string())
        } else {
            TransportFailure::Other(err.to_string())
        }
    }
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportFailure::Offline => f.write_str("offline"),
            TransportFailure::Timeout => f.write_str("timeout"),
            TransportFailure::Connect(detail) => write!(f, "connect: {detail}"),
            TransportFailure::Other(detail) => write!(f, "transport: {detail}"),
        }
    }
}

/// Status and decoded body of a failed HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body, if the response carried one.
    pub body: Option<serde_json::Value>,
}

/// Body fields probed for a server-provided message, in priority order.
const MESSAGE_FIELDS: [&str; 3] = ["error", "detail", "message"];

/// Classify a raw failure into a normalized record. First match wins:
/// offline, timeout, transport failure, missing response, then status code.
///
/// When the response carries a body, a server-provided message is extracted
/// through the ordered rules in [`extract_message`] and replaces the generic
/// one; a malformed body silently keeps the status-derived message.
pub fn classify(
    failure: Option<&TransportFailure>,
    response: Option<&RawResponse>,
) -> ErrorRecord {
    let record = match failure {
        Some(TransportFailure::Offline) => ErrorRecord::new(
            ErrorKind::Network,
            "Connection Error",
            "You appear to be offline. Please check your internet connection.",
            true,
        ),
        Some(TransportFailure::Timeout) => ErrorRecord::new(
            ErrorKind::Timeout,
            "Request Timeout",
            "The request took too long. Please try again.",
            true,
        ),
        Some(TransportFailure::Connect(_)) => ErrorRecord::new(
            ErrorKind::Network,
            "Network Error",
            "Unable to connect to the server. Please check your connection and try again.",
            true,
        ),
        Some(TransportFailure::Other(_)) | None => match response {
            None => ErrorRecord::new(
                ErrorKind::Server,
                "Unexpected Error",
                "Something went wrong. Please try again.",
                true,
            ),
            Some(response) => from_status(response.status),
        },
    };

    let Some(body) = response.and_then(|r| r.body.as_ref()) else {
        return record;
    };
    match extract_message(body) {
        Some(message) => record.with_message(message),
        None => record,
    }
}

fn from_status(status: u16) -> ErrorRecord {
    match status {
        401 => ErrorRecord::new(
            ErrorKind::Auth,
            "Authentication Required",
            "Please log in to continue.",
            false,
        ),
        403 => ErrorRecord::new(
            ErrorKind::Auth,
            "Access Denied",
            "You don't have permission to perform this action.",
            false,
        ),
        404 => ErrorRecord::new(
            ErrorKind::Server,
            "Not Found",
            "The requested resource was not found.",
            false,
        ),
        500.. => ErrorRecord::new(
            ErrorKind::Server,
            "Server Error",
            "The server is experiencing issues. Please try again later.",
            true,
        ),
        400..=499 => ErrorRecord::new(
            ErrorKind::Validation,
            "Request Error",
            "There was an issue with your request. Please check your input and try again.",
            false,
        ),
        _ => ErrorRecord::new(
            ErrorKind::Server,
            "Unknown Error",
            "An unexpected error occurred. Please try again.",
            true,
        ),
    }
}

/// Extract a human-readable message from an error body.
///
/// Rules are evaluated in priority order, first non-empty wins:
/// 1. the `error`, `detail`, and `message` fields, in that order;
/// 2. the first entry of `non_field_errors`;
/// 3. the first field whose value is a non-empty string array, rendered
///    as `field: message`.
pub fn extract_message(body: &serde_json::Value) -> Option<String> {
    let object = body.as_object()?;

    for field in MESSAGE_FIELDS {
        if let Some(text) = object.get(field).and_then(|v| v.as_str()) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    if let Some(text) = object
        .get("non_field_errors")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|v| v.as_str())
    {
        return Some(text.to_string());
    }

    for (name, value) in object {
        if name == "non_field_errors" {
            continue;
        }
        if let Some(text) = value.as_array().and_then(|a| a.first()).and_then(|v| v.as_str()) {
            return Some(format!("{}: {}", name, text));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_offline_wins_first() {
        let record = classify(Some(&TransportFailure::Offline), None);
        assert_eq!(record.kind, ErrorKind::Network);
        assert!(record.can_retry);
        assert_eq!(record.title, "Connection Error");
    }

    #[test]
    fn test_timeout() {
        let record = classify(Some(&TransportFailure::Timeout), None);
        assert_eq!(record.kind, ErrorKind::Timeout);
        assert!(record.can_retry);
    }

    #[test]
    fn test_connect_failure_is_network() {
        let failure = TransportFailure::Connect("connection refused".into());
        let record = classify(Some(&failure), None);
        assert_eq!(record.kind, ErrorKind::Network);
        assert!(record.can_retry);
    }

    #[test]
    fn test_no_response_no_failure_is_conservative() {
        let record = classify(None, None);
        assert_eq!(record.kind, ErrorKind::Server);
        assert!(record.can_retry);
    }

    #[test]
    fn test_status_taxonomy() {
        let cases = [
            (401, ErrorKind::Auth, false),
            (403, ErrorKind::Auth, false),
            (404, ErrorKind::Server, false),
            (422, ErrorKind::Validation, false),
            (500, ErrorKind::Server, true),
            (503, ErrorKind::Server, true),
        ];
        for (status, kind, can_retry) in cases {
            let record = classify(None, Some(&RawResponse { status, body: None }));
            assert_eq!(record.kind, kind, "status {status}");
            assert_eq!(record.can_retry, can_retry, "status {status}");
        }
    }

    #[test]
    fn test_message_extraction_priority() {
        let body = json!({"detail": "token expired", "message": "other"});
        assert_eq!(extract_message(&body), Some("token expired".to_string()));

        let body = json!({"error": "bad creds", "detail": "ignored"});
        assert_eq!(extract_message(&body), Some("bad creds".to_string()));
    }

    #[test]
    fn test_non_field_errors() {
        let body = json!({"non_field_errors": ["Unable to log in."]});
        assert_eq!(extract_message(&body), Some("Unable to log in.".to_string()));
    }

    #[test]
    fn test_field_level_errors() {
        let body = json!({"email": ["This field is required."]});
        assert_eq!(
            extract_message(&body),
            Some("email: This field is required.".to_string())
        );
    }

    #[test]
    fn test_extracted_message_overrides_generic() {
        let response = RawResponse {
            status: 400,
            body: Some(json!({"error": "Email and password are required"})),
        };
        let record = classify(None, Some(&response));
        assert_eq!(record.kind, ErrorKind::Validation);
        assert_eq!(record.message, "Email and password are required");
        assert_eq!(record.title, "Request Error");
    }

    #[test]
    fn test_malformed_body_falls_back() {
        let response = RawResponse {
            status: 500,
            body: Some(json!("not an object")),
        };
        let record = classify(None, Some(&response));
        assert_eq!(
            record.message,
            "The server is experiencing issues. Please try again later."
        );
    }

    #[test]
    fn test_empty_fields_skipped() {
        let body = json!({"error": "", "detail": "the real one"});
        assert_eq!(extract_message(&body), Some("the real one".to_string()));
    }
}
