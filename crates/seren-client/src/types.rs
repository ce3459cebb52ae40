//! Request options and the call result surface.

use std::time::Duration;

use serde::de::DeserializeOwned;
use seren_types::ErrorRecord;

/// Retry policy applied per call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Time bound for each individual attempt.
    pub timeout: Duration,

    /// Maximum retries after the first attempt.
    pub max_retries: u32,

    /// Base backoff delay, doubled after every failed attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(15_000),
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
        }
    }
}

impl From<&seren_config::RetryConfig> for RetryPolicy {
    fn from(config: &seren_config::RetryConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

/// Options for a single [`crate::ApiClient::call`] invocation.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// HTTP method.
    pub method: reqwest::Method,

    /// JSON body, sent for non-GET methods only.
    pub body: Option<serde_json::Value>,

    /// Extra request headers.
    pub headers: Vec<(String, String)>,

    /// Check/obtain a valid credential before the request.
    pub require_auth: bool,

    /// Issue a single attempt, no retry loop.
    pub skip_retry: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            method: reqwest::Method::GET,
            body: None,
            headers: Vec::new(),
            require_auth: false,
            skip_retry: false,
        }
    }
}

impl CallOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn put(body: serde_json::Value) -> Self {
        Self {
            method: reqwest::Method::PUT,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: reqwest::Method::DELETE,
            ..Self::default()
        }
    }

    /// Require a valid credential before the request.
    pub fn with_auth(mut self) -> Self {
        self.require_auth = true;
        self
    }

    /// Disable the retry loop for this call.
    pub fn with_skip_retry(mut self) -> Self {
        self.skip_retry = true;
        self
    }

    /// Add a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Outcome of a call. Always returned, never thrown: failure is encoded
/// in `error`, and `status == 0` means no HTTP response was obtained.
#[derive(Debug, Clone)]
pub struct CallResult {
    /// Whether the request succeeded.
    pub ok: bool,

    /// HTTP status, or 0 when no response was obtained.
    pub status: u16,

    /// Parsed JSON body on success. A non-JSON success body yields `None`.
    pub data: Option<serde_json::Value>,

    /// Normalized error on failure.
    pub error: Option<ErrorRecord>,
}

impl CallResult {
    pub fn success(status: u16, data: Option<serde_json::Value>) -> Self {
        Self {
            ok: true,
            status,
            data,
            error: None,
        }
    }

    pub fn failure(status: u16, error: ErrorRecord) -> Self {
        Self {
            ok: false,
            status,
            data: None,
            error: Some(error),
        }
    }

    /// Deserialize the success body into a concrete type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.data
            .as_ref()
            .and_then(|data| serde_json::from_value(data.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seren_types::ErrorKind;

    #[test]
    fn test_options_builders() {
        let options = CallOptions::post(serde_json::json!({"a": 1}))
            .with_auth()
            .with_header("X-Request-Id", "7");

        assert_eq!(options.method, reqwest::Method::POST);
        assert!(options.require_auth);
        assert!(!options.skip_retry);
        assert_eq!(options.headers.len(), 1);
    }

    #[test]
    fn test_result_data_as() {
        let result = CallResult::success(200, Some(serde_json::json!({"id": "3"})));

        #[derive(serde::Deserialize)]
        struct Body {
            id: String,
        }

        let body: Body = result.data_as().unwrap();
        assert_eq!(body.id, "3");
    }

    #[test]
    fn test_failure_carries_record() {
        let record = ErrorRecord::new(ErrorKind::Server, "Server Error", "boom", true);
        let result = CallResult::failure(500, record);
        assert!(!result.ok);
        assert_eq!(result.status, 500);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Server);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = seren_config::RetryConfig {
            timeout_ms: 500,
            max_retries: 2,
            base_delay_ms: 10,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.timeout, Duration::from_millis(500));
        assert_eq!(policy.max_retries, 2);
    }
}
