//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [api]
//! base_url = "https://app.example.com"
//!
//! [api.endpoints]
//! login = "/api/auth/login/"
//!
//! [retry]
//! timeout_ms = 15000
//! max_retries = 3
//! base_delay_ms = 1000
//!
//! [cache]
//! default_ttl_secs = 300
//! ```
//!
//! All sections are optional so partial configs (project-local overrides)
//! can be loaded and merged on top of a base config.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerenConfig {
    /// Backend connection settings.
    pub api: Option<ApiConfig>,

    /// Retry policy tuning.
    pub retry: Option<RetryConfig>,

    /// Cache tuning.
    pub cache: Option<CacheTuning>,
}

impl SerenConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: SerenConfig) {
        if other.api.is_some() {
            self.api = other.api;
        }
        if other.retry.is_some() {
            self.retry = other.retry;
        }
        if other.cache.is_some() {
            self.cache = other.cache;
        }
    }

    /// Resolved API section (defaults applied).
    pub fn api(&self) -> ApiConfig {
        self.api.clone().unwrap_or_default()
    }

    /// Resolved retry section (defaults applied).
    pub fn retry(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Resolved cache section (defaults applied).
    pub fn cache(&self) -> CacheTuning {
        self.cache.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API
// ─────────────────────────────────────────────────────────────────────────────

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend, no trailing slash required.
    pub base_url: String,

    /// Endpoint path table.
    pub endpoints: Endpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

/// Paths of the auth endpoints on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub login: String,
    pub register: String,
    pub verify: String,
    pub logout: String,
    /// Credential validity probe.
    pub check_auth: String,
    /// Credential refresh endpoint.
    pub refresh: String,
    /// Authenticated profile endpoint.
    pub profile: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/api/auth/login/".to_string(),
            register: "/api/auth/register/".to_string(),
            verify: "/api/auth/verify/".to_string(),
            logout: "/api/auth/logout/".to_string(),
            check_auth: "/api/auth/user/authenticated/".to_string(),
            refresh: "/api/auth/token/refresh/".to_string(),
            profile: "/api/auth/user/profile/".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────────────────────────────────────

/// Retry policy tuning, applied per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Per-attempt time bound in milliseconds.
    pub timeout_ms: u64,

    /// Maximum retries after the first attempt.
    pub max_retries: u32,

    /// Base backoff delay in milliseconds, doubled each attempt.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_retries: 3,
            base_delay_ms: 1_000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

/// Cache tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTuning {
    /// Default TTL for cached values, in seconds.
    pub default_ttl_secs: u64,

    /// Interval for the background expiry sweep, in seconds.
    pub cleanup_interval_secs: u64,

    /// TTL for preserved state entries, in seconds.
    pub preserve_ttl_secs: u64,
}

impl Default for CacheTuning {
    fn default() -> Self {
        Self {
            default_ttl_secs: 5 * 60,
            cleanup_interval_secs: 5 * 60,
            preserve_ttl_secs: 5 * 60,
        }
    }
}
