//! Configuration for the Seren client runtime.
//!
//! TOML-based configuration with:
//! - Backend connection settings (base URL + endpoint table)
//! - Retry policy tuning (timeout, attempt budget, backoff base)
//! - Cache tuning (TTLs, sweep interval)
//! - File layering (user config + local overrides merged section-wise)
//! - Environment override for the base URL (`SEREN_BASE_URL`)

mod discovery;
mod error;
mod types;

pub use discovery::{config_path, load, load_from, BASE_URL_ENV};
pub use error::{ConfigError, Result};
pub use types::{ApiConfig, CacheTuning, Endpoints, RetryConfig, SerenConfig};
