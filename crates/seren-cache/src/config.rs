//! Configuration for the cache layer.

use std::time::Duration;

/// Default TTL for cached values (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default interval for the periodic expiry sweep (5 minutes).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default TTL for preserved state (5 minutes).
pub const DEFAULT_PRESERVE_TTL: Duration = Duration::from_secs(5 * 60);

/// Tuning knobs for [`crate::TtlCache`] and [`crate::StatePreserver`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied by `set` when no explicit TTL is given.
    pub default_ttl: Duration,

    /// Interval for the background expiry sweep, if spawned.
    pub cleanup_interval: Duration,

    /// TTL applied to preserved state entries.
    pub preserve_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            preserve_ttl: DEFAULT_PRESERVE_TTL,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default TTL for cached values.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the background sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the TTL for preserved state entries.
    pub fn with_preserve_ttl(mut self, ttl: Duration) -> Self {
        self.preserve_ttl = ttl;
        self
    }
}
