//! Connectivity probe.
//!
//! The caller-detectable offline condition. Transport failures while the
//! probe reports offline are terminal (retrying without connectivity cannot
//! help) and classify as `Network` immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reports whether the client currently has connectivity.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Default probe: assumes connectivity.
///
/// Platforms with a real network signal (mobile, desktop network watcher)
/// supply their own implementation; with this one the offline
/// short-circuit simply never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Probe backed by a shared flag, for tests and embedders that receive
/// connectivity change events.
#[derive(Debug, Clone, Default)]
pub struct SharedFlag {
    online: Arc<AtomicBool>,
}

impl SharedFlag {
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Connectivity for SharedFlag {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}
