//! TTL cache and cross-navigation state preservation.
//!
//! Two small stores the rest of the runtime leans on:
//!
//! - [`TtlCache`]: a generic expiring key/value cache used to avoid redundant
//!   fetches of slow-changing data. TTL is the only reclamation policy;
//!   expired entries are dropped lazily on read and by a periodic sweep.
//! - [`StatePreserver`]: short-lived, consume-on-read persistence over a
//!   durable [`KeyValueStore`], used to survive full restarts that would
//!   otherwise discard in-memory state. Best-effort: storage faults degrade
//!   to "nothing preserved."

mod config;
mod error;
mod preserve;
mod store;
mod ttl;

pub use config::CacheConfig;
pub use error::{Error, Result};
pub use preserve::{StatePreserver, PRESERVED_PREFIX};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use ttl::{cache_key, CacheEntry, TtlCache};
