//! Cache Module
//!
//! Provides an in-process cache with size-watermark LRU eviction and TTL
//! expiration.

mod clock;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheSize, Entry, Lookup};
pub use lru::RecencyIndex;
pub use stats::CacheStats;
pub use store::{Cache, Reclaimed};

pub(crate) use store::Shared;
