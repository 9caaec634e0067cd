//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and a soft memory budget.

mod entry;
mod size;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use size::{estimate_size, parse_size, ByteSize, SizeUnit, DEFAULT_MAX_MEMORY};
pub use stats::{CacheCounters, CacheStats};
pub use store::{MemCache, SetOutcome};
