//! Mem Cache - An embeddable in-process cache
//!
//! Provides a thread-safe key/value store with per-entry TTL expiration, a
//! soft memory budget and a background sweeper for expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{parse_size, MemCache, SetOutcome};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::{spawn_sweeper, SweeperHandle};
