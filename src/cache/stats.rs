//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, expirations and
//! budget rejections.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Counters ==
/// Live counters shared by every handle of a cache.
///
/// Atomics so that operations holding only shared access can record hits.
#[derive(Debug, Default)]
pub struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    rejected: AtomicU64,
}

impl CacheCounters {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self, count: u64) {
        self.expired.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters into a fresh [`CacheStats`] with empty size fields.
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            ..CacheStats::default()
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed because their TTL elapsed
    pub expired: u64,
    /// Number of inserts evicted by the memory budget
    pub rejected: u64,
    /// Current number of entries in the cache
    pub total_entries: u64,
    /// Approximate bytes held by stored entries
    pub current_size: u64,
    /// Configured budget in bytes, 0 = unbounded
    pub max_size: u64,
    /// Canonical form of the configured budget, if any
    pub max_memory: Option<String>,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
