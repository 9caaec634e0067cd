//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration and a soft
//! memory budget.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::size::{estimate_size, parse_size};
use crate::cache::{CacheCounters, CacheEntry, CacheStats};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::{spawn_sweeper, SweeperHandle};

// == Set Outcome ==
/// Result of a [`MemCache::set`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The entry is stored and readable
    Stored,
    /// The entry did not fit in the memory budget and was evicted
    OverBudget {
        /// Approximate size of the rejected value
        size: u64,
        /// Budget in force at the time of the call
        max_size: u64,
    },
}

impl SetOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, SetOutcome::Stored)
    }
}

// == Shelf ==
/// Entries, their accounted size and the budget, guarded as one unit.
#[derive(Debug)]
struct Shelf<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Sum of `size` over `entries`
    current_size: u64,
    /// Budget in bytes, 0 = unbounded
    max_size: u64,
    /// Canonical budget string from the size parser
    max_memory: Option<String>,
}

impl<V> Shelf<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            current_size: 0,
            max_size: 0,
            max_memory: None,
        }
    }

    fn add(&mut self, key: String, entry: CacheEntry<V>) {
        self.current_size += entry.size;
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.current_size -= entry.size;
        Some(entry)
    }

    fn fits(&self, size: u64) -> bool {
        self.max_size == 0 || self.current_size.saturating_add(size) <= self.max_size
    }
}

// == Mem Cache ==
/// Thread-safe key/value cache with per-entry TTL and a soft memory budget.
///
/// `MemCache` is a handle: clones share the same storage. Values are sized by
/// their JSON encoding, so `V` must be `Serialize` to be inserted and `Clone`
/// to be read back. Use `serde_json::Value` to store heterogeneous values.
///
/// Expired entries are removed lazily by [`get`](Self::get) and in bulk by the
/// background sweeper started with [`start_sweeper`](Self::start_sweeper).
pub struct MemCache<V> {
    shelf: Arc<RwLock<Shelf<V>>>,
    counters: Arc<CacheCounters>,
    sweep_interval: Duration,
}

impl<V> Clone for MemCache<V> {
    fn clone(&self) -> Self {
        Self {
            shelf: Arc::clone(&self.shelf),
            counters: Arc::clone(&self.counters),
            sweep_interval: self.sweep_interval,
        }
    }
}

impl<V> Default for MemCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MemCache<V> {
    // == Constructor ==
    /// Creates an unbounded cache with the default sweep interval.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Creates a cache from configuration, applying its memory budget if set.
    pub fn from_config(config: &Config) -> Self {
        let cache = Self {
            shelf: Arc::new(RwLock::new(Shelf::new())),
            counters: Arc::new(CacheCounters::default()),
            sweep_interval: config.sweep_interval,
        };
        if let Some(size) = &config.max_memory {
            cache.set_max_memory(size);
        }
        cache
    }

    // == Set Max Memory ==
    /// Sets the memory budget from a size string such as `"100MB"`.
    ///
    /// Malformed strings fall back to 100MB. Entries already stored are kept
    /// even if they exceed the new budget. Always returns `true`.
    pub fn set_max_memory(&self, size: &str) -> bool {
        let (bytes, canonical) = parse_size(size);
        info!("Max memory set to {} ({} bytes)", canonical, bytes);

        let mut shelf = self.shelf.write();
        shelf.max_size = bytes;
        shelf.max_memory = Some(canonical);
        true
    }

    // == Delete ==
    /// Removes an entry by key. Absent keys are ignored; always returns `true`.
    pub fn del(&self, key: &str) -> bool {
        self.shelf.write().remove(key);
        true
    }

    // == Exists ==
    /// Reports whether an entry is stored under `key`.
    ///
    /// This is a structural check: an entry whose TTL elapsed but which has
    /// not been swept or read yet still counts as present.
    pub fn exists(&self, key: &str) -> bool {
        self.shelf.read().entries.contains_key(key)
    }

    // == Keys ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn keys(&self) -> u64 {
        self.shelf.read().entries.len() as u64
    }

    // == Flush ==
    /// Removes every entry and resets the accounted size. Always returns `true`.
    pub fn flush(&self) -> bool {
        let mut shelf = self.shelf.write();
        shelf.entries = HashMap::new();
        shelf.current_size = 0;
        true
    }

    // == Purge Expired ==
    /// Removes all expired entries and returns how many were removed.
    ///
    /// Keys are collected under shared access; each removal then takes
    /// exclusive access and re-checks the entry, which may have been replaced
    /// in between.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .shelf
            .read()
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = 0;
        for key in expired_keys {
            let mut shelf = self.shelf.write();
            if shelf.entries.get(&key).is_some_and(|entry| entry.is_expired()) {
                shelf.remove(&key);
                removed += 1;
            }
        }

        if removed > 0 {
            self.counters.record_expired(removed as u64);
        }
        removed
    }

    // == Introspection ==
    /// Approximate bytes held by stored entries.
    pub fn current_size(&self) -> u64 {
        self.shelf.read().current_size
    }

    /// Memory budget in bytes, 0 when unbounded.
    pub fn max_size(&self) -> u64 {
        self.shelf.read().max_size
    }

    /// Canonical form of the configured budget, e.g. `"100MB"`.
    pub fn max_memory(&self) -> Option<String> {
        self.shelf.read().max_memory.clone()
    }

    /// Remaining TTL of a stored entry; None if absent or never expiring.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.shelf
            .read()
            .entries
            .get(key)
            .and_then(|entry| entry.ttl_remaining())
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.counters.snapshot();
        let shelf = self.shelf.read();
        stats.total_entries = shelf.entries.len() as u64;
        stats.current_size = shelf.current_size;
        stats.max_size = shelf.max_size;
        stats.max_memory = shelf.max_memory.clone();
        stats
    }

    /// Sum of entry sizes recomputed from scratch.
    #[cfg(test)]
    pub(crate) fn accounted_size(&self) -> u64 {
        self.shelf.read().entries.values().map(|entry| entry.size).sum()
    }
}

impl<V: Serialize> MemCache<V> {
    // == Set ==
    /// Stores `value` under `key`. A zero `ttl` means the entry never expires.
    ///
    /// Any existing entry for `key` is evicted first. If the new entry would
    /// push usage over the memory budget it is evicted as well, a warning is
    /// logged and [`SetOutcome::OverBudget`] is returned. Other entries are
    /// never evicted to make room.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> SetOutcome {
        let key = key.into();
        let size = estimate_size(&value);
        let entry = CacheEntry::new(value, ttl, size);

        let mut shelf = self.shelf.write();
        shelf.remove(&key);

        if !shelf.fits(size) {
            let max_size = shelf.max_size;
            warn!(
                "Max memory size {} exceeded, evicted '{}' ({} bytes, {} in use)",
                shelf.max_memory.as_deref().unwrap_or("unset"),
                key,
                size,
                shelf.current_size
            );
            drop(shelf);
            self.counters.record_rejection();
            return SetOutcome::OverBudget { size, max_size };
        }

        shelf.add(key, entry);
        SetOutcome::Stored
    }
}

impl<V: Clone> MemCache<V> {
    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// An entry whose TTL elapsed is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        {
            let shelf = self.shelf.read();
            match shelf.entries.get(key) {
                None => {
                    self.counters.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_expired() => {
                    self.counters.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Expired under shared access: retake exclusively to remove it
        let mut shelf = self.shelf.write();
        let expired = match shelf.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.counters.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            shelf.remove(key);
            self.counters.record_expired(1);
            debug!("Lazily removed expired key '{}'", key);
        }
        self.counters.record_miss();
        None
    }
}

impl<V: Send + Sync + 'static> MemCache<V> {
    // == Start Sweeper ==
    /// Starts the background expiry sweeper on the current tokio runtime.
    ///
    /// The sweeper runs until the returned handle is stopped or dropped.
    pub fn start_sweeper(&self) -> Result<SweeperHandle> {
        spawn_sweeper(self.clone(), self.sweep_interval)
    }
}
