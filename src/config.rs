//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::ByteSize;
use crate::error::{CacheError, Result};

/// Environment variable holding the memory budget, e.g. `"256MB"`
pub const MAX_MEMORY_VAR: &str = "CACHE_MAX_MEMORY";
/// Environment variable holding the sweep interval in milliseconds
pub const SWEEP_INTERVAL_VAR: &str = "CACHE_SWEEP_INTERVAL_MS";

/// Default background sweep interval
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Memory budget as a size string, None = unbounded
    pub max_memory: Option<String>,
    /// Interval between background sweeps of expired entries
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_MEMORY` - Memory budget such as `100MB` (default: unbounded)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    pub fn from_env() -> Self {
        Self {
            max_memory: max_memory_from_env(),
            sweep_interval: env::var(SWEEP_INTERVAL_VAR)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        }
    }

    /// Like [`from_env`](Self::from_env) but reports malformed values.
    ///
    /// The memory budget must parse as a size string with a unit.
    pub fn try_from_env() -> Result<Self> {
        let max_memory = match max_memory_from_env() {
            Some(raw) => match raw.parse::<ByteSize>() {
                Ok(size) => Some(size.to_string()),
                Err(_) => {
                    return Err(CacheError::InvalidConfig {
                        name: MAX_MEMORY_VAR,
                        value: raw,
                    })
                }
            },
            None => None,
        };

        let sweep_interval = match env::var(SWEEP_INTERVAL_VAR) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(CacheError::InvalidConfig {
                        name: SWEEP_INTERVAL_VAR,
                        value: raw,
                    })
                }
            },
            Err(_) => DEFAULT_SWEEP_INTERVAL,
        };

        Ok(Self {
            max_memory,
            sweep_interval,
        })
    }

    // == Builders ==
    pub fn with_max_memory(mut self, size: impl Into<String>) -> Self {
        self.max_memory = Some(size.into());
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

fn max_memory_from_env() -> Option<String> {
    env::var(MAX_MEMORY_VAR)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_memory: None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
