//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror. Most cache operations
//! absorb their failures internally; these variants cover the places where a
//! caller can act on one.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Size string could not be parsed
    #[error("Invalid size '{input}': {reason}")]
    InvalidSize { input: String, reason: String },

    /// Environment configuration value could not be parsed
    #[error("Invalid configuration for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },

    /// Background sweeper requires a running tokio runtime
    #[error("No tokio runtime available to run the sweeper")]
    NoRuntime,
}

impl CacheError {
    pub(crate) fn invalid_size(input: &str, reason: impl Into<String>) -> Self {
        CacheError::InvalidSize {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_size_display() {
        let err = CacheError::invalid_size("12XB", "unknown unit 'XB'");
        assert_eq!(err.to_string(), "Invalid size '12XB': unknown unit 'XB'");
    }

    #[test]
    fn test_invalid_config_display() {
        let err = CacheError::InvalidConfig {
            name: "CACHE_SWEEP_INTERVAL_MS",
            value: "soon".to_string(),
        };
        assert!(err.to_string().contains("CACHE_SWEEP_INTERVAL_MS"));
        assert!(err.to_string().contains("soon"));
    }
}
