//! Size Module
//!
//! Parses human-readable capacity strings ("100MB") into byte counts and
//! estimates the footprint of stored values.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::error::{CacheError, Result};

// == Size Unit ==
/// Binary (1024-based) size units accepted by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
    Petabytes,
}

impl SizeUnit {
    /// Number of bytes in one unit.
    pub const fn multiplier(self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::Kilobytes => 1 << 10,
            SizeUnit::Megabytes => 1 << 20,
            SizeUnit::Gigabytes => 1 << 30,
            SizeUnit::Terabytes => 1 << 40,
            SizeUnit::Petabytes => 1 << 50,
        }
    }

    /// Suffix used in canonical size strings.
    pub const fn suffix(self) -> &'static str {
        match self {
            SizeUnit::Bytes => "B",
            SizeUnit::Kilobytes => "KB",
            SizeUnit::Megabytes => "MB",
            SizeUnit::Gigabytes => "GB",
            SizeUnit::Terabytes => "TB",
            SizeUnit::Petabytes => "PB",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        // Suffixes are case-sensitive
        match suffix {
            "B" => Some(SizeUnit::Bytes),
            "KB" => Some(SizeUnit::Kilobytes),
            "MB" => Some(SizeUnit::Megabytes),
            "GB" => Some(SizeUnit::Gigabytes),
            "TB" => Some(SizeUnit::Terabytes),
            "PB" => Some(SizeUnit::Petabytes),
            _ => None,
        }
    }
}

// == Byte Size ==
/// A capacity expressed as an integer amount of a [`SizeUnit`].
///
/// The byte count of a parsed `ByteSize` always fits in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSize {
    amount: u64,
    unit: SizeUnit,
}

/// Budget used when a size string cannot be parsed.
pub const DEFAULT_MAX_MEMORY: ByteSize = ByteSize {
    amount: 100,
    unit: SizeUnit::Megabytes,
};

impl ByteSize {
    /// Creates a size, returning None if the byte count would overflow.
    pub fn new(amount: u64, unit: SizeUnit) -> Option<Self> {
        amount
            .checked_mul(unit.multiplier())
            .map(|_| Self { amount, unit })
    }

    /// Total number of bytes.
    pub fn bytes(&self) -> u64 {
        self.amount * self.unit.multiplier()
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn unit(&self) -> SizeUnit {
        self.unit
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for ByteSize {
    type Err = CacheError;

    /// Parses strings such as `"512B"`, `"10KB"` or `"1 GB"`.
    ///
    /// The amount must be a non-negative integer and the unit is mandatory.
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, rest) = trimmed.split_at(split);

        if digits.is_empty() {
            return Err(CacheError::invalid_size(input, "missing number"));
        }

        let suffix = rest.trim_start();
        if suffix.is_empty() {
            return Err(CacheError::invalid_size(input, "missing unit"));
        }

        let unit = SizeUnit::from_suffix(suffix).ok_or_else(|| {
            CacheError::invalid_size(input, format!("unknown unit '{}'", suffix))
        })?;

        let amount: u64 = digits
            .parse()
            .map_err(|_| CacheError::invalid_size(input, "number out of range"))?;

        ByteSize::new(amount, unit)
            .ok_or_else(|| CacheError::invalid_size(input, "byte count overflows u64"))
    }
}

// == Parse Size ==
/// Parses a capacity string into `(byte_count, canonical_string)`.
///
/// Never fails: malformed input is logged and replaced by
/// [`DEFAULT_MAX_MEMORY`].
pub fn parse_size(input: &str) -> (u64, String) {
    let size = input.parse::<ByteSize>().unwrap_or_else(|err| {
        warn!("{}, falling back to {}", err, DEFAULT_MAX_MEMORY);
        DEFAULT_MAX_MEMORY
    });
    (size.bytes(), size.to_string())
}

// == Estimate Size ==
/// Approximates the footprint of a value as the length of its JSON encoding.
///
/// Values that fail to serialize count as zero bytes.
pub fn estimate_size<V: Serialize + ?Sized>(value: &V) -> u64 {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};
    use std::collections::HashMap;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("512B"), (512, "512B".to_string()));
        assert_eq!(parse_size("10KB"), (10_240, "10KB".to_string()));
        assert_eq!(parse_size("1MB"), (1_048_576, "1MB".to_string()));
        assert_eq!(parse_size("2GB"), (2 * 1024 * 1024 * 1024, "2GB".to_string()));
        assert_eq!(parse_size("1TB"), (1 << 40, "1TB".to_string()));
        assert_eq!(parse_size("3PB"), (3 << 50, "3PB".to_string()));
    }

    #[test]
    fn test_parse_size_falls_back_on_garbage() {
        assert_eq!(parse_size("bogus"), (104_857_600, "100MB".to_string()));
        assert_eq!(parse_size(""), (104_857_600, "100MB".to_string()));
    }

    #[test]
    fn test_parse_size_falls_back_without_unit() {
        assert_eq!(parse_size("5"), (104_857_600, "100MB".to_string()));
    }

    #[test]
    fn test_parse_size_is_case_sensitive() {
        assert_eq!(parse_size("10kb"), (104_857_600, "100MB".to_string()));
        assert_eq!(parse_size("10Kb"), (104_857_600, "100MB".to_string()));
    }

    #[test]
    fn test_parse_size_rejects_fractions_and_signs() {
        assert_eq!(parse_size("1.5MB").0, 104_857_600);
        assert_eq!(parse_size("-1MB").0, 104_857_600);
    }

    #[test]
    fn test_parse_size_tolerates_whitespace() {
        assert_eq!(parse_size("  64 KB "), (65_536, "64KB".to_string()));
    }

    #[test]
    fn test_parse_size_overflow_falls_back() {
        assert_eq!(parse_size("99999999PB").0, 104_857_600);
        assert_eq!(parse_size("99999999999999999999999B").0, 104_857_600);
    }

    #[test]
    fn test_byte_size_from_str_errors() {
        let err = "MB".parse::<ByteSize>().unwrap_err();
        assert!(matches!(err, CacheError::InvalidSize { .. }));
        assert!(err.to_string().contains("missing number"));

        let err = "7".parse::<ByteSize>().unwrap_err();
        assert!(err.to_string().contains("missing unit"));

        let err = "7XB".parse::<ByteSize>().unwrap_err();
        assert!(err.to_string().contains("unknown unit 'XB'"));
    }

    #[test]
    fn test_byte_size_accessors() {
        let size: ByteSize = "4GB".parse().unwrap();
        assert_eq!(size.amount(), 4);
        assert_eq!(size.unit(), SizeUnit::Gigabytes);
        assert_eq!(size.bytes(), 4 << 30);
        assert_eq!(size.to_string(), "4GB");
    }

    #[test]
    fn test_default_max_memory() {
        assert_eq!(DEFAULT_MAX_MEMORY.bytes(), 104_857_600);
        assert_eq!(DEFAULT_MAX_MEMORY.to_string(), "100MB");
    }

    #[test]
    fn test_estimate_size_matches_json_length() {
        assert_eq!(estimate_size("abc"), 5); // "abc" with quotes
        assert_eq!(estimate_size(&42u32), 2);
        assert_eq!(estimate_size(&vec![1, 2, 3]), 7);

        let mut map = HashMap::new();
        map.insert("k", "v");
        assert_eq!(estimate_size(&map), r#"{"k":"v"}"#.len() as u64);
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("not serializable"))
        }
    }

    #[test]
    fn test_estimate_size_failure_is_zero() {
        assert_eq!(estimate_size(&Unserializable), 0);
    }
}
