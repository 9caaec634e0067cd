//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value together with its expiry and approximate size.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Time to live, zero = no expiration
    pub ttl: Duration,
    /// Expiration instant, None when `ttl` is zero or beyond the clock range
    pub expires_at: Option<Instant>,
    /// Approximate size in bytes, fixed at insertion
    pub size: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    ///
    /// A zero `ttl` creates an entry that never expires.
    pub fn new(value: V, ttl: Duration, size: u64) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };

        Self {
            value,
            ttl,
            expires_at,
            size,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its expiration instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied instant.
    ///
    /// A zero `ttl` never expires, whatever `expires_at` holds.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        if self.ttl.is_zero() {
            return false;
        }
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value", Duration::ZERO, 12);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.size, 12);
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(60), 12);

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value", Duration::from_millis(50), 12);

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = CacheEntry::new(1u8, Duration::ZERO, 1);
        let far_future = Instant::now() + Duration::from_secs(86_400 * 365);

        assert!(!entry.is_expired_at(far_future));
    }

    #[test]
    fn test_zero_ttl_ignores_expires_at() {
        let now = Instant::now();
        let entry = CacheEntry {
            value: "v",
            ttl: Duration::ZERO,
            expires_at: Some(now),
            size: 3,
        };

        assert!(!entry.is_expired_at(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("v", Duration::from_secs(10), 3);

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = CacheEntry::new("v", Duration::ZERO, 3);
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry::new("v", Duration::from_millis(20), 3);

        sleep(Duration::from_millis(40));

        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("test", Duration::from_secs(5), 6);
        let expires = entry.expires_at.unwrap();

        assert!(!entry.is_expired_at(expires - Duration::from_millis(1)));
        assert!(entry.is_expired_at(expires), "Entry should be expired at boundary");
    }
}
