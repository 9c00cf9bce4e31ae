//! Cache entries and the staleness policy applied to them.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Default age after which a read attempts a refresh (5 minutes)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default age after which a read must fail rather than serve old data (10 minutes)
pub const DEFAULT_INVALID_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// A value plus the moment it was last fetched successfully.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    /// Monotonic time of the last successful fetch; drives the policy
    pub last_success: Instant,
    /// Wall-clock time of the same fetch, for display
    pub refreshed_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Create an entry stamped with the current time
    pub fn new(value: T) -> Self {
        Self {
            value,
            last_success: Instant::now(),
            refreshed_at: Utc::now(),
        }
    }

    /// Age of the entry at `now`
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_success)
    }

    /// Age of the entry right now
    pub fn age(&self) -> Duration {
        self.age_at(Instant::now())
    }
}

/// How usable a cached value of a given age is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Within the poll interval; served without a refresh
    Fresh,
    /// Past the poll interval; a read refreshes, but may fall back to it
    Stale,
    /// Past the invalid timeout; never served after a failed refresh
    Invalid,
}

/// Staleness policy shared by every cached resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub poll_interval: Duration,
    pub invalid_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            invalid_timeout: DEFAULT_INVALID_TIMEOUT,
        }
    }
}

impl CachePolicy {
    /// Create a policy. `invalid_timeout` is raised to `poll_interval` if shorter.
    pub fn new(poll_interval: Duration, invalid_timeout: Duration) -> Self {
        Self {
            poll_interval,
            invalid_timeout: invalid_timeout.max(poll_interval),
        }
    }

    /// Classify a value of the given age
    pub fn classify(&self, age: Duration) -> Freshness {
        if age > self.invalid_timeout {
            Freshness::Invalid
        } else if age > self.poll_interval {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries_are_exclusive() {
        let policy = CachePolicy::new(Duration::from_secs(10), Duration::from_secs(20));

        assert_eq!(policy.classify(Duration::ZERO), Freshness::Fresh);
        assert_eq!(policy.classify(Duration::from_secs(10)), Freshness::Fresh);
        assert_eq!(policy.classify(Duration::from_secs(11)), Freshness::Stale);
        assert_eq!(policy.classify(Duration::from_secs(20)), Freshness::Stale);
        assert_eq!(policy.classify(Duration::from_secs(21)), Freshness::Invalid);
    }

    #[test]
    fn test_invalid_timeout_never_below_poll_interval() {
        let policy = CachePolicy::new(Duration::from_secs(30), Duration::from_secs(5));
        assert_eq!(policy.invalid_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_entry_age_grows() {
        let entry = CacheEntry::new(vec!["wifi".to_string()]);
        let later = entry.last_success + Duration::from_secs(3);
        assert_eq!(entry.age_at(later), Duration::from_secs(3));
        // Instants before the fetch clamp to zero
        assert_eq!(entry.age_at(entry.last_success), Duration::ZERO);
    }
}
