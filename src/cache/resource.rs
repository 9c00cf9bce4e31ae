//! Per-resource staleness state machine
//!
//! One [`ResourceCache`] per logical resource kind. The map is guarded by a
//! single mutex; every read-modify-write goes through it. The lock is never
//! held across the remote fetch, so concurrent refreshes of the same key may
//! overlap and the last successful writer wins.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, warn};

use super::entry::{CacheEntry, CachePolicy, Freshness};

/// Whether a read may be served from a fresh entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Fetch only when the entry is missing or older than the poll interval
    IfStale,
    /// Always fetch; used by the background refresher
    Force,
}

/// Outcome of a single [`ResourceCache::get`], for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Served from the entry without a fetch
    Hit,
    /// Fetched and stored a new value
    Refreshed,
    /// Fetch failed; the previous value was still within the invalid timeout
    StaleTolerated,
}

/// Cached values of one resource kind, keyed by `K`.
///
/// Singleton resources use `K = ()`.
#[derive(Debug)]
pub struct ResourceCache<K, V> {
    name: &'static str,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resource name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    // A panic elsewhere cannot leave a half-written entry: every write is a
    // single insert, so the map is still consistent after poisoning.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current entry for `key`, whatever its age
    pub fn peek(&self, key: &K) -> Option<CacheEntry<V>> {
        self.lock().get(key).cloned()
    }

    /// Keys that have been fetched successfully at least once
    pub fn keys(&self) -> Vec<K> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn store(&self, key: &K, value: V) {
        self.lock().insert(key.clone(), CacheEntry::new(value));
    }

    /// Read `key`, refreshing through `fetch` when required by `mode` and `policy`.
    pub fn get<E, F>(
        &self,
        key: &K,
        policy: &CachePolicy,
        mode: RefreshMode,
        fetch: F,
    ) -> Result<V, E>
    where
        E: Display,
        F: FnOnce() -> Result<V, E>,
    {
        self.get_with_outcome(key, policy, mode, fetch)
            .map(|(value, _)| value)
    }

    /// Like [`ResourceCache::get`], also reporting how the value was obtained
    pub fn get_with_outcome<E, F>(
        &self,
        key: &K,
        policy: &CachePolicy,
        mode: RefreshMode,
        fetch: F,
    ) -> Result<(V, ReadOutcome), E>
    where
        E: Display,
        F: FnOnce() -> Result<V, E>,
    {
        if mode == RefreshMode::IfStale {
            if let Some(entry) = self.peek(key) {
                if policy.classify(entry.age_at(Instant::now())) == Freshness::Fresh {
                    return Ok((entry.value, ReadOutcome::Hit));
                }
            }
        }

        match fetch() {
            Ok(value) => {
                self.store(key, value.clone());
                debug!(
                    event = "lava.cache.refreshed",
                    resource = self.name,
                    key = ?key,
                );
                Ok((value, ReadOutcome::Refreshed))
            }
            Err(e) => {
                // Re-read: another thread may have refreshed the key while we fetched
                match self.peek(key) {
                    Some(entry) if policy.classify(entry.age()) != Freshness::Invalid => {
                        warn!(
                            event = "lava.cache.stale_tolerated",
                            resource = self.name,
                            key = ?key,
                            age_ms = entry.age().as_millis() as u64,
                            error = %e,
                        );
                        Ok((entry.value, ReadOutcome::StaleTolerated))
                    }
                    _ => Err(e),
                }
            }
        }
    }
}
