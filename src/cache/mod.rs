//! Staleness-bounded caching of scheduler reads
//!
//! - [`entry`]: cached values and the poll/invalid policy
//! - [`resource`]: the per-resource refresh state machine
//! - [`staleness`]: the four scheduler resources behind one cache

mod entry;
mod resource;
mod staleness;

pub use entry::{
    CacheEntry, CachePolicy, Freshness, DEFAULT_INVALID_TIMEOUT, DEFAULT_POLL_INTERVAL,
};
pub use resource::{ReadOutcome, RefreshMode, ResourceCache};
pub use staleness::StalenessCache;

pub(crate) use staleness::CacheShared;
