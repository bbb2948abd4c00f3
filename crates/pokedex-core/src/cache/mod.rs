//! Timed cache for API responses.
//!
//! This module provides the `TimedCache`, which keeps every response it has
//! ever been given in a single blob in the key-value store, stamped with the
//! time it was saved. Readers choose how old a value they are willing to
//! accept:
//!
//! - entity details are fresh for 24 hours
//! - list pages are fresh for 10 minutes
//! - `MaxAge::Any` ignores age entirely (stale fallback)
//!
//! Nothing is ever evicted; entries are only replaced by newer writes.

pub mod manager;

pub use manager::{CacheEntry, MaxAge, TimedCache, CACHE_STORE_KEY};
