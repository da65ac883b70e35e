//! Store trait definition for backend injection.

use crate::store::types::{CachedResponse, StoreError};

/// Abstraction over the named-cache storage substrate.
///
/// A store holds any number of named caches; each cache maps a request URL
/// to one stored response. Operations are atomic at single-key granularity,
/// and `keys` reports URLs in insertion order (oldest first) so callers can
/// trim FIFO-style.
///
/// Backends are interchangeable: in-memory for a running worker, on-disk
/// for persistence across processes, no-op to disable caching entirely.
pub trait CacheStore: Send + Sync {
    /// Get the stored response for `url` in the named cache.
    fn get(&self, cache: &str, url: &str) -> Option<CachedResponse>;

    /// Store a response under `url` in the named cache, creating the cache
    /// if it does not exist. Replacing an existing entry keeps its position
    /// in the insertion order.
    fn put(&self, cache: &str, url: &str, response: CachedResponse) -> Result<(), StoreError>;

    /// Delete one entry. Returns true if an entry was removed.
    fn delete(&self, cache: &str, url: &str) -> Result<bool, StoreError>;

    /// Check whether an entry exists without reading it.
    fn contains(&self, cache: &str, url: &str) -> bool;

    /// All keys in the named cache, oldest inserted first.
    fn keys(&self, cache: &str) -> Vec<String>;

    /// Number of entries in the named cache.
    fn entry_count(&self, cache: &str) -> usize;

    /// Approximate stored size of the named cache in bytes.
    fn size_bytes(&self, cache: &str) -> u64;

    /// Names of all caches currently held by this store.
    fn list_caches(&self) -> Vec<String>;

    /// Delete an entire named cache. Returns true if the cache existed.
    fn delete_cache(&self, cache: &str) -> Result<bool, StoreError>;
}
