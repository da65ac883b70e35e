//! No-op store that never caches.

use crate::store::r#trait::CacheStore;
use crate::store::types::{CachedResponse, StoreError};

/// Store implementation that accepts writes and always misses.
///
/// Useful for running the gateway with caching disabled (the CLI's
/// `--no-cache` mode) and for isolating network behavior in tests.
#[derive(Debug, Clone, Default)]
pub struct NoOpStore;

impl NoOpStore {
    /// Create a new no-op store.
    pub fn new() -> Self {
        Self
    }
}

impl CacheStore for NoOpStore {
    fn get(&self, _cache: &str, _url: &str) -> Option<CachedResponse> {
        None
    }

    fn put(&self, _cache: &str, _url: &str, _response: CachedResponse) -> Result<(), StoreError> {
        Ok(())
    }

    fn delete(&self, _cache: &str, _url: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn contains(&self, _cache: &str, _url: &str) -> bool {
        false
    }

    fn keys(&self, _cache: &str) -> Vec<String> {
        Vec::new()
    }

    fn entry_count(&self, _cache: &str) -> usize {
        0
    }

    fn size_bytes(&self, _cache: &str) -> u64 {
        0
    }

    fn list_caches(&self) -> Vec<String> {
        Vec::new()
    }

    fn delete_cache(&self, _cache: &str) -> Result<bool, StoreError> {
        Ok(false)
    }
}
