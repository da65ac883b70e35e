//! In-memory store backend.

use crate::store::r#trait::CacheStore;
use crate::store::types::{CachedResponse, StoreError};
use dashmap::DashMap;
use std::collections::HashMap;

/// One named cache: URL → response, with insertion order tracked.
#[derive(Debug, Default)]
struct NamedCache {
    entries: HashMap<String, CachedResponse>,
    /// Keys in insertion order, oldest first
    order: Vec<String>,
    size_bytes: u64,
}

impl NamedCache {
    fn insert(&mut self, url: String, response: CachedResponse) {
        let added = response.size_bytes();
        if let Some(previous) = self.entries.insert(url.clone(), response) {
            // Replacement keeps the key's original position in the order
            self.size_bytes = self.size_bytes.saturating_sub(previous.size_bytes());
        } else {
            self.order.push(url);
        }
        self.size_bytes += added;
    }

    fn remove(&mut self, url: &str) -> bool {
        match self.entries.remove(url) {
            Some(removed) => {
                self.size_bytes = self.size_bytes.saturating_sub(removed.size_bytes());
                self.order.retain(|k| k != url);
                true
            }
            None => false,
        }
    }
}

/// In-memory cache store.
///
/// The default backend for a running worker: fast, process-local, and
/// dropped wholesale when the worker goes away (a fresh deployment starts
/// from empty caches, matching the versioned-name scheme).
#[derive(Debug, Default)]
pub struct MemoryStore {
    caches: DashMap<String, NamedCache>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            caches: DashMap::new(),
        }
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, cache: &str, url: &str) -> Option<CachedResponse> {
        self.caches
            .get(cache)
            .and_then(|named| named.entries.get(url).cloned())
    }

    fn put(&self, cache: &str, url: &str, response: CachedResponse) -> Result<(), StoreError> {
        self.caches
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response);
        Ok(())
    }

    fn delete(&self, cache: &str, url: &str) -> Result<bool, StoreError> {
        match self.caches.get_mut(cache) {
            Some(mut named) => Ok(named.remove(url)),
            None => Ok(false),
        }
    }

    fn contains(&self, cache: &str, url: &str) -> bool {
        self.caches
            .get(cache)
            .map(|named| named.entries.contains_key(url))
            .unwrap_or(false)
    }

    fn keys(&self, cache: &str) -> Vec<String> {
        self.caches
            .get(cache)
            .map(|named| named.order.clone())
            .unwrap_or_default()
    }

    fn entry_count(&self, cache: &str) -> usize {
        self.caches
            .get(cache)
            .map(|named| named.entries.len())
            .unwrap_or(0)
    }

    fn size_bytes(&self, cache: &str) -> u64 {
        self.caches
            .get(cache)
            .map(|named| named.size_bytes)
            .unwrap_or(0)
    }

    fn list_caches(&self) -> Vec<String> {
        self.caches.iter().map(|named| named.key().clone()).collect()
    }

    fn delete_cache(&self, cache: &str) -> Result<bool, StoreError> {
        Ok(self.caches.remove(cache).is_some())
    }
}
