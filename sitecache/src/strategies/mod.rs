//! Caching-strategy executors.
//!
//! Each executor drives one request through its strategy's state machine
//! over a shared [`StrategyContext`]. Terminal outcomes: served from cache,
//! served from network (optionally stored), stale served while a refresh
//! runs, offline fallback, or - for images only - a graceful nothing.

pub(crate) mod cache_first;
pub(crate) mod image_cache;
pub(crate) mod network_first;
pub(crate) mod stale_while_revalidate;

use crate::config::WorkerConfig;
use crate::net::{NetError, NetworkClient, NetworkResponse};
use crate::offline::{build_offline_page, synthetic_unavailable, OFFLINE_PAGE_KEY};
use crate::registry::{CacheRegistry, Category};
use crate::request::FetchRequest;
use crate::stats::WorkerStats;
use crate::store::CachedResponse;
use crate::worker::events::{EventSender, WorkerEvent};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedSource {
    /// Fresh cache hit, no network involved
    Cache,
    /// Fetched from the network; `stored` says whether a copy was cached
    Network { stored: bool },
    /// Cached copy served although it is (or may be) stale
    StaleCache,
    /// The synthesized offline document
    OfflinePage,
    /// Minimal synthetic response, offline page unavailable
    Synthetic,
}

/// Terminal outcome of handling one request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A response was produced
    Served {
        response: CachedResponse,
        source: ServedSource,
    },
    /// The request is not the gateway's to answer (non-GET, bypass list);
    /// the caller should send it to the network directly
    NotIntercepted,
    /// Nothing to serve, degrade silently (image strategy only)
    Unavailable,
}

impl FetchOutcome {
    /// The served response, if any.
    pub fn response(&self) -> Option<&CachedResponse> {
        match self {
            FetchOutcome::Served { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The serve source, if a response was produced.
    pub fn source(&self) -> Option<ServedSource> {
        match self {
            FetchOutcome::Served { source, .. } => Some(*source),
            _ => None,
        }
    }
}

/// Cache key and absolute network target for one request.
pub(crate) struct RequestUrls {
    pub key: String,
    pub target: String,
}

/// Everything an executor needs: the registry, the network client, policy
/// knobs, and the stats/event sinks. Cheap to clone (all shared handles),
/// which is what lets revalidation run as a detached task.
#[derive(Clone)]
pub(crate) struct StrategyContext {
    pub registry: Arc<CacheRegistry>,
    pub client: Arc<dyn NetworkClient>,
    pub config: Arc<WorkerConfig>,
    pub stats: Arc<Mutex<WorkerStats>>,
    pub events: EventSender,
}

impl StrategyContext {
    /// Canonical cache key and resolved network target for a request.
    pub fn urls(&self, request: &FetchRequest) -> RequestUrls {
        RequestUrls {
            key: self.config.cache_key(request.url()),
            target: self.config.resolve(request.url()),
        }
    }

    /// Network fetch with stats accounting.
    pub async fn fetch(&self, target: &str) -> Result<NetworkResponse, NetError> {
        match self.client.get(target).await {
            Ok(response) => {
                if let Ok(mut stats) = self.stats.lock() {
                    stats.record_network_fetch(response.body.len() as u64);
                }
                Ok(response)
            }
            Err(e) => {
                if let Ok(mut stats) = self.stats.lock() {
                    stats.record_network_failure();
                }
                Err(e)
            }
        }
    }

    /// Network fetch bounded by the configured network-first timeout.
    pub async fn fetch_with_timeout(&self, target: &str) -> Result<NetworkResponse, NetError> {
        let timeout = self.config.network_timeout;
        match tokio::time::timeout(timeout, self.fetch(target)).await {
            Ok(result) => result,
            Err(_) => {
                if let Ok(mut stats) = self.stats.lock() {
                    stats.record_network_failure();
                }
                Err(NetError::Timeout(timeout))
            }
        }
    }

    /// Store a network response if it qualifies, returning whether it was
    /// stored. Store failures are logged and absorbed; the caller still
    /// returns the network response.
    pub fn store_if_cacheable(
        &self,
        category: Category,
        key: &str,
        response: &NetworkResponse,
    ) -> bool {
        if !response.is_cacheable() {
            return false;
        }

        match self
            .registry
            .put(category, key, response.clone().into_cached())
        {
            Ok(()) => {
                if let Ok(mut stats) = self.stats.lock() {
                    stats.record_stored();
                }
                let _ = self.events.send(WorkerEvent::Stored {
                    url: key.to_string(),
                    cache: self.registry.cache_name(category),
                });
                true
            }
            Err(e) => {
                warn!(key = key, error = %e, "Failed to store response, serving uncached");
                if let Ok(mut stats) = self.stats.lock() {
                    stats.record_store_failure();
                }
                false
            }
        }
    }

    pub fn record_hit(&self, key: &str) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_cache_hit();
        }
        let _ = self.events.send(WorkerEvent::CacheHit {
            url: key.to_string(),
        });
    }

    pub fn record_miss(&self, key: &str) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_cache_miss();
        }
        let _ = self.events.send(WorkerEvent::CacheMiss {
            url: key.to_string(),
        });
    }

    /// Offline fallback for a failed navigation: the stored offline page,
    /// or a minimal synthetic 503 when even that is missing. Returns `None`
    /// for subresource requests, which must propagate their failure.
    pub fn offline_fallback(&self, request: &FetchRequest) -> Option<FetchOutcome> {
        if !request.is_navigation() {
            return None;
        }

        if let Ok(mut stats) = self.stats.lock() {
            stats.record_offline_served();
        }
        let _ = self.events.send(WorkerEvent::OfflineServed {
            url: request.url().to_string(),
        });

        let outcome = match self.registry.get(Category::Static, OFFLINE_PAGE_KEY) {
            Some(page) => FetchOutcome::Served {
                response: page,
                source: ServedSource::OfflinePage,
            },
            None => FetchOutcome::Served {
                response: synthetic_unavailable(),
                source: ServedSource::Synthetic,
            },
        };
        Some(outcome)
    }

    /// Refresh a cache entry in the background. The task's result only ever
    /// updates the cache; failures are swallowed and logged because the
    /// original caller already holds a response.
    pub fn spawn_revalidate(&self, category: Category, key: String, target: String) {
        let ctx = self.clone();
        tokio::spawn(async move {
            match ctx.fetch(&target).await {
                Ok(response) => {
                    let stored = ctx.store_if_cacheable(category, &key, &response);
                    debug!(key = %key, stored = stored, "Background revalidation completed");
                }
                Err(e) => {
                    debug!(key = %key, error = %e, "Background revalidation failed");
                }
            }
        });
    }

    /// Store the offline fallback page under its fixed key.
    pub fn store_offline_page(&self) -> Result<(), crate::store::StoreError> {
        self.registry
            .put(Category::Static, OFFLINE_PAGE_KEY, build_offline_page())
    }
}
