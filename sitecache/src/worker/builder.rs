//! Service builder for backend injection.

use crate::config::WorkerConfig;
use crate::net::{NetworkClient, ReqwestClient};
use crate::store::{CacheStore, MemoryStore};
use crate::worker::error::WorkerError;
use crate::worker::facade::SiteCacheService;
use std::sync::Arc;

/// Builds a [`SiteCacheService`] with optional store and client overrides.
///
/// Defaults: an in-memory store and a real reqwest-backed client. Tests
/// inject scripted clients; the CLI injects a disk store.
pub struct ServiceBuilder {
    config: WorkerConfig,
    store: Option<Arc<dyn CacheStore>>,
    client: Option<Arc<dyn NetworkClient>>,
}

impl ServiceBuilder {
    /// Start a builder from configuration.
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            store: None,
            client: None,
        }
    }

    /// Use a specific storage backend.
    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a specific network client.
    pub fn with_client(mut self, client: Arc<dyn NetworkClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Assemble the service.
    pub fn build(self) -> Result<SiteCacheService, WorkerError> {
        let client: Arc<dyn NetworkClient> = match self.client {
            Some(client) => client,
            None => Arc::new(ReqwestClient::new()?),
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn CacheStore>);

        Ok(SiteCacheService::assemble(self.config, store, client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::tests::MockNetworkClient;
    use crate::worker::state::WorkerState;

    #[test]
    fn test_builder_with_injected_parts() {
        let service = ServiceBuilder::new(WorkerConfig::new("https://site.test"))
            .with_store(Arc::new(MemoryStore::new()))
            .with_client(Arc::new(MockNetworkClient::new()))
            .build()
            .unwrap();

        assert_eq!(service.state(), WorkerState::Installing);
    }
}
