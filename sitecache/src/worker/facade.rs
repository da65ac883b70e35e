//! Service facade: the lifecycle controller.

use crate::classify::Classifier;
use crate::config::WorkerConfig;
use crate::maintenance::{record_report, run_maintenance, MaintenanceDaemon, MaintenanceReport};
use crate::net::NetworkClient;
use crate::registry::{CacheRegistry, CacheVersion};
use crate::request::FetchRequest;
use crate::stats::{WorkerStats, WorkerStatistics};
use crate::store::CacheStore;
use crate::strategies::{FetchOutcome, StrategyContext};
use crate::worker::activate::{self, ActivationReport};
use crate::worker::builder::ServiceBuilder;
use crate::worker::error::WorkerError;
use crate::worker::events::{event_channel, EventSender, WorkerEvent};
use crate::worker::fetch;
use crate::worker::install::{self, InstallReport};
use crate::worker::messages::{self, ControlMessage, MessageReply};
use crate::worker::state::WorkerState;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::info;

/// High-level facade over the whole cache subsystem.
///
/// Wires the registry, classifier, strategy executors, and maintenance
/// together, and drives the worker lifecycle:
///
/// `install()` pre-warms, `activate()` purges stale caches and takes
/// control, `handle()` answers fetches while active, `retire()` ends it.
///
/// # Example
///
/// ```ignore
/// use sitecache::config::WorkerConfig;
/// use sitecache::request::FetchRequest;
/// use sitecache::worker::SiteCacheService;
///
/// let service = SiteCacheService::new(WorkerConfig::new("https://solar.example"))?;
/// service.install().await?;
/// service.activate().await?;
///
/// let outcome = service.handle(&FetchRequest::navigate("/index.html")).await?;
/// ```
pub struct SiteCacheService {
    config: Arc<WorkerConfig>,
    registry: Arc<CacheRegistry>,
    classifier: Classifier,
    client: Arc<dyn NetworkClient>,
    state: Mutex<WorkerState>,
    stats: Arc<Mutex<WorkerStats>>,
    events: EventSender,
}

impl SiteCacheService {
    /// Create a service with the default backends (memory store, reqwest
    /// client).
    pub fn new(config: WorkerConfig) -> Result<Self, WorkerError> {
        Self::builder(config).build()
    }

    /// Start a builder for backend injection.
    pub fn builder(config: WorkerConfig) -> ServiceBuilder {
        ServiceBuilder::new(config)
    }

    /// Wire the service from its parts (used by the builder).
    pub(crate) fn assemble(
        config: WorkerConfig,
        store: Arc<dyn CacheStore>,
        client: Arc<dyn NetworkClient>,
    ) -> Self {
        let classifier = Classifier::from_config(&config);
        let registry = Arc::new(CacheRegistry::new(CacheVersion::from_config(&config), store));
        let (events, _) = event_channel();

        Self {
            config: Arc::new(config),
            registry,
            classifier,
            client,
            state: Mutex::new(WorkerState::Installing),
            stats: Arc::new(Mutex::new(WorkerStats::new())),
            events,
        }
    }

    fn context(&self) -> StrategyContext {
        StrategyContext {
            registry: Arc::clone(&self.registry),
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
            stats: Arc::clone(&self.stats),
            events: self.events.clone(),
        }
    }

    fn expect_state(&self, expected: WorkerState) -> Result<(), WorkerError> {
        let state = *self.state.lock().unwrap();
        if state == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidState {
                expected: expected.as_str(),
                actual: state,
            })
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap()
    }

    /// The cache registry (shared with any maintenance daemon).
    pub fn registry(&self) -> Arc<CacheRegistry> {
        Arc::clone(&self.registry)
    }

    /// The worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Subscribe to the worker event feed.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkerEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the worker's statistics.
    pub fn statistics(&self) -> WorkerStatistics {
        let stats = self.stats.lock().unwrap();
        WorkerStatistics::from_stats(&stats)
    }

    /// Install: pre-warm the caches and store the offline page, then move
    /// to Waiting. Skip-waiting semantics: activation may follow at once.
    pub async fn install(&self) -> Result<InstallReport, WorkerError> {
        self.expect_state(WorkerState::Installing)?;
        info!(version = %self.registry.version().deployment_name(), "Installing worker");

        let report = install::run(&self.context()).await?;

        *self.state.lock().unwrap() = WorkerState::Waiting;
        Ok(report)
    }

    /// Activate: purge stale caches, run a maintenance pass, take control.
    pub async fn activate(&self) -> Result<ActivationReport, WorkerError> {
        self.expect_state(WorkerState::Waiting)?;
        info!(version = %self.registry.version().deployment_name(), "Activating worker");

        let report = activate::run(&self.context());

        *self.state.lock().unwrap() = WorkerState::Active;
        Ok(report)
    }

    /// Resume an already-installed worker over a persistent store.
    ///
    /// A worker restart for a version that has installed before does not
    /// re-run install or activate; it picks up its existing caches and goes
    /// straight to Active.
    pub fn resume(&self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Installing)?;
        *self.state.lock().unwrap() = WorkerState::Active;
        info!(version = %self.registry.version().deployment_name(), "Worker resumed");
        Ok(())
    }

    /// Handle one intercepted request. Only valid while Active.
    pub async fn handle(&self, request: &FetchRequest) -> Result<FetchOutcome, WorkerError> {
        self.expect_state(WorkerState::Active)?;
        fetch::dispatch(&self.context(), &self.classifier, request).await
    }

    /// Handle a typed control message from a page.
    pub async fn handle_message(&self, message: ControlMessage) -> Result<MessageReply, WorkerError> {
        match message {
            ControlMessage::SkipWaiting => {
                if self.state() == WorkerState::Waiting {
                    self.activate().await?;
                }
                Ok(MessageReply::Ack)
            }
            ControlMessage::GetVersion => Ok(MessageReply::Version {
                version: self.registry.version().release_name(),
            }),
            ControlMessage::CacheUrls { urls } => {
                let (cached, failed) = messages::cache_urls(&self.context(), urls).await;
                Ok(MessageReply::UrlsCached { cached, failed })
            }
            ControlMessage::ClearCache { cache } => {
                let cleared = self.registry.clear_cache(&cache)?;
                Ok(MessageReply::CacheCleared { cleared })
            }
        }
    }

    /// Run one maintenance pass immediately.
    pub fn run_maintenance_once(&self) -> MaintenanceReport {
        let report = run_maintenance(&self.registry, &self.config.trim_bounds);
        record_report(&report, &self.registry, &self.stats, &self.events);
        report
    }

    /// Build the recurring maintenance daemon for this service. The caller
    /// spawns it: `tokio::spawn(service.maintenance_daemon().run(token))`.
    pub fn maintenance_daemon(&self) -> MaintenanceDaemon {
        MaintenanceDaemon::new(
            Arc::clone(&self.registry),
            self.config.trim_bounds.clone(),
            self.config.maintenance_interval,
            Arc::clone(&self.stats),
            self.events.clone(),
        )
    }

    /// Mark the worker redundant; it refuses further lifecycle work.
    pub fn retire(&self) {
        *self.state.lock().unwrap() = WorkerState::Redundant;
        info!("Worker retired");
    }
}
