//! Shared setup for command handlers.
//!
//! Every command operates on the same persistent store; the context
//! resolves the global options once and hands out stores, registries, and
//! services built over them.

use crate::error::CliError;
use sitecache::config::WorkerConfig;
use sitecache::registry::{CacheRegistry, CacheVersion};
use sitecache::store::{CacheStore, DiskStore};
use sitecache::worker::SiteCacheService;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Marker file in the store root recording the current deployment's build
/// id. Commands other than `install` refuse to run without it, so they can
/// never silently address a generation that was never installed.
const DEPLOYMENT_FILE: &str = "deployment";

/// Resolved global options shared by every command.
pub struct CliContext {
    origin: String,
    cache_dir: PathBuf,
}

impl CliContext {
    pub fn new(origin: String, cache_dir: Option<PathBuf>) -> Self {
        Self {
            origin,
            cache_dir: cache_dir.unwrap_or_else(DiskStore::default_dir),
        }
    }

    /// The store directory commands operate on.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Open the persistent store.
    pub fn open_store(&self) -> Result<Arc<DiskStore>, CliError> {
        DiskStore::open(&self.cache_dir)
            .map(Arc::new)
            .map_err(|e| CliError::Store(e.to_string()))
    }

    /// Configuration with a fresh build id (a new deployment).
    pub fn fresh_config(&self) -> WorkerConfig {
        WorkerConfig::new(self.origin.clone())
    }

    /// Configuration pinned to an existing deployment's build id.
    pub fn config(&self, build_id: &str) -> WorkerConfig {
        self.fresh_config().with_build_id(build_id)
    }

    /// Registry over the store for the given deployment.
    pub fn registry(&self, build_id: &str, store: Arc<dyn CacheStore>) -> CacheRegistry {
        let config = self.config(build_id);
        CacheRegistry::new(CacheVersion::from_config(&config), store)
    }

    /// Build a service over a store with the default network client.
    pub fn service(
        &self,
        config: WorkerConfig,
        store: Arc<dyn CacheStore>,
    ) -> Result<SiteCacheService, CliError> {
        SiteCacheService::builder(config)
            .with_store(store)
            .build()
            .map_err(CliError::ServiceCreation)
    }

    /// The build id of the store's current deployment, if any.
    pub fn read_deployment(&self) -> Option<String> {
        let text = fs::read_to_string(self.cache_dir.join(DEPLOYMENT_FILE)).ok()?;
        let build = text.trim().to_string();
        (!build.is_empty()).then_some(build)
    }

    /// The current deployment's build id, or the install hint.
    pub fn require_deployment(&self) -> Result<String, CliError> {
        self.read_deployment().ok_or(CliError::NeedsInstall)
    }

    /// Record `build_id` as the store's current deployment.
    pub fn write_deployment(&self, build_id: &str) -> Result<(), CliError> {
        let path = self.cache_dir.join(DEPLOYMENT_FILE);
        fs::write(&path, format!("{}\n", build_id)).map_err(|e| CliError::FileWrite {
            path: path.display().to_string(),
            error: e,
        })
    }

    /// Forget the store's current deployment.
    pub fn remove_deployment(&self) -> Result<(), CliError> {
        let path = self.cache_dir.join(DEPLOYMENT_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CliError::FileWrite {
                path: path.display().to_string(),
                error: e,
            }),
        }
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let value = bytes as f64;
    if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} KB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}
