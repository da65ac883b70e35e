//! Periodic cache maintenance.
//!
//! One pass removes orphaned caches from previous deployments and trims
//! each bounded category back to its maximum entry count, deleting oldest-
//! inserted entries first. A pass runs once at activation and then on a
//! fixed interval for the lifetime of the worker.

use crate::config::TrimBounds;
use crate::registry::{CacheRegistry, Category};
use crate::stats::WorkerStats;
use crate::store::StoreError;
use crate::worker::events::{EventSender, WorkerEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Categories subject to trimming, in pass order.
const BOUNDED_CATEGORIES: [Category; 3] = [Category::Images, Category::Dynamic, Category::Api];

/// Result of one maintenance pass.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    /// Stale-version caches deleted
    pub purged_caches: Vec<String>,
    /// Entries removed per category
    pub trimmed: Vec<(Category, usize)>,
    /// Categories whose trim failed (the pass continued past them)
    pub failures: Vec<(Category, String)>,
}

impl MaintenanceReport {
    /// Total entries removed across all categories.
    pub fn total_trimmed(&self) -> usize {
        self.trimmed.iter().map(|(_, count)| count).sum()
    }
}

/// Trim one category's cache down to `max_entries`, oldest-inserted first.
///
/// Returns the number of entries removed.
pub fn trim_category(
    registry: &CacheRegistry,
    category: Category,
    max_entries: usize,
) -> Result<usize, StoreError> {
    let keys = registry.keys(category);
    if keys.len() <= max_entries {
        return Ok(0);
    }

    let excess = keys.len() - max_entries;
    let mut removed = 0;
    for key in keys.iter().take(excess) {
        if registry.delete(category, key)? {
            removed += 1;
        }
    }

    debug!(
        category = %category,
        removed = removed,
        bound = max_entries,
        "Trimmed cache to bound"
    );
    Ok(removed)
}

/// Run one full maintenance pass: purge stale caches, then trim every
/// bounded category. A failure in one category is recorded and does not
/// stop the others.
pub fn run_maintenance(registry: &CacheRegistry, bounds: &TrimBounds) -> MaintenanceReport {
    let mut report = MaintenanceReport {
        purged_caches: registry.purge_stale(),
        ..Default::default()
    };

    for category in BOUNDED_CATEGORIES {
        let Some(max_entries) = bounds.bound_for(category) else {
            continue;
        };
        match trim_category(registry, category, max_entries) {
            Ok(0) => {}
            Ok(removed) => report.trimmed.push((category, removed)),
            Err(e) => {
                warn!(category = %category, error = %e, "Trim failed, continuing with next category");
                report.failures.push((category, e.to_string()));
            }
        }
    }

    report
}

/// Fold a maintenance report into the worker's stats and event feed.
pub(crate) fn record_report(
    report: &MaintenanceReport,
    registry: &CacheRegistry,
    stats: &Arc<Mutex<WorkerStats>>,
    events: &EventSender,
) {
    if let Ok(mut stats) = stats.lock() {
        stats.record_purged(report.purged_caches.len() as u64);
        stats.record_trimmed(report.total_trimmed() as u64);
    }

    for (category, removed) in &report.trimmed {
        let _ = events.send(WorkerEvent::Trimmed {
            cache: registry.cache_name(*category),
            removed: *removed,
        });
    }
    let _ = events.send(WorkerEvent::MaintenanceCompleted {
        purged: report.purged_caches.len(),
        trimmed: report.total_trimmed(),
    });
}

/// Background daemon running maintenance passes on a fixed interval.
///
/// The first tick is skipped; activation already ran a pass.
pub struct MaintenanceDaemon {
    registry: Arc<CacheRegistry>,
    bounds: TrimBounds,
    interval: Duration,
    stats: Arc<Mutex<WorkerStats>>,
    events: EventSender,
}

impl MaintenanceDaemon {
    /// Create a daemon with the given pass interval.
    pub fn new(
        registry: Arc<CacheRegistry>,
        bounds: TrimBounds,
        interval: Duration,
        stats: Arc<Mutex<WorkerStats>>,
        events: EventSender,
    ) -> Self {
        Self {
            registry,
            bounds,
            interval,
            stats,
            events,
        }
    }

    /// Override the pass interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The configured pass interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until shutdown is signalled.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Maintenance daemon starting"
        );

        let mut interval = tokio::time::interval(self.interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Maintenance daemon shutting down");
                    break;
                }

                _ = interval.tick() => {
                    let report = run_maintenance(&self.registry, &self.bounds);
                    record_report(&report, &self.registry, &self.stats, &self.events);
                    info!(
                        purged = report.purged_caches.len(),
                        trimmed = report.total_trimmed(),
                        failures = report.failures.len(),
                        "Maintenance pass completed"
                    );
                }
            }
        }
    }
}
