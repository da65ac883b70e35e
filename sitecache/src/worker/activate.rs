//! Activate phase: purge stale caches and take control.

use crate::maintenance::{record_report, run_maintenance, MaintenanceReport};
use crate::strategies::StrategyContext;
use crate::worker::events::WorkerEvent;
use tracing::info;

/// What activation did.
#[derive(Debug, Clone)]
pub struct ActivationReport {
    /// Stale-version caches purged before taking control
    pub purged: Vec<String>,
    /// The maintenance pass run right after taking control
    pub maintenance: MaintenanceReport,
}

/// Run the activate phase: delete every cache that does not belong to the
/// current version, then run one maintenance pass.
pub(crate) fn run(ctx: &StrategyContext) -> ActivationReport {
    let purged = ctx.registry.purge_stale();

    if let Ok(mut stats) = ctx.stats.lock() {
        stats.record_purged(purged.len() as u64);
    }
    let _ = ctx.events.send(WorkerEvent::Activated {
        purged: purged.len(),
    });

    let maintenance = run_maintenance(&ctx.registry, &ctx.config.trim_bounds);
    record_report(&maintenance, &ctx.registry, &ctx.stats, &ctx.events);

    info!(
        purged = purged.len(),
        trimmed = maintenance.total_trimmed(),
        "Worker activated"
    );

    ActivationReport {
        purged,
        maintenance,
    }
}
