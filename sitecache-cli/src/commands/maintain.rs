//! Maintain command - run one maintenance pass.

use sitecache::maintenance::run_maintenance;

use crate::commands::common::CliContext;
use crate::error::CliError;

/// Run the maintain command: purge stale generations and trim every
/// bounded category back to its entry limit.
pub fn run(ctx: &CliContext) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let build = ctx.require_deployment()?;
    let config = ctx.config(&build);
    let registry = ctx.registry(&build, store);

    let report = run_maintenance(&registry, &config.trim_bounds);

    for name in &report.purged_caches {
        println!("  purged {}", name);
    }
    for (category, removed) in &report.trimmed {
        println!(
            "  trimmed {} entries from {}",
            removed,
            registry.cache_name(*category)
        );
    }
    for (category, error) in &report.failures {
        eprintln!("  {} trim failed: {}", category, error);
    }

    println!(
        "Maintenance complete: {} cache(s) purged, {} entries trimmed",
        report.purged_caches.len(),
        report.total_trimmed()
    );
    Ok(())
}
