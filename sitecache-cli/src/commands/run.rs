//! Run command - keep the gateway resident with periodic maintenance.

use clap::Args;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::commands::common::CliContext;
use crate::error::CliError;

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Seconds between maintenance passes (default: daily)
    #[arg(long)]
    pub interval: Option<u64>,
}

/// Run the run command.
///
/// Resumes the installed deployment over the persistent store, runs one
/// catch-up maintenance pass, then keeps the maintenance daemon alive
/// until Ctrl+C.
pub async fn run(ctx: &CliContext, args: RunArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let build = ctx.require_deployment()?;

    let mut config = ctx.config(&build);
    if let Some(secs) = args.interval {
        config = config.with_maintenance_interval(Duration::from_secs(secs));
    }

    let service = ctx.service(config, store)?;
    service.resume().map_err(CliError::ServiceCreation)?;

    // Log the worker's event feed while resident
    let mut events = service.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(?event, "worker event"),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "event feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!(
        "sitecache v{} resident over {}",
        sitecache::VERSION,
        ctx.cache_dir().display()
    );

    // Catch up on anything that accumulated since the last session
    let report = service.run_maintenance_once();
    println!(
        "Startup maintenance: {} cache(s) purged, {} entries trimmed",
        report.purged_caches.len(),
        report.total_trimmed()
    );
    println!(
        "Maintenance every {}s. Press Ctrl+C to stop.",
        service.config().maintenance_interval.as_secs()
    );

    let shutdown = CancellationToken::new();
    let daemon_handle = tokio::spawn(service.maintenance_daemon().run(shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::Resident(format!("Failed to wait for shutdown signal: {}", e)))?;

    shutdown.cancel();
    let _ = daemon_handle.await;

    println!();
    println!(
        "{}",
        service
            .statistics()
            .format(&service.registry().version().release_name())
    );
    println!("Goodbye!");
    Ok(())
}
