//! Install command - pre-warm and activate a new cache generation.

use clap::Args;

use crate::commands::common::CliContext;
use crate::error::CliError;

/// Arguments for the install command.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Build identifier for the new generation (default: current timestamp)
    #[arg(long)]
    pub build_id: Option<String>,

    /// Fail the install if any pre-warm URL could not be fetched
    #[arg(long)]
    pub strict: bool,
}

/// Run the install command.
///
/// Creates a new cache generation over the persistent store: pre-warms the
/// static cache, stores the offline page, then activates (purging any
/// previous generation) and records the deployment.
pub async fn run(ctx: &CliContext, args: InstallArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;

    let config = match args.build_id {
        Some(build) => ctx.config(&build),
        None => ctx.fresh_config(),
    };
    let build_id = config.build_id.clone();

    let service = ctx.service(config, store)?;
    println!(
        "Installing {} into {}",
        service.registry().version().deployment_name(),
        ctx.cache_dir().display()
    );

    let report = service.install().await.map_err(CliError::Install)?;
    for url in &report.warmed {
        println!("  warmed {}", url);
    }
    for (url, reason) in &report.failed {
        println!("  FAILED {} ({})", url, reason);
    }

    if args.strict && !report.is_complete() {
        return Err(CliError::Usage(format!(
            "{} pre-warm URL(s) failed and --strict was set; deployment not recorded",
            report.failed.len()
        )));
    }

    let activation = service.activate().await.map_err(CliError::Install)?;
    for name in &activation.purged {
        println!("  purged {}", name);
    }

    ctx.write_deployment(&build_id)?;

    println!();
    println!(
        "Installed: {} warmed, {} failed, {} previous cache(s) purged",
        report.warmed.len(),
        report.failed.len(),
        activation.purged.len()
    );
    Ok(())
}
