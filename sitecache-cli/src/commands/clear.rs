//! Clear command - delete caches from the persistent store.

use clap::Args;

use sitecache::registry::CacheVersion;
use sitecache::store::CacheStore;

use crate::commands::common::CliContext;
use crate::error::CliError;

/// Arguments for the clear command.
#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Clear one of the current deployment's caches by full name
    #[arg(long, conflicts_with = "all")]
    pub cache: Option<String>,

    /// Clear every generation's caches and forget the deployment
    #[arg(long)]
    pub all: bool,
}

/// Run the clear command.
pub fn run(ctx: &CliContext, args: ClearArgs) -> Result<(), CliError> {
    let store = ctx.open_store()?;

    if args.all {
        let family = CacheVersion::family_prefix();
        let mut removed = 0;
        for name in store.list_caches() {
            if !name.starts_with(&family) {
                continue;
            }
            match store.delete_cache(&name) {
                Ok(true) => {
                    println!("  deleted {}", name);
                    removed += 1;
                }
                Ok(false) => {}
                Err(e) => return Err(CliError::Store(e.to_string())),
            }
        }
        ctx.remove_deployment()?;
        println!("Deleted {} cache(s)", removed);
        return Ok(());
    }

    let Some(name) = args.cache else {
        return Err(CliError::Usage(
            "pass --cache <name> or --all".to_string(),
        ));
    };

    let build = ctx.require_deployment()?;
    let registry = ctx.registry(&build, store);

    let cleared = registry
        .clear_cache(&name)
        .map_err(|e| CliError::Store(e.to_string()))?;
    if cleared {
        println!("Cleared {}", name);
    } else {
        println!(
            "Refused: {} is not one of the current deployment's caches",
            name
        );
    }
    Ok(())
}
