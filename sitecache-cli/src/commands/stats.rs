//! Stats command - report on the persistent store's caches.

use sitecache::registry::CacheVersion;
use sitecache::store::CacheStore;

use crate::commands::common::{format_size, CliContext};
use crate::error::CliError;

/// Run the stats command.
pub fn run(ctx: &CliContext) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let build = ctx.require_deployment()?;
    let registry = ctx.registry(&build, store.clone());

    println!("Cache store: {}", ctx.cache_dir().display());
    println!("Deployment:  {}", registry.version().deployment_name());
    println!();

    let family = CacheVersion::family_prefix();
    let mut names: Vec<String> = store
        .list_caches()
        .into_iter()
        .filter(|name| name.starts_with(&family))
        .collect();
    names.sort();

    if names.is_empty() {
        println!("No caches yet.");
        return Ok(());
    }

    let mut total_entries = 0;
    let mut total_bytes = 0;
    for name in &names {
        let entries = store.entry_count(name);
        let bytes = store.size_bytes(name);
        total_entries += entries;
        total_bytes += bytes;

        let marker = if registry.is_expected(name) {
            ""
        } else {
            "  (stale)"
        };
        println!(
            "  {:<44} {:>5} entries  {:>10}{}",
            name,
            entries,
            format_size(bytes),
            marker
        );
    }

    println!();
    println!(
        "Total: {} entries, {}",
        total_entries,
        format_size(total_bytes)
    );
    Ok(())
}
