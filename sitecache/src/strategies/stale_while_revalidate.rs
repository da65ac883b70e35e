//! Stale-while-revalidate strategy: external CDN and font resources.

use crate::registry::Category;
use crate::request::FetchRequest;
use crate::strategies::{FetchOutcome, ServedSource, StrategyContext};
use crate::worker::error::WorkerError;

/// Serve the cached copy immediately when present, refreshing the cache
/// from the network in a detached task whose failures are swallowed. With
/// no cached copy, await the network inline and store the result.
pub(crate) async fn execute(
    ctx: &StrategyContext,
    request: &FetchRequest,
    category: Category,
) -> Result<FetchOutcome, WorkerError> {
    let urls = ctx.urls(request);

    if let Some(response) = ctx.registry.get(category, &urls.key) {
        ctx.record_hit(&urls.key);
        ctx.spawn_revalidate(category, urls.key, urls.target);
        return Ok(FetchOutcome::Served {
            response,
            source: ServedSource::StaleCache,
        });
    }
    ctx.record_miss(&urls.key);

    let network = ctx.fetch(&urls.target).await?;
    let stored = ctx.store_if_cacheable(category, &urls.key, &network);
    Ok(FetchOutcome::Served {
        response: network.into_cached(),
        source: ServedSource::Network { stored },
    })
}
