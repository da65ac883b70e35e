//! Cache-first strategy: static assets that only change with a deploy.

use crate::registry::Category;
use crate::request::FetchRequest;
use crate::strategies::{FetchOutcome, ServedSource, StrategyContext};
use crate::worker::error::WorkerError;
use tracing::warn;

/// Check the cache; on a hit return immediately with no network call.
/// On a miss fetch the network, store a copy if it qualifies, and return
/// the network response. If the network fails, fall back to any cached
/// copy, then to the offline page (navigations only), then propagate.
pub(crate) async fn execute(
    ctx: &StrategyContext,
    request: &FetchRequest,
    category: Category,
) -> Result<FetchOutcome, WorkerError> {
    let urls = ctx.urls(request);

    if let Some(response) = ctx.registry.get(category, &urls.key) {
        ctx.record_hit(&urls.key);
        return Ok(FetchOutcome::Served {
            response,
            source: ServedSource::Cache,
        });
    }
    ctx.record_miss(&urls.key);

    match ctx.fetch(&urls.target).await {
        Ok(network) => {
            let stored = ctx.store_if_cacheable(category, &urls.key, &network);
            Ok(FetchOutcome::Served {
                response: network.into_cached(),
                source: ServedSource::Network { stored },
            })
        }
        Err(err) => {
            warn!(url = %urls.target, error = %err, "Cache-first network fetch failed");

            if let Some((_, response)) = ctx.registry.match_any(&urls.key) {
                return Ok(FetchOutcome::Served {
                    response,
                    source: ServedSource::Cache,
                });
            }
            match ctx.offline_fallback(request) {
                Some(fallback) => Ok(fallback),
                None => Err(err.into()),
            }
        }
    }
}
