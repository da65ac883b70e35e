//! Image strategy: cache-first with a freshness window.
//!
//! Freshness is measured from the entry's stored capture timestamp, never
//! from a `date` response header.

use crate::registry::Category;
use crate::request::FetchRequest;
use crate::strategies::{FetchOutcome, ServedSource, StrategyContext};
use crate::worker::error::WorkerError;
use chrono::Utc;
use tracing::{debug, warn};

/// A cached image within the freshness window is returned with zero network
/// access. Stale or absent entries trigger one fetch; a successful fetch
/// overwrites the entry. On network failure the stale entry is served if
/// one exists; otherwise the outcome is [`FetchOutcome::Unavailable`] - a
/// broken image should degrade, not break the page.
pub(crate) async fn execute(
    ctx: &StrategyContext,
    request: &FetchRequest,
    category: Category,
) -> Result<FetchOutcome, WorkerError> {
    let urls = ctx.urls(request);
    let cached = ctx.registry.get(category, &urls.key);

    if let Some(response) = &cached {
        if response.is_fresh_within(ctx.config.image_freshness, Utc::now()) {
            ctx.record_hit(&urls.key);
            return Ok(FetchOutcome::Served {
                response: response.clone(),
                source: ServedSource::Cache,
            });
        }
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
        Err(err) => match cached {
            Some(response) => {
                warn!(url = %urls.target, error = %err, "Image refresh failed, serving stale copy");
                Ok(FetchOutcome::Served {
                    response,
                    source: ServedSource::StaleCache,
                })
            }
            None => {
                debug!(url = %urls.target, error = %err, "Image unavailable, degrading");
                Ok(FetchOutcome::Unavailable)
            }
        },
    }
}
