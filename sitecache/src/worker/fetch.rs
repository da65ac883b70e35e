//! Fetch dispatch: classification, executor selection, last-resort fallback.

use crate::classify::{Classifier, Decision, Strategy};
use crate::request::{FetchRequest, RequestMethod};
use crate::strategies::{
    cache_first, image_cache, network_first, stale_while_revalidate, FetchOutcome, ServedSource,
    StrategyContext,
};
use crate::worker::error::WorkerError;
use tracing::{trace, warn};

/// Route one request through the gateway.
///
/// Non-GET requests and bypass-classified URLs are not intercepted: no
/// cache entry is ever created or read for them. Everything else runs its
/// classified strategy, with a last-resort fallback chain (any cached copy,
/// then the offline page for navigations) wrapped around the executor.
pub(crate) async fn dispatch(
    ctx: &StrategyContext,
    classifier: &Classifier,
    request: &FetchRequest,
) -> Result<FetchOutcome, WorkerError> {
    if request.method() != RequestMethod::Get {
        trace!(url = request.url(), method = %request.method(), "Non-GET request not intercepted");
        return Ok(FetchOutcome::NotIntercepted);
    }

    let decision = classifier.classify(request.url());
    let (strategy, category) = match decision {
        Decision::Bypass => {
            trace!(url = request.url(), "Bypass-listed request not intercepted");
            return Ok(FetchOutcome::NotIntercepted);
        }
        Decision::Handle { strategy, category } => (strategy, category),
    };

    let result = match strategy {
        Strategy::CacheFirst => cache_first::execute(ctx, request, category).await,
        Strategy::CacheFirstImages => image_cache::execute(ctx, request, category).await,
        Strategy::NetworkFirst => network_first::execute(ctx, request, category).await,
        Strategy::StaleWhileRevalidate => {
            stale_while_revalidate::execute(ctx, request, category).await
        }
    };

    match result {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            warn!(url = request.url(), error = %err, "Strategy failed, trying last-resort fallbacks");

            let key = ctx.config.cache_key(request.url());
            if let Some((_, response)) = ctx.registry.match_any(&key) {
                return Ok(FetchOutcome::Served {
                    response,
                    source: ServedSource::Cache,
                });
            }
            match ctx.offline_fallback(request) {
                Some(fallback) => Ok(fallback),
                None => Err(err),
            }
        }
    }
}
