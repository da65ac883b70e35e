//! Network-first strategy: dynamic content that must be current when the
//! network allows it.

use crate::registry::Category;
use crate::request::FetchRequest;
use crate::strategies::{FetchOutcome, ServedSource, StrategyContext};
use crate::worker::error::WorkerError;
use tracing::warn;

/// Attempt the network under a bounded timeout; on success store a copy if
/// it qualifies and return it. On failure fall back to any cached copy,
/// then to the offline page (navigations only), then propagate.
pub(crate) async fn execute(
    ctx: &StrategyContext,
    request: &FetchRequest,
    category: Category,
) -> Result<FetchOutcome, WorkerError> {
    let urls = ctx.urls(request);

    match ctx.fetch_with_timeout(&urls.target).await {
        Ok(network) => {
            let stored = ctx.store_if_cacheable(category, &urls.key, &network);
            Ok(FetchOutcome::Served {
                response: network.into_cached(),
                source: ServedSource::Network { stored },
            })
        }
        Err(err) => {
            warn!(url = %urls.target, error = %err, "Network-first fetch failed, trying cache");

            if let Some((_, response)) = ctx.registry.match_any(&urls.key) {
                ctx.record_hit(&urls.key);
                return Ok(FetchOutcome::Served {
                    response,
                    source: ServedSource::StaleCache,
                });
            }
            ctx.record_miss(&urls.key);

            match ctx.offline_fallback(request) {
                Some(fallback) => Ok(fallback),
                None => Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::context;
    use crate::store::CachedResponse;

    #[tokio::test]
    async fn test_network_success_stores_and_returns() {
        let (ctx, client) = context();
        client.respond_ok("https://site.test/api/offers", b"[1,2]");

        let request = FetchRequest::get("/api/offers");
        let outcome = execute(&ctx, &request, Category::Api).await.unwrap();

        assert_eq!(outcome.source(), Some(ServedSource::Network { stored: true }));
        assert!(ctx.registry.contains(Category::Api, "/api/offers"));
    }

    #[tokio::test]
    async fn test_network_always_attempted_even_when_cached() {
        let (ctx, client) = context();
        ctx.registry
            .put(
                Category::Api,
                "/api/offers",
                CachedResponse::new(200, vec![], b"old".to_vec()),
            )
            .unwrap();
        client.respond_ok("https://site.test/api/offers", b"new");

        let request = FetchRequest::get("/api/offers");
        let outcome = execute(&ctx, &request, Category::Api).await.unwrap();

        assert_eq!(outcome.response().unwrap().body, b"new");
        assert_eq!(client.calls_for("https://site.test/api/offers"), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_cache() {
        let (ctx, client) = context();
        ctx.registry
            .put(
                Category::Api,
                "/api/offers",
                CachedResponse::new(200, vec![], b"cached".to_vec()),
            )
            .unwrap();
        client.set_offline(true);

        let request = FetchRequest::get("/api/offers");
        let outcome = execute(&ctx, &request, Category::Api).await.unwrap();

        assert_eq!(outcome.source(), Some(ServedSource::StaleCache));
        assert_eq!(outcome.response().unwrap().body, b"cached");
    }

    #[tokio::test]
    async fn test_failure_without_cache_propagates_for_resources() {
        let (ctx, client) = context();
        client.set_offline(true);

        let request = FetchRequest::get("/api/offers");
        let result = execute(&ctx, &request, Category::Api).await;

        assert!(matches!(result, Err(WorkerError::Network(_))));
    }

    #[tokio::test]
    async fn test_failed_navigation_gets_offline_page() {
        let (ctx, client) = context();
        ctx.store_offline_page().unwrap();
        client.set_offline(true);

        let request = FetchRequest::navigate("/pricing.html");
        let outcome = execute(&ctx, &request, Category::Dynamic).await.unwrap();

        assert_eq!(outcome.source(), Some(ServedSource::OfflinePage));
    }

    #[tokio::test]
    async fn test_failed_navigation_without_offline_page_is_synthetic_503() {
        let (ctx, client) = context();
        client.set_offline(true);

        let request = FetchRequest::navigate("/pricing.html");
        let outcome = execute(&ctx, &request, Category::Dynamic).await.unwrap();

        assert_eq!(outcome.source(), Some(ServedSource::Synthetic));
        assert_eq!(outcome.response().unwrap().status, 503);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_cache() {
        use crate::net::{NetFuture, NetworkClient};
        use crate::config::WorkerConfig;
        use std::sync::Arc;
        use std::time::Duration;

        struct HangingClient;
        impl NetworkClient for HangingClient {
            fn get<'a>(&'a self, _url: &'a str) -> NetFuture<'a> {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    unreachable!()
                })
            }
        }

        let (mut ctx, _client) = context();
        ctx.client = Arc::new(HangingClient);
        ctx.config = Arc::new(
            WorkerConfig::new(crate::strategies::test_support::TEST_ORIGIN)
                .with_network_timeout(Duration::from_millis(20)),
        );
        ctx.registry
            .put(
                Category::Api,
                "/api/offers",
                CachedResponse::new(200, vec![], b"cached".to_vec()),
            )
            .unwrap();

        let request = FetchRequest::get("/api/offers");
        let outcome = execute(&ctx, &request, Category::Api).await.unwrap();

        assert_eq!(outcome.source(), Some(ServedSource::StaleCache));
    }
}
