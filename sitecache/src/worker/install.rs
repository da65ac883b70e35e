//! Install phase: pre-warm the caches and store the offline page.

use crate::registry::Category;
use crate::strategies::StrategyContext;
use crate::worker::error::WorkerError;
use crate::worker::events::WorkerEvent;
use futures::future::join_all;
use tracing::{info, warn};

/// Per-URL outcome of the install pre-warm.
///
/// Pre-warm is warn-and-continue: one unreachable asset must not disable
/// offline support for the whole site. Callers that want the original
/// all-or-nothing behavior can check [`InstallReport::is_complete`].
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// URLs fetched and stored successfully
    pub warmed: Vec<String>,
    /// URLs that failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl InstallReport {
    /// Whether every pre-warm URL was stored.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the install phase: concurrently fetch every pre-warm URL into the
/// static cache, then synthesize and store the offline page.
///
/// Individual fetch failures are reported, not fatal; only a storage
/// failure for the offline page fails the install.
pub(crate) async fn run(ctx: &StrategyContext) -> Result<InstallReport, WorkerError> {
    let urls = ctx.config.prewarm_urls();
    info!(count = urls.len(), "Pre-warming caches");

    let results = join_all(urls.iter().map(|url| warm_one(ctx, url))).await;

    let mut report = InstallReport {
        warmed: Vec::new(),
        failed: Vec::new(),
    };
    for result in results {
        match result {
            Ok(url) => report.warmed.push(url),
            Err(failure) => report.failed.push(failure),
        }
    }

    ctx.store_offline_page()?;

    if let Ok(mut stats) = ctx.stats.lock() {
        stats.record_prewarm(report.warmed.len() as u64, report.failed.len() as u64);
    }
    let _ = ctx.events.send(WorkerEvent::Installed {
        warmed: report.warmed.len(),
        failed: report.failed.len(),
    });

    info!(
        warmed = report.warmed.len(),
        failed = report.failed.len(),
        "Install pre-warm complete"
    );
    Ok(report)
}

/// Fetch one pre-warm URL into the static cache.
async fn warm_one(ctx: &StrategyContext, url: &str) -> Result<String, (String, String)> {
    let key = ctx.config.cache_key(url);
    let target = ctx.config.resolve(url);

    match ctx.fetch(&target).await {
        Ok(network) if network.is_cacheable() => {
            match ctx
                .registry
                .put(Category::Static, &key, network.into_cached())
            {
                Ok(()) => Ok(url.to_string()),
                Err(e) => {
                    warn!(url = url, error = %e, "Pre-warm store failed");
                    Err((url.to_string(), e.to_string()))
                }
            }
        }
        Ok(network) => {
            warn!(url = url, status = network.status, "Pre-warm fetch rejected");
            Err((url.to_string(), format!("HTTP {}", network.status)))
        }
        Err(e) => {
            warn!(url = url, error = %e, "Pre-warm fetch failed");
            Err((url.to_string(), e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use crate::offline::OFFLINE_PAGE_KEY;
    use crate::strategies::test_support::{context_with_config, TEST_ORIGIN};

    fn test_config() -> WorkerConfig {
        WorkerConfig::new(TEST_ORIGIN)
            .with_build_id("test")
            .with_critical_paths(vec!["/".to_string(), "/css/style.css".to_string()])
            .with_static_asset_paths(vec!["/manifest.json".to_string()])
            .with_critical_urls(vec![])
    }

    #[tokio::test]
    async fn test_full_prewarm_populates_static_cache() {
        let (ctx, client) = context_with_config(test_config());
        client.respond_ok("https://site.test/", b"<html>");
        client.respond_ok("https://site.test/css/style.css", b"body{}");
        client.respond_ok("https://site.test/manifest.json", b"{}");

        let report = run(&ctx).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.warmed.len(), 3);
        assert!(ctx.registry.contains(Category::Static, "/"));
        assert!(ctx.registry.contains(Category::Static, "/css/style.css"));
        assert!(ctx.registry.contains(Category::Static, "/manifest.json"));
    }

    #[tokio::test]
    async fn test_offline_page_stored_at_install() {
        let (ctx, client) = context_with_config(test_config());
        client.respond_ok("https://site.test/", b"<html>");
        client.respond_ok("https://site.test/css/style.css", b"body{}");
        client.respond_ok("https://site.test/manifest.json", b"{}");

        run(&ctx).await.unwrap();

        let page = ctx.registry.get(Category::Static, OFFLINE_PAGE_KEY).unwrap();
        assert_eq!(page.content_type(), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_partial_failure_warns_and_continues() {
        let (ctx, client) = context_with_config(test_config());
        client.respond_ok("https://site.test/", b"<html>");
        client.respond_ok("https://site.test/css/style.css", b"body{}");
        // /manifest.json unscripted: mock answers 404

        let report = run(&ctx).await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.warmed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "/manifest.json");
        assert!(report.failed[0].1.contains("404"));

        // The successes landed despite the failure
        assert!(ctx.registry.contains(Category::Static, "/"));
        assert!(!ctx.registry.contains(Category::Static, "/manifest.json"));
    }

    #[tokio::test]
    async fn test_offline_install_still_stores_offline_page() {
        let (ctx, client) = context_with_config(test_config());
        client.set_offline(true);

        let report = run(&ctx).await.unwrap();

        assert_eq!(report.warmed.len(), 0);
        assert_eq!(report.failed.len(), 3);
        // The offline page is synthesized locally, no network needed
        assert!(ctx.registry.contains(Category::Static, OFFLINE_PAGE_KEY));
    }

    #[tokio::test]
    async fn test_prewarm_records_stats() {
        let (ctx, client) = context_with_config(test_config());
        client.respond_ok("https://site.test/", b"<html>");
        client.respond_ok("https://site.test/css/style.css", b"body{}");

        run(&ctx).await.unwrap();

        let stats = ctx.stats.lock().unwrap().clone();
        assert_eq!(stats.prewarmed, 2);
        assert_eq!(stats.prewarm_failures, 1);
    }
}
