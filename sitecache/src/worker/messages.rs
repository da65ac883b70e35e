//! Typed control messages between pages and the worker.
//!
//! The page side speaks JSON; both directions serialize with a `type` tag
//! in kebab-case, matching the wire shape pages already send.

use crate::registry::Category;
use crate::strategies::StrategyContext;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A control message from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ControlMessage {
    /// Stop waiting and activate immediately
    SkipWaiting,
    /// Ask for the worker's version label
    GetVersion,
    /// Fetch and cache the given URLs into the dynamic cache
    CacheUrls { urls: Vec<String> },
    /// Delete one of the current version's caches by full name
    ClearCache { cache: String },
}

/// The worker's reply to a control message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessageReply {
    /// Plain acknowledgement
    Ack,
    /// Version label reply
    Version { version: String },
    /// Outcome of a cache-urls request
    UrlsCached { cached: usize, failed: usize },
    /// Outcome of a clear-cache request
    CacheCleared { cleared: bool },
}

/// Fetch each URL and store the qualifying responses in the dynamic cache.
/// Individual failures are logged and counted, never fatal.
pub(crate) async fn cache_urls(ctx: &StrategyContext, urls: Vec<String>) -> (usize, usize) {
    let results = join_all(urls.iter().map(|url| async move {
        let key = ctx.config.cache_key(url);
        let target = ctx.config.resolve(url);

        match ctx.fetch(&target).await {
            Ok(network) if ctx.store_if_cacheable(Category::Dynamic, &key, &network) => {
                debug!(url = %url, "Cached on page request");
                true
            }
            Ok(network) => {
                warn!(url = %url, status = network.status, "Page-requested URL not cacheable");
                false
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to cache page-requested URL");
                false
            }
        }
    }))
    .await;

    let cached = results.iter().filter(|ok| **ok).count();
    (cached, results.len() - cached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::context;

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(&ControlMessage::SkipWaiting).unwrap();
        assert_eq!(json["type"], "skip-waiting");

        let json = serde_json::to_value(&ControlMessage::CacheUrls {
            urls: vec!["/a".to_string()],
        })
        .unwrap();
        assert_eq!(json["type"], "cache-urls");
        assert_eq!(json["urls"][0], "/a");

        let parsed: ControlMessage =
            serde_json::from_str(r#"{"type":"clear-cache","cache":"sitecache-v2.1-1-api"}"#)
                .unwrap();
        assert_eq!(
            parsed,
            ControlMessage::ClearCache {
                cache: "sitecache-v2.1-1-api".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_message_type_rejected() {
        let result = serde_json::from_str::<ControlMessage>(r#"{"type":"push-subscribe"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_wire_shape() {
        let json = serde_json::to_value(&MessageReply::UrlsCached {
            cached: 2,
            failed: 1,
        })
        .unwrap();
        assert_eq!(json["type"], "urls-cached");
        assert_eq!(json["cached"], 2);
    }

    #[tokio::test]
    async fn test_cache_urls_counts_successes_and_failures() {
        let (ctx, client) = context();
        client.respond_ok("https://site.test/promo.html", b"<html>");
        // /gone.html unscripted: 404, not cacheable

        let (cached, failed) = cache_urls(
            &ctx,
            vec!["/promo.html".to_string(), "/gone.html".to_string()],
        )
        .await;

        assert_eq!(cached, 1);
        assert_eq!(failed, 1);
        assert!(ctx.registry.contains(Category::Dynamic, "/promo.html"));
        assert!(!ctx.registry.contains(Category::Dynamic, "/gone.html"));
    }

    #[tokio::test]
    async fn test_cache_urls_offline_counts_all_failed() {
        let (ctx, client) = context();
        client.set_offline(true);

        let (cached, failed) = cache_urls(&ctx, vec!["/a".to_string(), "/b".to_string()]).await;

        assert_eq!(cached, 0);
        assert_eq!(failed, 2);
    }
}
