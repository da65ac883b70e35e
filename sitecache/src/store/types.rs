//! Core types for the cache store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Store-related errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error during store operations
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize entry metadata
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cache name is not usable by this backend
    #[error("invalid cache name: {0}")]
    InvalidCacheName(String),
}

/// A response stored in (or about to enter) a cache.
///
/// Carries an explicit `captured_at` timestamp rather than relying on a
/// `date` response header: the header may be absent or stripped, while the
/// capture time is always known at store time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
    /// When the response was captured from the network (or synthesized)
    pub captured_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Create a new response captured now.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
            captured_at: Utc::now(),
        }
    }

    /// Create a 200 HTML response from a string body.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(
            200,
            vec![(
                "content-type".to_string(),
                "text/html; charset=utf-8".to_string(),
            )],
            body.into().into_bytes(),
        )
    }

    /// Override the capture timestamp (test setup, clock injection).
    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `content-type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the response has a successful (200) status.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Whether the capture time is within `window` of `now`.
    ///
    /// Entries captured in the future (clock skew) count as fresh.
    pub fn is_fresh_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        let age_ms = now
            .signed_duration_since(self.captured_at)
            .num_milliseconds();
        age_ms < window.as_millis() as i64
    }

    /// Approximate stored size: body plus header text.
    pub fn size_bytes(&self) -> u64 {
        let header_bytes: usize = self
            .headers
            .iter()
            .map(|(n, v)| n.len() + v.len())
            .sum();
        (self.body.len() + header_bytes) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_html_response_defaults() {
        let response = CachedResponse::html("<h1>hi</h1>");

        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(
            response.content_type(),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(response.body, b"<h1>hi</h1>");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = CachedResponse::new(
            200,
            vec![("Content-Type".to_string(), "image/png".to_string())],
            vec![],
        );

        assert_eq!(response.header("content-type"), Some("image/png"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("image/png"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_non_200_is_not_success() {
        let response = CachedResponse::new(404, vec![], vec![]);
        assert!(!response.is_success());

        let response = CachedResponse::new(503, vec![], vec![]);
        assert!(!response.is_success());
    }

    #[test]
    fn test_freshness_within_window() {
        let captured = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let response = CachedResponse::new(200, vec![], vec![1, 2, 3]).with_captured_at(captured);

        let one_hour_later = captured + chrono::Duration::hours(1);
        let two_days_later = captured + chrono::Duration::days(2);
        let window = Duration::from_secs(24 * 60 * 60);

        assert!(response.is_fresh_within(window, one_hour_later));
        assert!(!response.is_fresh_within(window, two_days_later));
    }

    #[test]
    fn test_freshness_exactly_at_window_is_stale() {
        let captured = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let response = CachedResponse::new(200, vec![], vec![]).with_captured_at(captured);

        let at_window = captured + chrono::Duration::hours(24);
        assert!(!response.is_fresh_within(Duration::from_secs(24 * 60 * 60), at_window));
    }

    #[test]
    fn test_future_capture_counts_as_fresh() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let response =
            CachedResponse::new(200, vec![], vec![]).with_captured_at(now + chrono::Duration::hours(1));

        assert!(response.is_fresh_within(Duration::from_secs(60), now));
    }

    #[test]
    fn test_size_includes_headers() {
        let response = CachedResponse::new(
            200,
            vec![("a".to_string(), "bb".to_string())],
            vec![0u8; 100],
        );

        assert_eq!(response.size_bytes(), 103);
    }

    #[test]
    fn test_serde_round_trip() {
        let response = CachedResponse::new(
            200,
            vec![("content-type".to_string(), "text/css".to_string())],
            b"body { margin: 0 }".to_vec(),
        );

        let json = serde_json::to_string(&response).unwrap();
        let back: CachedResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(back, response);
    }
}
