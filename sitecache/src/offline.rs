//! Offline fallback page.
//!
//! The page is synthesized once at install time and stored in the static
//! cache under a fixed key. It is only ever served for navigation requests
//! that fail on both network and cache; failed subresources propagate
//! instead.

use crate::store::CachedResponse;

/// Fixed cache key the offline page is stored under.
pub const OFFLINE_PAGE_KEY: &str = "/offline.html";

const OFFLINE_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Offline</title>
    <style>
        body {
            font-family: system-ui, sans-serif;
            margin: 0;
            padding: 20px;
            min-height: 100vh;
            display: flex;
            align-items: center;
            justify-content: center;
            background: #10243e;
            color: #fff;
        }
        .offline-container {
            text-align: center;
            max-width: 480px;
        }
        h1 { font-size: 2rem; margin-bottom: 1rem; }
        p { font-size: 1.1rem; opacity: 0.9; margin-bottom: 2rem; }
        .retry-button {
            background: #2e8b57;
            color: #fff;
            border: none;
            padding: 1rem 2rem;
            border-radius: 50px;
            font-size: 1rem;
            font-weight: 600;
            cursor: pointer;
        }
    </style>
</head>
<body>
    <div class="offline-container">
        <h1>You are offline</h1>
        <p>We could not reach our servers. Check your internet connection and try again.</p>
        <button class="retry-button" onclick="window.location.reload()">Try again</button>
    </div>
</body>
</html>
"#;

/// Build the offline fallback document.
pub fn build_offline_page() -> CachedResponse {
    CachedResponse::html(OFFLINE_PAGE_HTML)
}

/// Minimal synthetic response for when even the offline page is missing.
///
/// Returned instead of an error so a failed navigation degrades to a plain
/// 503 document rather than an unhandled failure.
pub fn synthetic_unavailable() -> CachedResponse {
    CachedResponse::new(
        503,
        vec![(
            "content-type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        )],
        b"Offline - no cached content available".to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_page_is_html_200() {
        let page = build_offline_page();
        assert_eq!(page.status, 200);
        assert_eq!(page.content_type(), Some("text/html; charset=utf-8"));

        let body = String::from_utf8(page.body).unwrap();
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("offline"));
    }

    #[test]
    fn test_synthetic_unavailable_is_503() {
        let response = synthetic_unavailable();
        assert_eq!(response.status, 503);
        assert!(!response.is_success());
        assert!(!response.body.is_empty());
    }
}
