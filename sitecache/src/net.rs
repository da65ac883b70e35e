//! HTTP client abstraction for testability.
//!
//! The gateway only ever issues GET requests (non-GET traffic is never
//! intercepted), so the client trait is deliberately narrow. A non-2xx
//! status is a *response*, not an error: the caller decides cacheability
//! and still hands the response back to the page.

use crate::store::CachedResponse;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Default request timeout applied by the real client.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("sitecache/", env!("CARGO_PKG_VERSION"));

/// Errors from the network transport itself.
///
/// HTTP error statuses are not represented here; they come back as a
/// [`NetworkResponse`] with the status set.
#[derive(Debug, Clone, Error)]
pub enum NetError {
    /// The request did not complete within the allowed time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// DNS, connection, or protocol failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// A raw response from the network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers as (name, value) pairs
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Vec<u8>,
}

impl NetworkResponse {
    /// Whether this response qualifies for caching (successful status).
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    /// Convert into a storable response, stamping the capture time.
    pub fn into_cached(self) -> CachedResponse {
        CachedResponse::new(self.status, self.headers, self.body)
    }
}

/// Boxed future returned by [`NetworkClient::get`].
pub type NetFuture<'a> = Pin<Box<dyn Future<Output = Result<NetworkResponse, NetError>> + Send + 'a>>;

/// Trait for the gateway's outbound HTTP access.
///
/// Object-safe so the service can hold `Arc<dyn NetworkClient>` and tests
/// can inject scripted clients.
pub trait NetworkClient: Send + Sync {
    /// Perform an HTTP GET request.
    fn get<'a>(&'a self, url: &'a str) -> NetFuture<'a>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Create a client with default configuration.
    ///
    /// Keeps a warm connection pool: the gateway re-fetches the same small
    /// set of hosts (site origin, CDNs, font hosts) over and over.
    pub fn new() -> Result<Self, NetError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| NetError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl NetworkClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> NetFuture<'a> {
        Box::pin(async move {
            trace!(url = url, "HTTP GET starting");

            let response = match self.client.get(url).send().await {
                Ok(resp) => {
                    debug!(url = url, status = resp.status().as_u16(), "HTTP response received");
                    resp
                }
                Err(e) => {
                    warn!(
                        url = url,
                        error = %e,
                        is_connect = e.is_connect(),
                        is_timeout = e.is_timeout(),
                        "HTTP request failed"
                    );
                    if e.is_timeout() {
                        return Err(NetError::Timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
                    }
                    return Err(NetError::Transport(format!("request failed: {}", e)));
                }
            };

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();

            match response.bytes().await {
                Ok(bytes) => {
                    trace!(url = url, bytes = bytes.len(), "HTTP body read");
                    Ok(NetworkResponse {
                        status,
                        headers,
                        body: bytes.to_vec(),
                    })
                }
                Err(e) => {
                    warn!(url = url, error = %e, "Failed to read response body");
                    Err(NetError::Transport(format!("failed to read response: {}", e)))
                }
            }
        })
    }
}
