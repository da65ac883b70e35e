//! Worker configuration: version identity, pre-warm lists, classification
//! lists, trim bounds, and timing knobs.

use crate::registry::Category;
use chrono::Utc;
use std::time::Duration;
use url::Url;

/// Default image freshness window (24 hours).
pub const DEFAULT_IMAGE_FRESHNESS_SECS: u64 = 24 * 60 * 60;

/// Default maintenance interval (24 hours).
pub const DEFAULT_MAINTENANCE_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default bounded timeout for network-first attempts (10 seconds).
pub const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 10;

/// Default per-category entry bounds.
pub const DEFAULT_MAX_IMAGE_ENTRIES: usize = 50;
pub const DEFAULT_MAX_DYNAMIC_ENTRIES: usize = 100;
pub const DEFAULT_MAX_API_ENTRIES: usize = 20;

const DEFAULT_ORIGIN: &str = "https://www.example.com";

const DEFAULT_CRITICAL_PATHS: &[&str] = &["/", "/index.html", "/css/style.css", "/js/script.js"];

const DEFAULT_CRITICAL_URLS: &[&str] =
    &["https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700;800;900&display=swap"];

const DEFAULT_STATIC_ASSET_PATHS: &[&str] = &[
    "/thank-you.html",
    "/privacy-policy.html",
    "/terms.html",
    "/manifest.json",
];

const DEFAULT_API_PATH_PREFIXES: &[&str] = &["/php/", "/api/"];

const DEFAULT_IMAGE_EXTENSIONS: &[&str] =
    &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".ico"];

const DEFAULT_EXTERNAL_DOMAINS: &[&str] = &[
    "cdnjs.cloudflare.com",
    "fonts.googleapis.com",
    "fonts.gstatic.com",
];

const DEFAULT_FONT_DOMAINS: &[&str] = &["fonts.googleapis.com", "fonts.gstatic.com"];

const DEFAULT_TRACKING_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "graph.facebook.com",
    "connect.facebook.net",
];

const DEFAULT_NEVER_CACHE_PATHS: &[&str] = &["/php/send-lead.php"];

const DEFAULT_BYPASS_SCHEMES: &[&str] = &["chrome-extension", "moz-extension", "safari-extension"];

/// Per-category maximum entry counts for the maintenance trim.
///
/// Static and font caches are deliberately unbounded: they hold a fixed,
/// small set of assets controlled by the deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimBounds {
    pub images: usize,
    pub dynamic: usize,
    pub api: usize,
}

impl Default for TrimBounds {
    fn default() -> Self {
        Self {
            images: DEFAULT_MAX_IMAGE_ENTRIES,
            dynamic: DEFAULT_MAX_DYNAMIC_ENTRIES,
            api: DEFAULT_MAX_API_ENTRIES,
        }
    }
}

impl TrimBounds {
    /// The entry bound for a category, `None` when unbounded.
    pub fn bound_for(&self, category: Category) -> Option<usize> {
        match category {
            Category::Images => Some(self.images),
            Category::Dynamic => Some(self.dynamic),
            Category::Api => Some(self.api),
            Category::Static | Category::Fonts => None,
        }
    }
}

/// Complete worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Site origin that relative paths resolve against
    pub origin: String,
    /// Deployed version label, part of every cache name (e.g. "v2.1")
    pub version_label: String,
    /// Build identifier; changes per deployment so cache names go stale
    pub build_id: String,
    /// Same-origin paths pre-warmed at install and served cache-first
    pub critical_paths: Vec<String>,
    /// Absolute URLs pre-warmed at install and served cache-first
    pub critical_urls: Vec<String>,
    /// Secondary same-origin pages pre-warmed at install
    pub static_asset_paths: Vec<String>,
    /// Path prefixes routed network-first into the api cache
    pub api_path_prefixes: Vec<String>,
    /// Path suffixes classified as images
    pub image_extensions: Vec<String>,
    /// External hosts served stale-while-revalidate
    pub external_domains: Vec<String>,
    /// Subset of external hosts whose responses land in the fonts cache
    pub font_domains: Vec<String>,
    /// Analytics/conversion hosts that are never intercepted
    pub tracking_domains: Vec<String>,
    /// Same-origin paths that are never intercepted (the lead relay)
    pub never_cache_paths: Vec<String>,
    /// URL schemes that are never intercepted (browser extensions)
    pub bypass_schemes: Vec<String>,
    /// Per-category trim bounds
    pub trim_bounds: TrimBounds,
    /// Maximum age before a cached image is re-fetched
    pub image_freshness: Duration,
    /// Bounded timeout applied to network-first attempts
    pub network_timeout: Duration,
    /// Interval between maintenance passes
    pub maintenance_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            version_label: "v2.1".to_string(),
            build_id: Utc::now().timestamp_millis().to_string(),
            critical_paths: to_strings(DEFAULT_CRITICAL_PATHS),
            critical_urls: to_strings(DEFAULT_CRITICAL_URLS),
            static_asset_paths: to_strings(DEFAULT_STATIC_ASSET_PATHS),
            api_path_prefixes: to_strings(DEFAULT_API_PATH_PREFIXES),
            image_extensions: to_strings(DEFAULT_IMAGE_EXTENSIONS),
            external_domains: to_strings(DEFAULT_EXTERNAL_DOMAINS),
            font_domains: to_strings(DEFAULT_FONT_DOMAINS),
            tracking_domains: to_strings(DEFAULT_TRACKING_DOMAINS),
            never_cache_paths: to_strings(DEFAULT_NEVER_CACHE_PATHS),
            bypass_schemes: to_strings(DEFAULT_BYPASS_SCHEMES),
            trim_bounds: TrimBounds::default(),
            image_freshness: Duration::from_secs(DEFAULT_IMAGE_FRESHNESS_SECS),
            network_timeout: Duration::from_secs(DEFAULT_NETWORK_TIMEOUT_SECS),
            maintenance_interval: Duration::from_secs(DEFAULT_MAINTENANCE_INTERVAL_SECS),
        }
    }
}

impl WorkerConfig {
    /// Create a configuration for the given site origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Set the build identifier (deterministic cache names for tests).
    pub fn with_build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = build_id.into();
        self
    }

    /// Set the version label.
    pub fn with_version_label(mut self, label: impl Into<String>) -> Self {
        self.version_label = label.into();
        self
    }

    /// Set the image freshness window.
    pub fn with_image_freshness(mut self, window: Duration) -> Self {
        self.image_freshness = window;
        self
    }

    /// Set the network-first timeout.
    pub fn with_network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = timeout;
        self
    }

    /// Set the maintenance interval.
    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = interval;
        self
    }

    /// Set the per-category trim bounds.
    pub fn with_trim_bounds(mut self, bounds: TrimBounds) -> Self {
        self.trim_bounds = bounds;
        self
    }

    /// Replace the critical path list.
    pub fn with_critical_paths(mut self, paths: Vec<String>) -> Self {
        self.critical_paths = paths;
        self
    }

    /// Replace the static asset path list.
    pub fn with_static_asset_paths(mut self, paths: Vec<String>) -> Self {
        self.static_asset_paths = paths;
        self
    }

    /// Replace the absolute critical URL list.
    pub fn with_critical_urls(mut self, urls: Vec<String>) -> Self {
        self.critical_urls = urls;
        self
    }

    /// Every URL fetched during install pre-warm, in fetch order.
    pub fn prewarm_urls(&self) -> Vec<String> {
        self.critical_paths
            .iter()
            .chain(self.static_asset_paths.iter())
            .chain(self.critical_urls.iter())
            .cloned()
            .collect()
    }

    /// Resolve a request URL or same-origin path to an absolute URL.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        let origin = self.origin.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{}{}", origin, url)
        } else {
            format!("{}/{}", origin, url)
        }
    }

    /// Canonical cache key for a request URL.
    ///
    /// Same-origin URLs key by path (plus query) so that "/index.html" and
    /// "https://<origin>/index.html" share one entry; everything else keys
    /// by the full URL.
    pub fn cache_key(&self, url: &str) -> String {
        let Ok(parsed) = Url::parse(url) else {
            // Relative same-origin path
            return url.to_string();
        };

        let same_origin = Url::parse(&self.origin)
            .ok()
            .map(|origin| {
                origin.scheme() == parsed.scheme() && origin.host_str() == parsed.host_str()
            })
            .unwrap_or(false);

        if same_origin {
            match parsed.query() {
                Some(query) => format!("{}?{}", parsed.path(), query),
                None => parsed.path().to_string(),
            }
        } else {
            url.to_string()
        }
    }
}
