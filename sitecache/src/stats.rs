//! Worker statistics tracking and reporting.

use std::time::Instant;

/// Counters for everything the worker does.
#[derive(Debug, Clone)]
pub struct WorkerStats {
    // Fetch path
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub network_fetches: u64,
    pub network_failures: u64,
    pub bytes_fetched: u64,
    pub responses_stored: u64,
    pub store_failures: u64,

    // Lifecycle
    pub prewarmed: u64,
    pub prewarm_failures: u64,
    pub caches_purged: u64,

    // Maintenance
    pub trim_evictions: u64,

    // Fallbacks
    pub offline_served: u64,

    // Timing
    pub created_at: Instant,
}

impl Default for WorkerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerStats {
    /// Create a new statistics tracker.
    pub fn new() -> Self {
        Self {
            cache_hits: 0,
            cache_misses: 0,
            network_fetches: 0,
            network_failures: 0,
            bytes_fetched: 0,
            responses_stored: 0,
            store_failures: 0,
            prewarmed: 0,
            prewarm_failures: 0,
            caches_purged: 0,
            trim_evictions: 0,
            offline_served: 0,
            created_at: Instant::now(),
        }
    }

    /// Cache hit rate over the fetch path (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Uptime since the tracker was created.
    pub fn uptime(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    pub fn record_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    pub fn record_cache_miss(&mut self) {
        self.cache_misses += 1;
    }

    pub fn record_network_fetch(&mut self, bytes: u64) {
        self.network_fetches += 1;
        self.bytes_fetched += bytes;
    }

    pub fn record_network_failure(&mut self) {
        self.network_failures += 1;
    }

    pub fn record_stored(&mut self) {
        self.responses_stored += 1;
    }

    pub fn record_store_failure(&mut self) {
        self.store_failures += 1;
    }

    pub fn record_prewarm(&mut self, warmed: u64, failed: u64) {
        self.prewarmed += warmed;
        self.prewarm_failures += failed;
    }

    pub fn record_purged(&mut self, count: u64) {
        self.caches_purged += count;
    }

    pub fn record_trimmed(&mut self, count: u64) {
        self.trim_evictions += count;
    }

    pub fn record_offline_served(&mut self) {
        self.offline_served += 1;
    }
}

/// Snapshot of worker statistics for reporting.
#[derive(Debug, Clone)]
pub struct WorkerStatistics {
    pub stats: WorkerStats,
    pub hit_rate_percent: f64,
    pub uptime_secs: u64,
}

impl WorkerStatistics {
    /// Create a snapshot from current stats.
    pub fn from_stats(stats: &WorkerStats) -> Self {
        Self {
            stats: stats.clone(),
            hit_rate_percent: stats.hit_rate() * 100.0,
            uptime_secs: stats.uptime().as_secs(),
        }
    }

    /// Format the snapshot as a human-readable report.
    pub fn format(&self, version: &str) -> String {
        let stats = &self.stats;

        format!(
            r#"sitecache Worker Statistics
Version: {}

FETCH PATH
  Cache Hits:    {}
  Cache Misses:  {}
  Hit Rate:      {:.1}%
  Fetches:       {}
  Failures:      {}
  Stored:        {}
  Store Errors:  {}
  Bytes:         {:.2} MB

LIFECYCLE
  Pre-warmed:    {}
  Warm Failures: {}
  Purged Caches: {}

MAINTENANCE
  Trimmed:       {}

FALLBACKS
  Offline Pages: {}

Uptime: {}s
"#,
            version,
            stats.cache_hits,
            stats.cache_misses,
            self.hit_rate_percent,
            stats.network_fetches,
            stats.network_failures,
            stats.responses_stored,
            stats.store_failures,
            stats.bytes_fetched as f64 / (1024.0 * 1024.0),
            stats.prewarmed,
            stats.prewarm_failures,
            stats.caches_purged,
            stats.trim_evictions,
            stats.offline_served,
            self.uptime_secs,
        )
    }
}
