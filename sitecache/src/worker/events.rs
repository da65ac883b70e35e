//! Worker event feed.
//!
//! A broadcast channel of typed events, the analog of the original worker's
//! analytics postMessage fan-out: any number of pages (or none) may listen,
//! and a send with no listeners is not an error.

use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered events per subscriber before lagging kicks in.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Something the worker did that pages may want to observe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkerEvent {
    Installed { warmed: usize, failed: usize },
    Activated { purged: usize },
    CacheHit { url: String },
    CacheMiss { url: String },
    Stored { url: String, cache: String },
    Trimmed { cache: String, removed: usize },
    OfflineServed { url: String },
    MaintenanceCompleted { purged: usize, trimmed: usize },
}

/// Sending half of the worker event feed.
pub type EventSender = broadcast::Sender<WorkerEvent>;

/// Create an event channel with the default capacity.
pub fn event_channel() -> (EventSender, broadcast::Receiver<WorkerEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
