//! sitecache - offline-first caching fetch gateway
//!
//! This library reimplements a marketing site's service-worker cache layer
//! as a composable subsystem: a versioned registry of named caches, a
//! deterministic URL classifier, four caching-strategy executors, a
//! lifecycle controller, a periodic maintenance task, and an offline
//! fallback page.
//!
//! # High-Level API
//!
//! Most uses go through the [`worker`] facade:
//!
//! ```ignore
//! use sitecache::config::WorkerConfig;
//! use sitecache::request::FetchRequest;
//! use sitecache::worker::SiteCacheService;
//!
//! let service = SiteCacheService::new(WorkerConfig::new("https://solar.example"))?;
//! service.install().await?;
//! service.activate().await?;
//!
//! let outcome = service.handle(&FetchRequest::navigate("/index.html")).await?;
//! ```

pub mod classify;
pub mod config;
pub mod maintenance;
pub mod net;
pub mod offline;
pub mod registry;
pub mod request;
pub mod stats;
pub mod store;
pub mod strategies;
pub mod worker;

/// Version of the sitecache library and CLI.
///
/// Synchronized across all workspace components; injected at compile time
/// from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
