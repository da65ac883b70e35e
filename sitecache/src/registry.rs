//! Versioned registry of named caches.
//!
//! Every deployed version owns a disjoint set of cache names
//! (`sitecache-<label>-<build>-<category>`), so staleness detection after a
//! deploy is a name comparison: anything in the family that is not in the
//! current expected set gets purged on activation.

use crate::config::WorkerConfig;
use crate::store::{CacheStore, CachedResponse, StoreError};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Logical grouping of cached resources by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Static,
    Dynamic,
    Images,
    Api,
    Fonts,
}

impl Category {
    /// All categories, in `match_any` lookup priority order.
    pub const ALL: [Category; 5] = [
        Category::Static,
        Category::Dynamic,
        Category::Images,
        Category::Api,
        Category::Fonts,
    ];

    /// The category's name suffix in cache names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Static => "static",
            Category::Dynamic => "dynamic",
            Category::Images => "images",
            Category::Api => "api",
            Category::Fonts => "fonts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Category::Static),
            "dynamic" => Ok(Category::Dynamic),
            "images" => Ok(Category::Images),
            "api" => Ok(Category::Api),
            "fonts" => Ok(Category::Fonts),
            other => Err(format!("unknown cache category: {}", other)),
        }
    }
}

/// Identity of one deployed cache generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheVersion {
    label: String,
    build: String,
}

impl CacheVersion {
    /// Name family shared by every generation of this worker's caches.
    pub const FAMILY: &'static str = "sitecache";

    /// Create a version from a label ("v2.1") and a build identifier.
    pub fn new(label: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            build: build.into(),
        }
    }

    /// Build the version from worker configuration.
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(config.version_label.clone(), config.build_id.clone())
    }

    /// The version label without the build component.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Prefix identifying any cache of this family, any generation.
    pub fn family_prefix() -> String {
        format!("{}-", Self::FAMILY)
    }

    /// Family-qualified release label without the build component,
    /// e.g. `sitecache-v2.1`. This is what pages see via get-version.
    pub fn release_name(&self) -> String {
        format!("{}-{}", Self::FAMILY, self.label)
    }

    /// Full generation name, e.g. `sitecache-v2.1-1722771200000`.
    pub fn deployment_name(&self) -> String {
        format!("{}-{}-{}", Self::FAMILY, self.label, self.build)
    }

    /// The cache name for a category in this generation.
    pub fn cache_name(&self, category: Category) -> String {
        format!("{}-{}", self.deployment_name(), category.as_str())
    }
}

/// Explicit cache manager injected into the fetch path.
///
/// Owns the category → cache-name mapping for the current version and wraps
/// the storage backend with category-level operations. Holding the registry
/// is the only way the executors touch storage; there is no ambient global
/// cache state.
pub struct CacheRegistry {
    version: CacheVersion,
    store: Arc<dyn CacheStore>,
}

impl CacheRegistry {
    /// Create a registry over a storage backend.
    pub fn new(version: CacheVersion, store: Arc<dyn CacheStore>) -> Self {
        Self { version, store }
    }

    /// The current cache generation.
    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    /// The underlying storage backend.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// The cache name for a category.
    pub fn cache_name(&self, category: Category) -> String {
        self.version.cache_name(category)
    }

    /// Every cache name the current version expects to exist.
    pub fn expected_names(&self) -> Vec<String> {
        Category::ALL
            .iter()
            .map(|category| self.cache_name(*category))
            .collect()
    }

    /// Whether a cache name belongs to the current version.
    pub fn is_expected(&self, name: &str) -> bool {
        Category::ALL
            .iter()
            .any(|category| self.cache_name(*category) == name)
    }

    /// Get an entry from a category's cache.
    pub fn get(&self, category: Category, key: &str) -> Option<CachedResponse> {
        self.store.get(&self.cache_name(category), key)
    }

    /// Store an entry in a category's cache.
    pub fn put(
        &self,
        category: Category,
        key: &str,
        response: CachedResponse,
    ) -> Result<(), StoreError> {
        self.store.put(&self.cache_name(category), key, response)
    }

    /// Delete one entry from a category's cache.
    pub fn delete(&self, category: Category, key: &str) -> Result<bool, StoreError> {
        self.store.delete(&self.cache_name(category), key)
    }

    /// Whether a category's cache holds the key.
    pub fn contains(&self, category: Category, key: &str) -> bool {
        self.store.contains(&self.cache_name(category), key)
    }

    /// Keys of a category's cache, oldest inserted first.
    pub fn keys(&self, category: Category) -> Vec<String> {
        self.store.keys(&self.cache_name(category))
    }

    /// Entry count of a category's cache.
    pub fn entry_count(&self, category: Category) -> usize {
        self.store.entry_count(&self.cache_name(category))
    }

    /// Search every expected cache for a key, static first.
    pub fn match_any(&self, key: &str) -> Option<(Category, CachedResponse)> {
        Category::ALL.iter().find_map(|category| {
            self.get(*category, key)
                .map(|response| (*category, response))
        })
    }

    /// Delete every cache in this family that the current version does not
    /// expect. Caches outside the family (other tenants of the same store)
    /// are left alone. Returns the names that were deleted.
    pub fn purge_stale(&self) -> Vec<String> {
        let family = CacheVersion::family_prefix();
        let mut purged = Vec::new();

        for name in self.store.list_caches() {
            if !name.starts_with(&family) || self.is_expected(&name) {
                continue;
            }
            match self.store.delete_cache(&name) {
                Ok(_) => {
                    info!(cache = %name, "Purged stale cache");
                    purged.push(name);
                }
                Err(e) => {
                    warn!(cache = %name, error = %e, "Failed to purge stale cache");
                }
            }
        }

        purged
    }

    /// Delete one of the current version's caches by name.
    ///
    /// Names outside the expected set are refused (returns `Ok(false)`), so
    /// a page message cannot clear another generation's or tenant's cache.
    pub fn clear_cache(&self, name: &str) -> Result<bool, StoreError> {
        if !self.is_expected(name) {
            return Ok(false);
        }
        self.store.delete_cache(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registry() -> CacheRegistry {
        CacheRegistry::new(
            CacheVersion::new("v2.1", "123"),
            Arc::new(MemoryStore::new()),
        )
    }

    fn response(body: &[u8]) -> CachedResponse {
        CachedResponse::new(200, vec![], body.to_vec())
    }

    #[test]
    fn test_cache_names_carry_version_and_category() {
        let version = CacheVersion::new("v2.1", "123");

        assert_eq!(version.deployment_name(), "sitecache-v2.1-123");
        assert_eq!(version.cache_name(Category::Static), "sitecache-v2.1-123-static");
        assert_eq!(version.cache_name(Category::Images), "sitecache-v2.1-123-images");
    }

    #[test]
    fn test_new_build_produces_disjoint_names() {
        let old = CacheVersion::new("v2.1", "100");
        let new = CacheVersion::new("v2.1", "200");

        for category in Category::ALL {
            assert_ne!(old.cache_name(category), new.cache_name(category));
        }
    }

    #[test]
    fn test_expected_names_cover_all_categories() {
        let registry = registry();
        let names = registry.expected_names();

        assert_eq!(names.len(), 5);
        for category in Category::ALL {
            assert!(names.contains(&registry.cache_name(category)));
            assert!(registry.is_expected(&registry.cache_name(category)));
        }
        assert!(!registry.is_expected("sitecache-v2.0-999-static"));
    }

    #[test]
    fn test_put_get_scoped_by_category() {
        let registry = registry();
        registry.put(Category::Static, "/index.html", response(b"html")).unwrap();

        assert!(registry.get(Category::Static, "/index.html").is_some());
        assert!(registry.get(Category::Dynamic, "/index.html").is_none());
        assert_eq!(registry.entry_count(Category::Static), 1);
    }

    #[test]
    fn test_match_any_prefers_static() {
        let registry = registry();
        registry.put(Category::Dynamic, "/page", response(b"dynamic")).unwrap();
        registry.put(Category::Static, "/page", response(b"static")).unwrap();

        let (category, found) = registry.match_any("/page").unwrap();
        assert_eq!(category, Category::Static);
        assert_eq!(found.body, b"static");
    }

    #[test]
    fn test_purge_stale_removes_only_family_strangers() {
        let store = Arc::new(MemoryStore::new());
        let registry = CacheRegistry::new(CacheVersion::new("v2.1", "200"), store.clone());

        // Current-version cache, old-version cache, and a foreign cache
        registry.put(Category::Static, "/index.html", response(b"keep")).unwrap();
        store
            .put("sitecache-v2.1-100-static", "/index.html", response(b"old"))
            .unwrap();
        store.put("other-app-cache", "/x", response(b"foreign")).unwrap();

        let purged = registry.purge_stale();

        assert_eq!(purged, vec!["sitecache-v2.1-100-static"]);
        assert!(registry.get(Category::Static, "/index.html").is_some());
        assert_eq!(store.entry_count("other-app-cache"), 1);
        assert_eq!(store.entry_count("sitecache-v2.1-100-static"), 0);
    }

    #[test]
    fn test_clear_cache_refuses_unexpected_names() {
        let store = Arc::new(MemoryStore::new());
        let registry = CacheRegistry::new(CacheVersion::new("v2.1", "200"), store.clone());

        registry.put(Category::Images, "/a.png", response(b"img")).unwrap();
        store.put("other-app-cache", "/x", response(b"foreign")).unwrap();

        let images_name = registry.cache_name(Category::Images);
        assert!(registry.clear_cache(&images_name).unwrap());
        assert_eq!(registry.entry_count(Category::Images), 0);

        assert!(!registry.clear_cache("other-app-cache").unwrap());
        assert_eq!(store.entry_count("other-app-cache"), 1);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert!("bogus".parse::<Category>().is_err());
    }
}
