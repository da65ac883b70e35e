//! On-disk store backend.
//!
//! Persists each entry as a body file plus a JSON metadata sidecar, under
//! one subdirectory per named cache. The index is rebuilt by scanning the
//! directory tree at open, so a store survives process restarts.

use crate::store::r#trait::CacheStore;
use crate::store::types::{CachedResponse, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Sidecar metadata stored next to each body file.
///
/// Carries the full URL so a filename-hash collision can never serve the
/// wrong entry: the URL is verified against the lookup key on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    status: u16,
    headers: Vec<(String, String)>,
    captured_at: DateTime<Utc>,
    /// First time this key was stored; preserved across replacements so the
    /// FIFO trim order matches the memory backend
    stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct EntryRecord {
    stem: String,
    meta: EntryMeta,
    size_bytes: u64,
}

type CacheIndex = HashMap<String, EntryRecord>;

/// Remove an entry file, treating an already-missing file as success.
fn remove_entry_file(path: PathBuf) -> Result<(), StoreError> {
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

/// Persistent cache store rooted at a directory.
pub struct DiskStore {
    root: PathBuf,
    index: Mutex<HashMap<String, CacheIndex>>,
}

impl DiskStore {
    /// Open (creating if needed) a disk store rooted at `root`.
    ///
    /// Scans the directory tree to rebuild the entry index; unreadable or
    /// malformed sidecars are skipped with a warning.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let store = Self {
            root,
            index: Mutex::new(HashMap::new()),
        };
        store.scan_root()?;
        Ok(store)
    }

    /// Default store location under the user's cache directory.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitecache")
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, cache: &str) -> PathBuf {
        self.root.join(cache)
    }

    fn body_path(&self, cache: &str, stem: &str) -> PathBuf {
        self.cache_dir(cache).join(format!("{}.body", stem))
    }

    fn meta_path(&self, cache: &str, stem: &str) -> PathBuf {
        self.cache_dir(cache).join(format!("{}.meta.json", stem))
    }

    fn stem_for(url: &str) -> String {
        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    fn validate_cache_name(cache: &str) -> Result<(), StoreError> {
        let ok = !cache.is_empty()
            && !cache.starts_with('.')
            && cache
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if ok {
            Ok(())
        } else {
            Err(StoreError::InvalidCacheName(cache.to_string()))
        }
    }

    /// Rebuild the index from the directory tree.
    fn scan_root(&self) -> Result<(), StoreError> {
        let mut index = self.index.lock().unwrap();
        index.clear();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(cache) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let cache_index = index.entry(cache.to_string()).or_default();
            Self::scan_cache_dir(&path, cache_index);
        }

        Ok(())
    }

    fn scan_cache_dir(dir: &Path, cache_index: &mut CacheIndex) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable cache directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            let Some(stem) = name.strip_suffix(".meta.json") else {
                continue;
            };

            let meta: EntryMeta = match fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|text| serde_json::from_str(&text).map_err(StoreError::from))
            {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed cache entry");
                    continue;
                }
            };

            let body_len = fs::metadata(dir.join(format!("{}.body", stem)))
                .map(|m| m.len())
                .unwrap_or(0);
            let header_bytes: u64 = meta
                .headers
                .iter()
                .map(|(n, v)| (n.len() + v.len()) as u64)
                .sum();

            cache_index.insert(
                meta.url.clone(),
                EntryRecord {
                    stem: stem.to_string(),
                    meta,
                    size_bytes: body_len + header_bytes,
                },
            );
        }
    }
}

impl CacheStore for DiskStore {
    fn get(&self, cache: &str, url: &str) -> Option<CachedResponse> {
        let mut index = self.index.lock().unwrap();
        let record = index.get(cache)?.get(url)?.clone();

        match fs::read(self.body_path(cache, &record.stem)) {
            Ok(body) => Some(CachedResponse {
                status: record.meta.status,
                headers: record.meta.headers,
                body,
                captured_at: record.meta.captured_at,
            }),
            Err(e) => {
                // Body file gone or unreadable; drop the stale index record
                warn!(cache = cache, url = url, error = %e, "Cached body unreadable, dropping entry");
                if let Some(cache_index) = index.get_mut(cache) {
                    cache_index.remove(url);
                }
                None
            }
        }
    }

    fn put(&self, cache: &str, url: &str, response: CachedResponse) -> Result<(), StoreError> {
        Self::validate_cache_name(cache)?;

        let mut index = self.index.lock().unwrap();
        let cache_index = index.entry(cache.to_string()).or_default();

        let stem = Self::stem_for(url);
        let stored_at = cache_index
            .get(url)
            .map(|existing| existing.meta.stored_at)
            .unwrap_or_else(Utc::now);

        fs::create_dir_all(self.cache_dir(cache))?;

        let meta = EntryMeta {
            url: url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            captured_at: response.captured_at,
            stored_at,
        };

        fs::write(self.body_path(cache, &stem), &response.body)?;
        fs::write(
            self.meta_path(cache, &stem),
            serde_json::to_vec_pretty(&meta)?,
        )?;

        let size_bytes = response.size_bytes();
        cache_index.insert(
            url.to_string(),
            EntryRecord {
                stem,
                meta,
                size_bytes,
            },
        );

        Ok(())
    }

    fn delete(&self, cache: &str, url: &str) -> Result<bool, StoreError> {
        let mut index = self.index.lock().unwrap();
        let Some(cache_index) = index.get_mut(cache) else {
            return Ok(false);
        };
        match cache_index.remove(url) {
            Some(record) => {
                remove_entry_file(self.body_path(cache, &record.stem))?;
                remove_entry_file(self.meta_path(cache, &record.stem))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn contains(&self, cache: &str, url: &str) -> bool {
        let index = self.index.lock().unwrap();
        index
            .get(cache)
            .map(|cache_index| cache_index.contains_key(url))
            .unwrap_or(false)
    }

    fn keys(&self, cache: &str) -> Vec<String> {
        let index = self.index.lock().unwrap();
        let Some(cache_index) = index.get(cache) else {
            return Vec::new();
        };

        let mut entries: Vec<(&String, &EntryRecord)> = cache_index.iter().collect();
        entries.sort_by(|(_, a), (_, b)| {
            a.meta
                .stored_at
                .cmp(&b.meta.stored_at)
                .then_with(|| a.stem.cmp(&b.stem))
        });
        entries.into_iter().map(|(url, _)| url.clone()).collect()
    }

    fn entry_count(&self, cache: &str) -> usize {
        let index = self.index.lock().unwrap();
        index.get(cache).map(|c| c.len()).unwrap_or(0)
    }

    fn size_bytes(&self, cache: &str) -> u64 {
        let index = self.index.lock().unwrap();
        index
            .get(cache)
            .map(|c| c.values().map(|r| r.size_bytes).sum())
            .unwrap_or(0)
    }

    fn list_caches(&self) -> Vec<String> {
        let index = self.index.lock().unwrap();
        index.keys().cloned().collect()
    }

    fn delete_cache(&self, cache: &str) -> Result<bool, StoreError> {
        let mut index = self.index.lock().unwrap();
        let existed = index.remove(cache).is_some();
        let dir = self.cache_dir(cache);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            return Ok(true);
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn response(body: &[u8]) -> CachedResponse {
        CachedResponse::new(
            200,
            vec![("content-type".to_string(), "text/plain".to_string())],
            body.to_vec(),
        )
    }

    #[test]
    fn test_open_creates_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        let store = DiskStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert!(store.list_caches().is_empty());
    }

    #[test]
    fn test_put_get_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = DiskStore::open(tmp.path()).unwrap();

        store
            .put("static", "https://site.test/index.html", response(b"<html>"))
            .unwrap();

        let found = store.get("static", "https://site.test/index.html").unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.body, b"<html>");
        assert_eq!(found.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_index_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = DiskStore::open(tmp.path()).unwrap();
            store.put("static", "/index.html", response(b"one")).unwrap();
            store.put("images", "/hero.webp", response(b"img")).unwrap();
        }

        let reopened = DiskStore::open(tmp.path()).unwrap();
        let mut caches = reopened.list_caches();
        caches.sort();
        assert_eq!(caches, vec!["images", "static"]);
        assert_eq!(
            reopened.get("static", "/index.html").map(|r| r.body),
            Some(b"one".to_vec())
        );
        assert_eq!(reopened.entry_count("images"), 1);
    }

    #[test]
    fn test_keys_ordered_oldest_first_after_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let store = DiskStore::open(tmp.path()).unwrap();
            for (i, url) in ["/a", "/b", "/c"].iter().enumerate() {
                let resp = response(b"x").with_captured_at(Utc::now());
                store.put("dynamic", url, resp).unwrap();
                // Distinct stored_at values even on coarse clocks
                std::thread::sleep(std::time::Duration::from_millis(5 + i as u64));
            }
        }

        let reopened = DiskStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.keys("dynamic"), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_replacement_preserves_stored_at() {
        let tmp = TempDir::new().unwrap();
        let store = DiskStore::open(tmp.path()).unwrap();

        store.put("dynamic", "/a", response(b"a1")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.put("dynamic", "/b", response(b"b")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.put("dynamic", "/a", response(b"a2")).unwrap();

        assert_eq!(store.keys("dynamic"), vec!["/a", "/b"]);
        assert_eq!(
            store.get("dynamic", "/a").map(|r| r.body),
            Some(b"a2".to_vec())
        );
    }

    #[test]
    fn test_delete_entry_removes_files() {
        let tmp = TempDir::new().unwrap();
        let store = DiskStore::open(tmp.path()).unwrap();

        store.put("api", "/api/offers", response(b"[]")).unwrap();
        assert!(store.delete("api", "/api/offers").unwrap());
        assert!(!store.contains("api", "/api/offers"));

        // Directory holds no entry files any more
        let remaining: Vec<_> = fs::read_dir(tmp.path().join("api"))
            .unwrap()
            .flatten()
            .collect();
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_delete_cache() {
        let tmp = TempDir::new().unwrap();
        let store = DiskStore::open(tmp.path()).unwrap();

        store.put("old-cache", "/a", response(b"a")).unwrap();
        assert!(store.delete_cache("old-cache").unwrap());
        assert!(!tmp.path().join("old-cache").exists());
        assert!(!store.delete_cache("old-cache").unwrap());
    }

    #[test]
    fn test_rejects_unsafe_cache_names() {
        let tmp = TempDir::new().unwrap();
        let store = DiskStore::open(tmp.path()).unwrap();

        assert!(matches!(
            store.put("../escape", "/a", response(b"a")),
            Err(StoreError::InvalidCacheName(_))
        ));
        assert!(matches!(
            store.put("", "/a", response(b"a")),
            Err(StoreError::InvalidCacheName(_))
        ));
    }

    #[test]
    fn test_malformed_sidecar_is_skipped() {
        let tmp = TempDir::new().unwrap();
        {
            let store = DiskStore::open(tmp.path()).unwrap();
            store.put("static", "/good", response(b"ok")).unwrap();
        }
        fs::write(
            tmp.path().join("static").join("deadbeef.meta.json"),
            b"not json",
        )
        .unwrap();

        let reopened = DiskStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.entry_count("static"), 1);
        assert!(reopened.get("static", "/good").is_some());
    }
}
