//! In-memory cache over the configuration tree.
//!
//! # Data Flow
//! ```text
//! configuration tree (JSON files on disk)
//!     → initialize() walks the tree and parses every .json file
//!     → entries keyed by path relative to the root ("models.json")
//!     → handlers read through get()/get_models()
//!
//! After an import replaces the tree:
//!     clear() drops every entry
//!     → initialize() rebuilds from the new tree
//! ```
//!
//! # Design Decisions
//! - DashMap for lock-free concurrent reads from request handlers
//! - Refresh of a single entry re-reads exactly one file
//! - Hit/miss counters are atomics; stats are cheap to read

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors from cache loading.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("no cached entry for '{0}'")]
    UnknownEntry(String),
}

/// A single cached configuration document.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub loaded_at: DateTime<Utc>,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// A model made available to the translation proxy, read from the
/// tree's `models.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub name: String,
    pub enabled: bool,
}

/// Cache over the JSON documents in the configuration tree.
pub struct ConfigCache {
    root: PathBuf,
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    last_refresh: Mutex<Option<DateTime<Utc>>>,
}

impl ConfigCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            last_refresh: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and load every `.json` file. Returns the number of
    /// entries loaded. Unparseable files abort the load so a broken tree
    /// is noticed immediately rather than served piecemeal.
    pub fn initialize(&self) -> Result<usize, CacheError> {
        let mut loaded = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable path during cache load");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let key = relative_key(&self.root, entry.path());
            let content = std::fs::read_to_string(entry.path())?;
            let value: serde_json::Value =
                serde_json::from_str(&content).map_err(|source| CacheError::Json {
                    path: key.clone(),
                    source,
                })?;
            loaded.push((key, value));
        }

        let now = Utc::now();
        for (key, value) in loaded {
            self.entries.insert(
                key,
                CacheEntry {
                    value,
                    loaded_at: now,
                },
            );
        }
        *self.last_refresh.lock().unwrap() = Some(now);

        let count = self.entries.len();
        tracing::info!(entries = count, root = %self.root.display(), "Config cache initialized");
        Ok(count)
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries.clear();
        tracing::debug!("Config cache cleared");
    }

    /// Clear and rebuild the whole cache.
    pub fn refresh_all(&self) -> Result<usize, CacheError> {
        self.clear();
        self.initialize()
    }

    /// Re-read a single entry from disk. The key is the file path relative
    /// to the tree root.
    pub fn refresh_entry(&self, key: &str) -> Result<(), CacheError> {
        let path = self.root.join(key);
        let content = std::fs::read_to_string(&path)?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| CacheError::Json {
                path: key.to_string(),
                source,
            })?;
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                loaded_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Fetch a cached document by key.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Models listed in the tree's `models.json`, if present. When
    /// `include_disabled` is false, only enabled models are returned.
    pub fn get_models(&self, include_disabled: bool) -> Vec<ModelEntry> {
        let Some(value) = self.get("models.json") else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?.to_string();
                let enabled = item.get("enabled").and_then(|v| v.as_bool()).unwrap_or(true);
                Some(ModelEntry { name, enabled })
            })
            .filter(|m| include_disabled || m.enabled)
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            last_refresh: *self.last_refresh.lock().unwrap(),
        }
    }
}

fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn seed_tree(dir: &Path) {
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("app.json"), r#"{"name": "demo"}"#).unwrap();
        fs::write(dir.join("nested/extra.json"), r#"{"k": 1}"#).unwrap();
        fs::write(dir.join("readme.txt"), "not json").unwrap();
        fs::write(
            dir.join("models.json"),
            r#"[{"name": "gpt-4o-mini", "enabled": true}, {"name": "legacy", "enabled": false}]"#,
        )
        .unwrap();
    }

    #[test]
    fn test_initialize_loads_json_files_only() {
        let dir = tempfile::tempdir().unwrap();
        seed_tree(dir.path());

        let cache = ConfigCache::new(dir.path());
        let count = cache.initialize().unwrap();
        assert_eq!(count, 3);
        assert!(cache.get("app.json").is_some());
        assert!(cache.get("nested/extra.json").is_some());
        assert!(cache.get("readme.txt").is_none());
    }

    #[test]
    fn test_refresh_entry_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        seed_tree(dir.path());

        let cache = ConfigCache::new(dir.path());
        cache.initialize().unwrap();
        assert_eq!(cache.get("app.json").unwrap()["name"], "demo");

        fs::write(dir.path().join("app.json"), r#"{"name": "renamed"}"#).unwrap();
        cache.refresh_entry("app.json").unwrap();
        assert_eq!(cache.get("app.json").unwrap()["name"], "renamed");
    }

    #[test]
    fn test_get_models_filters_disabled() {
        let dir = tempfile::tempdir().unwrap();
        seed_tree(dir.path());

        let cache = ConfigCache::new(dir.path());
        cache.initialize().unwrap();

        let enabled = cache.get_models(false);
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].name, "gpt-4o-mini");

        let all = cache.get_models(true);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let dir = tempfile::tempdir().unwrap();
        seed_tree(dir.path());

        let cache = ConfigCache::new(dir.path());
        cache.initialize().unwrap();
        cache.get("app.json");
        cache.get("missing.json");

        let stats = cache.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!(stats.last_refresh.is_some());
    }

    #[test]
    fn test_clear_empties_cache() {
        let dir = tempfile::tempdir().unwrap();
        seed_tree(dir.path());

        let cache = ConfigCache::new(dir.path());
        cache.initialize().unwrap();
        cache.clear();
        assert_eq!(cache.stats().entries, 0);
    }
}
