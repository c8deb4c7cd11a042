use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feed::{Feed, FeedKey, Snapshot};
use crate::utils::format_age;

/// Last-known-good snapshot of one feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: FeedKey,
    pub payload: Snapshot,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: FeedKey, payload: Snapshot) -> Self {
        Self {
            key,
            payload,
            stored_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.stored_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        format_age(self.stored_at)
    }
}

/// Durable key to snapshot mapping.
///
/// `get` never fails: anything unreadable is reported as absent. `put`
/// replaces the whole entry; readers never observe a half-written one.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &FeedKey) -> Option<CacheEntry>;

    fn put(&self, key: &FeedKey, payload: &Snapshot) -> Result<CacheEntry>;

    fn remove_all(&self) -> Result<()>;

    /// Age of each feed's entry, `None` when never stored.
    fn entry_ages(&self, feeds: &[Feed]) -> Vec<(Feed, Option<String>)> {
        feeds
            .iter()
            .map(|feed| {
                let age = self.get(&feed.key()).map(|e| e.age_display());
                (feed.clone(), age)
            })
            .collect()
    }
}

// ============================================================================
// File-backed store
// ============================================================================

/// Extension for entry files
const ENTRY_EXTENSION: &str = "json";

/// Suffix for in-flight writes, renamed over the entry once complete
const TEMP_SUFFIX: &str = "tmp";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One JSON file per feed key in a cache directory.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &FeedKey) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", file_stem(key), ENTRY_EXTENSION))
    }

    fn load(&self, key: &FeedKey) -> Result<Option<CacheEntry>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", key))?;
        let entry: CacheEntry = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", key))?;

        if &entry.key != key {
            anyhow::bail!("Cache file for {} holds entry for {}", key, entry.key);
        }
        Ok(Some(entry))
    }
}

/// Injective file name for a key: ASCII alphanumerics, `-` and `_` are
/// kept, every other byte becomes `%XX`.
fn file_stem(key: &FeedKey) -> String {
    let mut out = String::with_capacity(key.as_str().len());
    for b in key.as_str().bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

impl CacheStore for FileStore {
    fn get(&self, key: &FeedKey) -> Option<CacheEntry> {
        match self.load(key) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(feed = %key, error = %e, "Treating unreadable cache entry as absent");
                None
            }
        }
    }

    fn put(&self, key: &FeedKey, payload: &Snapshot) -> Result<CacheEntry> {
        let entry = CacheEntry::new(key.clone(), payload.clone());
        let path = self.entry_path(key);
        let contents = serde_json::to_string(&entry)?;

        // Unique temp name per write so concurrent writers never share one
        let tmp = path.with_extension(format!(
            "{}.{}.{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
            TEMP_SUFFIX
        ));
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write cache file: {}", key))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e).with_context(|| format!("Failed to replace cache file: {}", key));
        }

        debug!(feed = %key, "Cache entry stored");
        Ok(entry)
    }

    /// Removes entries and writes abandoned before their rename.
    fn remove_all(&self) -> Result<()> {
        for dir_entry in std::fs::read_dir(&self.cache_dir)? {
            let path = dir_entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if ext == Some(ENTRY_EXTENSION) || ext == Some(TEMP_SUFFIX) {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, for tests and for running without a cache directory.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<FeedKey, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a ready-made entry, keeping its timestamp.
    pub fn insert(&self, entry: CacheEntry) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(entry.key.clone(), entry);
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &FeedKey) -> Option<CacheEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn put(&self, key: &FeedKey, payload: &Snapshot) -> Result<CacheEntry> {
        let entry = CacheEntry::new(key.clone(), payload.clone());
        self.insert(entry.clone());
        Ok(entry)
    }

    fn remove_all(&self) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        Ok(())
    }
}
