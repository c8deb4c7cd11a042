use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::api::{FeedError, FeedSource};
use crate::feed::Feed;

use super::store::{CacheEntry, CacheStore};

/// Cache-preferring or forced resolution of feeds.
///
/// Stale data is never substituted for a failed fetch here; callers decide
/// whether to keep showing what they already have.
#[derive(Clone)]
pub struct FeedCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn FeedSource>,
}

impl FeedCache {
    pub fn new(store: Arc<dyn CacheStore>, source: Arc<dyn FeedSource>) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Resolve one feed.
    ///
    /// Without `bypass_cache` a cached entry is returned with no network
    /// access. Otherwise the feed is fetched and stored before returning.
    pub async fn resolve(&self, feed: &Feed, bypass_cache: bool) -> Result<CacheEntry, FeedError> {
        let key = feed.key();
        if !bypass_cache {
            if let Some(entry) = self.store.get(&key) {
                debug!(feed = %key, age_minutes = entry.age_minutes(), "Serving feed from cache");
                return Ok(entry);
            }
        }

        let snapshot = self.source.fetch(feed).await?;
        match self.store.put(&key, &snapshot) {
            Ok(entry) => Ok(entry),
            Err(e) => {
                warn!(feed = %key, error = %e, "Failed to cache feed");
                Ok(CacheEntry::new(key, snapshot))
            }
        }
    }

    /// Resolve several feeds together, all or nothing.
    ///
    /// Fetches run concurrently. Nothing is written to the store unless every
    /// member succeeded; on failure the first error is returned and the
    /// store is left exactly as it was.
    pub async fn resolve_batch(
        &self,
        feeds: &[Feed],
        bypass_cache: bool,
    ) -> Result<Vec<CacheEntry>, FeedError> {
        let pending = feeds.iter().map(|feed| async move {
            let key = feed.key();
            if !bypass_cache {
                if let Some(entry) = self.store.get(&key) {
                    return Ok::<_, FeedError>((entry, false));
                }
            }
            let snapshot = self.source.fetch(feed).await?;
            Ok((CacheEntry::new(key, snapshot), true))
        });

        let resolved = try_join_all(pending).await?;

        let fetched = resolved.iter().filter(|(_, fresh)| *fresh).count();
        let entries = resolved
            .into_iter()
            .map(|(entry, fresh)| {
                if !fresh {
                    return entry;
                }
                match self.store.put(&entry.key, &entry.payload) {
                    Ok(stored) => stored,
                    Err(e) => {
                        warn!(feed = %entry.key, error = %e, "Failed to cache feed");
                        entry
                    }
                }
            })
            .collect::<Vec<_>>();

        if fetched > 0 {
            info!(feeds = feeds.len(), fetched, forced = bypass_cache, "Feed batch resolved");
        }
        Ok(entries)
    }
}
