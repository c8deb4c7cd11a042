//! Pitchside core - football feeds with a persistent cache and
//! activity-gated background refresh.
//!
//! This crate holds everything except the terminal front end:
//!
//! - `api`: the feed client and its typed errors
//! - `cache`: durable last-known-good snapshots and cache-preferring resolution
//! - `activity`: which match lists are live or about to be
//! - `scheduler`: periodic refresh that only fetches while something is active
//! - `view`: per-screen binding of feeds, load state and schedule
//! - `config`, `auth`: settings file and keychain token

pub mod activity;
pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod feed;
pub mod models;
pub mod scheduler;
pub mod utils;
pub mod view;

pub use activity::{ActivityRule, WindowBoundary};
pub use api::{FeedClient, FeedError, FeedSource, Upstream};
pub use cache::{CacheEntry, CacheStore, FeedCache, FileStore, MemoryStore};
pub use config::{Config, UpstreamMode};
pub use feed::{Feed, FeedKey, MatchQuery, Snapshot};
pub use scheduler::{RefreshScheduler, ScheduleConfig, ScheduleHandle, SchedulerState};
pub use view::{FeedBoard, FeedView, LoadPhase, RefreshMode};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::Value;

    use crate::api::{FeedError, FeedSource};
    use crate::feed::{Feed, FeedKey, Snapshot};

    enum Reply {
        Payload(Value),
        Status(u16),
    }

    /// Scripted feed source that counts fetches.
    #[derive(Default)]
    pub struct MockSource {
        replies: Mutex<HashMap<FeedKey, Reply>>,
        calls: Mutex<HashMap<FeedKey, usize>>,
        total: AtomicUsize,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, feed: &Feed, payload: Value) {
            self.replies.lock().unwrap().insert(feed.key(), Reply::Payload(payload));
        }

        pub fn fail(&self, feed: &Feed, status: u16) {
            self.replies.lock().unwrap().insert(feed.key(), Reply::Status(status));
        }

        pub fn calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }

        pub fn calls_for(&self, feed: &Feed) -> usize {
            self.calls.lock().unwrap().get(&feed.key()).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl FeedSource for MockSource {
        async fn fetch(&self, feed: &Feed) -> Result<Snapshot, FeedError> {
            let key = feed.key();
            self.total.fetch_add(1, Ordering::SeqCst);
            *self.calls.lock().unwrap().entry(key.clone()).or_default() += 1;

            match self.replies.lock().unwrap().get(&key) {
                Some(Reply::Payload(payload)) => Ok(Snapshot::new(payload.clone())),
                Some(Reply::Status(status)) => Err(FeedError::from_status(
                    StatusCode::from_u16(*status).unwrap(),
                    "",
                )),
                None => Err(FeedError::Transport(format!("no reply scripted for {}", key))),
            }
        }
    }
}
