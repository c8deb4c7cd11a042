//! View binding: the snapshots a screen shows and how they get loaded.
//!
//! A `FeedView` owns a shared `FeedBoard` cell. Loads and background
//! refreshes write to the cell; the UI reads a clone of it every frame, and
//! the refresh scheduler reads it at tick time.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::activity::ActivityRule;
use crate::api::FeedError;
use crate::cache::{CacheEntry, FeedCache};
use crate::feed::{Feed, FeedKey, Snapshot};
use crate::scheduler::{RefreshScheduler, ScheduleConfig, SchedulerState};
use crate::utils::format_age;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing to show yet
    Loading,
    /// Data on screen while a forced refresh is in flight
    Refreshing,
    Ready,
    /// The first load failed and there is nothing to show
    Failed(String),
}

/// Latest observed snapshots for one view.
#[derive(Debug, Clone)]
pub struct FeedBoard {
    entries: HashMap<FeedKey, CacheEntry>,
    pub phase: LoadPhase,
    /// Most recent background failure, cleared by the next success
    pub last_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for FeedBoard {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            phase: LoadPhase::Loading,
            last_error: None,
            updated_at: None,
        }
    }
}

impl FeedBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, feed: &Feed) -> Option<&CacheEntry> {
        self.entries.get(&feed.key())
    }

    pub fn snapshot(&self, feed: &Feed) -> Option<&Snapshot> {
        self.entry(feed).map(|e| &e.payload)
    }

    pub fn has_data(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Whether any of `feeds` currently holds a live or imminent match.
    pub fn is_active(&self, feeds: &[Feed], rule: &ActivityRule, now: DateTime<Utc>) -> bool {
        feeds.iter().any(|feed| {
            self.snapshot(feed)
                .map(|s| rule.is_active(&s.match_records(), now))
                .unwrap_or(false)
        })
    }

    pub fn begin_load(&mut self, forced: bool) {
        if !self.has_data() {
            self.phase = LoadPhase::Loading;
        } else if forced {
            self.phase = LoadPhase::Refreshing;
        }
    }

    /// Replace the snapshots of the given feeds wholesale.
    pub fn publish(&mut self, entries: Vec<CacheEntry>) {
        let newest = entries.iter().map(|e| e.stored_at).max();
        for entry in entries {
            self.entries.insert(entry.key.clone(), entry);
        }
        self.phase = LoadPhase::Ready;
        self.last_error = None;
        if newest.is_some() {
            self.updated_at = newest;
        }
    }

    /// Keep whatever is on screen; only a board with no data shows the error.
    pub fn record_failure(&mut self, err: &FeedError) {
        if self.has_data() {
            self.phase = LoadPhase::Ready;
            self.last_error = Some(err.summary());
        } else {
            self.phase = LoadPhase::Failed(err.to_string());
        }
    }

    /// Leave an in-flight phase after the load that set it was abandoned.
    pub fn settle(&mut self) {
        if self.phase == LoadPhase::Refreshing {
            self.phase = LoadPhase::Ready;
        }
    }

    pub fn age_display(&self) -> String {
        match self.updated_at {
            Some(at) => format_age(at),
            None => "never".to_string(),
        }
    }
}

pub type SharedBoard = Arc<RwLock<FeedBoard>>;

pub fn read_board(board: &SharedBoard) -> RwLockReadGuard<'_, FeedBoard> {
    board.read().unwrap_or_else(|e| e.into_inner())
}

pub fn write_board(board: &SharedBoard) -> RwLockWriteGuard<'_, FeedBoard> {
    board.write().unwrap_or_else(|e| e.into_inner())
}

/// Resolve `feeds` as one batch and publish the result to `board`.
///
/// On failure the board keeps its previous snapshots.
pub(crate) async fn load_into_board(
    cache: &FeedCache,
    board: &SharedBoard,
    feeds: &[Feed],
    forced: bool,
) -> Result<(), FeedError> {
    write_board(board).begin_load(forced);

    match cache.resolve_batch(feeds, forced).await {
        Ok(entries) => {
            write_board(board).publish(entries);
            Ok(())
        }
        Err(e) => {
            let mut guard = write_board(board);
            if guard.has_data() {
                warn!(
                    error = %e,
                    forced,
                    retryable = e.is_retryable(),
                    "Refresh failed, keeping previous data"
                );
            } else {
                error!(error = %e, retryable = e.is_retryable(), "Initial load failed");
            }
            guard.record_failure(&e);
            Err(e)
        }
    }
}

// ============================================================================
// View binding
// ============================================================================

/// How a view keeps its data current after mounting.
#[derive(Debug, Clone, Copy)]
pub enum RefreshMode {
    /// Load once on mount
    Static,
    /// Load on mount, then refresh while active
    Auto(ScheduleConfig),
}

pub struct FeedView {
    name: &'static str,
    cache: FeedCache,
    feeds: Vec<Feed>,
    board: SharedBoard,
    scheduler: Option<RefreshScheduler>,
    pending: Option<JoinHandle<()>>,
    selected: usize,
    mounted: bool,
}

impl FeedView {
    pub fn new(name: &'static str, cache: FeedCache, feeds: Vec<Feed>, mode: RefreshMode) -> Self {
        let board: SharedBoard = Arc::new(RwLock::new(FeedBoard::new()));
        let scheduler = match mode {
            RefreshMode::Static => None,
            RefreshMode::Auto(config) => Some(RefreshScheduler::new(
                cache.clone(),
                Arc::clone(&board),
                feeds.clone(),
                config,
            )),
        };

        Self {
            name,
            cache,
            feeds,
            board,
            scheduler,
            pending: None,
            selected: 0,
            mounted: false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler
            .as_ref()
            .map(|s| s.state())
            .unwrap_or(SchedulerState::Idle)
    }

    /// Clone of the current board, for rendering.
    pub fn board(&self) -> FeedBoard {
        read_board(&self.board).clone()
    }

    /// Cache-preferring load, plus the refresh schedule for auto views.
    /// Must be called from within a Tokio runtime.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        info!(view = self.name, "Mounting view");

        match self.scheduler.as_mut() {
            Some(scheduler) => scheduler.start(),
            None => self.spawn_load(false),
        }
    }

    /// Cancel the schedule and any load still in flight.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        debug!(view = self.name, "Unmounting view");

        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.cancel();
        }
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        write_board(&self.board).settle();
    }

    /// Forced refresh of every feed, regardless of activity.
    /// Returns false when the view is not mounted or a load is in flight.
    pub fn refresh_now(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        if self.pending.as_ref().is_some_and(|p| !p.is_finished()) {
            debug!(view = self.name, "Refresh already in flight");
            return false;
        }
        self.spawn_load(true);
        true
    }

    fn spawn_load(&mut self, forced: bool) {
        let cache = self.cache.clone();
        let board = Arc::clone(&self.board);
        let feeds = self.feeds.clone();
        self.pending = Some(tokio::spawn(async move {
            let _ = load_into_board(&cache, &board, &feeds, forced).await;
        }));
    }

    // ===== Tabs (UI-local, never touch the network) =====

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_feed(&self) -> Option<&Feed> {
        self.feeds.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.feeds.len() {
            self.selected = index;
        }
    }

    pub fn select_next(&mut self) {
        if !self.feeds.is_empty() {
            self.selected = (self.selected + 1) % self.feeds.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.feeds.is_empty() {
            self.selected = (self.selected + self.feeds.len() - 1) % self.feeds.len();
        }
    }
}

impl Drop for FeedView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryStore};
    use crate::models::MatchStatus;
    use crate::test_support::MockSource;
    use serde_json::json;
    use std::time::Duration;

    fn entry(feed: &Feed, payload: serde_json::Value) -> CacheEntry {
        CacheEntry::new(feed.key(), Snapshot::new(payload))
    }

    fn settle() -> tokio::time::Sleep {
        tokio::time::sleep(Duration::from_millis(1))
    }

    #[test]
    fn test_board_phases() {
        let mut board = FeedBoard::new();
        assert_eq!(board.phase, LoadPhase::Loading);

        board.begin_load(true);
        assert_eq!(board.phase, LoadPhase::Loading);

        board.publish(vec![entry(&Feed::Teams, json!({"teams": []}))]);
        assert_eq!(board.phase, LoadPhase::Ready);

        board.begin_load(false);
        assert_eq!(board.phase, LoadPhase::Ready);

        board.begin_load(true);
        assert_eq!(board.phase, LoadPhase::Refreshing);

        board.settle();
        assert_eq!(board.phase, LoadPhase::Ready);
    }

    #[test]
    fn test_board_failure_keeps_data() {
        let mut board = FeedBoard::new();
        board.record_failure(&FeedError::Transport("refused".into()));
        assert!(matches!(board.phase, LoadPhase::Failed(_)));

        let mut board = FeedBoard::new();
        board.publish(vec![entry(&Feed::Teams, json!({"teams": [1]}))]);
        board.begin_load(true);
        board.record_failure(&FeedError::Upstream { status: 429, message: "slow down".into() });

        assert_eq!(board.phase, LoadPhase::Ready);
        assert_eq!(board.last_error.as_deref(), Some("Rate limited by provider"));
        assert_eq!(
            board.snapshot(&Feed::Teams).unwrap().payload(),
            &json!({"teams": [1]})
        );

        board.publish(vec![entry(&Feed::Teams, json!({"teams": [2]}))]);
        assert!(board.last_error.is_none());
    }

    #[test]
    fn test_board_activity_is_or_across_feeds() {
        let upcoming = Feed::matches(MatchStatus::Scheduled, 20);
        let live = Feed::matches(MatchStatus::InPlay, 10);
        let mut board = FeedBoard::new();
        board.publish(vec![
            entry(&upcoming, json!({"matches": []})),
            entry(&live, json!({"matches": [{"id": 9, "status": "IN_PLAY"}]})),
        ]);
        let rule = ActivityRule::default();

        assert!(board.is_active(&[upcoming.clone(), live.clone()], &rule, Utc::now()));
        assert!(!board.is_active(&[upcoming], &rule, Utc::now()));
        assert!(!board.is_active(&[Feed::Teams], &rule, Utc::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_static_view_mount_loads_from_cache() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockSource::new());
        store.put(&Feed::Standings.key(), &Snapshot::new(json!({"standings": []}))).unwrap();
        source.respond(&Feed::Teams, json!({"teams": []}));
        let cache = FeedCache::new(store, source.clone());

        let mut view = FeedView::new(
            "dashboard",
            cache,
            vec![Feed::Standings, Feed::Teams],
            RefreshMode::Static,
        );
        assert_eq!(view.board().phase, LoadPhase::Loading);

        view.mount();
        settle().await;

        let board = view.board();
        assert_eq!(board.phase, LoadPhase::Ready);
        assert!(board.snapshot(&Feed::Standings).is_some());
        assert!(board.snapshot(&Feed::Teams).is_some());
        assert_eq!(source.calls(), 1);
        assert_eq!(view.scheduler_state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_failure_shows_error() {
        let source = Arc::new(MockSource::new());
        source.fail(&Feed::Teams, 500);
        let cache = FeedCache::new(Arc::new(MemoryStore::new()), source);

        let mut view = FeedView::new("teams", cache, vec![Feed::Teams], RefreshMode::Static);
        view.mount();
        settle().await;

        assert!(matches!(view.board().phase, LoadPhase::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_switch_does_not_fetch() {
        let feeds = vec![
            Feed::matches(MatchStatus::Scheduled, 20),
            Feed::matches(MatchStatus::InPlay, 10),
            Feed::matches(MatchStatus::Finished, 20),
        ];
        let source = Arc::new(MockSource::new());
        for feed in &feeds {
            source.respond(feed, json!({"matches": []}));
        }
        let cache = FeedCache::new(Arc::new(MemoryStore::new()), source.clone());
        let mut view = FeedView::new("matches", cache, feeds.clone(), RefreshMode::Static);
        view.mount();
        settle().await;
        let after_mount = source.calls();

        view.select_next();
        assert_eq!(view.selected_feed(), Some(&feeds[1]));
        view.select_prev();
        view.select_prev();
        assert_eq!(view.selected(), 2);
        view.select(7);
        assert_eq!(view.selected(), 2);
        settle().await;

        assert_eq!(source.calls(), after_mount);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_forces_fetch_and_requires_mount() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(MockSource::new());
        store.put(&Feed::Teams.key(), &Snapshot::new(json!({"v": 1}))).unwrap();
        source.respond(&Feed::Teams, json!({"v": 2}));
        let cache = FeedCache::new(store, source.clone());

        let mut view = FeedView::new("teams", cache, vec![Feed::Teams], RefreshMode::Static);
        assert!(!view.refresh_now());

        view.mount();
        settle().await;
        assert_eq!(source.calls(), 0);

        assert!(view.refresh_now());
        settle().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(
            view.board().snapshot(&Feed::Teams).unwrap().payload(),
            &json!({"v": 2})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_remount_keeps_data_and_restarts_schedule() {
        let feeds = vec![Feed::matches(MatchStatus::InPlay, 10)];
        let store = Arc::new(MemoryStore::new());
        store.put(&feeds[0].key(), &Snapshot::new(json!({"matches": []}))).unwrap();
        let source = Arc::new(MockSource::new());
        let cache = FeedCache::new(store, source.clone());

        let mut view = FeedView::new(
            "matches",
            cache,
            feeds.clone(),
            RefreshMode::Auto(ScheduleConfig::default()),
        );
        view.mount();
        settle().await;
        assert_eq!(view.scheduler_state(), SchedulerState::Scheduled);

        view.unmount();
        assert_eq!(view.scheduler_state(), SchedulerState::Idle);
        assert!(view.board().has_data());

        view.mount();
        settle().await;
        assert_eq!(view.scheduler_state(), SchedulerState::Scheduled);
        assert_eq!(view.board().phase, LoadPhase::Ready);
        assert_eq!(source.calls(), 0);
    }
}
