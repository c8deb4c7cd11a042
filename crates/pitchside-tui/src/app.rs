//! Application state for the terminal dashboard.
//!
//! The app owns one `FeedView` per screen. Only the screen on display is
//! mounted, so leaving the matches screen also stops its refresh schedule.

use std::sync::Arc;

use anyhow::{Context, Result};
use pitchside_core::auth::CredentialStore;
use pitchside_core::config::UpstreamMode;
use pitchside_core::{
    Config, FeedBoard, FeedCache, FeedClient, FeedView, FileStore, LoadPhase, RefreshMode,
    SchedulerState,
};
use tracing::info;

// ============================================================================
// Constants
// ============================================================================

/// Number of lines to scroll for page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Sub-tab labels of the matches screen, in feed order
pub const MATCH_TAB_LABELS: [&str; 3] = ["Upcoming", "Live", "Finished"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Matches,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Matches => "Matches",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

pub struct App {
    pub config: Config,
    pub state: AppState,
    pub current_tab: Tab,
    pub scroll: usize,
    dashboard: FeedView,
    matches: FeedView,
}

impl App {
    /// Build the app from configuration: file cache in the cache directory,
    /// HTTP client for the configured upstream.
    pub fn from_config(config: Config) -> Result<Self> {
        let token = match config.upstream {
            UpstreamMode::Direct => CredentialStore::resolve_token(),
            UpstreamMode::Proxy => None,
        };
        let client = FeedClient::new(config.upstream(token), config.request_timeout())
            .context("Failed to create feed client")?;
        let store = FileStore::new(config.cache_dir()?)?;
        let cache = FeedCache::new(Arc::new(store), Arc::new(client));
        Ok(Self::new(config, cache))
    }

    pub fn new(config: Config, cache: FeedCache) -> Self {
        let dashboard = FeedView::new(
            "dashboard",
            cache.clone(),
            config.dashboard_feeds(),
            RefreshMode::Static,
        );
        let matches = FeedView::new(
            "matches",
            cache,
            config.match_feeds(),
            RefreshMode::Auto(config.schedule_config()),
        );

        Self {
            config,
            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            scroll: 0,
            dashboard,
            matches,
        }
    }

    /// Mount the screen on display. Must be called from within a Tokio runtime.
    pub fn start(&mut self) {
        self.current_view_mut().mount();
    }

    pub fn view(&self, tab: Tab) -> &FeedView {
        match tab {
            Tab::Dashboard => &self.dashboard,
            Tab::Matches => &self.matches,
        }
    }

    pub fn current_view(&self) -> &FeedView {
        self.view(self.current_tab)
    }

    fn current_view_mut(&mut self) -> &mut FeedView {
        match self.current_tab {
            Tab::Dashboard => &mut self.dashboard,
            Tab::Matches => &mut self.matches,
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if tab == self.current_tab {
            return;
        }
        info!(from = self.current_tab.title(), to = tab.title(), "Switching screen");
        self.current_view_mut().unmount();
        self.current_tab = tab;
        self.scroll = 0;
        self.current_view_mut().mount();
    }

    /// Forced refresh of the screen on display.
    pub fn refresh_current_tab(&mut self) {
        self.current_view_mut().refresh_now();
    }

    // ===== Sub-tabs (matches screen only) =====

    pub fn next_sub_tab(&mut self) {
        if self.current_tab == Tab::Matches {
            self.matches.select_next();
            self.scroll = 0;
        }
    }

    pub fn prev_sub_tab(&mut self) {
        if self.current_tab == Tab::Matches {
            self.matches.select_prev();
            self.scroll = 0;
        }
    }

    // ===== Scrolling =====

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn status_text(&self) -> String {
        status_text(&self.current_view().board())
    }

    /// Whether the visible screen has a refresh schedule running.
    pub fn auto_refreshing(&self) -> bool {
        self.current_view().scheduler_state() == SchedulerState::Scheduled
    }
}

/// Status bar text for a board.
pub fn status_text(board: &FeedBoard) -> String {
    match &board.phase {
        LoadPhase::Loading => "Loading…".to_string(),
        LoadPhase::Refreshing => "Refreshing…".to_string(),
        LoadPhase::Failed(msg) => format!("Error: {}", msg),
        LoadPhase::Ready => match &board.last_error {
            Some(err) => format!("Refresh failed: {} (updated {})", err, board.age_display()),
            None => format!("Updated {}", board.age_display()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pitchside_core::cache::MemoryStore;
    use pitchside_core::{CacheEntry, Feed, FeedError, FeedSource, Snapshot};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Source that answers every feed with an empty payload.
    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedSource for CountingSource {
        async fn fetch(&self, _feed: &Feed) -> Result<Snapshot, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Snapshot::new(json!({})))
        }
    }

    fn app() -> (App, Arc<CountingSource>) {
        let source = Arc::new(CountingSource::default());
        let cache = FeedCache::new(Arc::new(MemoryStore::new()), source.clone());
        (App::new(Config::default(), cache), source)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_screens_mounts_one_view() {
        let (mut app, source) = app();
        app.start();
        settle().await;
        assert!(app.view(Tab::Dashboard).is_mounted());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        app.switch_tab(Tab::Matches);
        settle().await;
        assert!(!app.view(Tab::Dashboard).is_mounted());
        assert!(app.view(Tab::Matches).is_mounted());
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);

        // Warm cache: coming back costs nothing
        app.switch_tab(Tab::Dashboard);
        settle().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_only_on_matches() {
        let (mut app, _source) = app();
        app.start();
        settle().await;
        assert!(!app.auto_refreshing());

        app.switch_tab(Tab::Matches);
        settle().await;
        assert!(app.auto_refreshing());

        app.switch_tab(Tab::Dashboard);
        assert!(!app.auto_refreshing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_tabs_only_on_matches() {
        let (mut app, _source) = app();
        app.next_sub_tab();
        assert_eq!(app.view(Tab::Matches).selected(), 0);

        app.switch_tab(Tab::Matches);
        app.scroll_down(4);
        app.next_sub_tab();
        assert_eq!(app.view(Tab::Matches).selected(), 1);
        assert_eq!(app.scroll, 0);

        app.prev_sub_tab();
        app.prev_sub_tab();
        assert_eq!(app.view(Tab::Matches).selected(), 2);
    }

    #[test]
    fn test_status_text() {
        let mut board = FeedBoard::new();
        assert_eq!(status_text(&board), "Loading…");

        board.publish(vec![CacheEntry::new(
            Feed::Teams.key(),
            Snapshot::new(json!({})),
        )]);
        assert_eq!(status_text(&board), "Updated just now");

        board.begin_load(true);
        assert_eq!(status_text(&board), "Refreshing…");

        board.record_failure(&FeedError::Transport("refused".into()));
        assert_eq!(
            status_text(&board),
            "Refresh failed: Unable to reach server (updated just now)"
        );
    }

    #[test]
    fn test_scroll_saturates() {
        let (mut app, _source) = app();

        app.scroll_up(3);
        assert_eq!(app.scroll, 0);
        app.scroll_down(PAGE_SCROLL_SIZE);
        app.scroll_up(3);
        assert_eq!(app.scroll, 7);
    }
}
