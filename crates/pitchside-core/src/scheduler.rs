//! Background refresh schedule for auto-refreshing views.
//!
//! After the initial cache-preferring load, a fixed-period tick checks the
//! view's board and force-refreshes every feed if any of them is active.
//! The board is read at tick time, so a tick always classifies the most
//! recently published snapshots.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::activity::ActivityRule;
use crate::cache::FeedCache;
use crate::feed::Feed;
use crate::view::{load_into_board, read_board, SharedBoard};

/// Default tick period (1 hour).
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(3600);

/// Accepted tick periods. Longer or shorter periods are clamped.
pub const MIN_REFRESH_PERIOD: Duration = Duration::from_secs(1);
pub const MAX_REFRESH_PERIOD: Duration = Duration::from_secs(30 * 24 * 3600);

#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    pub period: Duration,
    pub rule: ActivityRule,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_REFRESH_PERIOD,
            rule: ActivityRule::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled,
}

/// A running schedule. Dropping the handle cancels it.
pub struct ScheduleHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    pub fn start(
        cache: FeedCache,
        board: SharedBoard,
        feeds: Vec<Feed>,
        config: ScheduleConfig,
    ) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(run(cache, board, feeds, config, rx));
        Self { shutdown, task }
    }

    /// Stop ticking and abandon any refresh in flight.
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run(
    cache: FeedCache,
    board: SharedBoard,
    feeds: Vec<Feed>,
    config: ScheduleConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = Instant::now();

    tokio::select! {
        biased;
        _ = shutdown.changed() => return,
        _ = load_into_board(&cache, &board, &feeds, false) => {}
    }

    let period = bounded_period(config.period);
    let first_tick = start.checked_add(period).unwrap_or_else(Instant::now);
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period_secs = period.as_secs(), feeds = feeds.len(), "Refresh schedule started");

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        if *shutdown.borrow() {
            break;
        }

        let active = read_board(&board).is_active(&feeds, &config.rule, Utc::now());
        if !active {
            debug!("No live or imminent matches, skipping refresh");
            continue;
        }

        debug!("Active matches, refreshing feeds");
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = load_into_board(&cache, &board, &feeds, true) => {}
        }
    }

    debug!("Refresh schedule stopped");
}

fn bounded_period(period: Duration) -> Duration {
    let bounded = period.clamp(MIN_REFRESH_PERIOD, MAX_REFRESH_PERIOD);
    if bounded != period {
        warn!(
            requested_secs = period.as_secs(),
            used_secs = bounded.as_secs(),
            "Refresh period out of range, clamping"
        );
    }
    bounded
}

/// Owns the schedule of one view across mounts.
pub struct RefreshScheduler {
    cache: FeedCache,
    board: SharedBoard,
    feeds: Vec<Feed>,
    config: ScheduleConfig,
    handle: Option<ScheduleHandle>,
}

impl RefreshScheduler {
    pub fn new(cache: FeedCache, board: SharedBoard, feeds: Vec<Feed>, config: ScheduleConfig) -> Self {
        Self {
            cache,
            board,
            feeds,
            config,
            handle: None,
        }
    }

    /// Load once, then tick. Any previous schedule is cancelled first.
    pub fn start(&mut self) {
        self.cancel();
        self.handle = Some(ScheduleHandle::start(
            self.cache.clone(),
            self.board.clone(),
            self.feeds.clone(),
            self.config,
        ));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
    }

    pub fn state(&self) -> SchedulerState {
        match &self.handle {
            Some(handle) if !handle.is_finished() => SchedulerState::Scheduled,
            _ => SchedulerState::Idle,
        }
    }
}
