//! Activity classification for match feeds.
//!
//! A feed is active while one of its matches is live, or scheduled to kick
//! off within the lookahead window. Only active feeds are refreshed in the
//! background.

use chrono::{DateTime, Duration, Utc};

use crate::models::{MatchRecord, MatchStatus};

/// Default lookahead window in minutes (3 hours).
pub const DEFAULT_WINDOW_MINUTES: i64 = 180;

/// Longest accepted lookahead window in minutes (one year).
pub const MAX_WINDOW_MINUTES: i64 = 365 * 24 * 60;

/// Whether a kick-off exactly at the window edge counts as imminent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBoundary {
    /// `kickoff <= now + window`
    Inclusive,
    /// `kickoff < now + window`
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRule {
    pub window: Duration,
    pub boundary: WindowBoundary,
}

impl Default for ActivityRule {
    fn default() -> Self {
        Self {
            window: Duration::minutes(DEFAULT_WINDOW_MINUTES),
            boundary: WindowBoundary::Inclusive,
        }
    }
}

impl ActivityRule {
    pub fn new(window: Duration, boundary: WindowBoundary) -> Self {
        Self { window, boundary }
    }

    pub fn is_active(&self, records: &[MatchRecord], now: DateTime<Utc>) -> bool {
        records.iter().any(|r| self.is_record_active(r, now))
    }

    pub fn is_record_active(&self, record: &MatchRecord, now: DateTime<Utc>) -> bool {
        if record.status.is_live() {
            return true;
        }
        if record.status != MatchStatus::Scheduled {
            return false;
        }
        let Some(kickoff) = record.utc_date else {
            return false;
        };
        // Past the end of the calendar, every kick-off is inside the window
        let Some(edge) = now.checked_add_signed(self.window) else {
            return true;
        };
        match self.boundary {
            WindowBoundary::Inclusive => kickoff <= edge,
            WindowBoundary::Exclusive => kickoff < edge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn record(status: MatchStatus, kickoff: Option<DateTime<Utc>>) -> MatchRecord {
        MatchRecord {
            id: Some(1.into()),
            utc_date: kickoff,
            status,
        }
    }

    #[test]
    fn test_empty_is_inactive() {
        assert!(!ActivityRule::default().is_active(&[], now()));
    }

    #[test]
    fn test_live_is_active_regardless_of_date() {
        let rule = ActivityRule::default();
        let far = now() + Duration::days(30);
        assert!(rule.is_active(&[record(MatchStatus::InPlay, Some(far))], now()));
        assert!(rule.is_active(&[record(MatchStatus::Live, None)], now()));
    }

    #[test]
    fn test_scheduled_inside_and_outside_window() {
        let rule = ActivityRule::default();
        let inside = now() + Duration::hours(2) + Duration::minutes(59);
        let outside = now() + Duration::hours(3) + Duration::minutes(1);
        assert!(rule.is_active(&[record(MatchStatus::Scheduled, Some(inside))], now()));
        assert!(!rule.is_active(&[record(MatchStatus::Scheduled, Some(outside))], now()));
    }

    #[test]
    fn test_window_edge_follows_boundary() {
        let edge = now() + Duration::hours(3);
        let scheduled = [record(MatchStatus::Scheduled, Some(edge))];

        let inclusive = ActivityRule::default();
        assert!(inclusive.is_active(&scheduled, now()));

        let exclusive = ActivityRule::new(Duration::hours(3), WindowBoundary::Exclusive);
        assert!(!exclusive.is_active(&scheduled, now()));
    }

    #[test]
    fn test_other_statuses_are_inactive() {
        let rule = ActivityRule::default();
        let soon = Some(now() + Duration::minutes(10));
        for status in [
            MatchStatus::Timed,
            MatchStatus::Paused,
            MatchStatus::Finished,
            MatchStatus::Postponed,
            MatchStatus::Suspended,
            MatchStatus::Cancelled,
            MatchStatus::Unknown,
        ] {
            assert!(!rule.is_active(&[record(status, soon)], now()), "{status:?}");
        }
    }

    #[test]
    fn test_scheduled_without_date_is_inactive() {
        let rule = ActivityRule::default();
        assert!(!rule.is_active(&[record(MatchStatus::Scheduled, None)], now()));
    }

    #[test]
    fn test_window_past_calendar_end_does_not_overflow() {
        let rule = ActivityRule::new(Duration::days(100_000_000), WindowBoundary::Inclusive);
        let kickoff = Some(now() + Duration::days(400));
        assert!(rule.is_active(&[record(MatchStatus::Scheduled, kickoff)], now()));
        assert!(!rule.is_active(&[record(MatchStatus::Finished, kickoff)], now()));
    }

    #[test]
    fn test_any_active_record_wins() {
        let rule = ActivityRule::default();
        let records = [
            record(MatchStatus::Finished, Some(now() - Duration::hours(2))),
            record(MatchStatus::Scheduled, Some(now() + Duration::days(3))),
            record(MatchStatus::Scheduled, Some(now() + Duration::minutes(30))),
        ];
        assert!(rule.is_active(&records, now()));
    }
}
