use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Timed,
    InPlay,
    Live,
    Paused,
    Finished,
    Postponed,
    Suspended,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl MatchStatus {
    /// Wire name, as sent in the `status` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "SCHEDULED",
            MatchStatus::Timed => "TIMED",
            MatchStatus::InPlay => "IN_PLAY",
            MatchStatus::Live => "LIVE",
            MatchStatus::Paused => "PAUSED",
            MatchStatus::Finished => "FINISHED",
            MatchStatus::Postponed => "POSTPONED",
            MatchStatus::Suspended => "SUSPENDED",
            MatchStatus::Cancelled => "CANCELLED",
            MatchStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::InPlay | MatchStatus::Live)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Shown as LIVE on screen, same as the provider's LIVE
            MatchStatus::InPlay => write!(f, "LIVE"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// The part of a match the activity check looks at.
///
/// Decoding never fails on a malformed id or kick-off time; a live match
/// is live whatever else the record carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(rename = "utcDate", default, deserialize_with = "lenient_utc_date")]
    pub utc_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: MatchStatus,
}

/// RFC 3339, or a naive timestamp read as UTC. Anything else is `None`.
fn lenient_utc_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_utc_date))
}

fn parse_utc_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub tla: Option<String>,
    pub crest: Option<String>,
}

impl TeamRef {
    pub fn display_name(&self) -> String {
        self.short_name
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "TBD".to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreLine {
    pub home: Option<i64>,
    pub away: Option<i64>,
}

impl ScoreLine {
    pub fn display(&self) -> Option<String> {
        match (self.home, self.away) {
            (Some(h), Some(a)) => Some(format!("{} - {}", h, a)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    HomeTeam,
    AwayTeam,
    Draw,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    pub winner: Option<Winner>,
    #[serde(rename = "fullTime", default)]
    pub full_time: ScoreLine,
    #[serde(rename = "halfTime", default)]
    pub half_time: ScoreLine,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(rename = "utcDate", default, deserialize_with = "lenient_utc_date")]
    pub utc_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: MatchStatus,
    pub matchday: Option<u32>,
    #[serde(rename = "homeTeam", default)]
    pub home_team: TeamRef,
    #[serde(rename = "awayTeam", default)]
    pub away_team: TeamRef,
    #[serde(default)]
    pub score: Score,
}

impl Match {
    /// Kick-off in UTC, e.g. "Sat 16 Aug 19:00"
    pub fn kickoff_display(&self) -> String {
        match self.utc_date {
            Some(dt) => dt.format("%a %d %b %H:%M").to_string(),
            None => "TBD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl MatchesResponse {
    /// Matches grouped by matchday in ascending order. Matches without a
    /// matchday are grouped under 0.
    pub fn by_matchday(&self) -> BTreeMap<u32, Vec<&Match>> {
        let mut groups: BTreeMap<u32, Vec<&Match>> = BTreeMap::new();
        for m in &self.matches {
            groups.entry(m.matchday.unwrap_or(0)).or_default().push(m);
        }
        groups
    }
}
