//! Feed identities and snapshots.
//!
//! A feed is one logical upstream resource (standings, a filtered match
//! list, teams). Its `FeedKey` is the identity used by the cache and by
//! the refresh scheduler.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::models::{MatchRecord, MatchStatus, MatchesResponse, StandingsResponse, TeamsResponse};

/// Stable identity of a feed: resource path plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedKey(String);

impl FeedKey {
    /// Derive a key from a path and its parameters, in declared order.
    ///
    /// Names and values are escaped so that separator characters inside a
    /// value can never make two different parameter lists collide.
    pub fn derive<K, V>(path: &str, params: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut key = escape_component(path);
        if !params.is_empty() {
            key.push(':');
            let joined: Vec<String> = params
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}={}",
                        escape_component(k.as_ref()),
                        escape_component(v.as_ref())
                    )
                })
                .collect();
            key.push_str(&joined.join("&"));
        }
        FeedKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' | '&' | '=' | ':' => out.push_str(&format!("%{:02X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Filter for the match list resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchQuery {
    pub status: Option<MatchStatus>,
    pub limit: Option<u32>,
}

impl MatchQuery {
    pub fn new(status: MatchStatus, limit: u32) -> Self {
        Self {
            status: Some(status),
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feed {
    Standings,
    Teams,
    Matches(MatchQuery),
}

impl Feed {
    pub fn matches(status: MatchStatus, limit: u32) -> Self {
        Feed::Matches(MatchQuery::new(status, limit))
    }

    /// Resource path, relative to the competition.
    pub fn path(&self) -> &'static str {
        match self {
            Feed::Standings => "standings",
            Feed::Teams => "teams",
            Feed::Matches(_) => "matches",
        }
    }

    /// Query parameters, passed to the upstream verbatim.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Feed::Standings | Feed::Teams => Vec::new(),
            Feed::Matches(query) => {
                let mut params = Vec::new();
                if let Some(status) = query.status {
                    params.push(("status", status.as_str().to_string()));
                }
                if let Some(limit) = query.limit {
                    params.push(("limit", limit.to_string()));
                }
                params
            }
        }
    }

    pub fn key(&self) -> FeedKey {
        FeedKey::derive(self.path(), &self.params())
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Full payload of one feed at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Value);

impl Snapshot {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// Match records in this payload. Records that fail to decode are
    /// skipped; a payload without a `matches` array has none.
    pub fn match_records(&self) -> Vec<MatchRecord> {
        let Some(items) = self.0.get("matches").and_then(|m| m.as_array()) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match serde_json::from_value::<MatchRecord>(item.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(error = %e, "Skipping undecodable match record");
                    None
                }
            })
            .collect()
    }

    pub fn as_matches(&self) -> MatchesResponse {
        Self::decode_or_default(&self.0, "matches")
    }

    pub fn as_standings(&self) -> StandingsResponse {
        Self::decode_or_default(&self.0, "standings")
    }

    pub fn as_teams(&self) -> TeamsResponse {
        Self::decode_or_default(&self.0, "teams")
    }

    fn decode_or_default<T: serde::de::DeserializeOwned + Default>(value: &Value, what: &str) -> T {
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            debug!(kind = what, error = %e, "Snapshot does not decode, rendering empty");
            T::default()
        })
    }
}
