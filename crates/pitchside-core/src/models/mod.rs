//! Data models for football-data.org payloads.
//!
//! Only the fields the cache inspects or the TUI renders are modelled:
//!
//! - `MatchRecord`, `MatchStatus`: the subset used for activity checks
//! - `Match`, `MatchesResponse`: fixtures and results
//! - `StandingsResponse`, `TeamsResponse`: league table and team list

pub mod competition;
pub mod fixture;

pub use competition::{StandingsGroup, StandingsResponse, TableRow, Team, TeamsResponse};
pub use fixture::{
    Match, MatchRecord, MatchStatus, MatchesResponse, Score, ScoreLine, TeamRef, Winner,
};
