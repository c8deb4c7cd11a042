use serde::{Deserialize, Serialize};

use super::fixture::TeamRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub position: u32,
    pub team: TeamRef,
    #[serde(rename = "playedGames", default)]
    pub played_games: u32,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub won: u32,
    #[serde(default)]
    pub draw: u32,
    #[serde(default)]
    pub lost: u32,
    #[serde(rename = "goalDifference", default)]
    pub goal_difference: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsGroup {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub table: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandingsResponse {
    #[serde(default)]
    pub standings: Vec<StandingsGroup>,
}

impl StandingsResponse {
    /// The overall league table (home and away tables are skipped).
    pub fn total_table(&self) -> &[TableRow] {
        self.standings
            .iter()
            .find(|s| s.kind == "TOTAL")
            .map(|s| s.table.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub tla: Option<String>,
    pub crest: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<Team>,
}
