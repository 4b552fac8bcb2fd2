use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which side is batting during a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfInning {
    /// Away team bats
    Top,
    /// Home team bats
    Bottom,
}

impl HalfInning {
    /// Feed value "bottom" is the home half; anything else counts as the top.
    pub fn from_feed(s: &str) -> Self {
        if s.eq_ignore_ascii_case("bottom") {
            HalfInning::Bottom
        } else {
            HalfInning::Top
        }
    }

    pub fn home_batting(self) -> bool {
        self == HalfInning::Bottom
    }
}

/// One plate appearance / event from the play-by-play feed, in game order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    /// 1-based inning; values above 9 are extra innings
    pub inning: i32,
    pub half: HalfInning,
    /// Runs that crossed the plate on this play
    pub runs_scored: i32,
    pub batter_id: Option<i64>,
    pub batter_name: String,
    pub pitcher_id: Option<i64>,
    pub pitcher_name: String,
    /// e.g. "Single", "Home Run", "Strikeout" (display only)
    pub event_type: String,
    pub description: String,
}

/// One row of the per-game WPA ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WpaEntry {
    pub play_index: usize,
    pub inning: i32,
    pub half: HalfInning,
    pub tracked_score_before: i32,
    pub opponent_score_before: i32,
    pub tracked_score_after: i32,
    pub opponent_score_after: i32,
    pub win_probability_before: f64,
    pub win_probability_after: f64,
    /// win_probability_after − win_probability_before
    pub wpa: f64,
    pub batter_id: Option<i64>,
    pub batter_name: String,
    pub pitcher_id: Option<i64>,
    pub pitcher_name: String,
    pub event_type: String,
    pub description: String,
}

/// Per-player WPA split into batting and pitching contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWpaTotal {
    pub player_id: i64,
    pub player_name: String,
    pub wpa_batting: f64,
    pub wpa_pitching: f64,
    pub wpa_total: f64,
}

/// Completed-game metadata as stored by the daily ingestion job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// MLB Stats API gamePk
    pub id: i64,
    pub game_date: NaiveDate,
    /// Season label: the 2025-2026 winter season is stored as 2026
    pub season: i32,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    /// "Final" | "Completed" | "Completed Early" | "Scheduled" | ...
    pub status: String,
    pub venue: Option<String>,
}

impl Game {
    pub fn is_home(&self, team_id: i64) -> bool {
        self.home_team_id == team_id
    }

    /// (team, opponent) runs from the point of view of `team_id`.
    pub fn score_for(&self, team_id: i64) -> Option<(i32, i32)> {
        let (home, away) = (self.home_score?, self.away_score?);
        if self.is_home(team_id) {
            Some((home, away))
        } else {
            Some((away, home))
        }
    }
}

/// Statuses the store uses for games that have a complete play-by-play.
pub const COMPLETED_STATUSES: [&str; 3] = ["Final", "Completed", "Completed Early"];
