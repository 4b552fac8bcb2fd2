//! Translation of MLB Stats API JSON into the typed shapes the WPA engine
//! consumes.
//!
//! Required fields (the two teams) produce a [`FeedError`] when absent.
//! Everything else falls back to a fixed default so one malformed play never
//! sinks the whole game:
//!
//! | field                  | fallback         |
//! |------------------------|------------------|
//! | `about.inning`         | `1`              |
//! | `about.halfInning`     | top              |
//! | `runners[]`            | no runs          |
//! | `matchup.*.id`         | `None`           |
//! | `matchup.*.fullName`   | `"Desconocido"`  |
//! | `result.event/description` | `""`         |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::db::models::{HalfInning, Play};

/// Display name used when the feed omits a participant's name.
pub const UNKNOWN_PLAYER: &str = "Desconocido";

#[derive(Debug, Error, PartialEq)]
pub enum FeedError {
    #[error("game feed is missing {0}")]
    MissingField(&'static str),
}

/// A completed game's play-by-play, ready for the WPA processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameFeed {
    pub game_pk: i64,
    pub home_team_id: i64,
    pub home_team_name: String,
    pub away_team_id: i64,
    pub away_team_name: String,
    pub plays: Vec<Play>,
}

impl GameFeed {
    pub fn tracked_is_home(&self, team_id: i64) -> bool {
        self.home_team_id == team_id
    }
}

/// Parse a `/v1.1/game/{pk}/feed/live` response.
pub fn parse_game_feed(game_pk: i64, raw: &Value) -> Result<GameFeed, FeedError> {
    let teams = &raw["gameData"]["teams"];
    let home_team_id = teams["home"]["id"]
        .as_i64()
        .ok_or(FeedError::MissingField("gameData.teams.home.id"))?;
    let away_team_id = teams["away"]["id"]
        .as_i64()
        .ok_or(FeedError::MissingField("gameData.teams.away.id"))?;
    let home_team_name = teams["home"]["name"].as_str().unwrap_or_default().to_string();
    let away_team_name = teams["away"]["name"].as_str().unwrap_or_default().to_string();

    let plays = raw["liveData"]["plays"]["allPlays"]
        .as_array()
        .map(|all| all.iter().map(parse_play).collect())
        .unwrap_or_default();

    Ok(GameFeed {
        game_pk,
        home_team_id,
        home_team_name,
        away_team_id,
        away_team_name,
        plays,
    })
}

fn parse_play(raw: &Value) -> Play {
    let about = &raw["about"];
    let matchup = &raw["matchup"];
    let result = &raw["result"];

    let runs_scored = raw["runners"]
        .as_array()
        .map(|runners| {
            runners
                .iter()
                .filter(|r| r["movement"]["end"].as_str() == Some("score"))
                .count() as i32
        })
        .unwrap_or(0);

    Play {
        inning: about["inning"]
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(1),
        half: HalfInning::from_feed(about["halfInning"].as_str().unwrap_or("top")),
        runs_scored,
        batter_id: matchup["batter"]["id"].as_i64(),
        batter_name: person_name(&matchup["batter"]),
        pitcher_id: matchup["pitcher"]["id"].as_i64(),
        pitcher_name: person_name(&matchup["pitcher"]),
        event_type: result["event"].as_str().unwrap_or_default().to_string(),
        description: result["description"].as_str().unwrap_or_default().to_string(),
    }
}

fn person_name(person: &Value) -> String {
    person["fullName"]
        .as_str()
        .unwrap_or(UNKNOWN_PLAYER)
        .to_string()
}

/// Extract the ids of every player listed for `team_id` in a
/// `/v1/game/{pk}/boxscore` response. Returns an empty set when the team is
/// not in the box score.
pub fn parse_boxscore_roster(raw: &Value, team_id: i64) -> HashSet<i64> {
    let mut roster = HashSet::new();
    for side in ["home", "away"] {
        let team = &raw["teams"][side];
        if team["team"]["id"].as_i64() != Some(team_id) {
            continue;
        }
        if let Some(players) = team["players"].as_object() {
            roster.extend(players.values().filter_map(|p| p["person"]["id"].as_i64()));
        }
    }
    roster
}
