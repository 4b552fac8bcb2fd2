//! Derived figures for the game card and charts: result, WP extremes, big
//! plays, WPA and score per inning, heroes/villains and the MVP/LVP pair.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::db::models::{PlayerWpaTotal, WpaEntry};

use super::ledger::INITIAL_WIN_PROBABILITY;
use super::players::{lvp, mvp};

/// |wpa| above this counts as a big play.
pub const BIG_PLAY_THRESHOLD: f64 = 0.1;
/// |inning wpa| above this marks a critical inning.
pub const CRITICAL_INNING_THRESHOLD: f64 = 0.15;
/// LVP is only shown when the worst total is below −0.05.
pub const LVP_DISPLAY_THRESHOLD: f64 = 0.05;
/// Number of best/worst plays listed.
pub const KEY_PLAYS: usize = 5;
/// Size of the heroes and villains lists.
pub const HEROES_VILLAINS: usize = 5;
/// A villain must have cost at least this much win probability.
pub const VILLAIN_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningWpa {
    pub inning: i32,
    pub wpa: f64,
}

/// Score at the end of an inning, tracked team first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningScore {
    pub inning: i32,
    pub tracked: i32,
    pub opponent: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub final_tracked_score: i32,
    pub final_opponent_score: i32,
    pub won: bool,
    pub max_win_probability: f64,
    pub min_win_probability: f64,
    pub big_plays: usize,
    pub wpa_by_inning: Vec<InningWpa>,
    pub critical_innings: Vec<InningWpa>,
    pub score_by_inning: Vec<InningScore>,
    pub best_plays: Vec<WpaEntry>,
    pub worst_plays: Vec<WpaEntry>,
    pub mvp: Option<PlayerWpaTotal>,
    pub lvp: Option<PlayerWpaTotal>,
    /// Top of the ranking, best first
    pub heroes: Vec<PlayerWpaTotal>,
    /// Clearly negative totals not already among the heroes, worst first
    pub villains: Vec<PlayerWpaTotal>,
    /// 0.5 seed followed by every play's win_probability_after
    pub win_probability_path: Vec<f64>,
}

/// Summarize a ledger and its player ranking. `None` when there are no plays.
pub fn summarize_game(ledger: &[WpaEntry], ranked: &[PlayerWpaTotal]) -> Option<GameSummary> {
    let last = ledger.last()?;

    let (min_wp, max_wp) = ledger.iter().fold((f64::MAX, f64::MIN), |(lo, hi), e| {
        (lo.min(e.win_probability_after), hi.max(e.win_probability_after))
    });

    let mut by_inning: BTreeMap<i32, f64> = BTreeMap::new();
    for e in ledger {
        *by_inning.entry(e.inning).or_insert(0.0) += e.wpa;
    }
    let wpa_by_inning: Vec<InningWpa> = by_inning
        .into_iter()
        .map(|(inning, wpa)| InningWpa { inning, wpa })
        .collect();
    let critical_innings = wpa_by_inning
        .iter()
        .filter(|i| i.wpa.abs() > CRITICAL_INNING_THRESHOLD)
        .cloned()
        .collect();

    // Ledger order is game order, so the last entry seen per inning wins.
    let mut last_score: BTreeMap<i32, (i32, i32)> = BTreeMap::new();
    for e in ledger {
        last_score.insert(e.inning, (e.tracked_score_after, e.opponent_score_after));
    }
    let score_by_inning = last_score
        .into_iter()
        .map(|(inning, (tracked, opponent))| InningScore {
            inning,
            tracked,
            opponent,
        })
        .collect();

    let mut by_wpa: Vec<&WpaEntry> = ledger.iter().collect();
    by_wpa.sort_by(|a, b| b.wpa.partial_cmp(&a.wpa).unwrap_or(std::cmp::Ordering::Equal));
    let best_plays = by_wpa.iter().take(KEY_PLAYS).map(|e| (*e).clone()).collect();
    let worst_plays = by_wpa
        .iter()
        .rev()
        .take(KEY_PLAYS)
        .map(|e| (*e).clone())
        .collect();

    let heroes: Vec<PlayerWpaTotal> = ranked.iter().take(HEROES_VILLAINS).cloned().collect();
    let villains = ranked
        .iter()
        .rev()
        .filter(|p| p.wpa_total < -VILLAIN_THRESHOLD)
        .filter(|p| !heroes.iter().any(|h| h.player_id == p.player_id))
        .take(HEROES_VILLAINS)
        .cloned()
        .collect();

    let win_probability_path = std::iter::once(INITIAL_WIN_PROBABILITY)
        .chain(ledger.iter().map(|e| e.win_probability_after))
        .collect();

    Some(GameSummary {
        final_tracked_score: last.tracked_score_after,
        final_opponent_score: last.opponent_score_after,
        won: last.tracked_score_after > last.opponent_score_after,
        max_win_probability: max_wp,
        min_win_probability: min_wp,
        big_plays: ledger
            .iter()
            .filter(|e| e.wpa.abs() > BIG_PLAY_THRESHOLD)
            .count(),
        wpa_by_inning,
        critical_innings,
        score_by_inning,
        best_plays,
        worst_plays,
        mvp: mvp(ranked).cloned(),
        lvp: lvp(ranked, LVP_DISPLAY_THRESHOLD).cloned(),
        heroes,
        villains,
        win_probability_path,
    })
}
