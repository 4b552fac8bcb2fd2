//! Per-player WPA aggregation and MVP/LVP selection.

use std::collections::{HashMap, HashSet};

use crate::db::models::{PlayerWpaTotal, WpaEntry};

/// Sum ledger WPA per player, split by role, and rank descending by total.
///
/// Batting WPA is the sum over plays where the player was the batter; pitching
/// WPA the sum over plays where they were the pitcher. Both are the raw ledger
/// value from the tracked team's perspective, so a tracked-team pitcher who
/// gives up a big inning gets a negative pitching contribution.
///
/// Plays missing a batter (or pitcher) id are skipped for that role only.
///
/// `roster`: when given and non-empty, players outside it are dropped. An
/// empty set means "roster unknown" and filters nothing.
///
/// Ties in `wpa_total` keep first-appearance order.
pub fn aggregate_players(
    ledger: &[WpaEntry],
    roster: Option<&HashSet<i64>>,
) -> Vec<PlayerWpaTotal> {
    let roster = roster.filter(|r| !r.is_empty());

    // player_id → index into `totals`, so output order follows first appearance
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut totals: Vec<PlayerWpaTotal> = Vec::new();

    let mut slot = |id: i64, name: &str| -> usize {
        *index.entry(id).or_insert_with(|| {
            totals.push(PlayerWpaTotal {
                player_id: id,
                player_name: name.to_string(),
                wpa_batting: 0.0,
                wpa_pitching: 0.0,
                wpa_total: 0.0,
            });
            totals.len() - 1
        })
    };

    let mut batting: Vec<(usize, f64)> = Vec::new();
    let mut pitching: Vec<(usize, f64)> = Vec::new();
    for entry in ledger {
        if let Some(id) = entry.batter_id {
            batting.push((slot(id, &entry.batter_name), entry.wpa));
        }
        if let Some(id) = entry.pitcher_id {
            pitching.push((slot(id, &entry.pitcher_name), entry.wpa));
        }
    }

    for (i, wpa) in batting {
        totals[i].wpa_batting += wpa;
    }
    for (i, wpa) in pitching {
        totals[i].wpa_pitching += wpa;
    }

    let mut ranked: Vec<PlayerWpaTotal> = totals
        .into_iter()
        .filter(|p| roster.map_or(true, |r| r.contains(&p.player_id)))
        .map(|mut p| {
            p.wpa_total = p.wpa_batting + p.wpa_pitching;
            p
        })
        .collect();

    // Stable sort: equal totals keep first-appearance order
    ranked.sort_by(|a, b| {
        b.wpa_total
            .partial_cmp(&a.wpa_total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
}

/// Most valuable player: the top of the ranking.
pub fn mvp(ranked: &[PlayerWpaTotal]) -> Option<&PlayerWpaTotal> {
    ranked.first()
}

/// Least valuable player: the bottom of the ranking, but only when their
/// total is below `-threshold`. The threshold is a display decision.
pub fn lvp(ranked: &[PlayerWpaTotal], threshold: f64) -> Option<&PlayerWpaTotal> {
    ranked.last().filter(|p| p.wpa_total < -threshold)
}
