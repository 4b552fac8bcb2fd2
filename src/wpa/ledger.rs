//! Play-by-play WPA processor.
//!
//! Walks a completed game's plays in order, keeps a running score, and
//! records how much each play moved the tracked team's win probability. The
//! swing is credited to the batter and pitcher of the play downstream (see
//! `players`).

use crate::db::models::{Play, WpaEntry};

use super::model::win_probability;

/// Win probability before the first pitch.
pub const INITIAL_WIN_PROBABILITY: f64 = 0.5;

/// Running score state carried across plays.
#[derive(Debug, Clone, Copy)]
struct GameState {
    home_score: i32,
    away_score: i32,
    previous_win_probability: f64,
}

impl GameState {
    fn new() -> Self {
        GameState {
            home_score: 0,
            away_score: 0,
            previous_win_probability: INITIAL_WIN_PROBABILITY,
        }
    }

    /// (tracked, opponent) runs.
    fn perspective(&self, tracked_is_home: bool) -> (i32, i32) {
        if tracked_is_home {
            (self.home_score, self.away_score)
        } else {
            (self.away_score, self.home_score)
        }
    }
}

/// Build the WPA ledger for one completed game.
///
/// Returns one entry per play, in order. An empty play list yields an empty
/// ledger; callers treat that as "no data".
///
/// The last entry is forced to a certain outcome: its `win_probability_after`
/// becomes 1.0 when the tracked team finished ahead and 0.0 otherwise, and its
/// `wpa` is recomputed against its own `win_probability_before`. The heuristic
/// model never reaches 0/1 on its own for close games, so without this the
/// path would end short of the real result.
pub fn compute_wpa_ledger(plays: &[Play], tracked_is_home: bool) -> Vec<WpaEntry> {
    let mut state = GameState::new();
    let mut ledger = Vec::with_capacity(plays.len());

    for (play_index, play) in plays.iter().enumerate() {
        if play.half.home_batting() {
            state.home_score += play.runs_scored;
        } else {
            state.away_score += play.runs_scored;
        }

        let (tracked_after, opponent_after) = state.perspective(tracked_is_home);
        let tracked_batting = play.half.home_batting() == tracked_is_home;
        let (tracked_before, opponent_before) = if tracked_batting {
            (tracked_after - play.runs_scored, opponent_after)
        } else {
            (tracked_after, opponent_after - play.runs_scored)
        };

        let probability_after = win_probability(play.inning, tracked_after - opponent_after);
        let probability_before = state.previous_win_probability;

        ledger.push(WpaEntry {
            play_index,
            inning: play.inning,
            half: play.half,
            tracked_score_before: tracked_before,
            opponent_score_before: opponent_before,
            tracked_score_after: tracked_after,
            opponent_score_after: opponent_after,
            win_probability_before: probability_before,
            win_probability_after: probability_after,
            wpa: probability_after - probability_before,
            batter_id: play.batter_id,
            batter_name: play.batter_name.clone(),
            pitcher_id: play.pitcher_id,
            pitcher_name: play.pitcher_name.clone(),
            event_type: play.event_type.clone(),
            description: play.description.clone(),
        });

        state.previous_win_probability = probability_after;
    }

    if let Some(last) = ledger.last_mut() {
        let final_probability = if last.tracked_score_after > last.opponent_score_after {
            1.0
        } else {
            0.0
        };
        last.win_probability_after = final_probability;
        last.wpa = final_probability - last.win_probability_before;
    }

    ledger
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::models::HalfInning;
    use approx::assert_relative_eq;

    pub(crate) fn play(inning: i32, half: HalfInning, runs: i32, batter: i64, pitcher: i64) -> Play {
        Play {
            inning,
            half,
            runs_scored: runs,
            batter_id: Some(batter),
            batter_name: format!("Batter {}", batter),
            pitcher_id: Some(pitcher),
            pitcher_name: format!("Pitcher {}", pitcher),
            event_type: if runs > 0 { "Single".into() } else { "Groundout".into() },
            description: String::new(),
        }
    }

    /// Nine innings, one play per half; the away side scores `away_runs` in
    /// the first and nobody scores afterwards.
    fn blowout(away_runs: i32) -> Vec<Play> {
        let mut plays = Vec::new();
        for inning in 1..=9 {
            let runs = if inning == 1 { away_runs } else { 0 };
            plays.push(play(inning, HalfInning::Top, runs, 100 + inning as i64, 200));
            plays.push(play(inning, HalfInning::Bottom, 0, 300 + inning as i64, 400));
        }
        plays
    }

    #[test]
    fn empty_plays_give_empty_ledger() {
        assert!(compute_wpa_ledger(&[], true).is_empty());
        assert!(compute_wpa_ledger(&[], false).is_empty());
    }

    #[test]
    fn single_scoring_play_is_forced_to_a_win() {
        // Tracked team is away and bats in the top of the 1st.
        let plays = vec![play(1, HalfInning::Top, 1, 10, 20)];
        let ledger = compute_wpa_ledger(&plays, false);

        assert_eq!(ledger.len(), 1);
        let e = &ledger[0];
        assert_eq!((e.tracked_score_before, e.opponent_score_before), (0, 0));
        assert_eq!((e.tracked_score_after, e.opponent_score_after), (1, 0));
        assert_relative_eq!(e.win_probability_before, 0.5);
        assert_eq!(e.win_probability_after, 1.0);
        assert_relative_eq!(e.wpa, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn trailing_all_game_ends_at_zero() {
        let ledger = compute_wpa_ledger(&blowout(5), true);

        assert_eq!(ledger.len(), 18);
        assert!(ledger[0].wpa < 0.0);
        for e in &ledger[1..] {
            assert!(e.wpa <= 1e-9, "play {} wpa {:.4}", e.play_index, e.wpa);
            assert_eq!(e.tracked_score_after - e.opponent_score_after, -5);
        }
        assert_eq!(ledger.last().unwrap().win_probability_after, 0.0);
    }

    #[test]
    fn boundary_correction_overrides_model_in_one_run_game() {
        // Home team walks it off 1-0 in the bottom of the 9th.
        let mut plays = Vec::new();
        for inning in 1..=8 {
            plays.push(play(inning, HalfInning::Top, 0, 1, 2));
            plays.push(play(inning, HalfInning::Bottom, 0, 3, 4));
        }
        plays.push(play(9, HalfInning::Top, 0, 1, 2));
        plays.push(play(9, HalfInning::Bottom, 1, 3, 4));

        let ledger = compute_wpa_ledger(&plays, true);
        let last = ledger.last().unwrap();

        // The raw model would say ~0.724 here.
        assert!(win_probability(9, 1) < 0.75);
        assert_eq!(last.win_probability_after, 1.0);
        assert_relative_eq!(last.win_probability_before, 0.5, epsilon = 1e-12);
        assert_relative_eq!(last.wpa, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn tied_final_score_resolves_to_zero() {
        let plays = vec![
            play(1, HalfInning::Top, 2, 1, 2),
            play(1, HalfInning::Bottom, 2, 3, 4),
        ];
        let ledger = compute_wpa_ledger(&plays, true);
        assert_eq!(ledger.last().unwrap().win_probability_after, 0.0);
    }

    #[test]
    fn probabilities_chain_from_one_play_to_the_next() {
        let plays = vec![
            play(1, HalfInning::Top, 1, 1, 2),
            play(1, HalfInning::Bottom, 0, 3, 4),
            play(2, HalfInning::Top, 0, 5, 2),
            play(2, HalfInning::Bottom, 3, 6, 4),
        ];
        let ledger = compute_wpa_ledger(&plays, true);
        for pair in ledger.windows(2) {
            assert_eq!(
                pair[1].win_probability_before.to_bits(),
                pair[0].win_probability_after.to_bits()
            );
        }
        // Mid-game entries carry the raw model value.
        assert_relative_eq!(ledger[0].win_probability_after, win_probability(1, -1));
        assert_relative_eq!(ledger[2].win_probability_after, win_probability(2, -1));
    }

    #[test]
    fn before_scores_subtract_runs_from_the_batting_side_only() {
        let plays = vec![
            play(1, HalfInning::Top, 2, 1, 2),
            play(1, HalfInning::Bottom, 3, 3, 4),
        ];

        // Tracked team is the visitor.
        let away = compute_wpa_ledger(&plays, false);
        assert_eq!(
            (away[0].tracked_score_before, away[0].tracked_score_after),
            (0, 2)
        );
        assert_eq!(
            (away[1].opponent_score_before, away[1].opponent_score_after),
            (0, 3)
        );
        assert_eq!(away[1].tracked_score_before, 2);

        // Same plays seen from the home dugout.
        let home = compute_wpa_ledger(&plays, true);
        assert_eq!(
            (home[0].opponent_score_before, home[0].opponent_score_after),
            (0, 2)
        );
        assert_eq!(
            (home[1].tracked_score_before, home[1].tracked_score_after),
            (0, 3)
        );
    }

    #[test]
    fn wpa_sums_to_final_probability_minus_half() {
        let plays = vec![
            play(1, HalfInning::Top, 1, 1, 2),
            play(3, HalfInning::Bottom, 2, 3, 4),
            play(5, HalfInning::Top, 0, 5, 6),
            play(7, HalfInning::Top, 3, 7, 6),
            play(8, HalfInning::Bottom, 1, 3, 8),
            play(9, HalfInning::Bottom, 0, 9, 8),
        ];
        for tracked_is_home in [true, false] {
            let ledger = compute_wpa_ledger(&plays, tracked_is_home);
            let total: f64 = ledger.iter().map(|e| e.wpa).sum();
            let last = ledger.last().unwrap();
            assert!(last.win_probability_after == 0.0 || last.win_probability_after == 1.0);
            assert_relative_eq!(total, last.win_probability_after - 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn missing_participants_still_produce_entries() {
        let mut p = play(1, HalfInning::Top, 1, 1, 2);
        p.batter_id = None;
        p.pitcher_id = None;
        let ledger = compute_wpa_ledger(&[p], false);
        assert_eq!(ledger.len(), 1);
        assert!(ledger[0].batter_id.is_none());
        assert_relative_eq!(ledger[0].wpa, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let plays = blowout(2);
        let a = compute_wpa_ledger(&plays, false);
        let b = compute_wpa_ledger(&plays, false);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.wpa.to_bits(), y.wpa.to_bits());
            assert_eq!(x.win_probability_after.to_bits(), y.win_probability_after.to_bits());
        }
    }
}
