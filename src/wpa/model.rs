//! Heuristic in-game win probability for baseball.
//!
//! The model only looks at two things: the inning and the run differential
//! from the tracked team's point of view. A logistic curve turns the
//! differential into a base probability, and a leverage term pushes that
//! probability away from 0.5 as the game approaches the 9th inning.
//!
//! This is deliberately not a table-driven empirical model (no outs, no
//! base state). The two coefficients below are fixed so that ledgers stay
//! numerically reproducible across runs and releases.

/// Logistic steepness per run of differential.
const RUN_STEEPNESS: f64 = 0.75;
/// How strongly late innings pull the estimate away from a coin flip.
const LEVERAGE_WEIGHT: f64 = 0.25;
/// Leverage stops growing after regulation.
const REGULATION_INNINGS: f64 = 9.0;

// ── Public API ───────────────────────────────────────────────────────────────

/// Win probability for the tracked team after a play.
///
/// * `inning` – current inning (1-based). Extra innings are capped to the
///   leverage of the 9th; zero or negative values are not rejected.
/// * `score_differential` – tracked team runs minus opponent runs.
///
/// Always returns a finite value in [0.0, 1.0].
pub fn win_probability(inning: i32, score_differential: i32) -> f64 {
    let leverage = (inning as f64 / REGULATION_INNINGS).min(1.0);
    let base = sigmoid(RUN_STEEPNESS * score_differential as f64);
    let p = base + LEVERAGE_WEIGHT * leverage * (base - 0.5);
    p.clamp(0.0, 1.0)
}

// ── Math utilities ───────────────────────────────────────────────────────────

/// Standard logistic sigmoid function.
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ── Tests ────────────────────────────────────────────────────────────────────
