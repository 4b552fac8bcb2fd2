//! Per-game analysis: fetch the play feed and roster (cached), run the WPA
//! engine and package everything the dashboard needs.
//!
//! Upstream failures never escape from here. A feed that cannot be fetched or
//! translated, or a game without plays, becomes a `no_data` analysis with a
//! human-readable reason.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::models::{PlayerWpaTotal, WpaEntry};
use crate::stats_api::{FeedCache, GameFeed, GameFeedProvider};
use crate::wpa::{aggregate_players, compute_wpa_ledger, summarize_game, GameSummary};

/// How long an empty roster from a failed box-score fetch is reused before
/// the box score is requested again.
pub const ROSTER_RETRY_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Ok,
    NoData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAnalysis {
    pub game_pk: i64,
    pub status: AnalysisStatus,
    /// Why there is no data; `None` on success
    pub message: Option<String>,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    pub tracked_is_home: Option<bool>,
    pub ledger: Vec<WpaEntry>,
    pub players: Vec<PlayerWpaTotal>,
    pub summary: Option<GameSummary>,
}

impl GameAnalysis {
    pub fn no_data(game_pk: i64, message: impl Into<String>) -> Self {
        GameAnalysis {
            game_pk,
            status: AnalysisStatus::NoData,
            message: Some(message.into()),
            home_team_name: None,
            away_team_name: None,
            tracked_is_home: None,
            ledger: Vec::new(),
            players: Vec::new(),
            summary: None,
        }
    }
}

/// Runs WPA analyses for one tracked team.
#[derive(Clone)]
pub struct GameAnalyzer {
    provider: Arc<dyn GameFeedProvider>,
    team_id: i64,
    feeds: FeedCache<GameFeed>,
    rosters: FeedCache<HashSet<i64>>,
}

impl GameAnalyzer {
    pub fn new(provider: Arc<dyn GameFeedProvider>, team_id: i64, cache_ttl: Duration) -> Self {
        GameAnalyzer {
            provider,
            team_id,
            feeds: FeedCache::new(cache_ttl),
            rosters: FeedCache::new(cache_ttl),
        }
    }

    pub fn team_id(&self) -> i64 {
        self.team_id
    }

    /// Full analysis of one completed game. Never fails.
    pub async fn analyze(&self, game_pk: i64) -> GameAnalysis {
        let (feed, roster) =
            futures_util::future::join(self.game_feed(game_pk), self.roster(game_pk)).await;

        let feed = match feed {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "[{}] Feed for game {} unavailable: {:#}",
                    self.provider.name(),
                    game_pk,
                    e
                );
                return GameAnalysis::no_data(game_pk, format!("Error processing game: {:#}", e));
            }
        };

        if feed.plays.is_empty() {
            return GameAnalysis::no_data(game_pk, "No plays available for this game");
        }

        let tracked_is_home = feed.tracked_is_home(self.team_id);
        if !tracked_is_home && feed.away_team_id != self.team_id {
            warn!(
                "Game {} does not involve team {} ({} @ {}); analysing from the visitors' side",
                game_pk, self.team_id, feed.away_team_name, feed.home_team_name
            );
        }

        let ledger = compute_wpa_ledger(&feed.plays, tracked_is_home);
        let players = aggregate_players(&ledger, Some(&roster));
        let summary = summarize_game(&ledger, &players);

        info!(
            "Game {}: {} plays, {} players ranked, MVP {}",
            game_pk,
            ledger.len(),
            players.len(),
            players
                .first()
                .map(|p| format!("{} ({:+.3})", p.player_name, p.wpa_total))
                .unwrap_or_else(|| "n/a".to_string())
        );

        GameAnalysis {
            game_pk,
            status: AnalysisStatus::Ok,
            message: None,
            home_team_name: Some(feed.home_team_name),
            away_team_name: Some(feed.away_team_name),
            tracked_is_home: Some(tracked_is_home),
            ledger,
            players,
            summary,
        }
    }

    async fn game_feed(&self, game_pk: i64) -> anyhow::Result<GameFeed> {
        if let Some(feed) = self.feeds.get(game_pk).await {
            return Ok(feed);
        }
        let feed = self.provider.fetch_game_feed(game_pk).await?;
        self.feeds.insert(game_pk, feed.clone()).await;
        Ok(feed)
    }

    /// Roster of the tracked team. An unreadable box score degrades to an
    /// empty set, which disables roster filtering instead of failing. The
    /// fallback is cached for `ROSTER_RETRY_TTL` so an outage is not paid for
    /// on every request.
    async fn roster(&self, game_pk: i64) -> HashSet<i64> {
        if let Some(roster) = self.rosters.get(game_pk).await {
            return roster;
        }
        match self.provider.fetch_roster(game_pk, self.team_id).await {
            Ok(roster) => {
                self.rosters.insert(game_pk, roster.clone()).await;
                roster
            }
            Err(e) => {
                warn!("Box score for game {} unavailable: {:#}", game_pk, e);
                self.rosters
                    .insert_with_ttl(game_pk, HashSet::new(), ROSTER_RETRY_TTL)
                    .await;
                HashSet::new()
            }
        }
    }

    /// Drop expired cache entries; called periodically from the server.
    pub async fn purge_caches(&self) -> usize {
        self.feeds.purge_expired().await + self.rosters.purge_expired().await
    }
}
