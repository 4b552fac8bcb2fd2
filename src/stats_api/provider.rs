use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

use super::feed::GameFeed;

/// Source of play-by-play and box-score data for completed games.
#[async_trait]
pub trait GameFeedProvider: Send + Sync {
    /// Fetch and translate the play-by-play feed of one game.
    async fn fetch_game_feed(&self, game_pk: i64) -> Result<GameFeed>;

    /// Player ids that appeared for `team_id` in the game's box score.
    async fn fetch_roster(&self, game_pk: i64, team_id: i64) -> Result<HashSet<i64>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
