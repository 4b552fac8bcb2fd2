use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::feed::{parse_boxscore_roster, parse_game_feed, GameFeed};
use super::provider::GameFeedProvider;

/// Client for the public MLB Stats API (LVBP games are served under
/// sportId 17).
/// Docs: <https://statsapi.mlb.com/docs/>
#[derive(Clone)]
pub struct StatsApi {
    http: Client,
    /// Always ends with '/', so relative joins keep the `/api` prefix
    base_url: Url,
    max_retries: u32,
}

impl StatsApi {
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).with_context(|| format!("Invalid stats API URL: {}", base_url))?;
        Ok(StatsApi {
            http,
            base_url,
            max_retries,
        })
    }

    fn feed_url(&self, game_pk: i64) -> Result<Url> {
        self.base_url
            .join(&format!("v1.1/game/{}/feed/live", game_pk))
            .context("Failed to build feed URL")
    }

    fn boxscore_url(&self, game_pk: i64) -> Result<Url> {
        self.base_url
            .join(&format!("v1/game/{}/boxscore", game_pk))
            .context("Failed to build boxscore URL")
    }

    /// GET a JSON document, retrying transient failures (network errors, 429,
    /// 5xx) with exponential backoff plus jitter.
    async fn get_json(&self, url: &Url) -> Result<serde_json::Value> {
        let mut attempt = 0u32;
        loop {
            debug!("Fetching {}", url);
            let outcome = match self.http.get(url.clone()).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse response from {}", url));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let err = anyhow::anyhow!("Stats API error {} for {}", status, url);
                    if !is_transient(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) => anyhow::Error::new(e).context(format!("Stats API request failed: {}", url)),
            };

            if attempt >= self.max_retries {
                return Err(outcome);
            }
            let delay = backoff_delay(attempt);
            warn!(
                "Stats API attempt {} failed ({:#}); retrying in {:?}",
                attempt + 1,
                outcome,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// 250ms, 500ms, 1s, ... capped at 4s, plus up to 100ms of jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let base_ms = (250u64 << attempt.min(4)).min(4_000);
    let jitter_ms = rand::thread_rng().gen_range(0..=100);
    Duration::from_millis(base_ms + jitter_ms)
}

#[async_trait]
impl GameFeedProvider for StatsApi {
    fn name(&self) -> &str {
        "MLB-StatsAPI"
    }

    async fn fetch_game_feed(&self, game_pk: i64) -> Result<GameFeed> {
        let url = self.feed_url(game_pk)?;
        let raw = self.get_json(&url).await?;
        let feed = parse_game_feed(game_pk, &raw)?;
        debug!(
            "Game {}: {} plays ({} @ {})",
            game_pk,
            feed.plays.len(),
            feed.away_team_name,
            feed.home_team_name
        );
        Ok(feed)
    }

    async fn fetch_roster(&self, game_pk: i64, team_id: i64) -> Result<HashSet<i64>> {
        let url = self.boxscore_url(game_pk)?;
        let raw = self.get_json(&url).await?;
        Ok(parse_boxscore_roster(&raw, team_id))
    }
}
