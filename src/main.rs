use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

mod analysis;
mod config;
mod dashboard;
mod db;
mod stats_api;
mod wpa;

use analysis::GameAnalyzer;
use config::Config;
use dashboard::AppState;
use db::Database;
use stats_api::{GameFeedProvider, StatsApi};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let stats_api = StatsApi::new(
        &config.stats_api_url,
        Duration::from_secs(config.http_timeout_secs),
        config.http_max_retries,
    )?;
    let provider: Arc<dyn GameFeedProvider> = Arc::new(stats_api);
    info!(
        "Using {} at {} for team {}",
        provider.name(),
        config.stats_api_url,
        config.team_id
    );

    let cache_ttl = Duration::from_secs(config.feed_cache_ttl_secs);
    let analyzer = GameAnalyzer::new(provider, config.team_id, cache_ttl);

    // One-shot mode: analyse a single game and exit
    if let Some(game_pk) = config.analyze_game {
        let analysis = analyzer.analyze(game_pk).await;
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    // Background cache housekeeping
    {
        let analyzer = analyzer.clone();
        let period = cache_ttl.max(Duration::from_secs(60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let purged = analyzer.purge_caches().await;
                if purged > 0 {
                    debug!("Purged {} expired feed cache entries", purged);
                }
            }
        });
    }

    let app = dashboard::router(AppState { db, analyzer });
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run dashboard server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
