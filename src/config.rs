use clap::Parser;

/// Win Probability Added service for the Leones del Caracas dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "leones-wpa", version, about)]
pub struct Config {
    /// Dashboard API listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// SQLite database holding completed-game metadata
    #[arg(long, env = "DATABASE_PATH", default_value = "leones.db")]
    pub database_path: String,

    /// MLB Stats API base URL (without version segment)
    #[arg(
        long,
        env = "STATS_API_URL",
        default_value = "https://statsapi.mlb.com/api"
    )]
    pub stats_api_url: String,

    /// Team whose perspective the WPA is computed from (695 = Leones del Caracas)
    #[arg(long, env = "TEAM_ID", default_value = "695")]
    pub team_id: i64,

    /// How long fetched play feeds and rosters are reused, in seconds
    #[arg(long, env = "FEED_CACHE_TTL_SECS", default_value = "600")]
    pub feed_cache_ttl_secs: u64,

    /// Per-request timeout for the stats API, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,

    /// Retries for transient stats API failures (network, 429, 5xx)
    #[arg(long, env = "HTTP_MAX_RETRIES", default_value = "2")]
    pub http_max_retries: u32,

    /// Analyse a single game (gamePk), print the result as JSON and exit
    #[arg(long)]
    pub analyze_game: Option<i64>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.team_id <= 0 {
            anyhow::bail!("team_id must be a positive MLB Stats API team id");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be at least 1");
        }
        if self.http_max_retries > 10 {
            anyhow::bail!("http_max_retries must be between 0 and 10");
        }
        if !self.stats_api_url.starts_with("http://") && !self.stats_api_url.starts_with("https://")
        {
            anyhow::bail!("stats_api_url must be an http(s) URL");
        }
        Ok(())
    }
}
