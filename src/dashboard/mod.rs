use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::analysis::{AnalysisStatus, GameAnalyzer};
use crate::db::models::{Game, PlayerWpaTotal};
use crate::db::{current_season, Database};
use crate::wpa::players::{lvp, mvp};
use crate::wpa::{filter_ledger, LedgerFilter};
use crate::wpa::summary::LVP_DISPLAY_THRESHOLD;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub analyzer: GameAnalyzer,
}

/// Build the Axum router for the dashboard API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/seasons", get(seasons_handler))
        .route("/api/games", get(games_handler))
        .route("/api/games/:game_pk", get(game_handler))
        .route("/api/games/:game_pk/wpa", get(wpa_handler))
        .route("/api/games/:game_pk/players", get(players_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// A completed game as listed in the game selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameListing {
    #[serde(flatten)]
    pub game: Game,
    pub is_home: bool,
    pub opponent_id: i64,
    pub team_score: Option<i32>,
    pub opponent_score: Option<i32>,
    pub won: Option<bool>,
}

impl GameListing {
    fn new(game: Game, team_id: i64) -> Self {
        let is_home = game.is_home(team_id);
        let opponent_id = if is_home {
            game.away_team_id
        } else {
            game.home_team_id
        };
        let score = game.score_for(team_id);
        GameListing {
            is_home,
            opponent_id,
            team_score: score.map(|(t, _)| t),
            opponent_score: score.map(|(_, o)| o),
            won: score.map(|(t, o)| t > o),
            game,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GamesQuery {
    season: Option<i32>,
}

/// Play-table filters, e.g. `?innings=7,8,9&min_wpa=0.05&events=Home Run,Double`.
#[derive(Debug, Default, Deserialize)]
struct WpaQuery {
    innings: Option<String>,
    min_wpa: Option<f64>,
    events: Option<String>,
}

impl WpaQuery {
    fn to_filter(&self) -> Result<LedgerFilter, String> {
        let innings = match &self.innings {
            Some(list) => split_list(list)
                .map(|s| s.parse::<i32>().map_err(|_| format!("invalid inning: {}", s)))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let min_abs_wpa = self.min_wpa.unwrap_or(0.0);
        if !min_abs_wpa.is_finite() || min_abs_wpa < 0.0 {
            return Err(format!("min_wpa must be a non-negative number, got {}", min_abs_wpa));
        }
        let event_types = self
            .events
            .as_deref()
            .map(|list| split_list(list).map(str::to_string).collect())
            .unwrap_or_default();
        Ok(LedgerFilter {
            innings,
            min_abs_wpa,
            event_types,
        })
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> + '_ {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize)]
struct PlayersResponse {
    game_pk: i64,
    status: AnalysisStatus,
    message: Option<String>,
    mvp: Option<PlayerWpaTotal>,
    lvp: Option<PlayerWpaTotal>,
    players: Vec<PlayerWpaTotal>,
}

/// GET /api/seasons
async fn seasons_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut seasons = state
        .db
        .available_seasons()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if seasons.is_empty() {
        seasons.push(current_season(Utc::now().date_naive()));
    }
    Ok(Json(seasons))
}

/// GET /api/games?season=2026
async fn games_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GamesQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let team_id = state.analyzer.team_id();
    let season = query
        .season
        .unwrap_or_else(|| current_season(Utc::now().date_naive()));
    state
        .db
        .list_completed_games(team_id, season)
        .map(|games| {
            Json(
                games
                    .into_iter()
                    .map(|g| GameListing::new(g, team_id))
                    .collect::<Vec<_>>(),
            )
        })
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// GET /api/games/:game_pk
async fn game_handler(
    State(state): State<Arc<AppState>>,
    Path(game_pk): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match state.db.get_game(game_pk) {
        Ok(Some(game)) => Ok(Json(GameListing::new(game, state.analyzer.team_id()))),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("game {} not found", game_pk))),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// GET /api/games/:game_pk/wpa
///
/// Filters only narrow the returned ledger; the summary and ranking always
/// cover the whole game.
async fn wpa_handler(
    State(state): State<Arc<AppState>>,
    Path(game_pk): Path<i64>,
    Query(query): Query<WpaQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let filter = query
        .to_filter()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let mut analysis = state.analyzer.analyze(game_pk).await;
    if filter != LedgerFilter::default() {
        analysis.ledger = filter_ledger(&analysis.ledger, &filter);
    }
    Ok(Json(analysis))
}

/// GET /api/games/:game_pk/players
async fn players_handler(
    State(state): State<Arc<AppState>>,
    Path(game_pk): Path<i64>,
) -> impl IntoResponse {
    let analysis = state.analyzer.analyze(game_pk).await;
    Json(PlayersResponse {
        game_pk,
        status: analysis.status,
        mvp: mvp(&analysis.players).cloned(),
        lvp: lvp(&analysis.players, LVP_DISPLAY_THRESHOLD).cloned(),
        message: analysis.message,
        players: analysis.players,
    })
}
