use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod models;
use models::*;

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Games ─────────────────────────────────────────────────────────────────

    /// Insert or refresh a game row. This is the write side used by the
    /// daily ingestion job; this service itself only reads.
    #[allow(dead_code)]
    pub fn upsert_game(&self, game: &Game) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO games (id, game_date, season, home_team_id, away_team_id,
                                home_score, away_score, status, venue)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)
             ON CONFLICT(id) DO UPDATE SET
                game_date=excluded.game_date,
                season=excluded.season,
                home_score=excluded.home_score,
                away_score=excluded.away_score,
                status=excluded.status,
                venue=excluded.venue",
            params![
                game.id,
                game.game_date,
                game.season,
                game.home_team_id,
                game.away_team_id,
                game.home_score,
                game.away_score,
                game.status,
                game.venue,
            ],
        )?;
        Ok(())
    }

    /// Completed games of `team_id` in `season`, most recent first.
    pub fn list_completed_games(&self, team_id: i64, season: i32) -> Result<Vec<Game>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, game_date, season, home_team_id, away_team_id,
                    home_score, away_score, status, venue
             FROM games
             WHERE season = ?1
               AND (home_team_id = ?2 OR away_team_id = ?2)
               AND status IN (?3, ?4, ?5)
             ORDER BY game_date DESC, id DESC",
        )?;
        let mut args: Vec<rusqlite::types::Value> = vec![
            rusqlite::types::Value::from(season),
            rusqlite::types::Value::from(team_id),
        ];
        args.extend(
            COMPLETED_STATUSES
                .iter()
                .map(|s| rusqlite::types::Value::from(s.to_string())),
        );
        let games = stmt
            .query_map(params_from_iter(args), map_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    /// Look up a single game by gamePk.
    pub fn get_game(&self, id: i64) -> Result<Option<Game>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, game_date, season, home_team_id, away_team_id,
                    home_score, away_score, status, venue
             FROM games WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], map_game)?;
        let game = rows.next().transpose()?;
        Ok(game)
    }

    /// Distinct seasons present in the store, newest first.
    pub fn available_seasons(&self) -> Result<Vec<i32>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT season FROM games ORDER BY season DESC")?;
        let seasons = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i32>>>()?;
        Ok(seasons)
    }
}

/// LVBP season label for a date. The winter season runs October through
/// January/February and is labelled by the year it ends in, so October 2025
/// belongs to season 2026. Off-season dates map to the last completed season.
pub fn current_season(today: NaiveDate) -> i32 {
    if today.month() >= 10 {
        today.year() + 1
    } else {
        today.year()
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_game(row: &rusqlite::Row) -> rusqlite::Result<Game> {
    Ok(Game {
        id: row.get(0)?,
        game_date: row.get(1)?,
        season: row.get(2)?,
        home_team_id: row.get(3)?,
        away_team_id: row.get(4)?,
        home_score: row.get(5)?,
        away_score: row.get(6)?,
        status: row.get(7)?,
        venue: row.get(8)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id            INTEGER PRIMARY KEY,
    game_date     TEXT    NOT NULL,
    season        INTEGER NOT NULL,
    home_team_id  INTEGER NOT NULL,
    away_team_id  INTEGER NOT NULL,
    home_score    INTEGER,
    away_score    INTEGER,
    status        TEXT    NOT NULL,
    venue         TEXT
);

CREATE INDEX IF NOT EXISTS idx_games_season ON games(season);
CREATE INDEX IF NOT EXISTS idx_games_home ON games(home_team_id);
CREATE INDEX IF NOT EXISTS idx_games_away ON games(away_team_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: i64, date: &str, home: i64, away: i64, status: &str) -> Game {
        Game {
            id,
            game_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            season: 2026,
            home_team_id: home,
            away_team_id: away,
            home_score: Some(5),
            away_score: Some(3),
            status: status.to_string(),
            venue: Some("Estadio Monumental Simón Bolívar".to_string()),
        }
    }

    #[test]
    fn completed_games_for_team_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_game(&game(1, "2025-10-15", 695, 696, "Final")).unwrap();
        db.upsert_game(&game(2, "2025-10-17", 698, 695, "Completed Early")).unwrap();
        db.upsert_game(&game(3, "2025-10-18", 695, 699, "Scheduled")).unwrap();
        db.upsert_game(&game(4, "2025-10-16", 692, 693, "Final")).unwrap();

        let games = db.list_completed_games(695, 2026).unwrap();
        let ids: Vec<i64> = games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(db.list_completed_games(695, 2025).unwrap().is_empty());
    }

    #[test]
    fn upsert_updates_existing_row() {
        let db = Database::open_in_memory().unwrap();
        let mut g = game(10, "2025-11-01", 695, 694, "In Progress");
        g.home_score = None;
        db.upsert_game(&g).unwrap();

        g.status = "Final".to_string();
        g.home_score = Some(2);
        db.upsert_game(&g).unwrap();

        let stored = db.get_game(10).unwrap().unwrap();
        assert_eq!(stored, g);
        assert!(db.get_game(11).unwrap().is_none());
    }

    #[test]
    fn seasons_are_distinct_and_descending() {
        let db = Database::open_in_memory().unwrap();
        for (id, season) in [(1, 2024), (2, 2026), (3, 2025), (4, 2026)] {
            let mut g = game(id, "2025-12-01", 695, 696, "Final");
            g.season = season;
            db.upsert_game(&g).unwrap();
        }
        assert_eq!(db.available_seasons().unwrap(), vec![2026, 2025, 2024]);
    }

    #[test]
    fn game_score_from_either_side() {
        let g = game(1, "2025-10-15", 695, 696, "Final");
        assert_eq!(g.score_for(695), Some((5, 3)));
        assert_eq!(g.score_for(696), Some((3, 5)));
    }

    #[test]
    fn season_rolls_over_in_october() {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(current_season(d("2025-10-01")), 2026);
        assert_eq!(current_season(d("2025-12-31")), 2026);
        assert_eq!(current_season(d("2026-01-20")), 2026);
        assert_eq!(current_season(d("2026-07-04")), 2026);
        assert_eq!(current_season(d("2026-09-30")), 2026);
    }
}
