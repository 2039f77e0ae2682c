use anyhow::{anyhow, Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

pub mod models;
use models::*;

/// Thread-safe SQLite handle (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating database directory {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path).with_context(|| format!("opening database {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        debug!("Database schema ready");
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Run raw SQL, for tests that simulate rows written by the pipeline
    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    // ── Games ────────────────────────────────────────────────────────────────

    /// Insert a new game; fails if the id already exists
    pub fn insert_game(&self, game: &NewGame) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO games (game_id, home_team, away_team, game_date, game_time,
                                venue, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?7)",
            params![
                game.game_id,
                game.home_team,
                game.away_team,
                game.game_date,
                game.game_time,
                game.venue,
                now,
            ],
        )
        .with_context(|| format!("inserting game {}", game.game_id))?;
        info!("Inserted game: {}", game.game_id);
        Ok(())
    }

    /// Insert or update the schedule fields of a game
    pub fn upsert_game(&self, game: &NewGame) -> Result<()> {
        let conn = self.conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO games (game_id, home_team, away_team, game_date, game_time,
                                venue, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?7)
             ON CONFLICT(game_id) DO UPDATE SET
                home_team=excluded.home_team,
                away_team=excluded.away_team,
                game_date=excluded.game_date,
                game_time=excluded.game_time,
                venue=excluded.venue,
                updated_at=excluded.updated_at",
            params![
                game.game_id,
                game.home_team,
                game.away_team,
                game.game_date,
                game.game_time,
                game.venue,
                now,
            ],
        )?;
        debug!("Upserted game: {}", game.game_id);
        Ok(())
    }

    pub fn get_game(&self, game_id: &str) -> Result<Option<Game>> {
        let conn = self.conn()?;
        let game = conn
            .query_row(&select_games("g.game_id = ?1"), params![game_id], map_game)
            .optional()?;
        Ok(game)
    }

    /// Display records for every game on `date`, in schedule order
    pub fn games_on(&self, date: NaiveDate) -> Result<Vec<GameRecord>> {
        let conn = self.conn()?;
        query_records(&conn, "g.game_date = ?1", params![date])
    }

    /// Games between `from` and `from + days_ahead` inclusive
    pub fn upcoming_games(&self, from: NaiveDate, days_ahead: i64) -> Result<Vec<Game>> {
        let conn = self.conn()?;
        let until = from + Duration::days(days_ahead);
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY {SCHEDULE_ORDER}",
            select_games("g.game_date BETWEEN ?1 AND ?2")
        ))?;
        let games = stmt
            .query_map(params![from, until], map_game)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    /// Display records for a team's games in the upcoming window
    pub fn games_for_team(
        &self,
        team: &str,
        from: NaiveDate,
        days_ahead: i64,
    ) -> Result<Vec<GameRecord>> {
        let conn = self.conn()?;
        let until = from + Duration::days(days_ahead);
        query_records(
            &conn,
            "(g.home_team = ?1 OR g.away_team = ?1) AND g.game_date BETWEEN ?2 AND ?3",
            params![team, from, until],
        )
    }

    /// Record the final outcome. Returns false when the game does not exist.
    pub fn set_game_result(&self, game_id: &str, result: GameResult) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE games SET actual_result=?1, updated_at=?2 WHERE game_id=?3",
            params![result, Utc::now(), game_id],
        )?;
        if changed > 0 {
            info!("Updated game result for {}: {}", game_id, result);
        }
        Ok(changed > 0)
    }

    // ── Players ──────────────────────────────────────────────────────────────

    /// Insert a player or refresh the status of an existing (name, team) pair
    pub fn upsert_player(&self, player: &NewPlayer) -> Result<i64> {
        let conn = self.conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO players (name, team, status, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?4)
             ON CONFLICT(name, team) DO UPDATE SET
                status=excluded.status,
                updated_at=excluded.updated_at",
            params![player.name, player.team, player.status, now],
        )?;
        let id = conn.query_row(
            "SELECT player_id FROM players WHERE name=?1 AND team=?2",
            params![player.name, player.team],
            |r| r.get(0),
        )?;
        debug!("Upserted player {} ({}) as {}", player.name, player.team, id);
        Ok(id)
    }

    /// Returns false when no player has this id
    pub fn update_player_status(&self, player_id: i64, status: &str) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE players SET status=?1, updated_at=?2 WHERE player_id=?3",
            params![status, Utc::now(), player_id],
        )?;
        Ok(changed > 0)
    }

    pub fn players_by_team(&self, team: &str) -> Result<Vec<Player>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT player_id, name, team, status, created_at, updated_at
             FROM players WHERE team=?1 ORDER BY name",
        )?;
        let players = stmt
            .query_map(params![team], |row| {
                Ok(Player {
                    player_id: row.get(0)?,
                    name: row.get(1)?,
                    team: row.get(2)?,
                    status: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    // ── Reddit ───────────────────────────────────────────────────────────────

    /// Insert a post unless its reddit id is already stored; returns the row id either way
    pub fn insert_reddit_post(&self, post: &RedditPost) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO reddit_posts (
                reddit_id, subreddit, title, content, author, created_utc,
                score, team_mention, player_mention, game_id, created_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                post.reddit_id,
                post.subreddit,
                post.title,
                post.content,
                post.author,
                post.created_utc,
                post.score,
                post.team_mention,
                post.player_mention,
                post.game_id,
                Utc::now(),
            ],
        )?;
        let id = conn.query_row(
            "SELECT post_id FROM reddit_posts WHERE reddit_id=?1",
            params![post.reddit_id],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    /// Same contract as [`Database::insert_reddit_post`]
    pub fn insert_reddit_comment(&self, comment: &RedditComment) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO reddit_comments (
                reddit_id, post_id, content, author, created_utc, score, created_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                comment.reddit_id,
                comment.post_id,
                comment.content,
                comment.author,
                comment.created_utc,
                comment.score,
                Utc::now(),
            ],
        )?;
        let id = conn.query_row(
            "SELECT comment_id FROM reddit_comments WHERE reddit_id=?1",
            params![comment.reddit_id],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn reddit_post_exists(&self, post_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM reddit_posts WHERE post_id=?1",
                params![post_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn reddit_comment_exists(&self, comment_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM reddit_comments WHERE comment_id=?1",
                params![comment_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Posts mentioning `team` created within the last `days_back` days, newest first
    pub fn reddit_posts_by_team(&self, team: &str, days_back: i64) -> Result<Vec<RedditPost>> {
        let conn = self.conn()?;
        let cutoff = (Utc::now() - Duration::days(days_back)).timestamp() as f64;
        let mut stmt = conn.prepare(
            "SELECT post_id, reddit_id, subreddit, title, content, author, created_utc,
                    score, team_mention, player_mention, game_id
             FROM reddit_posts WHERE team_mention=?1 AND created_utc > ?2
             ORDER BY created_utc DESC",
        )?;
        let posts = stmt
            .query_map(params![team, cutoff], |row| {
                Ok(RedditPost {
                    post_id: row.get(0)?,
                    reddit_id: row.get(1)?,
                    subreddit: row.get(2)?,
                    title: row.get(3)?,
                    content: row.get(4)?,
                    author: row.get(5)?,
                    created_utc: row.get(6)?,
                    score: row.get(7)?,
                    team_mention: row.get(8)?,
                    player_mention: row.get(9)?,
                    game_id: row.get(10)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts)
    }

    // ── Sentiment ────────────────────────────────────────────────────────────

    /// Store a sentiment score; it must point at a post or a comment
    pub fn insert_sentiment(&self, rec: &SentimentRecord) -> Result<i64> {
        if rec.post_id.is_none() && rec.comment_id.is_none() {
            anyhow::bail!("sentiment record needs a post_id or a comment_id");
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sentiment_analysis (
                entity_type, entity_id, post_id, comment_id,
                sentiment_score, confidence, created_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                rec.entity_type,
                rec.entity_id,
                rec.post_id,
                rec.comment_id,
                rec.sentiment_score,
                rec.confidence,
                rec.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Average team sentiment over the last `days_back` days; `(0.0, 0)` when nothing is stored
    pub fn team_sentiment(&self, team: &str, days_back: i64) -> Result<TeamSentiment> {
        let conn = self.conn()?;
        let cutoff = Utc::now() - Duration::days(days_back);
        let (average, samples): (Option<f64>, i64) = conn.query_row(
            "SELECT AVG(sentiment_score), COUNT(*) FROM sentiment_analysis
             WHERE entity_type='team' AND entity_id=?1 AND created_at > ?2",
            params![team, cutoff],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(TeamSentiment {
            average: average.unwrap_or(0.0),
            samples,
        })
    }

    // ── Predictions ──────────────────────────────────────────────────────────

    /// Store a prediction and mirror its probability onto the game row
    pub fn insert_prediction(&self, pred: &Prediction) -> Result<i64> {
        if !(0.0..=1.0).contains(&pred.home_win_probability) {
            anyhow::bail!(
                "home_win_probability must be within [0, 1], got {}",
                pred.home_win_probability
            );
        }
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        tx.execute(
            "INSERT INTO predictions (
                game_id, home_team_sentiment, away_team_sentiment,
                home_win_probability, prediction_timestamp, created_at
             ) VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                pred.game_id,
                pred.home_team_sentiment,
                pred.away_team_sentiment,
                pred.home_win_probability,
                pred.prediction_timestamp,
                now,
            ],
        )
        .with_context(|| format!("inserting prediction for game {}", pred.game_id))?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE games SET prediction=?1, updated_at=?2 WHERE game_id=?3",
            params![pred.home_win_probability, now, pred.game_id],
        )?;
        tx.commit()?;
        info!("Inserted prediction for game {} (ID: {})", pred.game_id, id);
        Ok(id)
    }

    pub fn latest_prediction(&self, game_id: &str) -> Result<Option<Prediction>> {
        let conn = self.conn()?;
        let pred = conn
            .query_row(
                "SELECT prediction_id, game_id, home_team_sentiment, away_team_sentiment,
                        home_win_probability, prediction_timestamp
                 FROM predictions WHERE game_id=?1
                 ORDER BY prediction_timestamp DESC, prediction_id DESC LIMIT 1",
                params![game_id],
                |row| {
                    Ok(Prediction {
                        prediction_id: row.get(0)?,
                        game_id: row.get(1)?,
                        home_team_sentiment: row.get(2)?,
                        away_team_sentiment: row.get(3)?,
                        home_win_probability: row.get(4)?,
                        prediction_timestamp: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(pred)
    }

    /// (home win probability, outcome) for every resolved game that was predicted
    pub fn resolved_predictions(&self) -> Result<Vec<(f64, GameResult)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LATEST_PROBABILITY}, g.actual_result
             FROM games g WHERE g.actual_result IS NOT NULL"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, Option<f64>>(0)?, row.get::<_, GameResult>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .filter_map(|(p, result)| p.map(|p| (p, result)))
            .collect())
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

/// Newest prediction row for `g`. The predictions table is the only source;
/// `games.prediction` is a write-side mirror and is never read back.
const LATEST_PROBABILITY: &str = "(SELECT p.home_win_probability FROM predictions p
     WHERE p.game_id = g.game_id
     ORDER BY p.prediction_timestamp DESC, p.prediction_id DESC LIMIT 1)";

/// Tip-off order. `game_time` is free text ("7:30 PM ET"), so it is ordered
/// by the clock time parsed out of it; 12-hour times are folded onto a 24-hour
/// key. Times without a colon sort after the parsed ones for the same day.
const SCHEDULE_ORDER: &str = "g.game_date,
    CASE WHEN instr(g.game_time, ':') > 0 THEN 0 ELSE 1 END,
    CASE
        WHEN upper(g.game_time) LIKE '%PM%'
            THEN CAST(substr(g.game_time, 1, instr(g.game_time, ':') - 1) AS INTEGER) % 12 + 12
        WHEN upper(g.game_time) LIKE '%AM%'
            THEN CAST(substr(g.game_time, 1, instr(g.game_time, ':') - 1) AS INTEGER) % 12
        ELSE CAST(substr(g.game_time, 1, instr(g.game_time, ':') - 1) AS INTEGER)
    END,
    CAST(substr(g.game_time, instr(g.game_time, ':') + 1, 2) AS INTEGER),
    g.game_id";

fn select_games(filter: &str) -> String {
    format!(
        "SELECT g.game_id, g.home_team, g.away_team, g.game_date, g.game_time, g.venue,
                {LATEST_PROBABILITY}, g.actual_result, g.created_at, g.updated_at
         FROM games g WHERE {filter}"
    )
}

fn query_records<P: Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<GameRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT g.game_id, g.game_time, g.home_team, g.away_team, {LATEST_PROBABILITY}
         FROM games g WHERE {filter}
         ORDER BY {SCHEDULE_ORDER}"
    ))?;
    let records = stmt
        .query_map(params, |row| {
            Ok(GameRecord::new(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

fn map_game(row: &rusqlite::Row) -> rusqlite::Result<Game> {
    Ok(Game {
        game_id: row.get(0)?,
        home_team: row.get(1)?,
        away_team: row.get(2)?,
        game_date: row.get(3)?,
        game_time: row.get(4)?,
        venue: row.get(5)?,
        prediction: row.get(6)?,
        actual_result: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    game_id       TEXT    PRIMARY KEY,
    home_team     TEXT    NOT NULL,
    away_team     TEXT    NOT NULL,
    game_date     TEXT    NOT NULL,
    game_time     TEXT    NOT NULL,
    venue         TEXT,
    prediction    REAL,
    actual_result TEXT,
    created_at    TEXT    NOT NULL,
    updated_at    TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS players (
    player_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    team        TEXT    NOT NULL,
    status      TEXT,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL,
    UNIQUE(name, team)
);

CREATE TABLE IF NOT EXISTS reddit_posts (
    post_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    reddit_id      TEXT    NOT NULL UNIQUE,
    subreddit      TEXT    NOT NULL,
    title          TEXT    NOT NULL,
    content        TEXT,
    author         TEXT,
    created_utc    REAL    NOT NULL,
    score          INTEGER,
    team_mention   TEXT,
    player_mention TEXT,
    game_id        TEXT,
    created_at     TEXT    NOT NULL,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE TABLE IF NOT EXISTS reddit_comments (
    comment_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    reddit_id   TEXT    NOT NULL UNIQUE,
    post_id     INTEGER NOT NULL,
    content     TEXT    NOT NULL,
    author      TEXT,
    created_utc REAL    NOT NULL,
    score       INTEGER,
    created_at  TEXT    NOT NULL,
    FOREIGN KEY (post_id) REFERENCES reddit_posts(post_id)
);

CREATE TABLE IF NOT EXISTS sentiment_analysis (
    sentiment_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_type     TEXT    NOT NULL,
    entity_id       TEXT    NOT NULL,
    post_id         INTEGER,
    comment_id      INTEGER,
    sentiment_score REAL    NOT NULL,
    confidence      REAL,
    created_at      TEXT    NOT NULL,
    FOREIGN KEY (post_id) REFERENCES reddit_posts(post_id),
    FOREIGN KEY (comment_id) REFERENCES reddit_comments(comment_id),
    CHECK (post_id IS NOT NULL OR comment_id IS NOT NULL)
);

CREATE TABLE IF NOT EXISTS predictions (
    prediction_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id              TEXT    NOT NULL,
    home_team_sentiment  REAL,
    away_team_sentiment  REAL,
    home_win_probability REAL    NOT NULL,
    prediction_timestamp TEXT    NOT NULL,
    created_at           TEXT    NOT NULL,
    FOREIGN KEY (game_id) REFERENCES games(game_id)
);

CREATE INDEX IF NOT EXISTS idx_games_date ON games(game_date);
CREATE INDEX IF NOT EXISTS idx_players_team ON players(team);
CREATE INDEX IF NOT EXISTS idx_reddit_posts_team ON reddit_posts(team_mention);
CREATE INDEX IF NOT EXISTS idx_sentiment_entity ON sentiment_analysis(entity_type, entity_id);
CREATE INDEX IF NOT EXISTS idx_predictions_game ON predictions(game_id);
"#;
