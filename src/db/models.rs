use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A scheduled matchup as stored by the prediction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub game_date: NaiveDate,
    /// Tip-off time as a display string, e.g. "7:30 PM ET"
    pub game_time: String,
    pub venue: Option<String>,
    /// Home-win probability of the newest predictions row, if any
    pub prediction: Option<f64>,
    pub actual_result: Option<GameResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields the pipeline supplies when creating or replacing a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGame {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub game_date: NaiveDate,
    pub game_time: String,
    #[serde(default)]
    pub venue: Option<String>,
}

/// Final outcome of a game, stored as `home_win` / `away_win`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    HomeWin,
    AwayWin,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::HomeWin => "home_win",
            GameResult::AwayWin => "away_win",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameResult {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home_win" => Ok(GameResult::HomeWin),
            "away_win" => Ok(GameResult::AwayWin),
            other => anyhow::bail!("unknown game result: {}", other),
        }
    }
}

impl ToSql for GameResult {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GameResult {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse()
            .map_err(|e: anyhow::Error| FromSqlError::Other(e.into()))
    }
}

/// A rostered player and their injury-report status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: i64,
    pub name: String,
    pub team: String,
    /// "active", "out", "questionable", ... as reported by the pipeline
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A scraped Reddit submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPost {
    pub post_id: Option<i64>,
    /// Reddit's own id, unique across inserts
    pub reddit_id: String,
    pub subreddit: String,
    pub title: String,
    pub content: Option<String>,
    pub author: Option<String>,
    /// Unix seconds
    pub created_utc: f64,
    pub score: Option<i64>,
    pub team_mention: Option<String>,
    pub player_mention: Option<String>,
    pub game_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditComment {
    pub comment_id: Option<i64>,
    pub reddit_id: String,
    pub post_id: i64,
    pub content: String,
    pub author: Option<String>,
    pub created_utc: f64,
    pub score: Option<i64>,
}

/// One sentiment score attached to a team, player or game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub sentiment_id: Option<i64>,
    /// "team" | "player" | "game"
    pub entity_type: String,
    pub entity_id: String,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    /// Typically in [-1, 1]
    pub sentiment_score: f64,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Average sentiment over a lookback window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamSentiment {
    pub average: f64,
    pub samples: i64,
}

/// A home-win probability produced by the pipeline for one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction_id: Option<i64>,
    pub game_id: String,
    pub home_team_sentiment: Option<f64>,
    pub away_team_sentiment: Option<f64>,
    /// Probability (0.0–1.0) that the home team wins
    pub home_win_probability: f64,
    pub prediction_timestamp: DateTime<Utc>,
}

/// What the listing page needs for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub game_time: String,
    pub home_team: String,
    pub away_team: String,
    pub prediction_available: bool,
    /// Home-win probability; only meaningful when `prediction_available`
    pub win_probability: f64,
}

impl GameRecord {
    pub fn new(
        game_id: String,
        game_time: String,
        home_team: String,
        away_team: String,
        win_probability: Option<f64>,
    ) -> Self {
        GameRecord {
            game_id,
            game_time,
            home_team,
            away_team,
            prediction_available: win_probability.is_some(),
            win_probability: win_probability.unwrap_or(0.5),
        }
    }
}
