pub mod assets;
pub mod display;
pub mod render;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::accuracy::{accuracy_report, AccuracyReport};
use crate::db::models::{
    Game, GameRecord, GameResult, NewGame, NewPlayer, Player, Prediction, RedditComment,
    RedditPost, SentimentRecord, TeamSentiment,
};
use crate::db::Database;
use crate::refresh::{DataRefresher, RefreshAction, UnknownAction};
use render::{IndexPage, Notice};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub refresher: Arc<dyn DataRefresher>,
    /// Lookback window for the team sentiment average, in days
    pub sentiment_days: i64,
    /// How far ahead the team page looks for games, in days
    pub upcoming_days: i64,
}

/// Build the Axum router for the site and its JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/team/:team", get(team_detail_handler))
        .route("/game/:game_id", get(game_detail_handler))
        .route("/refresh_data", post(refresh_data_handler))
        .route("/static/style.css", get(stylesheet_handler))
        .route("/healthz", get(|| async { "ok" }))
        .route(
            "/api/games",
            get(api_games_handler)
                .post(api_create_game_handler)
                .put(api_upsert_game_handler),
        )
        .route("/api/games/upcoming", get(api_upcoming_handler))
        .route("/api/games/:game_id", get(api_game_handler))
        .route("/api/games/:game_id/result", post(api_game_result_handler))
        .route("/api/predictions", post(api_prediction_handler))
        .route("/api/players", post(api_upsert_player_handler))
        .route("/api/players/:player_id/status", post(api_player_status_handler))
        .route("/api/teams/:team", get(api_team_handler))
        .route("/api/teams/:team/posts", get(api_team_posts_handler))
        .route("/api/reddit/posts", post(api_reddit_post_handler))
        .route("/api/reddit/comments", post(api_reddit_comment_handler))
        .route("/api/sentiment", post(api_sentiment_handler))
        .route("/api/accuracy", get(api_accuracy_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ── Errors ─────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients; internal details stay in the log
    fn public_message(&self) -> String {
        match self {
            AppError::Internal(e) => {
                error!("Request failed: {:#}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<UnknownAction> for AppError {
    fn from(e: UnknownAction) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// [`AppError`] rendered as an HTML page, for browser-facing routes
#[derive(Debug)]
pub struct PageError(AppError);

impl<E: Into<AppError>> From<E> for PageError {
    fn from(e: E) -> Self {
        PageError(e.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let html = render::error_page(status, &self.0.public_message());
        (status, Html(html)).into_response()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date {:?}, expected YYYY-MM-DD", raw)))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ── Pages ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    date: Option<String>,
    refreshed: Option<String>,
    refresh_error: Option<String>,
}

fn refresh_notice(query: &IndexQuery) -> Option<Notice> {
    if let Some(action) = query.refresh_error.as_deref().and_then(|a| a.parse::<RefreshAction>().ok()) {
        return Some(Notice {
            ok: false,
            message: format!("Refresh of {} data failed; see the server log.", action),
        });
    }
    query
        .refreshed
        .as_deref()
        .and_then(|a| a.parse::<RefreshAction>().ok())
        .map(|action| Notice {
            ok: true,
            message: format!("Refresh of {} data requested.", action),
        })
}

/// GET /?date=YYYY-MM-DD
async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, PageError> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let games = state.db.games_on(date)?;
    let accuracy = accuracy_report(&state.db.resolved_predictions()?);
    let current_date = date.format("%A, %B %-d, %Y").to_string();
    let html = render::index_page(&IndexPage {
        date,
        current_date: &current_date,
        games: &games,
        accuracy: &accuracy,
        notice: refresh_notice(&query),
    });
    Ok(Html(html))
}

/// Everything the team page shows; also served as JSON
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub team: String,
    pub color: &'static str,
    pub sentiment: TeamSentiment,
    pub sentiment_days: i64,
    pub players: Vec<Player>,
    pub upcoming: Vec<GameRecord>,
}

fn team_summary(state: &AppState, team: &str) -> Result<TeamSummary, AppError> {
    Ok(TeamSummary {
        team: team.to_string(),
        color: display::team_color(team),
        sentiment: state.db.team_sentiment(team, state.sentiment_days)?,
        sentiment_days: state.sentiment_days,
        players: state.db.players_by_team(team)?,
        upcoming: state.db.games_for_team(team, today(), state.upcoming_days)?,
    })
}

/// GET /team/:team
async fn team_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
) -> Result<Html<String>, PageError> {
    let summary = team_summary(&state, &team)?;
    Ok(Html(render::team_page(&summary)))
}

fn load_game(state: &AppState, game_id: &str) -> Result<(Game, Option<Prediction>), AppError> {
    let game = state
        .db
        .get_game(game_id)?
        .ok_or_else(|| AppError::NotFound(format!("no game with id {}", game_id)))?;
    let prediction = state.db.latest_prediction(game_id)?;
    Ok((game, prediction))
}

/// GET /game/:game_id
async fn game_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let (game, prediction) = load_game(&state, &game_id)?;
    Ok(Html(render::game_page(&game, prediction.as_ref())))
}

#[derive(Debug, Deserialize)]
pub struct RefreshForm {
    #[serde(default)]
    action: String,
}

/// POST /refresh_data (form field `action`)
async fn refresh_data_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RefreshForm>,
) -> Result<Redirect, PageError> {
    let action: RefreshAction = form.action.parse()?;
    info!("Refresh '{}' requested via {}", action, state.refresher.name());
    match state.refresher.refresh(action).await {
        Ok(outcome) => {
            info!("Refresh '{}' dispatched: {:?}", action, outcome);
            Ok(Redirect::to(&format!("/?refreshed={}", action)))
        }
        Err(e) => {
            warn!("Refresh '{}' failed: {:#}", action, e);
            Ok(Redirect::to(&format!("/?refresh_error={}", action)))
        }
    }
}

async fn stylesheet_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        assets::STYLE_CSS,
    )
}

// ── JSON API ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    date: Option<String>,
}

/// GET /api/games?date=YYYY-MM-DD
async fn api_games_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<GameRecord>>, AppError> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    Ok(Json(state.db.games_on(date)?))
}

#[derive(Debug, Serialize)]
pub struct GameDetail {
    pub game: Game,
    pub prediction: Option<Prediction>,
}

/// GET /api/games/:game_id
async fn api_game_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<GameDetail>, AppError> {
    let (game, prediction) = load_game(&state, &game_id)?;
    Ok(Json(GameDetail { game, prediction }))
}

fn check_game_id(game: &NewGame) -> Result<(), AppError> {
    if game.game_id.trim().is_empty() {
        return Err(AppError::BadRequest("game_id must not be empty".into()));
    }
    Ok(())
}

/// POST /api/games (409 if the id exists)
async fn api_create_game_handler(
    State(state): State<Arc<AppState>>,
    Json(game): Json<NewGame>,
) -> Result<impl IntoResponse, AppError> {
    check_game_id(&game)?;
    if state.db.get_game(&game.game_id)?.is_some() {
        return Err(AppError::Conflict(format!("game {} already exists", game.game_id)));
    }
    state.db.insert_game(&game)?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// PUT /api/games
async fn api_upsert_game_handler(
    State(state): State<Arc<AppState>>,
    Json(game): Json<NewGame>,
) -> Result<Json<NewGame>, AppError> {
    check_game_id(&game)?;
    state.db.upsert_game(&game)?;
    Ok(Json(game))
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    days: Option<i64>,
}

/// GET /api/games/upcoming?days=N
async fn api_upcoming_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<Game>>, AppError> {
    let days = query.days.unwrap_or(state.upcoming_days);
    if !(0..=60).contains(&days) {
        return Err(AppError::BadRequest("days must be between 0 and 60".into()));
    }
    Ok(Json(state.db.upcoming_games(today(), days)?))
}

#[derive(Debug, Deserialize)]
pub struct ResultBody {
    result: GameResult,
}

/// POST /api/games/:game_id/result
async fn api_game_result_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(body): Json<ResultBody>,
) -> Result<StatusCode, AppError> {
    if state.db.set_game_result(&game_id, body.result)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("no game with id {}", game_id)))
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictionBody {
    game_id: String,
    #[serde(default)]
    home_team_sentiment: Option<f64>,
    #[serde(default)]
    away_team_sentiment: Option<f64>,
    home_win_probability: f64,
    /// Defaults to the time the request is received
    #[serde(default)]
    prediction_timestamp: Option<DateTime<Utc>>,
}

/// POST /api/predictions
async fn api_prediction_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PredictionBody>,
) -> Result<impl IntoResponse, AppError> {
    if !(0.0..=1.0).contains(&body.home_win_probability) {
        return Err(AppError::BadRequest(format!(
            "home_win_probability must be within [0, 1], got {}",
            body.home_win_probability
        )));
    }
    require_game(&state, &body.game_id)?;
    let prediction = Prediction {
        prediction_id: None,
        game_id: body.game_id,
        home_team_sentiment: body.home_team_sentiment,
        away_team_sentiment: body.away_team_sentiment,
        home_win_probability: body.home_win_probability,
        prediction_timestamp: body.prediction_timestamp.unwrap_or_else(Utc::now),
    };
    let id = state.db.insert_prediction(&prediction)?;
    Ok((StatusCode::CREATED, Json(json!({ "prediction_id": id }))))
}

fn require_game(state: &AppState, game_id: &str) -> Result<(), AppError> {
    match state.db.get_game(game_id)? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("no game with id {}", game_id))),
    }
}

fn require_post(state: &AppState, post_id: i64) -> Result<(), AppError> {
    if state.db.reddit_post_exists(post_id)? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("no reddit post with id {}", post_id)))
    }
}

/// POST /api/players
async fn api_upsert_player_handler(
    State(state): State<Arc<AppState>>,
    Json(player): Json<NewPlayer>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.db.upsert_player(&player)?;
    Ok((StatusCode::CREATED, Json(json!({ "player_id": id }))))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    status: String,
}

/// POST /api/players/:player_id/status
async fn api_player_status_handler(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Result<StatusCode, AppError> {
    if state.db.update_player_status(player_id, &body.status)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("no player with id {}", player_id)))
    }
}

/// GET /api/teams/:team
async fn api_team_handler(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
) -> Result<Json<TeamSummary>, AppError> {
    Ok(Json(team_summary(&state, &team)?))
}

/// GET /api/teams/:team/posts?days=N
async fn api_team_posts_handler(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Vec<RedditPost>>, AppError> {
    let days = query.days.unwrap_or(state.sentiment_days);
    if days < 1 {
        return Err(AppError::BadRequest("days must be positive".into()));
    }
    Ok(Json(state.db.reddit_posts_by_team(&team, days)?))
}

/// POST /api/reddit/posts (idempotent on reddit_id)
async fn api_reddit_post_handler(
    State(state): State<Arc<AppState>>,
    Json(post): Json<RedditPost>,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(game_id) = post.game_id.as_deref() {
        require_game(&state, game_id)?;
    }
    let id = state.db.insert_reddit_post(&post)?;
    Ok(Json(json!({ "post_id": id })))
}

/// POST /api/reddit/comments (idempotent on reddit_id)
async fn api_reddit_comment_handler(
    State(state): State<Arc<AppState>>,
    Json(comment): Json<RedditComment>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_post(&state, comment.post_id)?;
    let id = state.db.insert_reddit_comment(&comment)?;
    Ok(Json(json!({ "comment_id": id })))
}

#[derive(Debug, Deserialize)]
pub struct SentimentBody {
    entity_type: String,
    entity_id: String,
    #[serde(default)]
    post_id: Option<i64>,
    #[serde(default)]
    comment_id: Option<i64>,
    sentiment_score: f64,
    #[serde(default)]
    confidence: Option<f64>,
}

/// POST /api/sentiment
async fn api_sentiment_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SentimentBody>,
) -> Result<impl IntoResponse, AppError> {
    if body.post_id.is_none() && body.comment_id.is_none() {
        return Err(AppError::BadRequest(
            "sentiment needs a post_id or a comment_id".into(),
        ));
    }
    if let Some(post_id) = body.post_id {
        require_post(&state, post_id)?;
    }
    if let Some(comment_id) = body.comment_id {
        if !state.db.reddit_comment_exists(comment_id)? {
            return Err(AppError::NotFound(format!("no reddit comment with id {}", comment_id)));
        }
    }
    let record = SentimentRecord {
        sentiment_id: None,
        entity_type: body.entity_type,
        entity_id: body.entity_id,
        post_id: body.post_id,
        comment_id: body.comment_id,
        sentiment_score: body.sentiment_score,
        confidence: body.confidence,
        created_at: Utc::now(),
    };
    let id = state.db.insert_sentiment(&record)?;
    Ok((StatusCode::CREATED, Json(json!({ "sentiment_id": id }))))
}

/// GET /api/accuracy
async fn api_accuracy_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AccuracyReport>, AppError> {
    Ok(Json(accuracy_report(&state.db.resolved_predictions()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use std::sync::Mutex;
    use tower::ServiceExt;

    use crate::refresh::RefreshOutcome;

    /// Remembers every action it is asked to run
    #[derive(Default)]
    struct RecordingRefresher {
        seen: Mutex<Vec<RefreshAction>>,
        fail: bool,
    }

    #[async_trait]
    impl DataRefresher for RecordingRefresher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn refresh(&self, action: RefreshAction) -> Result<RefreshOutcome> {
            self.seen.lock().unwrap().push(action);
            if self.fail {
                anyhow::bail!("pipeline down");
            }
            Ok(RefreshOutcome::Logged)
        }
    }

    fn app_with(refresher: Arc<dyn DataRefresher>) -> (Router, Database) {
        let db = Database::open_in_memory().unwrap();
        let state = AppState {
            db: db.clone(),
            refresher,
            sentiment_days: 7,
            upcoming_days: 7,
        };
        (router(state), db)
    }

    fn app() -> (Router, Database) {
        app_with(Arc::new(RecordingRefresher::default()))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<(String, String)>, String) {
        let response = app.clone().oneshot(req).await.expect("router request failed");
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        (status, headers, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _, body) = send(app, req).await;
        (status, body)
    }

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, String) {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _, body) = send(app, req).await;
        (status, body)
    }

    async fn post_form(app: &Router, body: &str) -> (StatusCode, Option<String>) {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/refresh_data")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, headers, _) = send(app, req).await;
        let location = headers
            .into_iter()
            .find(|(k, _)| k == "location")
            .map(|(_, v)| v);
        (status, location)
    }

    fn seed(db: &Database) {
        for (id, home, away) in [("g1", "Lakers", "Celtics"), ("g2", "Heat", "Knicks")] {
            db.insert_game(&NewGame {
                game_id: id.into(),
                home_team: home.into(),
                away_team: away.into(),
                game_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
                game_time: "7:30 PM ET".into(),
                venue: None,
            })
            .unwrap();
        }
        db.insert_prediction(&Prediction {
            prediction_id: None,
            game_id: "g1".into(),
            home_team_sentiment: Some(0.3),
            away_team_sentiment: Some(0.1),
            home_win_probability: 0.62,
            prediction_timestamp: Utc::now(),
        })
        .unwrap();
    }

    #[tokio::test]
    async fn index_lists_games_for_date() {
        let (app, db) = app();
        seed(&db);
        let (status, html) = get(&app, "/?date=2026-10-19").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Monday, October 19, 2026"));
        assert!(html.contains("Lakers win"));
        assert!(html.contains("width: 62.0%"));
        assert!(html.contains("No prediction yet"));
        assert!(html.contains("<table>"));
    }

    #[tokio::test]
    async fn index_empty_day() {
        let (app, db) = app();
        seed(&db);
        let (status, html) = get(&app, "/?date=2026-10-25").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("No games scheduled for today."));
        assert!(!html.contains("<table>"));
    }

    #[tokio::test]
    async fn index_rejects_bad_date() {
        let (app, _) = app();
        let (status, html) = get(&app, "/?date=19-10-2026").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("expected YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn refresh_dispatches_each_action() {
        let refresher = Arc::new(RecordingRefresher::default());
        let (app, _) = app_with(refresher.clone());
        for action in RefreshAction::ALL {
            let (status, location) = post_form(&app, &format!("action={}", action.as_str())).await;
            assert_eq!(status, StatusCode::SEE_OTHER);
            assert_eq!(location, Some(format!("/?refreshed={}", action.as_str())));
        }
        assert_eq!(*refresher.seen.lock().unwrap(), RefreshAction::ALL.to_vec());
    }

    #[tokio::test]
    async fn refresh_rejects_unknown_action() {
        let refresher = Arc::new(RecordingRefresher::default());
        let (app, _) = app_with(refresher.clone());
        let (status, _) = post_form(&app, "action=injuries").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = post_form(&app, "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(refresher.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn refresh_failure_redirects_with_error() {
        let refresher = Arc::new(RecordingRefresher {
            fail: true,
            ..Default::default()
        });
        let (app, _) = app_with(refresher);
        let (status, location) = post_form(&app, "action=reddit").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/?refresh_error=reddit"));

        let (_, html) = get(&app, "/?refresh_error=reddit").await;
        assert!(html.contains("Refresh of reddit data failed"));
    }

    #[tokio::test]
    async fn pipeline_rejection_redirects_with_error() {
        use crate::refresh::pipeline::stub;
        use crate::refresh::PipelineRefresher;
        use std::time::Duration;

        let pipeline = stub::spawn(StatusCode::SERVICE_UNAVAILABLE, Duration::ZERO).await;
        let refresher = PipelineRefresher::new(&pipeline.url, Duration::from_secs(5)).unwrap();
        let (app, _) = app_with(Arc::new(refresher));

        let (status, location) = post_form(&app, "action=players").await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/?refresh_error=players"));
        let received = pipeline.received.lock().unwrap().clone();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].body, json!({ "action": "players" }));
    }

    #[tokio::test]
    async fn game_detail_and_missing_game() {
        let (app, db) = app();
        seed(&db);
        let (status, html) = get(&app, "/game/g1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Lakers win"));
        assert!(html.contains("38.0%"));

        let (status, _) = get(&app, "/game/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = get(&app, "/api/games/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("\"error\""));
    }

    #[tokio::test]
    async fn team_detail_shows_roster() {
        let (app, db) = app();
        db.upsert_player(&NewPlayer {
            name: "Jayson Tatum".into(),
            team: "Trail Blazers".into(),
            status: Some("questionable".into()),
        })
        .unwrap();
        let (status, html) = get(&app, "/team/Trail%20Blazers").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Jayson Tatum"));
        assert!(html.contains(r#"class="pill questionable""#));
        assert!(html.contains("No upcoming games."));
    }

    #[tokio::test]
    async fn api_ingest_round() {
        let (app, _) = app();
        let (status, _) = post_json(
            &app,
            "/api/games",
            json!({
                "game_id": "g9",
                "home_team": "Suns",
                "away_team": "Jazz",
                "game_date": "2026-10-21",
                "game_time": "9:00 PM ET"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = post_json(
            &app,
            "/api/games",
            json!({
                "game_id": "g9",
                "home_team": "Suns",
                "away_team": "Jazz",
                "game_date": "2026-10-21",
                "game_time": "9:00 PM ET"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = post_json(
            &app,
            "/api/predictions",
            json!({ "game_id": "g9", "home_win_probability": 1.5 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = post_json(
            &app,
            "/api/predictions",
            json!({ "game_id": "missing", "home_win_probability": 0.4 }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = post_json(
            &app,
            "/api/predictions",
            json!({ "game_id": "g9", "home_win_probability": 0.4 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = get(&app, "/api/games?date=2026-10-21").await;
        assert_eq!(status, StatusCode::OK);
        let records: Vec<GameRecord> = serde_json::from_str(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].prediction_available);

        let (status, _) = post_json(&app, "/api/games/g9/result", json!({ "result": "away_win" })).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = get(&app, "/api/accuracy").await;
        assert_eq!(status, StatusCode::OK);
        let report: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(report["placeholder"], false);
        assert_eq!(report["resolved"], 1);
        assert_eq!(report["buckets"][1]["correct"], 1);
    }

    #[tokio::test]
    async fn player_status_endpoint() {
        let (app, _) = app();
        let (status, body) = post_json(
            &app,
            "/api/players",
            json!({ "name": "Anthony Davis", "team": "Lakers", "status": "active" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = serde_json::from_str::<serde_json::Value>(&body).unwrap()["player_id"]
            .as_i64()
            .unwrap();

        let (status, _) =
            post_json(&app, &format!("/api/players/{}/status", id), json!({ "status": "out" })).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) =
            post_json(&app, "/api/players/9999/status", json!({ "status": "out" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get(&app, "/api/teams/Lakers").await;
        let summary: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["players"][0]["status"], "out");
        assert_eq!(summary["color"], "#552583");
    }

    #[tokio::test]
    async fn reddit_and_sentiment_feed_team_page() {
        let (app, _) = app();
        let now = Utc::now().timestamp() as f64;
        let post = json!({
            "reddit_id": "t3_abc",
            "subreddit": "lakers",
            "title": "Huge win tonight",
            "created_utc": now,
            "team_mention": "Lakers"
        });
        let (status, body) = post_json(&app, "/api/reddit/posts", post.clone()).await;
        assert_eq!(status, StatusCode::OK);
        let post_id = serde_json::from_str::<serde_json::Value>(&body).unwrap()["post_id"]
            .as_i64()
            .unwrap();
        let (_, again) = post_json(&app, "/api/reddit/posts", post).await;
        assert_eq!(body, again);

        let (status, _) = post_json(
            &app,
            "/api/reddit/comments",
            json!({ "reddit_id": "t1_x", "post_id": post_id, "content": "lets go", "created_utc": now }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post_json(
            &app,
            "/api/sentiment",
            json!({ "entity_type": "team", "entity_id": "Lakers", "sentiment_score": 0.4 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = post_json(
            &app,
            "/api/sentiment",
            json!({ "entity_type": "team", "entity_id": "Lakers", "post_id": post_id, "sentiment_score": 0.4 }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = get(&app, "/api/teams/Lakers/posts").await;
        let posts: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(posts.as_array().map(|a| a.len()), Some(1));

        let (_, html) = get(&app, "/team/Lakers").await;
        assert!(html.contains("+0.40"));
    }

    #[tokio::test]
    async fn dangling_references_are_not_found() {
        let (app, _) = app();
        let now = Utc::now().timestamp() as f64;

        let (status, body) = post_json(
            &app,
            "/api/reddit/posts",
            json!({
                "reddit_id": "t3_q",
                "subreddit": "nba",
                "title": "Preview",
                "created_utc": now,
                "game_id": "nope"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("no game with id nope"));

        let (status, body) = post_json(
            &app,
            "/api/reddit/comments",
            json!({ "reddit_id": "t1_q", "post_id": 999, "content": "hm", "created_utc": now }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("no reddit post with id 999"));

        for source in ["post_id", "comment_id"] {
            let mut body = json!({ "entity_type": "team", "entity_id": "Lakers", "sentiment_score": 0.1 });
            body[source] = json!(999);
            let (status, _) = post_json(&app, "/api/sentiment", body).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn listing_and_detail_agree_without_prediction_row() {
        let (app, db) = app();
        seed(&db);
        db.execute_batch("UPDATE games SET prediction = 0.7 WHERE game_id = 'g2'")
            .unwrap();

        let (_, index) = get(&app, "/?date=2026-10-19").await;
        assert!(!index.contains("Heat win"));
        let (_, detail) = get(&app, "/game/g2").await;
        assert!(detail.contains("No prediction yet"));
        assert!(!detail.contains("Heat win"));

        let (status, body) = get(&app, "/api/games/g2").await;
        assert_eq!(status, StatusCode::OK);
        let detail: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(detail["game"]["prediction"].is_null());
        assert!(detail["prediction"].is_null());

        let (_, body) = get(&app, "/api/games?date=2026-10-19").await;
        let records: Vec<GameRecord> = serde_json::from_str(&body).unwrap();
        let g2 = records.iter().find(|r| r.game_id == "g2").unwrap();
        assert!(!g2.prediction_available);
    }

    #[tokio::test]
    async fn stylesheet_and_health() {
        let (app, _) = app();
        let req = Request::builder().uri("/static/style.css").body(Body::empty()).unwrap();
        let (status, headers, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers
            .iter()
            .any(|(k, v)| k == "content-type" && v.starts_with("text/css")));
        assert!(body.contains(".prob-fill"));

        let (status, body) = get(&app, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
