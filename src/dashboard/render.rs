//! Server-side HTML for the index, team and game pages.
//!
//! Every value that comes from the store goes through [`escape_html`] before it
//! is interpolated.
use axum::http::StatusCode;
use chrono::{Duration, NaiveDate};
use std::fmt::Write as _;

use super::display::{
    escape_html, format_probability, game_href, predicted_winner, probability_text, team_color,
    team_href, winner_label,
};
use super::TeamSummary;
use crate::accuracy::AccuracyReport;
use crate::db::models::{Game, GameRecord, GameResult, Player, Prediction};
use crate::refresh::RefreshAction;

pub const EMPTY_GAMES_MESSAGE: &str = "No games scheduled for today.";

/// Flash message shown above the game list after a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub ok: bool,
    pub message: String,
}

pub struct IndexPage<'a> {
    pub date: NaiveDate,
    /// Human-readable form of `date`
    pub current_date: &'a str,
    pub games: &'a [GameRecord],
    pub accuracy: &'a AccuracyReport,
    pub notice: Option<Notice>,
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} · NBA Sentiment Predictor</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header>
  <h1>🏀 NBA Sentiment Predictor</h1>
  <nav><a href="/">Today</a><a href="/api/accuracy">Accuracy data</a></nav>
</header>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
        body = body,
    )
}

fn team_link(team: &str) -> String {
    format!(
        r#"<a class="team" href="{href}"><span class="team-dot" style="background: {color}"></span>{name}</a>"#,
        href = escape_html(&team_href(team)),
        color = team_color(team),
        name = escape_html(team),
    )
}

fn game_row(game: &GameRecord) -> String {
    let winner = match predicted_winner(game) {
        Some(_) => format!(r#"<span class="winner">{}</span>"#, escape_html(&winner_label(game))),
        None => format!(
            r#"<span class="winner pending">{}</span>"#,
            escape_html(&winner_label(game))
        ),
    };
    let fill_color = if game.prediction_available {
        team_color(&game.home_team)
    } else {
        "var(--muted)"
    };
    let prob = probability_text(game);
    format!(
        r#"<tr>
  <td>{time}</td>
  <td>{home}<span class="vs">vs</span>{away}</td>
  <td>{winner}</td>
  <td class="prob"><div class="prob-bar"><div class="prob-fill" style="width: {prob}; background: {fill_color}"></div></div><span class="prob-text">{prob}</span></td>
  <td><a href="{href}">Details</a></td>
</tr>"#,
        time = escape_html(&game.game_time),
        home = team_link(&game.home_team),
        away = team_link(&game.away_team),
        href = escape_html(&game_href(&game.game_id)),
    )
}

/// The game table, or `empty_message` in place of the table when there are no games.
fn games_table(games: &[GameRecord], empty_message: &str) -> String {
    if games.is_empty() {
        return format!(r#"<div class="empty">{}</div>"#, escape_html(empty_message));
    }
    let mut rows = String::new();
    for game in games {
        rows.push_str(&game_row(game));
        rows.push('\n');
    }
    format!(
        r#"<table>
<thead><tr><th>Time</th><th>Matchup (home vs away)</th><th>Predicted winner</th><th>Home win probability</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
    )
}

fn refresh_form() -> String {
    let mut buttons = String::new();
    for action in RefreshAction::ALL {
        let _ = writeln!(
            buttons,
            r#"  <button type="submit" name="action" value="{}">{}</button>"#,
            action.as_str(),
            action.label()
        );
    }
    format!(
        r#"<div class="panel">
<div class="panel-header">Update Data</div>
<form class="refresh-form" method="post" action="/refresh_data">
{buttons}</form>
</div>"#
    )
}

const INFO_PANEL: &str = r#"<div class="panel">
<div class="panel-header">How predictions work</div>
<div class="panel-body">
<p>Each prediction blends fan sentiment from team subreddits with the latest injury reports and recent player form.</p>
<p>The probability shown is the chance that the <strong>home</strong> team wins. Anything above 50% favors the home side; otherwise the away side is the pick.</p>
<p>Games without a prediction show a neutral 50% until the pipeline has scored them.</p>
</div>
</div>"#;

const CHART_SCRIPT: &str = r#"<script>
(function () {
  const labels = __LABELS__;
  const values = __VALUES__;
  const canvas = document.getElementById('accuracy-chart');
  const ctx = canvas.getContext('2d');
  const W = canvas.parentElement.clientWidth - 32;
  const H = 180;
  canvas.width = W;
  canvas.height = H;
  ctx.clearRect(0, 0, W, H);

  // Grid lines at 25% steps
  ctx.strokeStyle = '#2a2d3a';
  ctx.lineWidth = 1;
  for (let i = 0; i <= 4; i++) {
    const y = (H - 20) - (i / 4) * (H - 30);
    ctx.beginPath(); ctx.moveTo(0, y); ctx.lineTo(W, y); ctx.stroke();
  }

  const slot = W / labels.length;
  const barW = slot * 0.6;
  ctx.font = '11px system-ui, sans-serif';
  ctx.textAlign = 'center';
  values.forEach((v, i) => {
    const h = v * (H - 30);
    const x = i * slot + (slot - barW) / 2;
    const y = (H - 20) - h;
    ctx.fillStyle = '#f58426';
    ctx.fillRect(x, y, barW, h);
    ctx.fillStyle = '#e0e0e0';
    ctx.fillText((v * 100).toFixed(0) + '%', x + barW / 2, Math.max(y - 4, 10));
    ctx.fillStyle = '#8888aa';
    ctx.fillText(labels[i], x + barW / 2, H - 5);
  });
})();
</script>"#;

/// JSON for embedding inside a `<script>` element
fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}

fn accuracy_panel(report: &AccuracyReport) -> String {
    let labels: Vec<&str> = report.buckets.iter().map(|b| b.label).collect();
    let values: Vec<f64> = report.buckets.iter().map(|b| b.accuracy).collect();
    let script = CHART_SCRIPT
        .replace("__LABELS__", &script_json(&labels))
        .replace("__VALUES__", &script_json(&values));
    let note = if report.placeholder {
        "Sample data: no predicted games have finished yet.".to_string()
    } else {
        format!("Based on {} finished games, grouped by prediction confidence.", report.resolved)
    };
    format!(
        r#"<div class="panel">
<div class="panel-header">Prediction Accuracy</div>
<div id="chart-container"><canvas id="accuracy-chart"></canvas></div>
<div class="chart-note">{note}</div>
</div>
{script}"#,
        note = escape_html(&note),
    )
}

pub fn index_page(page: &IndexPage<'_>) -> String {
    let notice = page
        .notice
        .as_ref()
        .map(|n| {
            format!(
                r#"<div class="notice {}">{}</div>"#,
                if n.ok { "ok" } else { "err" },
                escape_html(&n.message)
            )
        })
        .unwrap_or_default();
    let prev = page.date - Duration::days(1);
    let next = page.date + Duration::days(1);
    let body = format!(
        r#"{notice}
<div class="layout">
<div class="panel">
<div class="panel-header">Games <span class="date"><a href="/?date={prev}">&larr;</a> {current_date} <a href="/?date={next}">&rarr;</a></span></div>
{table}
</div>
<div class="sidebar">
{info}
{form}
</div>
</div>
{chart}"#,
        prev = prev.format("%Y-%m-%d"),
        next = next.format("%Y-%m-%d"),
        current_date = escape_html(page.current_date),
        table = games_table(page.games, EMPTY_GAMES_MESSAGE),
        info = INFO_PANEL,
        form = refresh_form(),
        chart = accuracy_panel(page.accuracy),
    );
    layout(page.current_date, &body)
}

fn status_pill(player: &Player) -> String {
    let status = player.status.as_deref().unwrap_or("unknown");
    let class = match status.to_lowercase().as_str() {
        "active" => "active",
        "out" => "out",
        "doubtful" => "doubtful",
        "questionable" | "day-to-day" | "probable" => "questionable",
        _ => "unknown",
    };
    format!(r#"<span class="pill {}">{}</span>"#, class, escape_html(status))
}

fn sentiment_class(score: f64) -> &'static str {
    if score >= 0.0 {
        "pos"
    } else {
        "neg"
    }
}

pub fn team_page(summary: &TeamSummary) -> String {
    let roster = if summary.players.is_empty() {
        r#"<div class="empty">No players on record.</div>"#.to_string()
    } else {
        let mut rows = String::new();
        for p in &summary.players {
            let _ = writeln!(
                rows,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&p.name),
                status_pill(p)
            );
        }
        format!(
            "<table>\n<thead><tr><th>Player</th><th>Status</th></tr></thead>\n<tbody>\n{rows}</tbody>\n</table>"
        )
    };
    let sentiment = if summary.sentiment.samples > 0 {
        format!(
            r#"<div class="value {}">{:+.2}</div>"#,
            sentiment_class(summary.sentiment.average),
            summary.sentiment.average
        )
    } else {
        r#"<div class="value">–</div>"#.to_string()
    };
    let body = format!(
        r#"<div class="team-title" style="border-color: {color}">{name}</div>
<div class="stat-row">
  <div class="stat-card"><div class="label">Sentiment ({days}d)</div>{sentiment}</div>
  <div class="stat-card"><div class="label">Sentiment samples</div><div class="value">{samples}</div></div>
  <div class="stat-card"><div class="label">Players tracked</div><div class="value">{players}</div></div>
</div>
<div class="layout">
<div class="panel">
<div class="panel-header">Upcoming Games</div>
{games}
</div>
<div class="panel">
<div class="panel-header">Injury Report</div>
{roster}
</div>
</div>"#,
        color = summary.color,
        name = escape_html(&summary.team),
        days = summary.sentiment_days,
        samples = summary.sentiment.samples,
        players = summary.players.len(),
        games = games_table(&summary.upcoming, "No upcoming games."),
    );
    layout(&summary.team, &body)
}

fn optional_sentiment(v: Option<f64>) -> String {
    v.map(|s| format!("{:+.2}", s)).unwrap_or_else(|| "–".to_string())
}

pub fn game_page(game: &Game, prediction: Option<&Prediction>) -> String {
    let prediction_html = match prediction {
        Some(p) => {
            let record = GameRecord::new(
                game.game_id.clone(),
                game.game_time.clone(),
                game.home_team.clone(),
                game.away_team.clone(),
                Some(p.home_win_probability),
            );
            format!(
                r#"<dl class="facts">
<dt>Pick</dt><dd class="winner">{pick}</dd>
<dt>{home} win</dt><dd>{home_p}</dd>
<dt>{away} win</dt><dd>{away_p}</dd>
<dt>{home} sentiment</dt><dd>{home_s}</dd>
<dt>{away} sentiment</dt><dd>{away_s}</dd>
<dt>Generated</dt><dd>{ts}</dd>
</dl>"#,
                pick = escape_html(&winner_label(&record)),
                home = escape_html(&game.home_team),
                away = escape_html(&game.away_team),
                home_p = format_probability(p.home_win_probability),
                away_p = format_probability(1.0 - p.home_win_probability),
                home_s = optional_sentiment(p.home_team_sentiment),
                away_s = optional_sentiment(p.away_team_sentiment),
                ts = p.prediction_timestamp.format("%Y-%m-%d %H:%M UTC"),
            )
        }
        None => r#"<div class="empty">No prediction yet</div>"#.to_string(),
    };
    let result = match game.actual_result {
        Some(GameResult::HomeWin) => format!("{} won", game.home_team),
        Some(GameResult::AwayWin) => format!("{} won", game.away_team),
        None => "Not played yet".to_string(),
    };
    let body = format!(
        r#"<div class="matchup">{home}<span class="vs">vs</span>{away}</div>
<div class="layout">
<div class="panel">
<div class="panel-header">Prediction</div>
<div class="panel-body">{prediction}</div>
</div>
<div class="panel">
<div class="panel-header">Game</div>
<div class="panel-body"><dl class="facts">
<dt>Date</dt><dd>{date}</dd>
<dt>Time</dt><dd>{time}</dd>
<dt>Venue</dt><dd>{venue}</dd>
<dt>Result</dt><dd>{result}</dd>
</dl></div>
</div>
</div>"#,
        home = team_link(&game.home_team),
        away = team_link(&game.away_team),
        prediction = prediction_html,
        date = game.game_date.format("%A, %B %-d, %Y"),
        time = escape_html(&game.game_time),
        venue = escape_html(game.venue.as_deref().unwrap_or("–")),
        result = escape_html(&result),
    );
    layout(
        &format!("{} vs {}", game.home_team, game.away_team),
        &body,
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<div class="panel"><div class="panel-header">{status}</div><div class="panel-body"><p>{message}</p><p><a href="/">Back to today's games</a></p></div></div>"#,
        status = status,
        message = escape_html(message),
    );
    layout(status.canonical_reason().unwrap_or("Error"), &body)
}
