//! Small value lookups the templates lean on: team colors, probability text,
//! winner labels, escaping.
use crate::accuracy::favors_home;
use crate::db::models::GameRecord;

/// Fallback for teams missing from [`TEAM_COLORS`].
pub const DEFAULT_TEAM_COLOR: &str = "#6c757d";

/// Primary color per franchise, keyed by nickname.
const TEAM_COLORS: [(&str, &str); 30] = [
    ("Hawks", "#E03A3E"),
    ("Celtics", "#007A33"),
    ("Nets", "#000000"),
    ("Hornets", "#1D1160"),
    ("Bulls", "#CE1141"),
    ("Cavaliers", "#860038"),
    ("Mavericks", "#00538C"),
    ("Nuggets", "#0E2240"),
    ("Pistons", "#C8102E"),
    ("Warriors", "#1D428A"),
    ("Rockets", "#CE1141"),
    ("Pacers", "#002D62"),
    ("Clippers", "#C8102E"),
    ("Lakers", "#552583"),
    ("Grizzlies", "#5D76A9"),
    ("Heat", "#98002E"),
    ("Bucks", "#00471B"),
    ("Timberwolves", "#0C2340"),
    ("Pelicans", "#0C2340"),
    ("Knicks", "#006BB6"),
    ("Thunder", "#007AC1"),
    ("Magic", "#0077C0"),
    ("76ers", "#006BB6"),
    ("Suns", "#1D1160"),
    ("Trail Blazers", "#E03A3E"),
    ("Kings", "#5A2D81"),
    ("Spurs", "#C4CED4"),
    ("Raptors", "#CE1141"),
    ("Jazz", "#002B5C"),
    ("Wizards", "#002B5C"),
];

/// Display color for a team given either its nickname ("Lakers") or full
/// name ("Los Angeles Lakers"). Matching ignores case.
pub fn team_color(team: &str) -> &'static str {
    let name = team.trim().to_lowercase();
    TEAM_COLORS
        .iter()
        .find(|(nick, _)| {
            let nick = nick.to_lowercase();
            name == nick || name.ends_with(&format!(" {}", nick))
        })
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_TEAM_COLOR)
}

/// 0.62 → "62.0%"
pub fn format_probability(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// The team the prediction favors, or `None` without a prediction.
pub fn predicted_winner(game: &GameRecord) -> Option<&str> {
    if !game.prediction_available {
        return None;
    }
    if favors_home(game.win_probability) {
        Some(game.home_team.as_str())
    } else {
        Some(game.away_team.as_str())
    }
}

pub fn winner_label(game: &GameRecord) -> String {
    match predicted_winner(game) {
        Some(team) => format!("{} win", team),
        None => "No prediction yet".to_string(),
    }
}

/// Home-win probability text; a neutral 50% without a prediction.
pub fn probability_text(game: &GameRecord) -> String {
    if game.prediction_available {
        format_probability(game.win_probability)
    } else {
        format_probability(0.5)
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a single path segment (RFC 3986 unreserved set kept as-is).
pub fn encode_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

pub fn team_href(team: &str) -> String {
    format!("/team/{}", encode_segment(team))
}

pub fn game_href(game_id: &str) -> String {
    format!("/game/{}", encode_segment(game_id))
}
