/// Site stylesheet, served at `/static/style.css`.
pub const STYLE_CSS: &str = r#":root {
  --bg: #0f1117;
  --card: #1a1d27;
  --border: #2a2d3a;
  --accent: #f58426;
  --green: #00c896;
  --red: #ff4f6a;
  --text: #e0e0e0;
  --muted: #8888aa;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
a { color: inherit; text-decoration: none; }
a:hover { text-decoration: underline; }
header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
header h1 { font-size: 1.4rem; font-weight: 700; }
header nav { margin-left: auto; display: flex; gap: 1.2rem; color: var(--muted); font-size: .9rem; }
main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
.layout { display: grid; grid-template-columns: 2fr 1fr; gap: 1.5rem; align-items: start; }
@media (max-width: 900px) { .layout { grid-template-columns: 1fr; } }
.sidebar { display: grid; gap: 1.5rem; }
.panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; }
.panel-header { padding: .9rem 1.2rem; border-bottom: 1px solid var(--border); font-weight: 600; display: flex; justify-content: space-between; align-items: center; }
.panel-header .date { color: var(--muted); font-weight: 400; font-size: .85rem; }
.panel-body { padding: 1rem 1.2rem; font-size: .9rem; line-height: 1.5; }
.panel-body p + p { margin-top: .6rem; }
table { width: 100%; border-collapse: collapse; }
th { padding: .7rem 1rem; text-align: left; font-size: .75rem; text-transform: uppercase; color: var(--muted); border-bottom: 1px solid var(--border); }
td { padding: .65rem 1rem; font-size: .88rem; border-bottom: 1px solid #1e2130; vertical-align: middle; }
tr:last-child td { border-bottom: none; }
.team { font-weight: 600; display: inline-flex; align-items: center; gap: .4rem; }
.team-dot { width: 10px; height: 10px; border-radius: 50%; display: inline-block; }
.vs { color: var(--muted); font-size: .8rem; margin: 0 .3rem; }
.winner { font-weight: 600; }
.winner.pending { color: var(--muted); font-weight: 400; font-style: italic; }
.prob { min-width: 140px; }
.prob-bar { height: 8px; border-radius: 4px; background: var(--border); overflow: hidden; margin-bottom: .25rem; }
.prob-fill { height: 100%; border-radius: 4px; }
.prob-text { font-size: .75rem; color: var(--muted); }
.empty { color: var(--muted); text-align: center; padding: 2rem; font-size: .9rem; }
.notice { padding: .7rem 1.2rem; border-radius: 8px; font-size: .88rem; }
.notice.ok { background: rgba(0,200,150,.12); color: var(--green); border: 1px solid rgba(0,200,150,.3); }
.notice.err { background: rgba(255,79,106,.12); color: var(--red); border: 1px solid rgba(255,79,106,.3); }
.refresh-form { display: grid; gap: .5rem; padding: 1rem 1.2rem; }
.refresh-form button { background: none; border: 1px solid var(--border); color: var(--text); padding: .45rem .8rem; border-radius: 6px; cursor: pointer; font-size: .85rem; text-align: left; }
.refresh-form button:hover { border-color: var(--accent); color: var(--accent); }
.refresh-form button[value="all"] { border-color: var(--accent); color: var(--accent); font-weight: 600; }
#chart-container { padding: 1rem; height: 220px; position: relative; }
canvas { width: 100% !important; }
.chart-note { color: var(--muted); font-size: .75rem; padding: 0 1.2rem 1rem; }
.stat-row { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 1rem; }
.stat-card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; }
.stat-card .label { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; margin-bottom: .4rem; }
.stat-card .value { font-size: 1.5rem; font-weight: 700; }
.pos { color: var(--green); }
.neg { color: var(--red); }
.pill { display: inline-block; padding: .15rem .55rem; border-radius: 20px; font-size: .75rem; font-weight: 600; }
.pill.active { background: rgba(0,200,150,.15); color: var(--green); }
.pill.out { background: rgba(255,79,106,.15); color: var(--red); }
.pill.doubtful, .pill.questionable { background: rgba(255,152,0,.15); color: #ff9800; }
.pill.unknown { background: rgba(136,136,170,.15); color: var(--muted); }
.team-title { font-size: 1.6rem; font-weight: 700; border-left: 6px solid; padding-left: .8rem; }
.matchup { display: flex; align-items: center; gap: 1rem; font-size: 1.4rem; font-weight: 700; }
dl.facts { display: grid; grid-template-columns: max-content 1fr; gap: .4rem 1.2rem; }
dl.facts dt { color: var(--muted); }
"#;
