use clap::Parser;
use url::Url;

/// NBA sentiment predictor web front end
#[derive(Parser, Debug, Clone)]
#[command(name = "courtside", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// SQLite database path (shared with the prediction pipeline)
    #[arg(long, env = "DATABASE_PATH", default_value = "nba_sentiment.db")]
    pub database_path: String,

    /// Base URL of the external data pipeline that handles refresh requests.
    /// When unset, refresh requests are only logged.
    #[arg(long, env = "PIPELINE_URL")]
    pub pipeline_url: Option<String>,

    /// Timeout for a single pipeline refresh request, in seconds
    #[arg(long, env = "PIPELINE_TIMEOUT_SECS", default_value = "30")]
    pub pipeline_timeout_secs: u64,

    /// How many days of sentiment records feed the team sentiment average
    #[arg(long, env = "SENTIMENT_DAYS", default_value = "7")]
    pub sentiment_days: i64,

    /// How many days ahead the team page lists upcoming games
    #[arg(long, env = "UPCOMING_DAYS", default_value = "7")]
    pub upcoming_days: i64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(raw) = &self.pipeline_url {
            let url = Url::parse(raw)
                .map_err(|e| anyhow::anyhow!("PIPELINE_URL is not a valid URL: {}", e))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                anyhow::bail!("PIPELINE_URL must use http or https, got {}", url.scheme());
            }
        }
        if self.pipeline_timeout_secs == 0 {
            anyhow::bail!("pipeline_timeout_secs must be positive");
        }
        if !(1..=365).contains(&self.sentiment_days) {
            anyhow::bail!("sentiment_days must be between 1 and 365");
        }
        if !(1..=60).contains(&self.upcoming_days) {
            anyhow::bail!("upcoming_days must be between 1 and 60");
        }
        Ok(())
    }
}
