use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{DataRefresher, RefreshAction, RefreshOutcome};

/// Forwards refresh actions to the pipeline's HTTP endpoint as `{"action": "<name>"}`.
#[derive(Clone)]
pub struct PipelineRefresher {
    http: Client,
    url: String,
}

impl PipelineRefresher {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(PipelineRefresher {
            http,
            url: url.to_string(),
        })
    }
}

fn payload(action: RefreshAction) -> serde_json::Value {
    json!({ "action": action.as_str() })
}

#[async_trait]
impl DataRefresher for PipelineRefresher {
    fn name(&self) -> &str {
        "pipeline"
    }

    async fn refresh(&self, action: RefreshAction) -> Result<RefreshOutcome> {
        debug!("Posting refresh action '{}' to {}", action, self.url);

        let resp = self
            .http
            .post(&self.url)
            .json(&payload(action))
            .send()
            .await
            .context("Pipeline refresh request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Pipeline refresh error {}: {}", status, body);
        }

        info!("Pipeline accepted refresh action '{}' ({})", action, status);
        Ok(RefreshOutcome::Accepted {
            detail: status.to_string(),
        })
    }
}

/// Used when no pipeline URL is configured.
#[derive(Debug, Clone, Default)]
pub struct LogOnlyRefresher;

#[async_trait]
impl DataRefresher for LogOnlyRefresher {
    fn name(&self) -> &str {
        "log-only"
    }

    async fn refresh(&self, action: RefreshAction) -> Result<RefreshOutcome> {
        info!(
            "Refresh requested for '{}' but no pipeline is configured (set PIPELINE_URL)",
            action
        );
        Ok(RefreshOutcome::Logged)
    }
}
