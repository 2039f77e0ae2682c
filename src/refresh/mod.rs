//! Data-refresh dispatch.
//!
//! The update-data form posts one of six fixed action names. What each action
//! does (scraping schedules, injury reports, Reddit threads, sentiment scoring,
//! prediction runs) lives in the external pipeline; this module only parses
//! the action and hands it to a [`DataRefresher`].

pub mod pipeline;

pub use pipeline::{LogOnlyRefresher, PipelineRefresher};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the refresh buttons on the index page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshAction {
    Games,
    Players,
    Reddit,
    Sentiment,
    Predictions,
    All,
}

impl RefreshAction {
    /// Form order, as rendered on the page
    pub const ALL: [RefreshAction; 6] = [
        RefreshAction::Games,
        RefreshAction::Players,
        RefreshAction::Reddit,
        RefreshAction::Sentiment,
        RefreshAction::Predictions,
        RefreshAction::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshAction::Games => "games",
            RefreshAction::Players => "players",
            RefreshAction::Reddit => "reddit",
            RefreshAction::Sentiment => "sentiment",
            RefreshAction::Predictions => "predictions",
            RefreshAction::All => "all",
        }
    }

    /// Button caption
    pub fn label(&self) -> &'static str {
        match self {
            RefreshAction::Games => "Update Games",
            RefreshAction::Players => "Update Injury Reports",
            RefreshAction::Reddit => "Update Reddit Data",
            RefreshAction::Sentiment => "Run Sentiment Analysis",
            RefreshAction::Predictions => "Generate Predictions",
            RefreshAction::All => "Update All Data",
        }
    }
}

impl fmt::Display for RefreshAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown refresh action: {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for RefreshAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RefreshAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// What happened to a dispatched refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The pipeline accepted the request
    Accepted { detail: String },
    /// No pipeline is configured; the request was only logged
    Logged,
}

/// The external collaborator behind the `refresh_data` endpoint.
#[async_trait]
pub trait DataRefresher: Send + Sync {
    async fn refresh(&self, action: RefreshAction) -> Result<RefreshOutcome>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
