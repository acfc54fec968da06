//! Error types
//!
//! Fetch failures are recoverable per subscription; render failures end the run.

use thiserror::Error;

/// What was being fetched when a [`FetchError`] happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Resources,
    NetworkDetails,
    Subscriptions,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Resources => "resources",
            Self::NetworkDetails => "network details",
            Self::Subscriptions => "subscriptions",
        };
        f.write_str(s)
    }
}

/// Failure of a resource or network detail source for one subscription
#[derive(Debug, Error)]
#[error("failed to fetch {stage} for subscription {subscription_id}: {source}")]
pub struct FetchError {
    pub subscription_id: String,
    pub stage: FetchStage,
    #[source]
    pub source: anyhow::Error,
}

impl FetchError {
    pub fn new(subscription_id: &str, stage: FetchStage, source: anyhow::Error) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            stage,
            source,
        }
    }
}

/// Failure to persist the rendered report
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build document package: {0}")]
    Zip(#[from] zip::result::ZipError),
}
