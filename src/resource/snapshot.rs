//! Inventory snapshots
//!
//! A snapshot is the raw fetched data of one run, saved as JSON so a report
//! can be rebuilt later without contacting Azure.

use super::fetcher::{Collected, FetchOutcome, NetworkDetails};
use super::normalize::ResourceRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub subscriptions: Vec<String>,
    #[serde(default)]
    pub outcomes: Vec<FetchOutcome>,
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
    #[serde(default)]
    pub network_details: NetworkDetails,
}

impl Snapshot {
    pub fn from_collected(subscriptions: &[String], collected: &Collected) -> Self {
        Self {
            subscriptions: subscriptions.to_vec(),
            outcomes: collected.outcomes.clone(),
            resources: collected.records.clone(),
            network_details: collected.network_details.clone(),
        }
    }

    pub fn into_collected(self) -> (Vec<String>, Collected) {
        (
            self.subscriptions,
            Collected {
                records: self.resources,
                network_details: self.network_details,
                outcomes: self.outcomes,
            },
        )
    }

    /// Load a snapshot from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    /// Save the snapshot to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        tracing::info!("Snapshot saved as {}", path.display());
        Ok(())
    }
}
