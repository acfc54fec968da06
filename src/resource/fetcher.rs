//! Resource Fetcher
//!
//! Collects resource records and network details from every requested
//! subscription. A subscription that fails contributes nothing; the rest of
//! the run carries on.

use super::normalize::ResourceRecord;
use crate::azure::client::{format_arm_error, ArmClient};
use crate::error::{FetchError, FetchStage};
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supplies resource records for one subscription
#[async_trait]
pub trait ResourceSource: Send + Sync {
    async fn list_resources(&self, subscription_id: &str) -> Result<Vec<ResourceRecord>, FetchError>;
}

/// Supplies virtual network detail records for one subscription
#[async_trait]
pub trait NetworkDetailSource: Send + Sync {
    async fn list_virtual_networks(&self, subscription_id: &str) -> Result<Vec<Value>, FetchError>;
}

#[async_trait]
impl ResourceSource for ArmClient {
    async fn list_resources(&self, subscription_id: &str) -> Result<Vec<ResourceRecord>, FetchError> {
        tracing::info!("Fetching resources for subscription ID {}", subscription_id);
        let items = self
            .get_all(&self.resources_url(subscription_id))
            .await
            .map_err(|e| FetchError::new(subscription_id, FetchStage::Resources, e))?;
        Ok(items.into_iter().map(post_process_item).collect())
    }
}

#[async_trait]
impl NetworkDetailSource for ArmClient {
    async fn list_virtual_networks(&self, subscription_id: &str) -> Result<Vec<Value>, FetchError> {
        tracing::info!("Fetching network details for subscription ID {}", subscription_id);
        self.get_all(&self.virtual_networks_url(subscription_id))
            .await
            .map_err(|e| FetchError::new(subscription_id, FetchStage::NetworkDetails, e))
    }
}

/// Virtual network detail records gathered across subscriptions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDetails {
    #[serde(default)]
    pub virtual_networks: Vec<Value>,
}

/// Per-subscription result of a collection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub subscription_id: String,
    pub resources: usize,
    pub virtual_networks: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Everything fetched in one run
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// Records in subscription order, then in-subscription order
    pub records: Vec<ResourceRecord>,
    pub network_details: NetworkDetails,
    pub outcomes: Vec<FetchOutcome>,
}

/// Fetch all subscriptions concurrently and merge them deterministically
pub async fn collect<R, N>(resources: &R, networks: &N, subscription_ids: &[String]) -> Collected
where
    R: ResourceSource + ?Sized,
    N: NetworkDetailSource + ?Sized,
{
    let fetches = subscription_ids.iter().map(|sub| async move {
        let (res, nets) = futures::join!(
            resources.list_resources(sub),
            networks.list_virtual_networks(sub)
        );
        (sub, res, nets)
    });

    // join_all keeps input order, so the merge doesn't depend on timing
    let results = join_all(fetches).await;

    let mut collected = Collected::default();
    for (sub, res, nets) in results {
        let mut outcome = FetchOutcome {
            subscription_id: sub.clone(),
            resources: 0,
            virtual_networks: 0,
            errors: Vec::new(),
        };

        match res {
            Ok(records) => {
                tracing::info!("Fetched {} resources for subscription ID {}", records.len(), sub);
                outcome.resources = records.len();
                collected.records.extend(records);
            }
            Err(e) => {
                tracing::error!("Error fetching data for subscription ID {}: {:#}", sub, e);
                outcome.errors.push(format!("{}: {}", e.stage, format_arm_error(&e.source)));
            }
        }

        match nets {
            Ok(vnets) => {
                tracing::info!(
                    "Fetched {} virtual networks for subscription ID {}",
                    vnets.len(),
                    sub
                );
                outcome.virtual_networks = vnets.len();
                collected.network_details.virtual_networks.extend(vnets);
            }
            Err(e) => {
                tracing::error!("Error fetching network details for subscription ID {}: {:#}", sub, e);
                outcome.errors.push(format!("{}: {}", e.stage, format_arm_error(&e.source)));
            }
        }

        collected.outcomes.push(outcome);
    }

    collected
}

/// Fill in fields the ARM list API leaves out
fn post_process_item(mut item: Value) -> Value {
    if let Value::Object(ref mut map) = item {
        let missing_group = map.get("resourceGroup").map_or(true, |v| v.is_null());
        if missing_group {
            if let Some(group) = map
                .get("id")
                .and_then(|v| v.as_str())
                .and_then(resource_group_from_id)
            {
                map.insert("resourceGroup".to_string(), Value::String(group));
            }
        }

        if !map.contains_key("addressSpace") {
            if let Some(space) = map
                .get("properties")
                .and_then(|p| p.get("addressSpace"))
                .cloned()
            {
                map.insert("addressSpace".to_string(), space);
            }
        }
    }
    item
}

/// Extract the resource group segment from an ARM resource ID
///
/// e.g. "/subscriptions/s/resourceGroups/rg1/providers/..." -> "rg1"
pub fn resource_group_from_id(id: &str) -> Option<String> {
    let mut parts = id.split('/');
    while let Some(part) = parts.next() {
        if part.eq_ignore_ascii_case("resourceGroups") {
            return parts.next().filter(|s| !s.is_empty()).map(|s| s.to_string());
        }
    }
    None
}
