//! Aggregator
//!
//! Groups normalized records into per-service sections and accumulates the
//! summary counters shown at the top of the report.

use super::catalog::{self, DISK_TYPE, STORAGE_ACCOUNT_TYPE, VIRTUAL_MACHINE_TYPE, VIRTUAL_NETWORK_TYPE};
use super::normalize::{display_value, normalize, resource_type, NormalizedAttributes, ResourceRecord, SENTINEL};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Prefix of every section title
pub const SECTION_TITLE_PREFIX: &str = "Service: ";

/// One report section per distinct resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub description: String,
    pub content: Vec<NormalizedAttributes>,
}

impl Section {
    /// Service display name (the title without its prefix)
    pub fn service_name(&self) -> &str {
        self.title
            .strip_prefix(SECTION_TITLE_PREFIX)
            .unwrap_or(&self.title)
    }
}

/// Summary counts for the report front matter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub subscriptions: usize,
    pub resource_groups: usize,
    pub virtual_machines: usize,
    pub disks: usize,
    pub storage_accounts: usize,
    pub vnets: usize,
}

impl Counters {
    /// Whether the report covers more than one subscription
    pub fn is_multi_subscription(&self) -> bool {
        self.subscriptions > 1
    }
}

/// Aggregate records using the embedded service catalog
pub fn aggregate(records: &[ResourceRecord], subscriptions: usize) -> (Vec<Section>, Counters) {
    aggregate_with(records, subscriptions, catalog::lookup)
}

/// Aggregate records with an explicit type lookup
///
/// Sections come out in the order each resource type was first seen.
pub fn aggregate_with<F>(
    records: &[ResourceRecord],
    subscriptions: usize,
    lookup: F,
) -> (Vec<Section>, Counters)
where
    F: Fn(&str) -> (String, String),
{
    let mut groups: IndexMap<String, Vec<NormalizedAttributes>> = IndexMap::new();
    let mut resource_groups: HashSet<String> = HashSet::new();
    let mut counters = Counters {
        subscriptions,
        ..Counters::default()
    };

    for record in records {
        let rtype = resource_type(record).unwrap_or(SENTINEL);

        resource_groups.insert(
            record
                .get("resourceGroup")
                .filter(|v| !v.is_null())
                .map(display_value)
                .unwrap_or_else(|| SENTINEL.to_string()),
        );

        match rtype {
            VIRTUAL_MACHINE_TYPE => counters.virtual_machines += 1,
            DISK_TYPE => counters.disks += 1,
            STORAGE_ACCOUNT_TYPE => counters.storage_accounts += 1,
            VIRTUAL_NETWORK_TYPE => counters.vnets += 1,
            _ => {}
        }

        groups
            .entry(rtype.to_string())
            .or_default()
            .push(normalize(record));
    }

    counters.resource_groups = resource_groups.len();

    let sections = groups
        .into_iter()
        .map(|(rtype, content)| {
            tracing::debug!("Processing resource type: {}", rtype);
            let (service_name, description) = lookup(&rtype);
            tracing::debug!(
                "Service name: {}, Description: {}",
                service_name,
                description
            );
            Section {
                title: format!("{}{}", SECTION_TITLE_PREFIX, service_name),
                description,
                content,
            }
        })
        .collect();

    tracing::info!("Processed resource data: {:?}", counters);
    (sections, counters)
}
