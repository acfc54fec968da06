//! Service Catalog - resource type and header lookups
//!
//! Loads the static service catalog from embedded JSON and answers two
//! questions for the rest of the pipeline: what a raw Azure resource type is
//! called (and what it does), and which columns a service's table shows.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded catalog JSON (compiled into the binary)
const CATALOG_FILE: &str = include_str!("../resources/catalog.json");

/// Description used for resource types missing from the catalog
pub const UNKNOWN_DESCRIPTION: &str = "Description not available.";

pub const VIRTUAL_MACHINE_TYPE: &str = "Microsoft.Compute/virtualMachines";
pub const DISK_TYPE: &str = "Microsoft.Compute/disks";
pub const STORAGE_ACCOUNT_TYPE: &str = "Microsoft.Storage/storageAccounts";
pub const VIRTUAL_NETWORK_TYPE: &str = "Microsoft.Network/virtualNetworks";

/// Display name of the virtual network service
pub const VIRTUAL_NETWORK_SERVICE: &str = "Azure Virtual Networks";

/// Columns used when a service has no registered header set
pub const DEFAULT_HEADERS: &[&str] = &["Name", "Resource Group", "Location", "Kind", "SKU", "Tags"];

/// Columns always used for virtual networks
pub const VIRTUAL_NETWORK_HEADERS: &[&str] =
    &["Name", "Resource Group", "Location", "Address Space", "Tags"];

/// Service entry from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDef {
    pub display_name: String,
    pub description: String,
}

/// Root structure of resources/catalog.json
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub resource_types: HashMap<String, ServiceDef>,
    #[serde(default)]
    pub service_headers: HashMap<String, Vec<String>>,
}

static CATALOG: OnceLock<CatalogConfig> = OnceLock::new();

/// Get the service catalog (parsed from embedded JSON on first access)
pub fn get_catalog() -> &'static CatalogConfig {
    CATALOG.get_or_init(|| {
        serde_json::from_str(CATALOG_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded catalog JSON: {}", e))
    })
}

/// Resolve a raw resource type to its (display name, description).
///
/// Unknown types fall back to the raw type string as display name.
pub fn lookup(resource_type: &str) -> (String, String) {
    match get_catalog().resource_types.get(resource_type) {
        Some(def) => (def.display_name.clone(), def.description.clone()),
        None => (resource_type.to_string(), UNKNOWN_DESCRIPTION.to_string()),
    }
}

/// Whether a resource type has a catalog entry
pub fn is_registered(resource_type: &str) -> bool {
    get_catalog().resource_types.contains_key(resource_type)
}

/// All registered service display names, sorted
pub fn service_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = get_catalog()
        .resource_types
        .values()
        .map(|d| d.display_name.as_str())
        .collect();
    names.sort_unstable();
    names
}

/// Ordered column headers for a service display name
pub fn headers_for(display_name: &str) -> Vec<String> {
    let mut headers = get_catalog()
        .service_headers
        .get(display_name)
        .cloned()
        .unwrap_or_else(|| DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect());

    // Applied after the table lookup so a catalog edit can't change it
    if display_name == VIRTUAL_NETWORK_SERVICE {
        headers = VIRTUAL_NETWORK_HEADERS.iter().map(|h| h.to_string()).collect();
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads_successfully() {
        let catalog = get_catalog();
        assert!(!catalog.resource_types.is_empty());
        assert!(!catalog.service_headers.is_empty());
    }

    #[test]
    fn test_lookup_known_type() {
        let (name, description) = lookup(VIRTUAL_MACHINE_TYPE);
        assert_eq!(name, "Azure Virtual Machines");
        assert_eq!(
            description,
            "Scalable computing resources for running applications."
        );
    }

    #[test]
    fn test_lookup_unknown_type_uses_raw_type() {
        let (name, description) = lookup("Contoso.Widgets/gadgets");
        assert_eq!(name, "Contoso.Widgets/gadgets");
        assert_eq!(description, UNKNOWN_DESCRIPTION);
    }

    #[test]
    fn test_lookup_empty_type() {
        let (name, description) = lookup("");
        assert_eq!(name, "");
        assert_eq!(description, UNKNOWN_DESCRIPTION);
    }

    #[test]
    fn test_headers_for_registered_service() {
        assert_eq!(
            headers_for("Azure Storage Accounts"),
            vec!["Name", "Resource Group", "Location", "SKU", "Access Tier", "Tags"]
        );
    }

    #[test]
    fn test_headers_for_unregistered_service_uses_default() {
        assert_eq!(headers_for("Azure Key Vault"), DEFAULT_HEADERS);
        assert_eq!(headers_for("Contoso.Widgets/gadgets"), DEFAULT_HEADERS);
    }

    #[test]
    fn test_virtual_network_headers_override() {
        assert_eq!(headers_for(VIRTUAL_NETWORK_SERVICE), VIRTUAL_NETWORK_HEADERS);
    }

    #[test]
    fn test_every_custom_header_service_is_in_catalog() {
        let names = service_names();
        for service in get_catalog().service_headers.keys() {
            assert!(names.contains(&service.as_str()), "{} missing", service);
        }
    }

    #[test]
    fn test_is_registered() {
        assert!(is_registered(VIRTUAL_NETWORK_TYPE));
        assert!(!is_registered(DISK_TYPE));
    }
}
