//! Resource Normalizer
//!
//! Flattens a raw ARM resource record into the fixed set of report attributes.

use super::catalog::VIRTUAL_NETWORK_TYPE;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder for an absent or unresolved attribute
pub const SENTINEL: &str = "N/A";

pub const NAME: &str = "Name";
pub const RESOURCE_GROUP: &str = "Resource Group";
pub const LOCATION: &str = "Location";
pub const KIND: &str = "Kind";
pub const SKU: &str = "SKU";
pub const TAGS: &str = "Tags";
pub const ID: &str = "ID";
pub const ADDRESS_SPACE: &str = "Address Space";

/// A raw resource record as returned by the resource source
pub type ResourceRecord = Value;

/// Flat attribute mapping for one resource, keyed by column header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedAttributes(IndexMap<String, Value>);

impl NormalizedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` holds something other than the sentinel
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !is_sentinel(v))
    }

    /// Text for a table cell; absent keys render as the sentinel
    pub fn display(&self, key: &str) -> String {
        self.get(key)
            .map(display_value)
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the entries whose key satisfies `keep`
    pub fn retain_keys<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| keep(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for NormalizedAttributes {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub fn sentinel() -> Value {
    Value::String(SENTINEL.to_string())
}

pub fn is_sentinel(value: &Value) -> bool {
    value.as_str() == Some(SENTINEL)
}

/// Render an attribute value as cell text
///
/// Tag maps render as `key: value` pairs.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => SENTINEL.to_string(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Look up a nested path, treating JSON null as absent
fn lookup_path<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = record;
    for part in path {
        current = current.get(part)?;
    }
    (!current.is_null()).then_some(current)
}

fn field(record: &Value, path: &[&str]) -> Value {
    lookup_path(record, path).cloned().unwrap_or_else(sentinel)
}

/// Raw resource type of a record, if it has one
pub fn resource_type(record: &Value) -> Option<&str> {
    record.get("type").and_then(|v| v.as_str())
}

/// Convert a raw record into its report attributes
pub fn normalize(record: &ResourceRecord) -> NormalizedAttributes {
    let mut attrs = NormalizedAttributes::new();
    attrs.insert(NAME, field(record, &["name"]));
    attrs.insert(RESOURCE_GROUP, field(record, &["resourceGroup"]));
    attrs.insert(LOCATION, field(record, &["location"]));
    attrs.insert(KIND, field(record, &["kind"]));
    attrs.insert(SKU, field(record, &["sku", "name"]));
    attrs.insert(TAGS, field(record, &["tags"]));
    attrs.insert(ID, field(record, &["id"]));

    if resource_type(record) == Some(VIRTUAL_NETWORK_TYPE) {
        // Empty prefixes give "", never the sentinel
        let prefixes = lookup_path(record, &["addressSpace", "addressPrefixes"])
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .map(|p| p.as_str().map(str::to_string).unwrap_or_else(|| p.to_string()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        attrs.insert(ADDRESS_SPACE, Value::String(prefixes.join(", ")));
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_full_record() {
        let record = json!({
            "type": "Microsoft.Storage/storageAccounts",
            "name": "sa1",
            "resourceGroup": "rg1",
            "location": "westeurope",
            "kind": "StorageV2",
            "sku": {"name": "Standard_LRS", "tier": "Standard"},
            "tags": {"env": "prod"},
            "id": "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/sa1"
        });

        let attrs = normalize(&record);
        assert_eq!(attrs.display(NAME), "sa1");
        assert_eq!(attrs.display(RESOURCE_GROUP), "rg1");
        assert_eq!(attrs.display(LOCATION), "westeurope");
        assert_eq!(attrs.display(KIND), "StorageV2");
        assert_eq!(attrs.display(SKU), "Standard_LRS");
        assert_eq!(attrs.get(TAGS), Some(&json!({"env": "prod"})));
        assert!(attrs.display(ID).ends_with("/sa1"));
        assert!(attrs.get(ADDRESS_SPACE).is_none());
        assert_eq!(attrs.len(), 7);
    }

    #[test]
    fn test_normalize_empty_record_is_all_sentinel() {
        let attrs = normalize(&json!({}));
        for key in [NAME, RESOURCE_GROUP, LOCATION, KIND, SKU, TAGS, ID] {
            assert_eq!(attrs.get(key), Some(&sentinel()), "{}", key);
        }
    }

    #[test]
    fn test_sku_without_name_is_sentinel() {
        let attrs = normalize(&json!({"sku": {"tier": "Basic"}}));
        assert_eq!(attrs.display(SKU), SENTINEL);
    }

    #[test]
    fn test_null_fields_are_sentinel() {
        let attrs = normalize(&json!({"tags": null, "kind": null, "sku": null}));
        assert_eq!(attrs.display(TAGS), SENTINEL);
        assert_eq!(attrs.display(KIND), SENTINEL);
        assert_eq!(attrs.display(SKU), SENTINEL);
    }

    #[test]
    fn test_vnet_address_space_joined() {
        let record = json!({
            "type": VIRTUAL_NETWORK_TYPE,
            "name": "vnet1",
            "addressSpace": {"addressPrefixes": ["10.0.0.0/16", "10.1.0.0/16"]}
        });
        let attrs = normalize(&record);
        assert_eq!(attrs.display(ADDRESS_SPACE), "10.0.0.0/16, 10.1.0.0/16");
    }

    #[test]
    fn test_vnet_empty_prefixes_is_empty_string() {
        let record = json!({
            "type": VIRTUAL_NETWORK_TYPE,
            "addressSpace": {"addressPrefixes": []}
        });
        assert_eq!(normalize(&record).get(ADDRESS_SPACE), Some(&json!("")));

        let missing = json!({"type": VIRTUAL_NETWORK_TYPE});
        assert_eq!(normalize(&missing).get(ADDRESS_SPACE), Some(&json!("")));
    }

    #[test]
    fn test_display_tags_object() {
        let value = json!({"cost": 42, "env": "prod"});
        assert_eq!(display_value(&value), "cost: 42, env: prod");
        assert_eq!(display_value(&json!({})), "");
    }

    #[test]
    fn test_tags_keep_record_key_order() {
        let record: Value =
            serde_json::from_str(r#"{"name": "vm1", "tags": {"zeta": "1", "alpha": "2"}}"#).unwrap();
        assert_eq!(normalize(&record).display(TAGS), "zeta: 1, alpha: 2");
    }

    #[test]
    fn test_display_missing_key_is_sentinel() {
        let attrs = NormalizedAttributes::new();
        assert_eq!(attrs.display("Size"), SENTINEL);
        assert!(!attrs.has_value("Size"));
    }
}
