//! Azure Subscriptions
//!
//! Functions for discovering the subscriptions the caller can read.

use super::client::ArmClient;
use anyhow::Result;
use serde_json::Value;

/// Subscription information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub subscription_id: String,
    pub display_name: String,
    pub state: String,
}

impl From<&Value> for Subscription {
    fn from(value: &Value) -> Self {
        let text = |key: &str, default: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or(default)
                .to_string()
        };
        Self {
            subscription_id: text("subscriptionId", "-"),
            display_name: text("displayName", "-"),
            state: text("state", "Unknown"),
        }
    }
}

/// Keep only enabled subscriptions
pub fn enabled_subscriptions(items: &[Value]) -> Vec<Subscription> {
    items
        .iter()
        .map(Subscription::from)
        .filter(|s| s.state == "Enabled")
        .collect()
}

/// List all enabled Azure subscriptions
pub async fn list_subscriptions(client: &ArmClient) -> Result<Vec<Subscription>> {
    let items = client.get_all(&client.subscriptions_url()).await?;
    Ok(enabled_subscriptions(&items))
}

/// Get subscription IDs as a simple list
pub async fn list_subscription_ids(client: &ArmClient) -> Result<Vec<String>> {
    let subscriptions = list_subscriptions(client).await?;
    Ok(subscriptions
        .into_iter()
        .map(|s| s.subscription_id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscription_from_value() {
        let sub = Subscription::from(&json!({
            "subscriptionId": "abc",
            "displayName": "Production",
            "state": "Enabled"
        }));
        assert_eq!(sub.subscription_id, "abc");
        assert_eq!(sub.display_name, "Production");
    }

    #[test]
    fn test_enabled_subscriptions_filters_state() {
        let items = vec![
            json!({"subscriptionId": "a", "state": "Enabled"}),
            json!({"subscriptionId": "b", "state": "Disabled"}),
            json!({"subscriptionId": "c"}),
        ];
        let subs = enabled_subscriptions(&items);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].subscription_id, "a");
    }
}
