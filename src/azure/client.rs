//! ARM Client
//!
//! Main client for Azure Resource Manager, combining authentication
//! and HTTP functionality.

use super::auth::{AzureCredentials, TokenSource};
use super::http::ArmHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use url::Url;

/// Public cloud Resource Manager endpoint
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

pub const RESOURCES_API_VERSION: &str = "2021-04-01";
pub const NETWORK_API_VERSION: &str = "2023-09-01";
pub const SUBSCRIPTIONS_API_VERSION: &str = "2020-01-01";

/// Upper bound on followed `nextLink`s for a single listing
const MAX_PAGES: usize = 1000;

/// Main ARM client
#[derive(Clone)]
pub struct ArmClient {
    pub credentials: AzureCredentials,
    pub http: ArmHttpClient,
    pub endpoint: String,
}

impl ArmClient {
    /// Create a client authenticating from the environment
    pub fn new(endpoint: &str) -> Result<Self> {
        let http = ArmHttpClient::new()?;
        let credentials = AzureCredentials::from_env(http.clone());
        Self::with_credentials(endpoint, credentials, http)
    }

    /// Create a client with an explicit token source
    pub fn with_token_source(endpoint: &str, source: TokenSource) -> Result<Self> {
        let http = ArmHttpClient::new()?;
        let credentials = AzureCredentials::with_source(source, http.clone());
        Self::with_credentials(endpoint, credentials, http)
    }

    fn with_credentials(endpoint: &str, credentials: AzureCredentials, http: ArmHttpClient) -> Result<Self> {
        Url::parse(endpoint)
            .with_context(|| format!("Invalid Resource Manager endpoint: {}", endpoint))?;

        Ok(Self {
            credentials,
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to an ARM API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    /// GET a list endpoint and follow `nextLink` until exhausted
    pub async fn get_all(&self, url: &str) -> Result<Vec<Value>> {
        let mut all_items = Vec::new();
        let mut next: Option<String> = Some(url.to_string());
        let mut pages = 0;

        while let Some(page_url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                return Err(anyhow::anyhow!(
                    "Listing exceeded {} pages, giving up",
                    MAX_PAGES
                ));
            }

            let response = self
                .get(&page_url)
                .await
                .with_context(|| format!("Failed to list page {}", pages))?;

            if let Some(items) = response.get("value").and_then(|v| v.as_array()) {
                all_items.extend(items.iter().cloned());
            }

            next = response
                .get("nextLink")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());

            if let Some(link) = &next {
                if !self.same_origin(link) {
                    return Err(anyhow::anyhow!(
                        "Refusing to follow nextLink outside {}",
                        self.endpoint
                    ));
                }
            }
        }

        Ok(all_items)
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Whether `link` points at the configured endpoint (the token is only sent there)
    pub fn same_origin(&self, link: &str) -> bool {
        match (Url::parse(&self.endpoint), Url::parse(link)) {
            (Ok(base), Ok(link)) => base.origin() == link.origin(),
            _ => false,
        }
    }

    /// Build an ARM URL for a path with an api-version query
    pub fn arm_url(&self, path: &str, api_version: &str) -> String {
        format!(
            "{}/{}?api-version={}",
            self.endpoint,
            path.trim_start_matches('/'),
            api_version
        )
    }

    /// All resources in a subscription
    pub fn resources_url(&self, subscription_id: &str) -> String {
        self.arm_url(
            &format!("subscriptions/{}/resources", subscription_id),
            RESOURCES_API_VERSION,
        )
    }

    /// All virtual networks in a subscription
    pub fn virtual_networks_url(&self, subscription_id: &str) -> String {
        self.arm_url(
            &format!(
                "subscriptions/{}/providers/Microsoft.Network/virtualNetworks",
                subscription_id
            ),
            NETWORK_API_VERSION,
        )
    }

    /// Subscriptions visible to the caller
    pub fn subscriptions_url(&self) -> String {
        self.arm_url("subscriptions", SUBSCRIPTIONS_API_VERSION)
    }
}

/// Format an ARM API error for display
pub fn format_arm_error(error: &anyhow::Error) -> String {
    super::http::format_arm_error(error)
}
