//! Azure Authentication
//!
//! Acquires ARM access tokens from, in order: a pre-issued token in
//! `AZURE_ACCESS_TOKEN`, service principal client credentials, or the Azure CLI.

use super::http::ArmHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Token audience for Azure Resource Manager
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Resource argument used by the Azure CLI
const ARM_RESOURCE: &str = "https://management.azure.com/";

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Where tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A pre-issued bearer token
    Static(String),
    /// OAuth2 client credentials flow for a service principal
    ClientSecret {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// `az account get-access-token`
    AzureCli,
}

impl TokenSource {
    /// Pick a token source from the environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("AZURE_ACCESS_TOKEN") {
            return Self::Static(token);
        }

        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            get("AZURE_TENANT_ID"),
            get("AZURE_CLIENT_ID"),
            get("AZURE_CLIENT_SECRET"),
        ) {
            return Self::ClientSecret {
                authority_host: get("AZURE_AUTHORITY_HOST")
                    .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
                tenant_id,
                client_id,
                client_secret,
            };
        }

        Self::AzureCli
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Static(_) => "static token",
            Self::ClientSecret { .. } => "client credentials",
            Self::AzureCli => "azure cli",
        }
    }
}

/// Azure credentials holder with token caching
#[derive(Clone)]
pub struct AzureCredentials {
    source: Arc<TokenSource>,
    http: ArmHttpClient,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl AzureCredentials {
    /// Create credentials from the environment
    pub fn from_env(http: ArmHttpClient) -> Self {
        Self::with_source(TokenSource::from_env(), http)
    }

    pub fn with_source(source: TokenSource, http: ArmHttpClient) -> Self {
        tracing::info!("Using {} for Azure authentication", source.describe());
        Self {
            source: Arc::new(source),
            http,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let (token, ttl) = self.fetch_token().await?;
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    async fn fetch_token(&self) -> Result<(String, Duration)> {
        match self.source.as_ref() {
            TokenSource::Static(token) => Ok((token.clone(), DEFAULT_TOKEN_TTL)),
            TokenSource::ClientSecret {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
            } => {
                let url = format!(
                    "{}/{}/oauth2/v2.0/token",
                    authority_host.trim_end_matches('/'),
                    tenant_id
                );
                let response = self
                    .http
                    .post_form(
                        &url,
                        &[
                            ("grant_type", "client_credentials"),
                            ("client_id", client_id.as_str()),
                            ("client_secret", client_secret.as_str()),
                            ("scope", ARM_SCOPE),
                        ],
                    )
                    .await
                    .context("Failed to get access token with client credentials")?;
                parse_token_response(&response)
            }
            TokenSource::AzureCli => fetch_cli_token().await,
        }
    }
}

/// Parse an OAuth2 token endpoint response
fn parse_token_response(response: &Value) -> Result<(String, Duration)> {
    let token = response
        .get("access_token")
        .and_then(|v| v.as_str())
        .context("Token response has no access_token")?
        .to_string();

    // expires_in is a number, but some endpoints send it as a string
    let ttl = response
        .get("expires_in")
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_TTL);

    Ok((token, ttl))
}

async fn fetch_cli_token() -> Result<(String, Duration)> {
    let output = tokio::process::Command::new("az")
        .args([
            "account",
            "get-access-token",
            "--resource",
            ARM_RESOURCE,
            "--output",
            "json",
        ])
        .output()
        .await
        .context("Failed to run 'az'. Install the Azure CLI or set AZURE_ACCESS_TOKEN")?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "Azure CLI authentication failed. Run 'az login' ({})",
            output.status
        ));
    }

    let response: Value =
        serde_json::from_slice(&output.stdout).context("Failed to parse Azure CLI output")?;
    parse_cli_response(&response, chrono::Utc::now().timestamp())
}

/// Parse `az account get-access-token` output
fn parse_cli_response(response: &Value, now: i64) -> Result<(String, Duration)> {
    let token = response
        .get("accessToken")
        .and_then(|v| v.as_str())
        .context("Azure CLI output has no accessToken")?
        .to_string();

    let ttl = response
        .get("expires_on")
        .and_then(|v| v.as_i64())
        // Past expiry gives a zero TTL so the token is never cached as valid
        .map(|exp| Duration::from_secs(u64::try_from(exp - now).unwrap_or(0)))
        .unwrap_or(DEFAULT_TOKEN_TTL);

    Ok((token, ttl))
}

/// Validate an Azure subscription ID (GUID format)
pub fn validate_subscription_id(id: &str) -> bool {
    let parts: Vec<&str> = id.split('-').collect();
    let lengths: [usize; 5] = [8, 4, 4, 4, 12];
    parts.len() == lengths.len()
        && parts
            .iter()
            .zip(lengths)
            .all(|(p, len)| p.len() == len && p.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_static_token_wins() {
        let source = TokenSource::from_lookup(lookup_from(&[
            ("AZURE_ACCESS_TOKEN", "abc"),
            ("AZURE_TENANT_ID", "t"),
            ("AZURE_CLIENT_ID", "c"),
            ("AZURE_CLIENT_SECRET", "s"),
        ]));
        assert_eq!(source, TokenSource::Static("abc".to_string()));
    }

    #[test]
    fn test_client_secret_needs_all_three() {
        let source = TokenSource::from_lookup(lookup_from(&[
            ("AZURE_TENANT_ID", "t"),
            ("AZURE_CLIENT_ID", "c"),
        ]));
        assert_eq!(source, TokenSource::AzureCli);

        let source = TokenSource::from_lookup(lookup_from(&[
            ("AZURE_TENANT_ID", "t"),
            ("AZURE_CLIENT_ID", "c"),
            ("AZURE_CLIENT_SECRET", "s"),
        ]));
        assert!(matches!(source, TokenSource::ClientSecret { ref authority_host, .. }
            if authority_host == DEFAULT_AUTHORITY_HOST));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let source = TokenSource::from_lookup(lookup_from(&[("AZURE_ACCESS_TOKEN", "  ")]));
        assert_eq!(source, TokenSource::AzureCli);
    }

    #[test]
    fn test_parse_token_response() {
        let (token, ttl) =
            parse_token_response(&json!({"access_token": "tok", "expires_in": 3599})).unwrap();
        assert_eq!(token, "tok");
        assert_eq!(ttl, Duration::from_secs(3599));

        let (_, ttl) =
            parse_token_response(&json!({"access_token": "tok", "expires_in": "120"})).unwrap();
        assert_eq!(ttl, Duration::from_secs(120));

        assert!(parse_token_response(&json!({"error": "invalid_client"})).is_err());
    }

    #[test]
    fn test_parse_cli_response() {
        let response = json!({"accessToken": "cli-tok", "expires_on": 1_000_600});
        let (token, ttl) = parse_cli_response(&response, 1_000_000).unwrap();
        assert_eq!(token, "cli-tok");
        assert_eq!(ttl, Duration::from_secs(600));

        let (_, ttl) = parse_cli_response(&json!({"accessToken": "t"}), 1_000_000).unwrap();
        assert_eq!(ttl, DEFAULT_TOKEN_TTL);
    }

    #[test]
    fn test_parse_cli_response_expired_token_has_zero_ttl() {
        let response = json!({"accessToken": "cli-tok", "expires_on": 1_000_600});
        let (token, ttl) = parse_cli_response(&response, 2_000_000).unwrap();
        assert_eq!(token, "cli-tok");
        assert_eq!(ttl, Duration::ZERO);
    }

    #[test]
    fn test_validate_subscription_id() {
        assert!(validate_subscription_id("5514d116-97eb-4cfc-927f-b03826fcc9cc"));
        assert!(!validate_subscription_id("5514d116-97eb-4cfc-927f"));
        assert!(!validate_subscription_id("my-subscription"));
        assert!(!validate_subscription_id(""));
    }

    #[tokio::test]
    async fn test_static_token_is_cached() {
        let http = ArmHttpClient::new().unwrap();
        let creds = AzureCredentials::with_source(TokenSource::Static("abc".into()), http);
        assert_eq!(creds.get_token().await.unwrap(), "abc");
        assert_eq!(creds.get_token().await.unwrap(), "abc");
    }
}
