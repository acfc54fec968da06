//! Configuration Management
//!
//! Handles persistent configuration storage for azbuilt.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "asbuilt.docx";
pub const DEFAULT_LOG_FILE: &str = "asbuiltlogs.txt";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Subscriptions to inventory when none are given on the command line
    #[serde(default)]
    pub subscription_ids: Vec<String>,
    /// Report output path
    #[serde(default)]
    pub output: Option<String>,
    /// Report title
    #[serde(default)]
    pub report_title: Option<String>,
    /// Table of contents page offset
    #[serde(default)]
    pub toc_page_offset: Option<usize>,
    /// Log file path
    #[serde(default)]
    pub log_file: Option<String>,
    /// Resource Manager endpoint (sovereign clouds)
    #[serde(default)]
    pub arm_endpoint: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("azbuilt").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Config saved to {:?}", path);
        Ok(())
    }

    /// Get effective subscriptions (CLI or `AZURE_SUBSCRIPTION_IDS` > config)
    ///
    /// An empty result means subscriptions should be discovered.
    pub fn effective_subscriptions(&self, cli: &[String]) -> Vec<String> {
        let from_cli = split_ids(cli.iter().map(String::as_str));
        if !from_cli.is_empty() {
            return from_cli;
        }

        split_ids(self.subscription_ids.iter().map(String::as_str))
    }

    /// Get effective output path (CLI > config > default)
    pub fn effective_output(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.output.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
    }

    /// Get effective log file (CLI > config > default)
    pub fn effective_log_file(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.log_file.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
    }

    /// Get effective ARM endpoint (CLI or `AZURE_RESOURCE_MANAGER_URL` > config > public cloud)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> String {
        cli.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.arm_endpoint.clone())
            .unwrap_or_else(|| crate::azure::client::DEFAULT_ARM_ENDPOINT.to_string())
    }

    /// Set subscriptions and save
    pub fn set_subscriptions(&mut self, ids: &[String]) -> Result<()> {
        self.subscription_ids = ids.to_vec();
        self.save()
    }
}

/// Split comma-separated IDs, trimming blanks and dropping duplicates
pub fn split_ids<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids: Vec<String> = Vec::new();
    for value in values {
        for id in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ids() {
        assert_eq!(
            split_ids(["a, b", "c", " ", "a"]),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(split_ids(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_cli_subscriptions_win() {
        let config = Config {
            subscription_ids: vec!["from-config".into()],
            ..Config::default()
        };
        assert_eq!(
            config.effective_subscriptions(&["x,y".to_string()]),
            vec!["x".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn test_config_subscriptions_when_cli_empty() {
        let config = Config {
            subscription_ids: vec!["from-config".into(), " ".into()],
            ..Config::default()
        };
        assert_eq!(config.effective_subscriptions(&[]), vec!["from-config".to_string()]);
        assert!(Config::default().effective_subscriptions(&["".to_string()]).is_empty());
    }

    #[test]
    fn test_effective_endpoint_precedence() {
        let config = Config {
            arm_endpoint: Some("https://management.usgovcloudapi.net".into()),
            ..Config::default()
        };
        assert_eq!(config.effective_endpoint(Some("https://example.test")), "https://example.test");
        assert_eq!(config.effective_endpoint(Some("  ")), "https://management.usgovcloudapi.net");
        assert_eq!(
            Config::default().effective_endpoint(None),
            crate::azure::client::DEFAULT_ARM_ENDPOINT
        );
    }

    #[test]
    fn test_effective_output_precedence() {
        let config = Config {
            output: Some("configured.docx".into()),
            ..Config::default()
        };
        assert_eq!(config.effective_output(Some("cli.docx")), "cli.docx");
        assert_eq!(config.effective_output(None), "configured.docx");
        assert_eq!(Config::default().effective_output(None), DEFAULT_OUTPUT);
        assert_eq!(Config::default().effective_log_file(None), DEFAULT_LOG_FILE);
    }

    #[test]
    fn test_config_roundtrip_with_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"subscription_ids": ["a"]}"#).unwrap();
        assert_eq!(config.subscription_ids, vec!["a".to_string()]);
        assert!(config.output.is_none());
    }
}
