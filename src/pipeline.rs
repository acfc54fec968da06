//! Report pipeline
//!
//! fetch -> aggregate -> build -> render. Fetch problems are logged per
//! subscription and never stop the run; a render failure does.

use crate::report::{self, OutputFormat, ReportOptions};
use crate::resource::fetcher::{self, Collected, FetchOutcome, NetworkDetailSource, ResourceSource};
use crate::resource::{aggregate, Counters, Snapshot};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Inputs for one report run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub subscription_ids: Vec<String>,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub options: ReportOptions,
    /// Also write the fetched data here
    pub save_snapshot: Option<PathBuf>,
}

impl RunRequest {
    pub fn new(subscription_ids: Vec<String>, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        Self {
            subscription_ids,
            format: OutputFormat::from_path(&output),
            output,
            options: ReportOptions::default(),
            save_snapshot: None,
        }
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub counters: Counters,
    pub sections: usize,
    pub outcomes: Vec<FetchOutcome>,
    pub output: PathBuf,
}

impl RunSummary {
    pub fn failed_subscriptions(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Fetch from live sources and write the report
pub async fn run<R, N>(resources: &R, networks: &N, request: &RunRequest) -> Result<RunSummary>
where
    R: ResourceSource + ?Sized,
    N: NetworkDetailSource + ?Sized,
{
    tracing::info!(
        "Starting the As-Built Document generation process for {} subscription(s)",
        request.subscription_ids.len()
    );

    let collected = fetcher::collect(resources, networks, &request.subscription_ids).await;

    if let Some(path) = &request.save_snapshot {
        Snapshot::from_collected(&request.subscription_ids, &collected).save(path)?;
    }

    generate(&request.subscription_ids, collected, request)
}

/// Write a report from a previously saved snapshot
pub fn run_from_snapshot(snapshot: Snapshot, request: &RunRequest) -> Result<RunSummary> {
    let (subscriptions, collected) = snapshot.into_collected();
    tracing::info!(
        "Rendering from snapshot with {} resources across {} subscription(s)",
        collected.records.len(),
        subscriptions.len()
    );
    generate(&subscriptions, collected, request)
}

fn generate(subscriptions: &[String], collected: Collected, request: &RunRequest) -> Result<RunSummary> {
    for outcome in &collected.outcomes {
        if outcome.is_success() {
            tracing::info!(
                "Subscription {}: {} resources, {} virtual networks",
                outcome.subscription_id,
                outcome.resources,
                outcome.virtual_networks
            );
        } else {
            tracing::warn!(
                "Subscription {} incomplete: {}",
                outcome.subscription_id,
                outcome.errors.join("; ")
            );
        }
    }

    // Network details are kept as context only
    tracing::debug!(
        "Collected {} virtual network detail records",
        collected.network_details.virtual_networks.len()
    );

    let (sections, counters) = aggregate(&collected.records, subscriptions.len());
    let ops = report::build(&sections, &counters, &request.options);

    request
        .format
        .renderer()
        .render(&ops, &request.output)
        .with_context(|| format!("Failed to save report to {}", request.output.display()))?;

    tracing::info!("Document saved as {}", request.output.display());

    Ok(RunSummary {
        counters,
        sections: sections.len(),
        outcomes: collected.outcomes,
        output: request.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, FetchStage};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Fixed(Vec<Value>);

    #[async_trait]
    impl ResourceSource for Fixed {
        async fn list_resources(&self, sub: &str) -> Result<Vec<Value>, FetchError> {
            if sub == "broken" {
                return Err(FetchError::new(sub, FetchStage::Resources, anyhow::anyhow!("API request failed: 500")));
            }
            Ok(self.0.clone())
        }
    }

    #[async_trait]
    impl NetworkDetailSource for Fixed {
        async fn list_virtual_networks(&self, _sub: &str) -> Result<Vec<Value>, FetchError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_run_writes_markdown_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.md");
        let source = Fixed(vec![json!({"type": "Microsoft.Web/sites", "name": "app1", "resourceGroup": "rg"})]);

        let request = RunRequest::new(vec!["good".into(), "broken".into()], &output);
        let summary = run(&source, &source, &request).await.unwrap();

        assert_eq!(summary.sections, 1);
        assert_eq!(summary.counters.subscriptions, 2);
        assert_eq!(summary.failed_subscriptions().count(), 1);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("# Service: Azure App Service"));
        assert!(text.contains("Subscriptions: 2"));
    }

    #[tokio::test]
    async fn test_render_failure_is_fatal() {
        let source = Fixed(vec![]);
        let request = RunRequest::new(vec!["good".into()], "/nonexistent-dir/asbuilt.docx");
        assert!(run(&source, &source, &request).await.is_err());
    }

    #[test]
    fn test_run_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("asbuilt.docx");
        let snapshot = Snapshot {
            subscriptions: vec!["s".into()],
            resources: vec![json!({"type": "Microsoft.Compute/disks", "name": "d1"})],
            ..Snapshot::default()
        };

        let summary = run_from_snapshot(snapshot, &RunRequest::new(vec![], &output)).unwrap();
        assert_eq!(summary.counters.disks, 1);
        assert_eq!(summary.counters.subscriptions, 1);
        assert!(output.exists());
    }
}
