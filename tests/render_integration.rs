//! End-to-end rendering tests
//!
//! Aggregates fixture records, builds the operation list and writes it to
//! disk with each renderer.

use azbuilt::report::docx::DocxRenderer;
use azbuilt::report::markdown::MarkdownRenderer;
use azbuilt::report::{self, DocumentRenderer, OutputFormat, ReportOptions};
use azbuilt::resource::{aggregate, Snapshot};
use azbuilt::pipeline::{self, RunRequest};
use serde_json::{json, Value};
use std::io::{Cursor, Read};

fn fixture() -> Vec<Value> {
    vec![
        json!({
            "type": "Microsoft.Compute/virtualMachines",
            "name": "vm-web-01",
            "resourceGroup": "rg-web",
            "location": "westeurope",
            "tags": {"env": "prod"},
            "id": "/subscriptions/s1/resourceGroups/rg-web/providers/Microsoft.Compute/virtualMachines/vm-web-01"
        }),
        json!({
            "type": "Microsoft.Storage/storageAccounts",
            "name": "stlogs",
            "resourceGroup": "rg-data",
            "location": "westeurope",
            "kind": "StorageV2",
            "sku": {"name": "Standard_LRS"},
            "id": "/subscriptions/s2/resourceGroups/rg-data/providers/Microsoft.Storage/storageAccounts/stlogs"
        }),
        // Nothing but a type: every column is pruned away
        json!({"type": "Microsoft.Web/sites"}),
    ]
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut content = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut content).unwrap();
    content
}

#[test]
fn test_docx_report_layout() {
    let (sections, counters) = aggregate(&fixture(), 2);
    let ops = report::build(&sections, &counters, &ReportOptions::default());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("asbuilt.docx");
    DocxRenderer::default().render(&ops, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let document = read_part(&bytes, "word/document.xml");

    assert!(document.contains("As-Built Document"));
    assert!(document.contains("Subscriptions: 2"));
    assert!(document.contains("Resource Groups: 3"));
    assert!(document.contains("1. Service: Azure Virtual Machines ................... Page 6"));
    assert!(document.contains("3. Service: Azure App Service ................... Page 8"));
    assert!(document.contains(r#"w:fill="87CEEB""#));
    assert!(document.contains(r#"w:sz="6""#));
    assert!(document.contains("env: prod"));
    // Two real tables; the all-empty App Service table is skipped
    assert_eq!(document.matches("<w:tbl>").count(), 2);
    assert!(document.contains("ID: N/A"));

    let styles = read_part(&bytes, "word/styles.xml");
    assert!(styles.contains("Aptos"));
}

#[test]
fn test_markdown_report_matches_sections() {
    let (sections, counters) = aggregate(&fixture(), 1);
    let ops = report::build(&sections, &counters, &ReportOptions::default());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("asbuilt.md");
    MarkdownRenderer.render(&ops, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let vm = text.find("Service: Azure Virtual Machines").unwrap();
    let storage = text.rfind("Service: Azure Storage Accounts").unwrap();
    assert!(vm < storage);
    // Kind and SKU are empty for the only VM
    assert!(text.contains("| Name | Resource Group | Location | Tags |\n| --- | --- | --- | --- |"));
    assert!(text.contains("| vm-web-01 | rg-web | westeurope | env: prod |"));
    assert!(text.contains("Standard_LRS"));
    assert!(!text.contains("Subscriptions:"));
    assert!(text.contains("within the specified subscription ID."));
}

#[test]
fn test_snapshot_rerender_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");
    let snapshot = Snapshot {
        subscriptions: vec!["s1".into(), "s2".into()],
        resources: fixture(),
        ..Snapshot::default()
    };
    snapshot.save(&snapshot_path).unwrap();

    let output = dir.path().join("from-snapshot.md");
    let mut request = RunRequest::new(vec![], &output);
    request.format = OutputFormat::Markdown;

    let first = pipeline::run_from_snapshot(Snapshot::load(&snapshot_path).unwrap(), &request).unwrap();
    let first_text = std::fs::read_to_string(&output).unwrap();
    let second = pipeline::run_from_snapshot(Snapshot::load(&snapshot_path).unwrap(), &request).unwrap();
    let second_text = std::fs::read_to_string(&output).unwrap();

    assert_eq!(first.sections, 3);
    assert_eq!(first.counters, second.counters);
    assert_eq!(first_text, second_text);
    assert!(first_text.contains("Subscriptions: 2"));
}
