//! Markdown renderer, for reviewing and diffing reports as text

use super::ops::{DocOp, Paragraph, Table};
use super::DocumentRenderer;
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn render_bytes(&self, ops: &[DocOp]) -> Result<Vec<u8>, RenderError> {
        Ok(render_markdown(ops).into_bytes())
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

pub fn render_markdown(ops: &[DocOp]) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for op in ops {
        match op {
            DocOp::Heading { text, level } => {
                let hashes = "#".repeat(usize::from((*level).clamp(1, 6)));
                blocks.push(format!("{} {}", hashes, text));
            }
            DocOp::Paragraph(p) => {
                let text = paragraph_text(p);
                if !text.trim().is_empty() {
                    blocks.push(text);
                }
            }
            // Markdown collapses blank lines anyway
            DocOp::VerticalSpace { .. } => {}
            DocOp::Table(table) => {
                if table.columns() > 0 {
                    blocks.push(table_text(table));
                }
            }
            DocOp::PageBreak => blocks.push("---".to_string()),
        }
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn paragraph_text(p: &Paragraph) -> String {
    p.runs
        .iter()
        .map(|run| {
            let text = run.text.trim_end_matches('\n');
            if run.bold && !text.trim().is_empty() {
                format!("**{}**", text)
            } else {
                text.to_string()
            }
        })
        .collect()
}

fn cell_text(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn table_text(table: &Table) -> String {
    let columns = table.columns();
    let mut lines = Vec::with_capacity(table.rows.len() + 2);

    let header: Vec<String> = table.header.iter().map(|c| cell_text(&c.text)).collect();
    lines.push(format!("| {} |", header.join(" | ")));
    lines.push(format!("|{}", " --- |".repeat(columns)));

    for row in &table.rows {
        let cells: Vec<String> = (0..columns)
            .map(|i| row.get(i).map(|c| cell_text(&c.text)).unwrap_or_default())
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    lines.join("\n")
}
