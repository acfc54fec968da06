//! Report Builder
//!
//! Lays out the as-built report as a sequence of [`DocOp`]s: title block,
//! summary, totals, table of contents, then one block per service section.

use super::ops::{BorderStyle, Cell, CellStyle, DocOp, Paragraph, Rgb, Run, Table};
use crate::resource::catalog::headers_for;
use crate::resource::normalize::ID;
use crate::resource::{prune, Counters, Section};
use chrono::{DateTime, Utc};

pub const DEFAULT_TITLE: &str = "As-Built Document";

/// Pages assumed to precede the first section (title, summary, counts, TOC)
pub const DEFAULT_TOC_PAGE_OFFSET: usize = 5;

/// Point size of header cell text
const HEADER_FONT_SIZE: u8 = 12;

/// Blank lines after the title
const TITLE_SPACING_LINES: u8 = 5;

/// Layout options for a report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub title: String,
    pub toc_page_offset: usize,
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            toc_page_offset: DEFAULT_TOC_PAGE_OFFSET,
            generated_at: None,
        }
    }
}

fn summary_text(multi_subscription: bool) -> String {
    let scope = if multi_subscription {
        "subscription IDs"
    } else {
        "subscription ID"
    };
    format!(
        "This As-Built Document provides a comprehensive overview of the current state of Azure resources \
         within the specified {}. It includes detailed information about various services, \
         such as Virtual Machines, Storage Accounts, Virtual Networks, and more. Each section contains \
         a description of the service, a table of key resource attributes, and unique resource IDs.",
        scope
    )
}

fn heading(text: impl Into<String>) -> DocOp {
    DocOp::Heading {
        text: text.into(),
        level: 1,
    }
}

fn header_cell(text: &str) -> Cell {
    Cell {
        text: text.to_string(),
        style: CellStyle {
            bold: true,
            color: Some(Rgb::WHITE),
            size: Some(HEADER_FONT_SIZE),
            fill: Some(Rgb::SKY_BLUE),
        },
    }
}

/// Build the full operation list for a report
pub fn build(sections: &[Section], counters: &Counters, options: &ReportOptions) -> Vec<DocOp> {
    let mut ops = Vec::new();

    // Title block
    ops.push(DocOp::Paragraph(
        Paragraph::with_run(Run::bold(options.title.clone())).centered(),
    ));
    if let Some(generated_at) = options.generated_at {
        ops.push(DocOp::Paragraph(
            Paragraph::text(format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M UTC")))
                .centered(),
        ));
    }
    ops.push(DocOp::VerticalSpace {
        lines: TITLE_SPACING_LINES,
    });

    ops.push(heading("Summary"));
    ops.push(DocOp::Paragraph(Paragraph::text(summary_text(
        counters.is_multi_subscription(),
    ))));

    ops.push(heading("Total Counts"));
    ops.extend(count_lines(counters).into_iter().map(|line| DocOp::Paragraph(Paragraph::text(line))));

    ops.push(heading("Table of Contents"));
    ops.extend(
        toc_lines(sections, options.toc_page_offset)
            .into_iter()
            .map(|line| DocOp::Paragraph(Paragraph::text(line))),
    );

    ops.push(DocOp::PageBreak);

    for section in sections {
        build_section(&mut ops, section);
    }

    ops
}

/// Total count lines; subscriptions only appear for multi-subscription reports
pub fn count_lines(counters: &Counters) -> Vec<String> {
    let mut lines = Vec::with_capacity(6);
    if counters.is_multi_subscription() {
        lines.push(format!("Subscriptions: {}", counters.subscriptions));
    }
    lines.push(format!("Resource Groups: {}", counters.resource_groups));
    lines.push(format!("Virtual Machines: {}", counters.virtual_machines));
    lines.push(format!("Disks: {}", counters.disks));
    lines.push(format!("Storage Accounts: {}", counters.storage_accounts));
    lines.push(format!("Virtual Networks: {}", counters.vnets));
    lines
}

/// Table of contents lines with fixed page numbers
pub fn toc_lines(sections: &[Section], page_offset: usize) -> Vec<String> {
    sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let index = i + 1;
            format!(
                "{}. {} ................... Page {}",
                index,
                section.title,
                index + page_offset
            )
        })
        .collect()
}

fn build_section(ops: &mut Vec<DocOp>, section: &Section) {
    ops.push(heading(section.title.clone()));
    ops.push(DocOp::Paragraph(Paragraph::text(section.description.clone())));

    let headers = headers_for(section.service_name());
    let (headers, content) = prune(&headers, &section.content);

    let table = Table {
        header: headers.iter().map(|h| header_cell(h)).collect(),
        rows: content
            .iter()
            .map(|item| headers.iter().map(|h| Cell::plain(item.display(h))).collect())
            .collect(),
        borders: Some(BorderStyle::default()),
    };
    ops.push(DocOp::Table(table));

    // IDs come from the unpruned content
    for item in &section.content {
        let resource_id = item.display(ID);
        tracing::info!("Resource ID: {}", resource_id);
        ops.push(DocOp::Paragraph(Paragraph::with_run(Run::bold(format!(
            "ID: {}",
            resource_id
        )))));
    }

    ops.push(DocOp::Paragraph(Paragraph::empty()));
}
