//! Report assembly and rendering
//!
//! - [`ops`] - The document operation model
//! - [`builder`] - Turns sections and counters into operations
//! - [`docx`] - Word (`.docx`) renderer
//! - [`markdown`] - Markdown renderer

pub mod builder;
pub mod docx;
pub mod markdown;
pub mod ops;

use crate::error::RenderError;
use clap::ValueEnum;
use std::path::Path;

pub use builder::{build, ReportOptions, DEFAULT_TITLE, DEFAULT_TOC_PAGE_OFFSET};
pub use docx::DocxRenderer;
pub use markdown::MarkdownRenderer;
pub use ops::DocOp;

/// Turns an operation list into a persisted document
pub trait DocumentRenderer {
    /// Serialize the operations into file contents
    fn render_bytes(&self, ops: &[DocOp]) -> Result<Vec<u8>, RenderError>;

    /// Conventional file extension, without the dot
    fn extension(&self) -> &'static str;

    /// Write the document to `path`
    fn render(&self, ops: &[DocOp], path: &Path) -> Result<(), RenderError> {
        let bytes = self.render_bytes(ops)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Docx,
    Markdown,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to docx
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Docx,
        }
    }

    pub fn renderer(self) -> Box<dyn DocumentRenderer> {
        match self {
            Self::Docx => Box::new(DocxRenderer::default()),
            Self::Markdown => Box::new(MarkdownRenderer),
        }
    }
}
