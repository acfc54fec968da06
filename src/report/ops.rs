//! Document operations
//!
//! The report builder emits a flat list of these; renderers turn them into a
//! concrete file format.

use serde::Serialize;

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    /// Light sky blue used for table header fills
    pub const SKY_BLUE: Rgb = Rgb(0x87, 0xCE, 0xEB);

    /// Uppercase hex without a leading `#`
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// A piece of text with its character styling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub color: Option<Rgb>,
    /// Font size in points
    pub size: Option<u8>,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub alignment: Alignment,
}

impl Paragraph {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::plain(text)],
            alignment: Alignment::Left,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_run(run: Run) -> Self {
        Self {
            runs: vec![run],
            alignment: Alignment::Left,
        }
    }

    pub fn centered(mut self) -> Self {
        self.alignment = Alignment::Center;
        self
    }

    /// Concatenated text of all runs
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Cell styling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellStyle {
    pub bold: bool,
    pub color: Option<Rgb>,
    pub size: Option<u8>,
    pub fill: Option<Rgb>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: CellStyle::default(),
        }
    }
}

/// Table border line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BorderStyle {
    /// Width in eighths of a point
    pub size: u8,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self { size: 6 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub header: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
    pub borders: Option<BorderStyle>,
}

impl Table {
    pub fn columns(&self) -> usize {
        self.header.len()
    }
}

/// One document construction step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DocOp {
    Heading { text: String, level: u8 },
    Paragraph(Paragraph),
    /// Blank lines between blocks
    VerticalSpace { lines: u8 },
    Table(Table),
    PageBreak,
}
