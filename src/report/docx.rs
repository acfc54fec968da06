//! DOCX renderer
//!
//! Writes a minimal WordprocessingML package: content types, relationships,
//! a style sheet and the document body.

use super::ops::{Alignment, BorderStyle, Cell, DocOp, Paragraph, Rgb, Run, Table};
use super::DocumentRenderer;
use crate::error::RenderError;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Usable page width in twentieths of a point (Letter, 1" margins)
const TEXT_WIDTH_TWIPS: usize = 9360;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Renders operations into a `.docx` file
#[derive(Debug, Clone)]
pub struct DocxRenderer {
    /// Body font for the Normal style
    pub font: String,
    /// Body font size in points
    pub font_size: u8,
    pub font_color: Rgb,
}

impl Default for DocxRenderer {
    fn default() -> Self {
        Self {
            font: "Aptos".to_string(),
            font_size: 12,
            font_color: Rgb::BLACK,
        }
    }
}

impl DocumentRenderer for DocxRenderer {
    fn render_bytes(&self, ops: &[DocOp]) -> Result<Vec<u8>, RenderError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
            ("word/styles.xml", self.styles_xml()),
            ("word/document.xml", document_xml(ops)),
        ];

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    fn extension(&self) -> &'static str {
        "docx"
    }
}

impl DocxRenderer {
    fn styles_xml(&self) -> String {
        let half_points = u32::from(self.font_size) * 2;
        let font = escape_xml(&self.font);
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(r#"<w:styles xmlns:w="{}">"#, WORDML_NS));
        xml.push_str(&format!(
            r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:eastAsia="{f}" w:cs="{f}"/><w:color w:val="{c}"/><w:sz w:val="{s}"/><w:szCs w:val="{s}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#,
            f = font,
            c = self.font_color.hex(),
            s = half_points
        ));
        xml.push_str(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#);
        for (level, size) in [(1u8, 32u32), (2, 26), (3, 24)] {
            xml.push_str(&format!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{l}"><w:name w:val="heading {l}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="360" w:after="80"/><w:outlineLvl w:val="{o}"/></w:pPr><w:rPr><w:b/><w:color w:val="0F4761"/><w:sz w:val="{s}"/><w:szCs w:val="{s}"/></w:rPr></w:style>"#,
                l = level,
                o = level - 1,
                s = size
            ));
        }
        xml.push_str(r#"<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblCellMar><w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>"#);
        xml.push_str("</w:styles>");
        xml
    }
}

/// Escape text for XML character data and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters are not allowed in XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

fn document_xml(ops: &[DocOp]) -> String {
    let mut body = String::new();
    for op in ops {
        match op {
            DocOp::Heading { text, level } => {
                let level = (*level).clamp(1, 3);
                body.push_str(&format!(
                    r#"<w:p><w:pPr><w:pStyle w:val="Heading{}"/></w:pPr>{}</w:p>"#,
                    level,
                    run_xml(&Run::plain(text.clone()))
                ));
            }
            DocOp::Paragraph(p) => body.push_str(&paragraph_xml(p)),
            DocOp::VerticalSpace { lines } => {
                body.push_str("<w:p><w:r>");
                for _ in 0..*lines {
                    body.push_str("<w:br/>");
                }
                body.push_str("</w:r></w:p>");
            }
            DocOp::Table(table) => {
                if table.columns() == 0 {
                    tracing::debug!("Skipping table with no columns");
                    continue;
                }
                body.push_str(&table_xml(table));
            }
            DocOp::PageBreak => body.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#),
        }
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        WORDML_NS, body
    )
}

fn paragraph_xml(p: &Paragraph) -> String {
    let mut xml = String::from("<w:p>");
    if p.alignment == Alignment::Center {
        xml.push_str(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#);
    }
    for run in &p.runs {
        xml.push_str(&run_xml(run));
    }
    xml.push_str("</w:p>");
    xml
}

fn run_properties(bold: bool, color: Option<Rgb>, size: Option<u8>) -> String {
    if !bold && color.is_none() && size.is_none() {
        return String::new();
    }
    let mut xml = String::from("<w:rPr>");
    if bold {
        xml.push_str("<w:b/>");
    }
    if let Some(color) = color {
        xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.hex()));
    }
    if let Some(size) = size {
        let half_points = u32::from(size) * 2;
        xml.push_str(&format!(
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
            half_points
        ));
    }
    xml.push_str("</w:rPr>");
    xml
}

fn run_xml(run: &Run) -> String {
    styled_text_xml(&run.text, &run_properties(run.bold, run.color, run.size))
}

/// A run whose embedded newlines become line breaks
fn styled_text_xml(text: &str, rpr: &str) -> String {
    let mut xml = format!("<w:r>{}", rpr);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        if !line.is_empty() {
            xml.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape_xml(line)
            ));
        }
    }
    xml.push_str("</w:r>");
    xml
}

fn borders_xml(borders: &BorderStyle) -> String {
    let mut xml = String::from("<w:tblBorders>");
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        xml.push_str(&format!(
            r#"<w:{} w:val="single" w:sz="{}" w:space="0" w:color="auto"/>"#,
            edge, borders.size
        ));
    }
    xml.push_str("</w:tblBorders>");
    xml
}

fn cell_xml(cell: &Cell, width: usize) -> String {
    let mut xml = format!(r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/>"#, width);
    if let Some(fill) = cell.style.fill {
        xml.push_str(&format!(
            r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
            fill.hex()
        ));
    }
    xml.push_str("</w:tcPr><w:p>");
    let rpr = run_properties(cell.style.bold, cell.style.color, cell.style.size);
    xml.push_str(&styled_text_xml(&cell.text, &rpr));
    xml.push_str("</w:p></w:tc>");
    xml
}

fn table_xml(table: &Table) -> String {
    let columns = table.columns();
    let width = TEXT_WIDTH_TWIPS / columns;

    let mut xml = String::from(r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/>"#);
    if let Some(borders) = &table.borders {
        xml.push_str(&borders_xml(borders));
    }
    xml.push_str(r#"<w:tblLook w:val="04A0" w:firstRow="1" w:lastRow="0" w:firstColumn="1" w:lastColumn="0" w:noHBand="0" w:noVBand="1"/></w:tblPr><w:tblGrid>"#);
    for _ in 0..columns {
        xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, width));
    }
    xml.push_str("</w:tblGrid>");

    for row in std::iter::once(&table.header).chain(table.rows.iter()) {
        xml.push_str("<w:tr>");
        // Short rows are padded so every row matches the grid
        for i in 0..columns {
            match row.get(i) {
                Some(cell) => xml.push_str(&cell_xml(cell, width)),
                None => xml.push_str(&cell_xml(&Cell::plain(""), width)),
            }
        }
        xml.push_str("</w:tr>");
    }

    xml.push_str("</w:tbl>");
    xml
}
