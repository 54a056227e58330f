/// Spreadsheet output
///
/// `SheetWriter` is the seam the assembler writes through. The xlsx
/// implementation writes every cell as text and turns style tags into
/// font colors.
use crate::types::{FormattedRow, StyleTag};
use log::debug;
use rust_xlsxwriter::{Color, Format, Workbook};
use std::path::Path;

/// Capability: write ordered rows with optional cell styles to a file
pub trait SheetWriter {
    fn write_rows(&self, path: &Path, rows: &[FormattedRow]) -> Result<(), String>;
}

/// Writes a single-sheet .xlsx workbook
#[derive(Debug, Default)]
pub struct XlsxSheetWriter;

fn style_format(tag: StyleTag) -> Format {
    let color = match tag {
        StyleTag::Positive => Color::Green,
        StyleTag::Negative => Color::Red,
        StyleTag::Neutral => Color::Black,
    };
    Format::new().set_font_color(color)
}

impl SheetWriter for XlsxSheetWriter {
    fn write_rows(&self, path: &Path, rows: &[FormattedRow]) -> Result<(), String> {
        let positive = style_format(StyleTag::Positive);
        let negative = style_format(StyleTag::Negative);
        let neutral = style_format(StyleTag::Neutral);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (r, row) in rows.iter().enumerate() {
            let r = u32::try_from(r).map_err(|_| format!("row index {} exceeds sheet limits", r))?;
            for (c, cell) in row.iter().enumerate() {
                let c = u16::try_from(c).map_err(|_| format!("column index {} exceeds sheet limits", c))?;
                let written = match cell.style {
                    Some(StyleTag::Positive) => worksheet.write_string_with_format(r, c, &cell.text, &positive),
                    Some(StyleTag::Negative) => worksheet.write_string_with_format(r, c, &cell.text, &negative),
                    Some(StyleTag::Neutral) => worksheet.write_string_with_format(r, c, &cell.text, &neutral),
                    None => worksheet.write_string(r, c, &cell.text),
                };
                written.map_err(|e| format!("cell ({}, {}): {}", r, c, e))?;
            }
        }

        debug!("saving workbook with {} rows to {:?}", rows.len(), path);
        workbook.save(path).map_err(|e| e.to_string())
    }
}
