/// Table access over a parsed HTML document
///
/// The extractor only needs header texts and per-row cell reads, so the
/// DOM is hidden behind `TableSource`. `HtmlTable` is the scraper-backed
/// implementation used in production.
use crate::error::RunError;
use crate::types::{RawCell, RawRow};
use lazy_static::lazy_static;
use log::debug;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    static ref ROW: Selector = Selector::parse("tr").expect("static selector");
    static ref HEADER_CELL: Selector = Selector::parse("th").expect("static selector");
    static ref DATA_CELL: Selector = Selector::parse("td").expect("static selector");
}

/// Positional view of a rendered table
pub trait TableSource {
    /// Header labels in column order
    fn header_cells(&self) -> Vec<String>;

    /// Body rows in document order; a failed read carries the reason
    fn body_rows(&self) -> Vec<Result<RawRow, String>>;
}

/// Parse a CSS selector taken from configuration
pub fn parse_selector(selector: &str) -> Result<Selector, RunError> {
    Selector::parse(selector).map_err(|e| RunError::Config(format!("invalid selector `{}`: {}", selector, e)))
}

/// Locate the table container in the document.
///
/// A missing table is fatal for the run.
pub fn locate_table<'a>(document: &'a Html, selector: &str) -> Result<HtmlTable<'a>, RunError> {
    let parsed = parse_selector(selector)?;
    let root = document.select(&parsed).next().ok_or_else(|| RunError::TableNotFound(selector.to_string()))?;
    debug!("located table container <{}> via `{}`", root.value().name(), selector);
    Ok(HtmlTable { root })
}

/// A table (or a wrapper around one) inside a parsed document
pub struct HtmlTable<'a> {
    root: ElementRef<'a>,
}

impl<'a> HtmlTable<'a> {
    fn rows(&self) -> Vec<ElementRef<'a>> {
        self.root.select(&ROW).collect()
    }

    /// Index of the first row holding header cells
    fn header_index(rows: &[ElementRef<'a>]) -> Option<usize> {
        rows.iter().position(|row| row.select(&HEADER_CELL).next().is_some())
    }
}

impl TableSource for HtmlTable<'_> {
    fn header_cells(&self) -> Vec<String> {
        let rows = self.rows();
        match Self::header_index(&rows) {
            Some(idx) => rows[idx].select(&HEADER_CELL).map(cell_text).collect(),
            None => Vec::new(),
        }
    }

    fn body_rows(&self) -> Vec<Result<RawRow, String>> {
        let rows = self.rows();
        // Without a header row the first row is still treated as the header
        let skip = Self::header_index(&rows).map(|idx| idx + 1).unwrap_or(1);
        rows.into_iter().skip(skip).map(read_row).collect()
    }
}

fn read_row(row: ElementRef<'_>) -> Result<RawRow, String> {
    let cells = row.select(&DATA_CELL).map(read_cell).collect::<Result<Vec<_>, _>>()?;
    Ok(RawRow::new(cells))
}

fn read_cell(cell: ElementRef<'_>) -> Result<RawCell, String> {
    match cell.value().attr("colspan") {
        Some(raw) => {
            let colspan = raw.trim().parse::<u32>().map_err(|_| format!("unreadable colspan {:?}", raw))?;
            Ok(RawCell::spanning(cell_text(cell), colspan))
        }
        None => Ok(RawCell::new(cell_text(cell))),
    }
}

/// Visible text with runs of whitespace (including nbsp) collapsed
fn cell_text(cell: ElementRef<'_>) -> String {
    let raw: String = cell.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
