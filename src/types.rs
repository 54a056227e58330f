/// Core data structures for the market snapshot pipeline
///
/// This module defines the values passed between pipeline stages:
/// raw rows as read from the page, suspension notices, parsed quotes,
/// formatted cells and the assembled report dataset.
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// A single table cell as rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    /// Visible text, whitespace collapsed
    pub text: String,
    /// Number of logical columns the cell spans (1 when absent)
    pub colspan: u32,
}

impl RawCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), colspan: 1 }
    }

    pub fn spanning(text: impl Into<String>, colspan: u32) -> Self {
        Self { text: text.into(), colspan }
    }
}

/// One body row of the source table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells }
    }

    /// Cell texts in column order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.text.as_str())
    }
}

/// A security that was listed but halted from trading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuspensionNotice {
    pub security_name: String,
    pub detail: String,
}

impl SuspensionNotice {
    pub fn new(security_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { security_name: security_name.into(), detail: detail.into() }
    }
}

impl std::fmt::Display for SuspensionNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.security_name, self.detail)
    }
}

/// Output of the table walk: tradable rows plus everything redirected away
#[derive(Debug, Clone, Default)]
pub struct ExtractedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub suspensions: Vec<SuspensionNotice>,
    /// Rows skipped because they matched neither shape or could not be read
    pub dropped: usize,
}

/// Parsed value of one quote column
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteValue {
    /// Opaque column, carried through as rendered
    Text(String),
    /// Numeric column; None is the missing sentinel
    Number(Option<f64>),
}

/// One tradable security, one value per header column
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityQuote {
    pub name: String,
    pub values: Vec<QuoteValue>,
}

/// Advisory styling for the percent-change cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    Positive,
    Negative,
    Neutral,
}

/// Display text for a single cell plus optional style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCell {
    pub text: String,
    pub style: Option<StyleTag>,
}

impl FormattedCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), style: None }
    }

    pub fn styled(text: impl Into<String>, style: StyleTag) -> Self {
        Self { text: text.into(), style: Some(style) }
    }
}

pub type FormattedRow = Vec<FormattedCell>;

/// The assembled snapshot for one run
#[derive(Debug, Clone)]
pub struct ReportDataset {
    /// Column names after date/time removal (not written to the artifact)
    pub headers: Vec<String>,
    pub quotes: Vec<FormattedRow>,
    pub suspensions: Vec<SuspensionNotice>,
    pub as_of: NaiveDate,
}

/// What a completed run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub as_of: NaiveDate,
    pub artifact: PathBuf,
    pub quotes: usize,
    pub suspensions: Vec<SuspensionNotice>,
    pub dropped_rows: usize,
    pub notified: bool,
}
