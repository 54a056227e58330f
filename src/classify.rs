/// Row classification
///
/// Suspended securities are rendered as a short row whose second cell spans
/// two columns and carries the suspension text. Those rows must be caught
/// before anything reads columns positionally, since they lack the full
/// column count of a normal row.
use crate::types::{RawRow, SuspensionNotice};

/// Text that marks a spanning cell as a suspension notice
pub const DEFAULT_SUSPENSION_MARKER: &str = "Suspendido";

/// Colspan used by the page for suspension cells
const SUSPENSION_COLSPAN: u32 = 2;

/// Classification outcome for a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowClass {
    Tradable(RawRow),
    Suspended(SuspensionNotice),
    Drop(String),
}

/// Classify one body row.
///
/// `expected_columns` is the header width; only rows with exactly that many
/// cells are tradable.
pub fn classify(row: RawRow, expected_columns: usize, marker: &str) -> RowClass {
    if is_suspended(&row, marker) {
        // Both ends exist: is_suspended found at least one cell
        let name = row.cells.first().map(|c| c.text.clone()).unwrap_or_default();
        let detail = row.cells.last().map(|c| c.text.clone()).unwrap_or_default();
        return RowClass::Suspended(SuspensionNotice::new(name, detail));
    }

    if row.cells.is_empty() {
        return RowClass::Drop("row has no cells".to_string());
    }

    if row.cells.len() != expected_columns {
        return RowClass::Drop(format!("expected {} cells, found {}", expected_columns, row.cells.len()));
    }

    RowClass::Tradable(row)
}

fn is_suspended(row: &RawRow, marker: &str) -> bool {
    row.cells.iter().any(|cell| cell.colspan == SUSPENSION_COLSPAN && cell.text.contains(marker))
}
