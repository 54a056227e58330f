/// Table extraction
///
/// Walks the body rows of a located table, classifies each one and splits
/// the result into tradable rows and suspension notices. Column semantics
/// are not interpreted here.
use crate::classify::{classify, RowClass};
use crate::error::RunError;
use crate::table::TableSource;
use crate::types::ExtractedTable;
use log::{debug, info};

/// Extract headers, tradable rows and suspensions from a table.
///
/// A table without header cells is a structural failure. Individual rows
/// that cannot be read or do not match a known shape are dropped.
pub fn extract_table(source: &dyn TableSource, marker: &str) -> Result<ExtractedTable, RunError> {
    let headers = source.header_cells();
    if headers.is_empty() {
        return Err(RunError::HeaderMismatch("table has no header cells".to_string()));
    }
    debug!("table headers: {:?}", headers);

    let mut extracted = ExtractedTable { headers, ..Default::default() };
    let width = extracted.headers.len();

    for (idx, read) in source.body_rows().into_iter().enumerate() {
        let row = match read {
            Ok(row) => row,
            Err(reason) => {
                debug!("row {}: read failed, dropping ({})", idx, reason);
                extracted.dropped += 1;
                continue;
            }
        };

        match classify(row, width, marker) {
            RowClass::Tradable(row) => extracted.rows.push(row),
            RowClass::Suspended(notice) => {
                debug!("row {}: suspended {}", idx, notice);
                extracted.suspensions.push(notice);
            }
            RowClass::Drop(reason) => {
                debug!("row {}: dropped ({})", idx, reason);
                extracted.dropped += 1;
            }
        }
    }

    info!(
        "extracted {} tradable rows, {} suspended, {} dropped",
        extracted.rows.len(),
        extracted.suspensions.len(),
        extracted.dropped
    );

    Ok(extracted)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
