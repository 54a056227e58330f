/// Report assembly
///
/// Drops the date/time columns, names the artifact after the run date and
/// hands the headerless formatted rows to the sheet writer.
use crate::columns::{ColumnMap, ColumnRole};
use crate::error::RunError;
use crate::sheet::SheetWriter;
use crate::types::{FormattedRow, ReportDataset, SuspensionNotice};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Calendar format used in file names and subjects
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Where the date goes in the artifact name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `DD-MM-YYYY_suffix.ext`
    DateFirst,
    /// `suffix_DD-MM-YYYY.ext`
    DateLast,
}

/// Artifact naming scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    pub order: DateOrder,
    pub suffix: String,
    pub extension: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self { order: DateOrder::DateFirst, suffix: "mercado_continuo".to_string(), extension: "xlsx".to_string() }
    }
}

/// Artifact file name for a run date (no time component)
pub fn artifact_file_name(naming: &FileNaming, date: NaiveDate) -> String {
    let stamp = date.format(DATE_FORMAT);
    let ext = naming.extension.trim_start_matches('.');
    match naming.order {
        DateOrder::DateFirst => format!("{}_{}.{}", stamp, naming.suffix, ext),
        DateOrder::DateLast => format!("{}_{}.{}", naming.suffix, stamp, ext),
    }
}

/// Indices of the date and time columns, only when both are present
pub fn date_time_columns(map: &ColumnMap) -> Vec<usize> {
    match (map.position(ColumnRole::Date), map.position(ColumnRole::Time)) {
        (Some(date), Some(time)) => vec![date, time],
        _ => Vec::new(),
    }
}

fn without_columns<T: Clone>(items: &[T], dropped: &[usize]) -> Vec<T> {
    items.iter().enumerate().filter(|(idx, _)| !dropped.contains(idx)).map(|(_, item)| item.clone()).collect()
}

/// Build the final dataset for the run
pub fn assemble(
    headers: &[String],
    map: &ColumnMap,
    rows: Vec<FormattedRow>,
    suspensions: Vec<SuspensionNotice>,
    as_of: NaiveDate,
) -> ReportDataset {
    let dropped = date_time_columns(map);
    if !dropped.is_empty() {
        debug!("dropping date/time columns at {:?}", dropped);
    }

    let quotes =
        if dropped.is_empty() { rows } else { rows.iter().map(|row| without_columns(row, &dropped)).collect() };

    ReportDataset { headers: without_columns(headers, &dropped), quotes, suspensions, as_of }
}

/// Write the dataset to `<output_dir>/<artifact name>`.
///
/// The header row is intentionally not written.
pub fn write_artifact(
    dataset: &ReportDataset,
    output_dir: &Path,
    naming: &FileNaming,
    writer: &dyn SheetWriter,
) -> Result<PathBuf, RunError> {
    let path = output_dir.join(artifact_file_name(naming, dataset.as_of));
    debug!("artifact columns (header row omitted): {}", dataset.headers.join(" | "));

    fs::create_dir_all(output_dir).map_err(|e| RunError::Artifact {
        path: path.clone(),
        reason: format!("cannot create output dir: {}", e),
    })?;

    writer
        .write_rows(&path, &dataset.quotes)
        .map_err(|reason| RunError::Artifact { path: path.clone(), reason })?;

    info!("wrote {} rows to {}", dataset.quotes.len(), path.display());
    Ok(path)
}
