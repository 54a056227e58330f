/// Run summary output
///
/// Console lines go through `ui`; the JSON export is the machine-readable
/// record of a run.
use crate::assemble::DATE_FORMAT;
use crate::types::RunSummary;
use crate::ui;
use serde_json::json;
use std::fs::File;
use std::path::Path;

/// Build the JSON document for a run
pub fn summary_json(summary: &RunSummary) -> serde_json::Value {
    json!({
        "tool": env!("CARGO_PKG_NAME"),
        "tool_version": env!("CARGO_PKG_VERSION"),
        "as_of": summary.as_of.format(DATE_FORMAT).to_string(),
        "artifact": summary.artifact.display().to_string(),
        "quotes": summary.quotes,
        "dropped_rows": summary.dropped_rows,
        "notified": summary.notified,
        "suspensions": summary.suspensions,
    })
}

/// Export the run summary as pretty-printed JSON
pub fn export_json_summary(summary: &RunSummary, output_path: &Path) -> std::io::Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, &summary_json(summary))?;
    Ok(())
}

/// Print the end-of-run summary
pub fn print_summary(summary: &RunSummary) {
    ui::status(&format!("wrote {} securities to {}", summary.quotes, summary.artifact.display()));
    if summary.dropped_rows > 0 {
        ui::status(&format!("skipped {} unreadable rows", summary.dropped_rows));
    }

    if summary.suspensions.is_empty() {
        ui::status("no suspended securities");
    } else {
        ui::status(&format!("{} suspended:", summary.suspensions.len()));
        for notice in &summary.suspensions {
            println!("  {}", notice);
        }
    }

    if summary.notified {
        ui::status("email sent");
    } else {
        ui::status("dry run, email not sent");
    }
}
