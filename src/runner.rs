/// Job orchestration
///
/// One run is a straight pipeline:
/// session -> locate -> extract -> map columns -> format -> assemble ->
/// write -> notify. The page session is released as soon as extraction is
/// done, and always released on failure.
use crate::assemble::{assemble, write_artifact};
use crate::columns::ColumnMap;
use crate::config::JobConfig;
use crate::error::RunError;
use crate::extract::extract_table;
use crate::format::format_rows;
use crate::notify::{compose_notification, Notifier};
use crate::session::{wait_until, PageSession, SessionGuard, StepOutcome};
use crate::sheet::SheetWriter;
use crate::table::{locate_table, parse_selector};
use crate::types::{ExtractedTable, RunSummary};
use log::{debug, info, warn};

/// Pipeline stages reported to the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Extracting,
    Writing,
    Notifying,
}

impl Stage {
    pub fn describe(&self) -> &'static str {
        match self {
            Stage::Loading => "loading page",
            Stage::Extracting => "extracting table",
            Stage::Writing => "writing spreadsheet",
            Stage::Notifying => "sending email",
        }
    }
}

/// Run the whole job once.
///
/// `notifier` is required unless the config is a dry run. `on_stage` is
/// invoked as each stage starts.
pub fn run_job<S, F>(
    config: &JobConfig,
    session: S,
    writer: &dyn SheetWriter,
    notifier: Option<&dyn Notifier>,
    mut on_stage: F,
) -> Result<RunSummary, RunError>
where
    S: PageSession,
    F: FnMut(Stage),
{
    let extracted = {
        let mut guard = SessionGuard::new(session);
        if !config.dry_run && notifier.is_none() {
            return Err(RunError::Config("no notifier configured and not a dry run".to_string()));
        }

        on_stage(Stage::Loading);
        load_page(config, &mut *guard)?;

        on_stage(Stage::Extracting);
        let document = guard.document()?;
        let table = locate_table(document, &config.page.table_selector)?;
        extract_table(&table, &config.page.suspension_marker)?
    };

    let ExtractedTable { headers, rows, suspensions, dropped } = extracted;
    let map = ColumnMap::from_headers(&headers)?;
    let formatted = format_rows(&rows, &map);
    let dataset = assemble(&headers, &map, formatted, suspensions, config.as_of);

    on_stage(Stage::Writing);
    let artifact = write_artifact(&dataset, &config.output_dir, &config.naming, writer)?;

    let notified = match notifier {
        Some(notifier) if !config.dry_run => {
            on_stage(Stage::Notifying);
            let notification =
                compose_notification(&config.subject_label, config.as_of, &dataset.suspensions, &artifact);
            notifier.send(&notification).map_err(RunError::Notify)?;
            info!("sent '{}'", notification.subject);
            true
        }
        _ => {
            info!("dry run: not sending email");
            false
        }
    };

    Ok(RunSummary {
        as_of: config.as_of,
        artifact,
        quotes: dataset.quotes.len(),
        suspensions: dataset.suspensions,
        dropped_rows: dropped,
        notified,
    })
}

/// Navigate, wait for the table and try the optional page interactions
fn load_page<S: PageSession + ?Sized>(config: &JobConfig, session: &mut S) -> Result<(), RunError> {
    let page = &config.page;
    let table = parse_selector(&page.table_selector)?;
    let table_present = |doc: &scraper::Html| doc.select(&table).next().is_some();

    session.navigate(&page.url)?;
    if session.is_static() {
        debug!("static document, not waiting for the table");
    } else {
        wait_until(session, "securities table", page.ready_timeout, page.poll_interval, table_present)?;
    }

    log_step("cookie consent", &session.dismiss_cookies(&page.cookie_selector));

    let expanded = session.expand_all(&page.expand_link_text);
    log_step("expand all rows", &expanded);
    if expanded == StepOutcome::Performed && !session.is_static() {
        wait_until(session, "expanded table", page.ready_timeout, page.poll_interval, table_present)?;
    }

    Ok(())
}

fn log_step(step: &str, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Performed => info!("{}: done", step),
        StepOutcome::NotApplicable(reason) => debug!("{}: skipped ({})", step, reason),
        StepOutcome::Failed(reason) => warn!("{}: failed, continuing ({})", step, reason),
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
