/// Tests for runner module
#[cfg(test)]
mod tests {
    use crate::cli::CliArgs;
    use crate::config::{resolve, FileConfig, JobConfig};
    use crate::error::RunError;
    use crate::notify::{Notification, Notifier, NO_SUSPENSIONS};
    use crate::runner::{run_job, Stage};
    use crate::session::{PageSession, StepOutcome};
    use crate::sheet::SheetWriter;
    use crate::types::{FormattedRow, StyleTag};
    use chrono::NaiveDate;
    use scraper::Html;
    use std::cell::{Cell, RefCell};
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use std::time::Duration;

    const PAGE: &str = r#"
    <html><body>
      <div class="table-responsive"><table>
        <thead><tr>
          <th>Nombre</th><th>Último</th><th>% Dif.</th><th>Máximo</th><th>Mínimo</th>
          <th>Volumen</th><th>Efectivo (miles €)</th><th>Fecha</th><th>Hora</th>
        </tr></thead>
        <tbody>
          <tr><td>ACME S.A.</td><td>12,3400</td><td>-1,25%</td><td>12,5000</td><td>12,0000</td>
              <td>1.234,50</td><td>1.000,00</td><td>18/10/2026</td><td>17:35</td></tr>
          <tr><td>BETA</td><td colspan="2">Suspendido (Motivo X)</td></tr>
          <tr><td>GAMMA</td><td>3,1000</td><td>0,75%</td><td>3,2000</td><td>3,0000</td>
              <td>500</td><td>-</td><td>18/10/2026</td><td>17:35</td></tr>
        </tbody>
      </table></div>
    </body></html>
    "#;

    /// Serves one fixed document and records whether it was closed
    struct FakeSession {
        html: &'static str,
        document: Option<Html>,
        expand: StepOutcome,
        static_page: bool,
        closed: Rc<Cell<bool>>,
    }

    impl FakeSession {
        fn new(html: &'static str) -> Self {
            Self {
                html,
                document: None,
                expand: StepOutcome::NotApplicable("no link".to_string()),
                static_page: false,
                closed: Rc::new(Cell::new(false)),
            }
        }
    }

    impl PageSession for FakeSession {
        fn navigate(&mut self, _url: &str) -> Result<(), RunError> {
            self.document = Some(Html::parse_document(self.html));
            Ok(())
        }

        fn refresh(&mut self) -> Result<(), RunError> {
            self.navigate("")
        }

        fn document(&self) -> Result<&Html, RunError> {
            self.document.as_ref().ok_or_else(|| RunError::Session("no page".to_string()))
        }

        fn dismiss_cookies(&mut self, _selector: &str) -> StepOutcome {
            StepOutcome::Failed("banner did not respond".to_string())
        }

        fn expand_all(&mut self, _link_text: &str) -> StepOutcome {
            self.expand.clone()
        }

        fn close(&mut self) {
            self.closed.set(true);
        }

        fn is_static(&self) -> bool {
            self.static_page
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        written: RefCell<Vec<(PathBuf, Vec<FormattedRow>)>>,
    }

    impl SheetWriter for RecordingWriter {
        fn write_rows(&self, path: &Path, rows: &[FormattedRow]) -> Result<(), String> {
            self.written.borrow_mut().push((path.to_path_buf(), rows.to_vec()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        sent: RefCell<Vec<Notification>>,
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, notification: &Notification) -> Result<(), String> {
            if self.fail {
                return Err("relay refused".to_string());
            }
            self.sent.borrow_mut().push(notification.clone());
            Ok(())
        }
    }

    fn config(output_dir: &Path, dry_run: bool) -> JobConfig {
        let args = CliArgs {
            config: None,
            url: Some("https://example.test/mercado".to_string()),
            html_file: None,
            output_dir: Some(output_dir.to_path_buf()),
            recipient: None,
            smtp_secret: None,
            date: NaiveDate::from_ymd_opt(2026, 10, 19),
            dry_run: true,
            json: None,
        };
        let mut config = resolve(&args, FileConfig::default()).expect("config");
        config.page.ready_timeout = Duration::from_millis(50);
        config.page.poll_interval = Duration::from_millis(5);
        config.dry_run = dry_run;
        config
    }

    #[test]
    fn test_successful_run_writes_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(PAGE);
        let closed = Rc::clone(&session.closed);
        let writer = RecordingWriter::default();
        let notifier = RecordingNotifier::default();
        let mut stages = Vec::new();

        let summary =
            run_job(&config(dir.path(), false), session, &writer, Some(&notifier), |s| stages.push(s)).unwrap();

        assert!(closed.get(), "Session should be released");
        assert_eq!(stages, vec![Stage::Loading, Stage::Extracting, Stage::Writing, Stage::Notifying]);

        let expected_path = dir.path().join("19-10-2026_mercado_continuo.xlsx");
        assert_eq!(summary.artifact, expected_path);
        assert_eq!(summary.quotes, 2);
        assert_eq!(summary.dropped_rows, 0);
        assert!(summary.notified);
        assert_eq!(summary.suspensions.len(), 1);
        assert_eq!(summary.suspensions[0].security_name, "BETA");

        let written = writer.written.borrow();
        assert_eq!(written.len(), 1);
        let (path, rows) = &written[0];
        assert_eq!(path, &expected_path);
        // Date and time columns are gone, no header row
        let first: Vec<&str> = rows[0].iter().map(|c| c.text.as_str()).collect();
        assert_eq!(first, vec!["ACME S.A.", "12,34", "-1,25%", "12,5", "12", "1234,5", "1000"]);
        assert_eq!(rows[0][2].style, Some(StyleTag::Negative));
        assert_eq!(rows[1][6].text, "-");

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Datos del Mercado Continuo - 19-10-2026");
        assert!(sent[0].body.contains("BETA: Suspendido (Motivo X)"));
        assert!(!sent[0].body.contains(NO_SUSPENSIONS));
        assert_eq!(sent[0].attachment, expected_path);
    }

    #[test]
    fn test_missing_table_stops_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new("<html><body><p>mantenimiento</p></body></html>");
        let closed = Rc::clone(&session.closed);
        let writer = RecordingWriter::default();
        let notifier = RecordingNotifier::default();

        let err = run_job(&config(dir.path(), false), session, &writer, Some(&notifier), |_| {}).unwrap_err();

        assert!(matches!(err, RunError::Timeout { .. }), "got {}", err);
        assert!(closed.get(), "Session should be released on failure");
        assert!(writer.written.borrow().is_empty());
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn test_static_page_without_table_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = FakeSession::new("<html><body><p>mantenimiento</p></body></html>");
        session.static_page = true;
        let closed = Rc::clone(&session.closed);
        let writer = RecordingWriter::default();

        let mut config = config(dir.path(), true);
        config.page.ready_timeout = Duration::from_secs(30);
        let started = std::time::Instant::now();

        let err = run_job(&config, session, &writer, None, |_| {}).unwrap_err();

        assert!(matches!(err, RunError::TableNotFound(_)), "got {}", err);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(closed.get());
        assert!(writer.written.borrow().is_empty());
    }

    #[test]
    fn test_header_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(
            r#"<div class="table-responsive"><table><tr><th>Nombre</th><th>Último</th></tr>
               <tr><td>ACME</td><td>1,0</td></tr></table></div>"#,
        );
        let writer = RecordingWriter::default();

        let err = run_job(&config(dir.path(), true), session, &writer, None, |_| {}).unwrap_err();
        assert!(matches!(err, RunError::HeaderMismatch(_)), "got {}", err);
        assert!(writer.written.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_skips_notification() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        let notifier = RecordingNotifier::default();
        let mut stages = Vec::new();

        let summary =
            run_job(&config(dir.path(), true), FakeSession::new(PAGE), &writer, Some(&notifier), |s| stages.push(s))
                .unwrap();

        assert!(!summary.notified);
        assert!(!stages.contains(&Stage::Notifying));
        assert!(notifier.sent.borrow().is_empty());
        assert_eq!(writer.written.borrow().len(), 1);
    }

    #[test]
    fn test_notify_failure_keeps_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        let notifier = RecordingNotifier { fail: true, ..Default::default() };

        let err = run_job(&config(dir.path(), false), FakeSession::new(PAGE), &writer, Some(&notifier), |_| {})
            .unwrap_err();

        assert!(matches!(err, RunError::Notify(_)), "got {}", err);
        assert_eq!(writer.written.borrow().len(), 1);
    }

    #[test]
    fn test_missing_notifier_without_dry_run_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = FakeSession::new(PAGE);
        let closed = Rc::clone(&session.closed);

        let err = run_job(&config(dir.path(), false), session, &RecordingWriter::default(), None, |_| {})
            .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
        assert!(closed.get());
    }

    #[test]
    fn test_performed_expand_waits_again() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = FakeSession::new(PAGE);
        session.expand = StepOutcome::Performed;
        let writer = RecordingWriter::default();

        let summary = run_job(&config(dir.path(), true), session, &writer, None, |_| {}).unwrap();
        assert_eq!(summary.quotes, 2);
    }
}
