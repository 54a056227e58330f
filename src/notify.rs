/// Email notification
///
/// The message lists every suspended security and carries the artifact as
/// an attachment. Composition is pure; delivery goes through `Notifier`.
use crate::assemble::DATE_FORMAT;
use crate::types::SuspensionNotice;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SUBJECT_LABEL: &str = "Datos del Mercado Continuo";

const BODY_INTRO: &str = "Adjunto encontrarás los datos del Mercado Continuo.\n\n\
                          Las siguientes filas no se incluyeron por estar suspendidas:\n\n";

/// Body text when nothing was suspended
pub const NO_SUSPENSIONS: &str = "No se encontraron empresas suspendidas.";

/// A composed message, independent of transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

/// Capability: deliver a notification
pub trait Notifier {
    fn send(&self, notification: &Notification) -> Result<(), String>;
}

/// Compose subject and body for a run
pub fn compose_notification(
    label: &str,
    as_of: NaiveDate,
    suspensions: &[SuspensionNotice],
    attachment: &Path,
) -> Notification {
    let subject = format!("{} - {}", label, as_of.format(DATE_FORMAT));
    let body = format!("{}{}", BODY_INTRO, suspension_lines(suspensions));
    Notification { subject, body, attachment: attachment.to_path_buf() }
}

fn suspension_lines(suspensions: &[SuspensionNotice]) -> String {
    if suspensions.is_empty() {
        return NO_SUSPENSIONS.to_string();
    }
    suspensions.iter().map(|notice| notice.to_string()).collect::<Vec<_>>().join("\n")
}

/// SMTP settings; the secret is never defaulted
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub secret: String,
    pub recipient: String,
}

/// Sends through an SMTP relay with STARTTLS
pub struct SmtpNotifier {
    settings: SmtpSettings,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, String> {
        let from: Mailbox =
            self.settings.sender.parse().map_err(|e| format!("bad sender {:?}: {}", self.settings.sender, e))?;
        let to: Mailbox =
            self.settings.recipient.parse().map_err(|e| format!("bad recipient {:?}: {}", self.settings.recipient, e))?;

        let bytes = fs::read(&notification.attachment)
            .map_err(|e| format!("cannot read attachment {}: {}", notification.attachment.display(), e))?;
        let file_name = notification
            .attachment
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.xlsx".to_string());
        let octet_stream = ContentType::parse("application/octet-stream").map_err(|e| e.to_string())?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(notification.body.clone()))
                    .singlepart(Attachment::new(file_name).body(bytes, octet_stream)),
            )
            .map_err(|e| format!("cannot build message: {}", e))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, notification: &Notification) -> Result<(), String> {
        let message = self.build_message(notification)?;

        let transport = SmtpTransport::starttls_relay(&self.settings.host)
            .map_err(|e| format!("cannot set up relay {}: {}", self.settings.host, e))?
            .port(self.settings.port)
            .credentials(Credentials::new(self.settings.sender.clone(), self.settings.secret.clone()))
            .build();

        debug!(
            "sending '{}' to {} via {}:{}",
            notification.subject, self.settings.recipient, self.settings.host, self.settings.port
        );
        transport.send(&message).map_err(|e| format!("SMTP delivery failed: {}", e))?;
        Ok(())
    }
}
