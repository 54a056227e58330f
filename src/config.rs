/// Configuration resolution module
///
/// This module handles:
/// - Loading the optional TOML configuration file
/// - Layering defaults < file < CLI flags < environment secret
/// - Validating that mail settings exist unless running dry
/// - Producing an immutable JobConfig for the runner
use crate::assemble::{DateOrder, FileNaming};
use crate::classify::DEFAULT_SUSPENSION_MARKER;
use crate::cli::CliArgs;
use crate::notify::{SmtpSettings, DEFAULT_SUBJECT_LABEL};
use crate::session::SessionOptions;
use chrono::{Local, NaiveDate};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_URL: &str = concat!(
    "https://www.bolsasymercados.es/bme-exchange/es/",
    "Mercados-y-Cotizaciones/Acciones/Mercado-Continuo/Precios/mercado-continuo"
);
pub const DEFAULT_TABLE_SELECTOR: &str = ".table-responsive";
pub const DEFAULT_COOKIE_SELECTOR: &str = "#onetrust-accept-btn-handler";
pub const DEFAULT_EXPAND_LINK_TEXT: &str = "Ver todas";
pub const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("mercado-report/", env!("CARGO_PKG_VERSION"));

/// On-disk configuration; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub page: PageSection,
    #[serde(default)]
    pub artifact: ArtifactSection,
    #[serde(default)]
    pub mail: MailSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSection {
    pub url: Option<String>,
    pub table_selector: Option<String>,
    pub cookie_selector: Option<String>,
    pub expand_link_text: Option<String>,
    pub suspension_marker: Option<String>,
    pub ready_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactSection {
    pub output_dir: Option<PathBuf>,
    pub date_order: Option<DateOrder>,
    pub suffix: Option<String>,
    pub extension: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailSection {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub sender: Option<String>,
    pub sender_secret: Option<String>,
    pub recipient: Option<String>,
    pub subject_label: Option<String>,
}

/// Where and how to read the page
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub url: String,
    pub table_selector: String,
    pub cookie_selector: String,
    pub expand_link_text: String,
    pub suspension_marker: String,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub page: PageSettings,
    pub session: SessionOptions,
    pub output_dir: PathBuf,
    pub naming: FileNaming,
    pub subject_label: String,
    /// None only in dry-run mode
    pub mail: Option<SmtpSettings>,
    pub as_of: NaiveDate,
    pub dry_run: bool,
}

/// Load and parse a configuration file
pub fn load_config_file(path: &Path) -> Result<FileConfig, String> {
    let s = fs::read_to_string(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
    toml::from_str(&s).map_err(|e| format!("Failed to parse TOML in {:?}: {}", path, e))
}

/// Build a complete JobConfig from CLI arguments and the optional config file
pub fn build_job_config(args: &CliArgs) -> Result<JobConfig, String> {
    let file = match args.config_file() {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            load_config_file(&path)?
        }
        None => FileConfig::default(),
    };

    resolve(args, file)
}

/// Merge CLI arguments over file settings over defaults
pub fn resolve(args: &CliArgs, file: FileConfig) -> Result<JobConfig, String> {
    let FileConfig { page, artifact, mail } = file;

    let page_settings = PageSettings {
        url: args.url.clone().or(page.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
        table_selector: page.table_selector.unwrap_or_else(|| DEFAULT_TABLE_SELECTOR.to_string()),
        cookie_selector: page.cookie_selector.unwrap_or_else(|| DEFAULT_COOKIE_SELECTOR.to_string()),
        expand_link_text: page.expand_link_text.unwrap_or_else(|| DEFAULT_EXPAND_LINK_TEXT.to_string()),
        suspension_marker: page.suspension_marker.unwrap_or_else(|| DEFAULT_SUSPENSION_MARKER.to_string()),
        ready_timeout: Duration::from_secs(page.ready_timeout_secs.unwrap_or(DEFAULT_READY_TIMEOUT_SECS)),
        poll_interval: Duration::from_millis(page.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS)),
    };

    let session = SessionOptions {
        request_timeout: Duration::from_secs(page.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)),
        user_agent: page.user_agent.unwrap_or_else(|| USER_AGENT.to_string()),
        snapshot: args.html_file.clone(),
    };

    let defaults = FileNaming::default();
    let naming = FileNaming {
        order: artifact.date_order.unwrap_or(defaults.order),
        suffix: artifact.suffix.unwrap_or(defaults.suffix),
        extension: artifact.extension.unwrap_or(defaults.extension),
    };

    let subject_label = mail.subject_label.clone().unwrap_or_else(|| DEFAULT_SUBJECT_LABEL.to_string());
    let mail = if args.dry_run { None } else { Some(resolve_mail(args, mail)?) };

    Ok(JobConfig {
        page: page_settings,
        session,
        output_dir: args.output_dir.clone().or(artifact.output_dir).unwrap_or_else(|| PathBuf::from(".")),
        naming,
        subject_label,
        mail,
        as_of: args.date.unwrap_or_else(|| Local::now().date_naive()),
        dry_run: args.dry_run,
    })
}

fn resolve_mail(args: &CliArgs, mail: MailSection) -> Result<SmtpSettings, String> {
    let host = mail.smtp_host;
    let sender = mail.sender;
    let recipient = args.recipient.clone().or(mail.recipient);
    let secret = args.smtp_secret.clone().or(mail.sender_secret);

    let mut missing = Vec::new();
    if host.is_none() {
        missing.push("mail.smtp_host");
    }
    if sender.is_none() {
        missing.push("mail.sender");
    }
    if recipient.is_none() {
        missing.push("mail.recipient (or --recipient)");
    }
    if secret.is_none() {
        missing.push("mail.sender_secret (or MERCADO_SMTP_SECRET)");
    }

    match (host, sender, recipient, secret) {
        (Some(host), Some(sender), Some(recipient), Some(secret)) => Ok(SmtpSettings {
            host,
            port: mail.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
            sender,
            secret,
            recipient,
        }),
        _ => Err(format!("Missing mail setting(s): {}. Use --dry-run to skip email.", missing.join(", "))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
