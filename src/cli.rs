use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Get the default configuration file location
/// Uses platform-specific config directories:
/// - Linux: ~/.config/mercado-report/config.toml
/// - macOS: ~/Library/Application Support/mercado-report/config.toml
/// - Windows: %APPDATA%/mercado-report/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mercado-report").join("config.toml"))
}

fn parse_run_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[derive(Parser, Debug, Clone)]
#[command(name = "mercado-report")]
#[command(about = "Snapshot the continuous-market table into a spreadsheet and email it")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file (TOML). Defaults to the platform config dir when present
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Page holding the securities table
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Read the page from a saved HTML file instead of fetching it
    #[arg(long, value_name = "FILE")]
    pub html_file: Option<PathBuf>,

    /// Directory the spreadsheet is written to
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Email address that receives the report
    #[arg(long, value_name = "ADDR")]
    pub recipient: Option<String>,

    /// SMTP password or app token for the sender account
    #[arg(long, env = "MERCADO_SMTP_SECRET", hide_env_values = true, value_name = "SECRET")]
    pub smtp_secret: Option<String>,

    /// Run date used in the file name and subject (default: today)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_run_date)]
    pub date: Option<NaiveDate>,

    /// Build the spreadsheet but do not send email
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the run summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                return Err(format!("Config file {} does not exist", path.display()));
            }
        }

        if let Some(path) = &self.html_file {
            if !path.is_file() {
                return Err(format!("HTML file {} does not exist", path.display()));
            }
        }

        if let Some(url) = &self.url {
            url::Url::parse(url).map_err(|e| format!("Invalid --url {}: {}", url, e))?;
        }

        Ok(())
    }

    /// Config file to load: explicit flag, else the default location if it exists
    pub fn config_file(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| default_config_path().filter(|p| p.is_file()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            config: None,
            url: None,
            html_file: None,
            output_dir: None,
            recipient: None,
            smtp_secret: None,
            date: None,
            dry_run: false,
            json: None,
        }
    }

    #[test]
    fn test_validate_defaults_succeeds() {
        assert!(args().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_html_file_fails() {
        let mut a = args();
        a.html_file = Some(PathBuf::from("/nonexistent/page.html"));
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_validate_bad_url_fails() {
        let mut a = args();
        a.url = Some("not a url".to_string());
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_parse_flags() {
        let a = CliArgs::try_parse_from([
            "mercado-report",
            "--url",
            "https://example.test/mercado",
            "--date",
            "2026-10-19",
            "--dry-run",
            "-o",
            "out",
        ])
        .unwrap();
        assert_eq!(a.url.as_deref(), Some("https://example.test/mercado"));
        assert_eq!(a.date, NaiveDate::from_ymd_opt(2026, 10, 19));
        assert!(a.dry_run);
        assert_eq!(a.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(CliArgs::try_parse_from(["mercado-report", "--date", "19-10-2026"]).is_err());
    }
}
