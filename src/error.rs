/// Fatal run errors
///
/// Only structural and resource failures end up here. Cell-level parse
/// problems become missing values or dropped rows, and optional page
/// interactions report a `StepOutcome` instead.
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("page session failed: {0}")]
    Session(String),

    #[error("timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    #[error("table not found using selector `{0}`")]
    TableNotFound(String),

    #[error("header mismatch: {0}")]
    HeaderMismatch(String),

    #[error("failed to write artifact {}: {reason}", path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("failed to send notification: {0}")]
    Notify(String),
}

impl RunError {
    /// Short stage label used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::Config(_) => "config",
            RunError::Session(_) => "session",
            RunError::Timeout { .. } => "timeout",
            RunError::TableNotFound(_) => "table",
            RunError::HeaderMismatch(_) => "header",
            RunError::Artifact { .. } => "artifact",
            RunError::Notify(_) => "notify",
        }
    }
}
