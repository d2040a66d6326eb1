//! # Error Reporting
//!
//! Typed failures for the tools and the structured channel they are reported
//! on. A fatal error is written to stderr as one JSON line:
//!
//! ```text
//! {"type":"ERR_ZIP_NOT_FOUND","message":"zip file not found","hint":"/tmp/missing.zip"}
//! ```
//!
//! Non-fatal failures inside a running screen never reach this channel; they
//! are shown on the status line instead.

use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Usage hint for commands that take an archive path.
pub const ZIP_PATH_USAGE: &str = r#"argv <file.zip> or stdin {"zip_path":"..."}"#;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("missing path ({usage})")]
    InputMissing { usage: &'static str },

    #[error("invalid input: {reason}")]
    InputInvalid { reason: String },

    #[error("zip file not found: {}", path.display())]
    ArchiveNotFound { path: PathBuf },

    #[error("zip processing failed: {detail}")]
    ArchiveRead { detail: String },

    #[error("entry not found: {name}")]
    EntryNotFound { name: String },

    #[error("invalid JSON: {detail}")]
    JsonParse { detail: String },

    #[error("unexpected data shape: {detail}")]
    ShapeMismatch { detail: String },

    #[error("child process failed: {detail}")]
    ChildProcess { detail: String },

    #[error("cannot read {what}: {detail}")]
    ReadFailed { what: String, detail: String },

    #[error("{action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("terminal init failed: {detail}")]
    Terminal { detail: String },
}

impl ToolError {
    pub fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action: action.into(),
            source,
        }
    }

    /// Stable type code used on the structured error channel.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputMissing { .. } => "ERR_INPUT",
            Self::InputInvalid { .. } => "ERR_INPUT_INVALID",
            Self::ArchiveNotFound { .. } => "ERR_ZIP_NOT_FOUND",
            Self::ArchiveRead { .. } => "ERR_ZIP",
            Self::EntryNotFound { .. } => "ERR_ENTRY_NOT_FOUND",
            Self::JsonParse { .. } => "ERR_JSON_PARSE",
            Self::ShapeMismatch { .. } => "ERR_SHAPE",
            Self::ChildProcess { .. } => "ERR_CHILD_PROCESS",
            Self::ReadFailed { .. } => "ERR_READ",
            Self::Io { .. } => "ERR_IO",
            Self::Terminal { .. } => "ERR_TUI_INIT",
        }
    }

    /// Short human summary, without the variable detail.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::InputMissing { .. } => "missing path",
            Self::InputInvalid { .. } => "invalid input",
            Self::ArchiveNotFound { .. } => "zip file not found",
            Self::ArchiveRead { .. } => "zip processing failed",
            Self::EntryNotFound { .. } => "entry not found",
            Self::JsonParse { .. } => "invalid JSON",
            Self::ShapeMismatch { .. } => "unexpected data shape",
            Self::ChildProcess { .. } => "child process failed",
            Self::ReadFailed { .. } => "cannot read input",
            Self::Io { .. } => "filesystem operation failed",
            Self::Terminal { .. } => "terminal init failed",
        }
    }

    /// The variable detail that helps the user fix the problem.
    pub fn hint(&self) -> String {
        match self {
            Self::InputMissing { usage } => (*usage).to_string(),
            Self::InputInvalid { reason } => reason.clone(),
            Self::ArchiveNotFound { path } => path.display().to_string(),
            Self::ArchiveRead { detail }
            | Self::JsonParse { detail }
            | Self::ShapeMismatch { detail }
            | Self::ChildProcess { detail }
            | Self::Terminal { detail } => detail.clone(),
            Self::EntryNotFound { name } => name.clone(),
            Self::ReadFailed { what, detail } => format!("{what}: {detail}"),
            Self::Io { action, source } => format!("{action}: {source}"),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.summary().to_string(),
            hint: self.hint(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub hint: String,
}

impl ErrorReport {
    /// Build the report for any error, using the first [`ToolError`] in its
    /// chain when there is one.
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.chain().find_map(|e| e.downcast_ref::<ToolError>()) {
            Some(tool) => tool.report(),
            None => Self {
                kind: "ERR_INTERNAL",
                message: "unexpected failure".to_string(),
                hint: format!("{err:#}"),
            },
        }
    }

    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"type":"{}","message":"{}"}}"#,
                self.kind,
                self.message.replace('"', "'")
            )
        })
    }
}

/// Write the report as a single JSON line to stderr.
pub fn emit_error(report: &ErrorReport) {
    tracing::error!(kind = report.kind, hint = %report.hint, "{}", report.message);
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", report.to_json_line());
}
