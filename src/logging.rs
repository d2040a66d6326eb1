//! # Logging
//!
//! `tracing` output goes to `zipscope.log` in the platform data directory,
//! never to the terminal the screens draw on. The filter is read from
//! `ZIPSCOPE_LOG` (same syntax as `RUST_LOG`) and defaults to `warn`.
//!
//! Nested viewers are separate processes; the file is opened in append mode
//! so their lines interleave with the parent's.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const LOG_ENV: &str = "ZIPSCOPE_LOG";
pub const LOG_FILE_NAME: &str = "zipscope.log";
const DEFAULT_FILTER: &str = "warn";

/// Platform location of the log file.
pub fn default_log_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "zipscope")
        .context("Could not determine data directory")?;
    Ok(dirs.data_dir().join(LOG_FILE_NAME))
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `path`. Calling it again in the
/// same process is a no-op.
pub fn init_logging_at(path: &Path) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .compact();

    if tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!(pid = std::process::id(), "logging initialized");
    }
    Ok(())
}

/// Install the subscriber at the platform log path and return that path.
pub fn init_logging() -> Result<PathBuf> {
    let path = default_log_path()?;
    init_logging_at(&path)?;
    Ok(path)
}
