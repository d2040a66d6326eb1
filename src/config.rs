//! # Configuration
//!
//! User settings stored as JSON in the platform config directory:
//!
//! ```text
//! ~/.config/zipscope/config.json
//! ```
//!
//! Every field has a default, so a missing file (or a file with only some
//! keys) is fine. `--config FILE` points at another file.

use crate::nav::tree::DEFAULT_PREVIEW_BUDGET;
use crate::ui::theme::Theme;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const MIN_PANE_FRACTION: f64 = 0.2;
const MAX_PANE_FRACTION: f64 = 0.8;
const MIN_PREVIEW_BUDGET: usize = 8;

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Built-in theme name, matched case-insensitively.
    #[serde(default = "default_theme_name")]
    pub theme: String,

    /// Characters of a scalar shown next to its key in the JSON tree.
    #[serde(default = "default_preview_budget")]
    pub preview_budget: usize,

    /// Width share of the entry list in `browse`; the rest is the metadata
    /// panel.
    #[serde(default = "default_pane_fraction")]
    pub pane_fraction: f64,

    /// Directory transcripts are exported to, relative to the working
    /// directory unless absolute.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_theme_name() -> String {
    "Catppuccin Mocha".to_string()
}

fn default_preview_budget() -> usize {
    DEFAULT_PREVIEW_BUDGET
}

fn default_pane_fraction() -> f64 {
    0.55
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme_name(),
            preview_budget: default_preview_budget(),
            pane_fraction: default_pane_fraction(),
            export_dir: default_export_dir(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the platform location when `None`. An
    /// explicit path that fails to parse is an error; the platform file
    /// silently falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::try_load().unwrap_or_else(|e| {
                tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable config");
                Self::default()
            })),
        }
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Read `path`; a missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Platform location of the config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "zipscope")
            .context("No home directory to place the config file in")?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// The configured theme, or the default one for an unknown name.
    pub fn theme(&self) -> &'static Theme {
        Theme::by_name(&self.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.theme, "unknown theme, using default");
            Theme::default_theme()
        })
    }

    pub fn pane_fraction(&self) -> f64 {
        if self.pane_fraction.is_finite() {
            self.pane_fraction.clamp(MIN_PANE_FRACTION, MAX_PANE_FRACTION)
        } else {
            default_pane_fraction()
        }
    }

    pub fn preview_budget(&self) -> usize {
        self.preview_budget.max(MIN_PREVIEW_BUDGET)
    }
}
