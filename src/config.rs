//! # Panel Configuration
//!
//! Read-only settings loaded once at startup.
//!
//! ```text
//! ~/.config/cfsd-panel/config.json
//! ```
//!
//! Every field has a default, so an absent file and `{}` both yield the stock
//! jail layout and a ten minute session. The panel never writes this file.

use crate::sandbox::Jail;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Length of the advisory session countdown.
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u64,

    #[serde(default)]
    pub jail: Jail,
}

fn default_session_minutes() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_minutes: default_session_minutes(),
            jail: Jail::default(),
        }
    }
}

impl Config {
    /// Load from `path` when given, otherwise from the platform config
    /// directory. A missing file means defaults; an unreadable or malformed
    /// one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn session_length(&self) -> Duration {
        Duration::from_secs(self.session_minutes.saturating_mul(60))
    }

    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "cfsd-panel")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
