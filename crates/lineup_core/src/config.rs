//! Playback configuration
//!
//! Passed explicitly to a session at construction. `load_config_from_env` is
//! the only place that reads process state, and only the CLI calls it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};

use crate::error::{LineupError, Result};
use crate::i18n::{FALLBACK_LOCALE, SUPPORTED_LOCALES};

pub const CONFIG_PATH_ENV: &str = "LINEUP_CONFIG_PATH";

pub const DEFAULT_ADVANCE_INTERVAL_MS: u64 = 4000;
pub const MIN_ADVANCE_INTERVAL_MS: u64 = 500;
pub const MAX_ADVANCE_INTERVAL_MS: u64 = 60_000;

/// How the advance timer is re-armed when a paused session resumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Start a fresh full interval
    #[default]
    RestartInterval,
    /// Continue with whatever was left of the interval when paused
    CarryRemaining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Time each item stays in focus, and the hold on the last item
    pub advance_interval_ms: u64,
    pub resume_policy: ResumePolicy,
    /// Locale for placeholder names and group banners
    pub locale: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            advance_interval_ms: DEFAULT_ADVANCE_INTERVAL_MS,
            resume_policy: ResumePolicy::default(),
            locale: FALLBACK_LOCALE.to_string(),
        }
    }
}

impl PlaybackConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_ADVANCE_INTERVAL_MS..=MAX_ADVANCE_INTERVAL_MS).contains(&self.advance_interval_ms) {
            return Err(LineupError::Config(format!(
                "advance_interval_ms must be within {}..={}, got {}",
                MIN_ADVANCE_INTERVAL_MS, MAX_ADVANCE_INTERVAL_MS, self.advance_interval_ms
            )));
        }
        if self.locale.trim().is_empty() {
            return Err(LineupError::Config("locale must not be empty".into()));
        }
        if !SUPPORTED_LOCALES.contains(&self.locale.as_str()) {
            log::warn!("Locale {} is not bundled, falling back during negotiation", self.locale);
        }
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| LineupError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config = Self::from_json(&content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Read the config file named by `LINEUP_CONFIG_PATH`; defaults when unset or blank
pub fn load_config_from_env() -> Result<PlaybackConfig> {
    let Ok(path) = env::var(CONFIG_PATH_ENV) else {
        return Ok(PlaybackConfig::default());
    };

    let path = path.trim();
    if path.is_empty() {
        return Ok(PlaybackConfig::default());
    }

    PlaybackConfig::load_from_path(Path::new(path))
        .map_err(|e| LineupError::Config(format!("{CONFIG_PATH_ENV}='{path}': {e}")))
}
