//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::env::VarError;

use crate::error::ErrorCode;

pub const DEFAULT_CHAR_WIDTH: f64 = 12.0;
pub const DEFAULT_LINE_HEIGHT: f64 = 24.0;
pub const DEFAULT_UNDO_MERGE_WINDOW_MS: u64 = 300;

pub const ENV_CHAR_WIDTH: &str = "TALLSKOG_CHAR_WIDTH";
pub const ENV_LINE_HEIGHT: &str = "TALLSKOG_LINE_HEIGHT";
pub const ENV_UNDO_MERGE_MS: &str = "TALLSKOG_UNDO_MERGE_MS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: '{value}' is not a number")]
    Invalid { key: &'static str, value: String },
    #[error("{key}: '{value}' must be finite and greater than zero")]
    OutOfRange { key: &'static str, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
            Self::OutOfRange { .. } => "E_CONFIG_RANGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Advance of one label character, used by the monospace measurer.
    pub char_width: f64,
    pub line_height: f64,
    /// Edits closer together than this collapse into one undo step.
    pub undo_merge_window_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            char_width: DEFAULT_CHAR_WIDTH,
            line_height: DEFAULT_LINE_HEIGHT,
            undo_merge_window_ms: DEFAULT_UNDO_MERGE_WINDOW_MS,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `TALLSKOG_CHAR_WIDTH`: default 12
    /// - `TALLSKOG_LINE_HEIGHT`: default 24
    /// - `TALLSKOG_UNDO_MERGE_MS`: default 300
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(raw)) => Some(raw.to_string_lossy().into_owned()),
        })
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let char_width = parse_positive_f64(ENV_CHAR_WIDTH, lookup(ENV_CHAR_WIDTH), DEFAULT_CHAR_WIDTH)?;
        let line_height = parse_positive_f64(ENV_LINE_HEIGHT, lookup(ENV_LINE_HEIGHT), DEFAULT_LINE_HEIGHT)?;
        let undo_merge_window_ms =
            parse_u64(ENV_UNDO_MERGE_MS, lookup(ENV_UNDO_MERGE_MS), DEFAULT_UNDO_MERGE_WINDOW_MS)?;
        Ok(Self { char_width, line_height, undo_merge_window_ms })
    }
}

fn parse_positive_f64(key: &'static str, raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::Invalid { key, value: raw.clone() })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::OutOfRange { key, value: raw });
    }
    Ok(value)
}

fn parse_u64(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid { key, value: raw.clone() })
}
