/*!
 * Application configuration.
 *
 * Loads and validates the optional JSON configuration file. Command-line
 * flags override every value here.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::caption_merger::DEFAULT_MIN_DURATION_MS;
use crate::cover::CoverOptions;
use crate::errors::ConfigError;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Log level used when no -v flag is given
    #[serde(default)]
    pub log_level: LogLevel,

    /// Cover command defaults
    #[serde(default)]
    pub cover: CoverConfig,

    /// Subtitle command defaults
    #[serde(default)]
    pub subtitle: SubtitleConfig,
}

/// Defaults for the `cover` command
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CoverConfig {
    /// Output file path
    #[serde(default = "default_cover_output")]
    pub output: String,

    /// Geometry and format
    #[serde(flatten)]
    pub options: CoverOptions,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            output: default_cover_output(),
            options: CoverOptions::default(),
        }
    }
}

/// Defaults for the `sub` command
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleConfig {
    /// Events shorter than this are removed
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: i64,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: default_min_duration_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map a count of -v flags to a level
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Warn,
            1 => Self::Info,
            _ => Self::Debug,
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_cover_output() -> String {
    "cover.jpg".to_string()
}

fn default_min_duration_ms() -> i64 {
    DEFAULT_MIN_DURATION_MS
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cover = &self.cover.options;
        if cover.width == 0 || cover.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "cover size must be positive, got {}x{}",
                cover.width, cover.height
            )));
        }

        if cover.extension.trim().is_empty() {
            return Err(ConfigError::Invalid("cover extension must not be empty".to_string()));
        }

        if self.subtitle.min_duration_ms < 0 {
            return Err(ConfigError::Invalid(format!(
                "min_duration_ms must not be negative, got {}",
                self.subtitle.min_duration_ms
            )));
        }

        Ok(())
    }
}
