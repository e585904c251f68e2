use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::formats::{CodecOptions, Format};
use crate::transforms::TransformDefaults;
use crate::validation::TimecodeValidatorConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Format used when an output path has no recognizable extension
    #[serde(default)]
    pub default_format: Format,

    /// Codec parameters (MicroDVD frame rate, SAMI trailing cue duration)
    #[serde(default)]
    pub codecs: CodecOptions,

    /// Parameters used by transforms when the command line omits them
    #[serde(default)]
    pub transforms: TransformDefaults,

    /// Limits used by the `check` command
    #[serde(default)]
    pub validation: TimecodeValidatorConfig,

    /// Maximum number of undo states kept per session, 0 = unlimited
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_history_limit() -> usize {
    100
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.codecs.validate().context("Invalid codec options")?;

        let defaults = &self.transforms;
        if !defaults.max_gap_seconds.is_finite() || defaults.max_gap_seconds < 0.0 {
            return Err(anyhow!("transforms.max_gap_seconds must be non-negative, got {}", defaults.max_gap_seconds));
        }
        if !defaults.min_display_seconds.is_finite() || defaults.min_display_seconds < 0.0 {
            return Err(anyhow!(
                "transforms.min_display_seconds must be non-negative, got {}",
                defaults.min_display_seconds
            ));
        }
        if defaults.merge_min_chars == 0 || defaults.split_max_chars == 0 {
            return Err(anyhow!("transforms character limits must be greater than zero"));
        }

        let limits = &self.validation;
        if limits.max_cps <= 0.0 {
            return Err(anyhow!("validation.max_cps must be positive, got {}", limits.max_cps));
        }
        if limits.min_duration_ms < 0 || limits.max_duration_ms < limits.min_duration_ms {
            return Err(anyhow!(
                "validation durations are inconsistent: min {} ms, max {} ms",
                limits.min_duration_ms,
                limits.max_duration_ms
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_format: Format::default(),
            codecs: CodecOptions::default(),
            transforms: TransformDefaults::default(),
            validation: TimecodeValidatorConfig::default(),
            history_limit: default_history_limit(),
            log_level: LogLevel::default(),
        }
    }
}
