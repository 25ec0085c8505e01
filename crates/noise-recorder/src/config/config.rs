//! Configuration management for noise-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{CaptureConfig, CaptureSource, RecorderConfig, ServerConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Upload server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Recording session behaviour.
    #[serde(default)]
    pub recorder: RecorderConfig,
    /// Capture device configuration.
    #[serde(default)]
    pub capture: CaptureConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate configuration from `path`.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config {}: {}", path.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config = Self::parse(&contents)?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Parse and validate TOML text.
    #[track_caller]
    pub fn parse(contents: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Check values that would make recording impossible.
    ///
    /// A zero chunk interval would let some devices withhold all data until
    /// stop, so it is refused here rather than at record time.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        if self.recorder.chunk_interval_ms == 0 {
            return Err(AppError::ConfigError {
                reason: "recorder.chunk_interval_ms must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.capture.chunk_bytes == 0 {
            return Err(AppError::ConfigError {
                reason: "capture.chunk_bytes must be greater than zero".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.capture.source == CaptureSource::File && self.capture.input_path.is_none() {
            warn!("File capture selected but no input_path configured; pass --input");
        }

        Ok(())
    }

    /// Interval the capture device is started with.
    pub fn chunk_interval(&self) -> Duration {
        Duration::from_millis(self.recorder.chunk_interval_ms)
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("com", "noise-recorder", "Noise-Recorder").ok_or_else(|| {
                AppError::ConfigError {
                    reason: "Failed to get config directory".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
