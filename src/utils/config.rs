use crate::core::{CAPTURE_ACCURACY_THRESHOLD_M, DEFAULT_ACCURACY_THRESHOLD_M, FIX_TIMEOUT_MS};
use crate::platform::{AccuracyLevel, FixOptions};
use crate::validation::AccuracyPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Longest fix timeout accepted from configuration (milliseconds)
const MAX_FIX_TIMEOUT_MS: u32 = 60_000;

/// Tunable parameters of the location acquisition service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Upper bound on a single fix request (milliseconds)
    pub fix_timeout_ms: u32,
    /// Accuracy level requested from the platform
    pub accuracy_level: AccuracyLevel,
    /// Threshold for the general accuracy check (meters)
    pub default_accuracy_threshold_m: f64,
    /// Threshold that triggers the accept/retry choice during capture (meters)
    pub capture_accuracy_threshold_m: f64,
    /// Cap on guided capture attempts; `None` leaves it to the user
    pub max_capture_attempts: Option<u32>,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid parameter '{parameter}' = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("I/O error: {message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            fix_timeout_ms: FIX_TIMEOUT_MS,
            accuracy_level: AccuracyLevel::Highest,
            default_accuracy_threshold_m: DEFAULT_ACCURACY_THRESHOLD_M,
            capture_accuracy_threshold_m: CAPTURE_ACCURACY_THRESHOLD_M,
            max_capture_attempts: None,
        }
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl LocatorConfig {
    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: LocatorConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to serialize configuration: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fix_timeout_ms == 0 || self.fix_timeout_ms > MAX_FIX_TIMEOUT_MS {
            return Err(invalid(
                "fix_timeout_ms",
                self.fix_timeout_ms,
                "must be between 1 and 60000 ms",
            ));
        }

        let default_threshold = self.default_accuracy_threshold_m;
        if !default_threshold.is_finite() || default_threshold <= 0.0 {
            return Err(invalid(
                "default_accuracy_threshold_m",
                default_threshold,
                "must be a positive number of meters",
            ));
        }

        let capture_threshold = self.capture_accuracy_threshold_m;
        if !capture_threshold.is_finite() || capture_threshold <= 0.0 {
            return Err(invalid(
                "capture_accuracy_threshold_m",
                capture_threshold,
                "must be a positive number of meters",
            ));
        }

        if capture_threshold < default_threshold {
            return Err(invalid(
                "capture_accuracy_threshold_m",
                capture_threshold,
                "must not be stricter than default_accuracy_threshold_m",
            ));
        }

        if self.max_capture_attempts == Some(0) {
            return Err(invalid(
                "max_capture_attempts",
                0,
                "must allow at least one attempt",
            ));
        }

        Ok(())
    }

    pub fn fix_options(&self) -> FixOptions {
        FixOptions::new(self.accuracy_level, self.fix_timeout_ms)
    }

    pub fn accuracy_policy(&self) -> AccuracyPolicy {
        AccuracyPolicy::new(
            self.default_accuracy_threshold_m,
            self.capture_accuracy_threshold_m,
        )
    }
}
