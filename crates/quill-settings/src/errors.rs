//! Settings error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Failed to read the configuration file from disk.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse YAML in the configuration file.
    #[error("failed to parse configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Merged settings did not match the expected shape.
    #[error("failed to decode configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A required option is absent or blank.
    #[error("missing required configuration option: {0}")]
    Missing(&'static str),
    /// A settings value was invalid (e.g., out of range).
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
