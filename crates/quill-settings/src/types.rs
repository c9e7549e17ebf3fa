//! Settings type definitions.
//!
//! Field names are snake_case to match the configuration file. Missing
//! fields get their default value during deserialization.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use quill_core::ApiKey;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Log file used when the configuration does not name one.
pub const DEFAULT_LOG_FILE: &str = "quill.log";

/// Log level used when neither the configuration nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Settings as read from the configuration file.
///
/// `api_key` and `api_url` are optional here so that partial files can be
/// merged and overridden; [`QuillSettings::resolve`] enforces them.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillSettings {
    /// Credential for the generation service. Never serialized back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base endpoint of the generation service.
    pub api_url: Option<String>,
    /// Append-only log destination.
    pub log_file: PathBuf,
    /// Default tracing level (overridden by `RUST_LOG`).
    pub log_level: String,
    /// Upper bound on one request, in seconds. Absent means unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Default for QuillSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for QuillSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuillSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("log_file", &self.log_file)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl QuillSettings {
    /// Check required options and ranges, producing the settings the
    /// client runs with.
    pub fn resolve(self) -> Result<ResolvedSettings> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .map(ApiKey::new)
            .ok_or(SettingsError::Missing("api_key"))?;

        let api_url = self
            .api_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(SettingsError::Missing("api_url"))?;
        if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
            return Err(SettingsError::InvalidValue(format!(
                "api_url must be an http(s) URL, got {api_url}"
            )));
        }

        if self.log_file.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue("log_file is empty".into()));
        }

        let log_level = self.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(SettingsError::InvalidValue(format!(
                "log_level must be one of {}, got {}",
                LOG_LEVELS.join("/"),
                self.log_level
            )));
        }

        let request_timeout = match self.request_timeout_secs {
            Some(0) => {
                return Err(SettingsError::InvalidValue(
                    "request_timeout_secs must be positive".into(),
                ))
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(ResolvedSettings {
            api_key,
            api_url,
            log_file: self.log_file,
            log_level,
            request_timeout,
        })
    }
}

/// Validated settings handed to the rest of the client.
#[derive(Clone, Debug)]
pub struct ResolvedSettings {
    pub api_key: ApiKey,
    pub api_url: String,
    pub log_file: PathBuf,
    pub log_level: String,
    pub request_timeout: Option<Duration>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
