//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`QuillSettings::default()`]
//! 2. Deep-merge the YAML configuration file over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Resolve: required options present, values in range
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::{QuillSettings, ResolvedSettings};

/// Configuration file read when none is named on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Load, override, and resolve settings from the given file.
pub fn load_settings(path: &Path) -> Result<ResolvedSettings> {
    let mut settings = merge_file(path)?;
    apply_env_overrides(&mut settings);
    settings.resolve()
}

/// Read the YAML file at `path` and deep-merge it over the defaults.
///
/// A missing file is an error. An empty file yields the defaults.
pub fn merge_file(path: &Path) -> Result<QuillSettings> {
    if !path.exists() {
        return Err(SettingsError::NotFound(path.to_path_buf()));
    }

    debug!(?path, "loading configuration from file");
    let content = std::fs::read_to_string(path)?;
    let user: Value = if is_blank_yaml(&content) {
        Value::Null
    } else {
        serde_yaml::from_str(&content)?
    };
    let user = match user {
        Value::Null => Value::Object(serde_json::Map::new()),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(SettingsError::InvalidValue(format!(
                "configuration root must be a mapping, got {other}"
            )))
        }
    };

    let defaults = serde_json::to_value(QuillSettings::default())?;
    let merged = deep_merge(defaults, user);
    Ok(serde_json::from_value(merged)?)
}

/// No content besides whitespace and comments.
fn is_blank_yaml(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `QUILL_*` environment variable overrides.
pub fn apply_env_overrides(settings: &mut QuillSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides using `lookup` to read variables.
///
/// Empty values are ignored. Invalid numbers are ignored with a warning
/// (fall back to file/default).
pub fn apply_overrides_from<F>(settings: &mut QuillSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("QUILL_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = read("QUILL_API_URL") {
        settings.api_url = Some(v);
    }
    if let Some(v) = read("QUILL_LOG_FILE") {
        settings.log_file = v.into();
    }
    if let Some(v) = read("QUILL_LOG_LEVEL") {
        settings.log_level = v;
    }
    if let Some(v) = read("QUILL_REQUEST_TIMEOUT_SECS") {
        match parse_u64_range(&v, 1, 3600) {
            Some(secs) => settings.request_timeout_secs = Some(secs),
            None => {
                tracing::warn!(key = "QUILL_REQUEST_TIMEOUT_SECS", value = ?v, "invalid u64 env var, ignoring");
            }
        }
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
