//! # quill-settings
//!
//! Configuration for the quill client, loaded once at startup.
//!
//! Settings are resolved from three layers (in priority order):
//! 1. **Compiled defaults**: [`QuillSettings::default()`]
//! 2. **Configuration file**: YAML, deep-merged over defaults
//! 3. **Environment variables**: `QUILL_*` overrides (highest priority)
//!
//! The merged value is then checked by [`QuillSettings::resolve`], which
//! rejects a missing credential or endpoint. Unlike the defaults-on-failure
//! behaviour of long-running servers, every failure here is fatal: the
//! client cannot do anything useful without a key and an endpoint.

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides_from, deep_merge, load_settings, merge_file,
    DEFAULT_CONFIG_FILE,
};
pub use types::{QuillSettings, ResolvedSettings, DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL};
