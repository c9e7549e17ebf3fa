//! # quill-telemetry
//!
//! `tracing` subscriber setup for the quill client.
//!
//! Every event goes to an append-only log file, one line per event, with no
//! ANSI colouring. Warnings and errors are also mirrored to stderr so a
//! failing endpoint is visible without opening the log. `RUST_LOG` overrides
//! the configured level.

mod capture;

pub use capture::{capture_logs, CapturedEvent, CapturedLogs};

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Errors from subscriber initialization.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Configuration for the logging subsystem.
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// Append-only destination for every event.
    pub log_file: PathBuf,
    /// Default level directive. Overridden by RUST_LOG env var.
    pub level: String,
    /// Mirror warn+ events to stderr.
    pub stderr_warnings: bool,
}

impl LogConfig {
    pub fn new(log_file: impl Into<PathBuf>, level: impl Into<String>) -> Self {
        Self {
            log_file: log_file.into(),
            level: level.into(),
            stderr_warnings: true,
        }
    }
}

/// Initialize the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<(), TelemetryError> {
    let file = open_log_file(&config.log_file)?;

    let stderr_layer = config.stderr_warnings.then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(file_layer::<Registry>(file).with_filter(env_filter(&config.level)))
        .with(stderr_layer)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}

/// `RUST_LOG` if set and valid, else the given level.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Open the log file for appending, creating it and its parent directory.
pub fn open_log_file(path: &Path) -> Result<File, TelemetryError> {
    let wrap = |source| TelemetryError::LogFile {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(wrap)
}

fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
}
