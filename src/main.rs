//! # quill
//!
//! Interactive client that revises one document through a conversation
//! with a text-generation service. Wires settings, logging, the HTTP
//! client, and the session loop together.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use quill_engine::{ConsoleSink, ContextSource, DocumentSink, FsContextLoader, Session, SessionLoop};
use quill_llm::GeminiClient;
use quill_settings::{apply_env_overrides, merge_file, QuillSettings, DEFAULT_CONFIG_FILE};
use quill_telemetry::LogConfig;
use tokio::io::BufReader;
use tracing::{error, info};

/// Output path that selects chat mode.
const CHAT_MODE: &str = "-";

/// Revise a document by conversing with a generation service.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Document to write, or `-` to print responses instead.
    output: String,

    /// Context file, directory, or glob pattern, sent once with the first
    /// request.
    context: Option<String>,

    /// Configuration file.
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Request timeout in seconds (overrides `request_timeout_secs`).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    timeout: Option<u64>,

    /// Log level (overrides `log_level`).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(&self, settings: &mut QuillSettings) {
        if let Some(secs) = self.timeout {
            settings.request_timeout_secs = Some(secs);
        }
        if let Some(level) = &self.log_level {
            settings.log_level.clone_from(level);
        }
    }

    fn is_chat(&self) -> bool {
        self.output == CHAT_MODE
    }

    /// Loader for the context argument. A pattern that cannot be expanded
    /// is logged and the session runs without context.
    fn context_source(&self) -> Option<Box<dyn ContextSource>> {
        let arg = self.context.as_deref()?;
        match FsContextLoader::from_arg(arg) {
            Ok(loader) => Some(Box::new(loader)),
            Err(e) => {
                error!(path = %e.subject(), error = ?e, "context load failed");
                None
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = merge_file(&cli.config)
        .with_context(|| format!("Failed to load configuration: {}", cli.config.display()))?;
    apply_env_overrides(&mut settings);
    cli.apply(&mut settings);
    let settings = settings.resolve().context("Invalid configuration")?;

    quill_telemetry::init_logging(&LogConfig::new(&settings.log_file, &settings.log_level))
        .context("Failed to initialize logging")?;
    info!(
        config = %cli.config.display(),
        api_url = %settings.api_url,
        timeout = ?settings.request_timeout,
        chat = cli.is_chat(),
        "starting quill"
    );

    let client = GeminiClient::new(
        settings.api_url.clone(),
        settings.api_key.clone(),
        settings.request_timeout,
    )
    .context("Failed to build HTTP client")?;

    let session = Session::new(Arc::new(client), cli.context_source());
    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let exit = if cli.is_chat() {
        SessionLoop::new(session, ConsoleSink)
            .run(input, &mut stdout)
            .await
    } else {
        let sink = DocumentSink::new(&cli.output);
        sink.touch()
            .with_context(|| format!("Failed to create output document: {}", cli.output))?;
        SessionLoop::new(session, sink).run(input, &mut stdout).await
    }
    .context("Session aborted")?;

    info!(?exit, "quill exiting");
    Ok(())
}
