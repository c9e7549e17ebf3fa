use std::sync::Arc;

use chrono::Utc;
use quill_core::{LoadError, RequestId};
use quill_llm::{estimate_tokens, Extraction, GenerateContentRequest, GenerationClient};
use tracing::{error, info, warn};

use crate::compiler::PromptCompiler;
use crate::context::ContextSource;
use crate::memory::{Exchange, SessionMemory};
use crate::usage::UsageTracker;

/// State of one conversation: history, usage counters, and the one-time
/// context, owned together and driven one request at a time.
pub struct Session {
    client: Arc<dyn GenerationClient>,
    compiler: PromptCompiler,
    memory: SessionMemory,
    usage: UsageTracker,
    request_count: u64,
}

impl Session {
    pub fn new(client: Arc<dyn GenerationClient>, context: Option<Box<dyn ContextSource>>) -> Self {
        Self {
            client,
            compiler: PromptCompiler::new(context),
            memory: SessionMemory::new(),
            usage: UsageTracker::new(),
            request_count: 0,
        }
    }

    /// Send one instruction and return the generated text.
    ///
    /// Transport failures, rejected requests, and responses without text
    /// all come back as `Ok(None)` after being logged. The only error is a
    /// failure to load the session's file context, which happens before
    /// anything is sent.
    pub async fn generate(&mut self, prompt: &str) -> Result<Option<String>, LoadError> {
        let compiled = self.compiler.compile(&self.memory, prompt)?;
        let tokens = estimate_tokens(&compiled);

        let now = Utc::now();
        self.request_count += 1;
        self.usage.record(now, tokens);
        let summary = self.usage.summarize(now);
        info!(
            requests_per_minute = summary.requests_last_minute,
            requests_per_day = summary.requests_last_day,
            tokens_per_minute = summary.tokens_per_minute,
            "usage"
        );

        let request_id = RequestId::new();
        info!(
            request_id = %request_id,
            request_number = self.request_count,
            tokens,
            "sending request"
        );

        let request = GenerateContentRequest::from_prompt(compiled);
        match self.client.generate(&request_id, &request).await {
            Ok(response) => {
                let extraction = response.extract();
                if let Extraction::Missing(field) = &extraction {
                    warn!(request_id = %request_id, missing = field.as_str(), "response carried no text");
                }
                self.memory.append(Exchange::new(prompt, response));
                Ok(extraction.into_text())
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    kind = e.error_kind(),
                    remote = e.is_remote_rejection(),
                    error = ?e.to_string(),
                    "request failed"
                );
                Ok(None)
            }
        }
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn context_loads(&self) -> usize {
        self.compiler.context_loads()
    }

    pub fn client_name(&self) -> &str {
        self.client.name()
    }
}
