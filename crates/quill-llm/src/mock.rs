use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use quill_core::{GatewayError, RequestId};

use crate::provider::GenerationClient;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Pre-programmed responses for deterministic testing without API calls.
pub enum MockResponse {
    Success(GenerateContentResponse),
    Error(GatewayError),
}

impl MockResponse {
    /// Convenience: a response with one candidate carrying `text`.
    pub fn text(text: &str) -> Self {
        Self::Success(GenerateContentResponse::from_text(text))
    }

    /// Convenience: a successful response with no `candidates` field.
    pub fn no_candidates() -> Self {
        Self::Success(GenerateContentResponse::default())
    }
}

/// Mock client that returns pre-programmed responses in sequence and
/// records every request it receives.
pub struct MockClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Prompts of every request received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.prompt().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        _request_id: &RequestId,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().push(request.clone());

        match self.responses.lock().pop_front() {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(e)) => Err(e),
            None => Err(GatewayError::InvalidRequest(format!(
                "MockClient: no response configured for call {idx}"
            ))),
        }
    }
}
