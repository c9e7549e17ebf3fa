use quill_llm::GenerateContentResponse;

/// One instruction and the structured response it produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Exchange {
    pub prompt: String,
    pub response: GenerateContentResponse,
}

impl Exchange {
    pub fn new(prompt: impl Into<String>, response: GenerateContentResponse) -> Self {
        Self {
            prompt: prompt.into(),
            response,
        }
    }

    /// First candidate's text, or empty when the response carried none.
    pub fn response_text(&self) -> &str {
        self.response.first_text().unwrap_or_default()
    }
}

/// Exchanges of the current process, in arrival order.
///
/// Unbounded: history lives as long as the process and is never trimmed.
#[derive(Clone, Debug, Default)]
pub struct SessionMemory {
    exchanges: Vec<Exchange>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    pub fn all(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}
