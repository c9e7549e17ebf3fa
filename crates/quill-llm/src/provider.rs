use std::time::Duration;

use async_trait::async_trait;
use quill_core::{ApiKey, GatewayError, RequestId};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// A remote text-generation service.
///
/// Implementations issue exactly one request per call. Retries and usage
/// accounting belong to the caller.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request_id: &RequestId,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError>;
}

/// Client for Gemini-style `generateContent` endpoints.
///
/// The API key travels as the `key` query parameter. Request URLs are never
/// logged, and transport errors have the URL stripped before they surface.
#[derive(Debug)]
pub struct GeminiClient {
    client: Client,
    api_url: String,
    api_key: ApiKey,
    timeout: Option<Duration>,
}

impl GeminiClient {
    /// Build a client. `timeout` bounds the whole request; `None` waits
    /// for the service indefinitely.
    pub fn new(
        api_url: impl Into<String>,
        api_key: ApiKey,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        if api_key.is_empty() {
            return Err(GatewayError::AuthenticationFailed("API key is empty".into()));
        }
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::NetworkError(e.without_url().to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
            timeout,
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        match self.timeout {
            Some(limit) if error.is_timeout() => GatewayError::Timeout(limit),
            _ => GatewayError::NetworkError(error.without_url().to_string()),
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip_all, fields(request_id = %request_id))]
    async fn generate(
        &self,
        request_id: &RequestId,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let payload = serde_json::to_string(request)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        info!(%payload, "request payload");

        let resp = self
            .client
            .post(&self.api_url)
            .query(&[("key", self.api_key.expose())])
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status().as_u16();
        info!(status, "response status");

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        info!(?body, "response body");

        if !(200..300).contains(&status) {
            return Err(GatewayError::from_status(status, body));
        }

        let parsed = serde_json::from_str(&body)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        debug!("response parsed");
        Ok(parsed)
    }
}
