//! # quill-llm
//!
//! Client side of the generation service: wire types, the
//! [`GenerationClient`] seam, the HTTP implementation, and a scripted mock.

pub mod provider;
pub mod tokens;
pub mod types;

pub mod mock;

pub use mock::{MockClient, MockResponse};
pub use provider::{GeminiClient, GenerationClient};
pub use tokens::estimate_tokens;
pub use types::{Extraction, GenerateContentRequest, GenerateContentResponse, MissingField};
