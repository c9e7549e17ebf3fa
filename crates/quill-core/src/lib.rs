//! # quill-core
//!
//! Shared vocabulary for the quill crates: error hierarchy, request ids,
//! and the secret wrapper used for the service credential.

pub mod errors;
pub mod ids;
pub mod security;

pub use errors::{GatewayError, LoadError, SessionError};
pub use ids::RequestId;
pub use security::ApiKey;
