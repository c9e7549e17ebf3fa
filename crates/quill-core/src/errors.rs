use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while talking to the generation service.
///
/// None of these escape a turn: the session logs them against the request
/// id and reports "no result" to its caller.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GatewayError {
    // Transport
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // Remote rejection
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("server error {status}: {body}")]
    ServerError { status: u16, body: String },

    // Response body
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => "network_error",
            Self::Timeout(_) => "timeout",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::InvalidRequest(_) => "invalid_request",
            Self::RateLimited(_) => "rate_limited",
            Self::ServerError { .. } => "server_error",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    /// True when the service answered with a non-success status.
    pub fn is_remote_rejection(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_)
                | Self::InvalidRequest(_)
                | Self::RateLimited(_)
                | Self::ServerError { .. }
        )
    }

    /// Classify an HTTP status code into the appropriate error variant.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(body),
            429 => Self::RateLimited(body),
            500..=599 => Self::ServerError { status, body },
            400 => Self::InvalidRequest(body),
            _ => Self::InvalidRequest(format!("unexpected status {status}: {body}")),
        }
    }
}

/// Errors raised while expanding context paths into file contents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list {}: {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid context pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },
}

impl LoadError {
    /// The path or pattern the failure is attributed to.
    pub fn subject(&self) -> String {
        match self {
            Self::Read { path, .. } | Self::List { path, .. } => path.display().to_string(),
            Self::Pattern { pattern, .. } => pattern.clone(),
        }
    }
}

/// Errors that end a session.
///
/// Everything a single turn can hit is recovered inside the loop; these are
/// the failures that mean the user's work cannot continue or was not saved.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read instruction: {0}")]
    Input(#[source] io::Error),

    #[error("document I/O failed for {}: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to console: {0}")]
    Console(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn from_status_mapping() {
        assert_matches!(
            GatewayError::from_status(401, "unauthorized".into()),
            GatewayError::AuthenticationFailed(_)
        );
        assert_matches!(
            GatewayError::from_status(403, "forbidden".into()),
            GatewayError::AuthenticationFailed(_)
        );
        assert_matches!(
            GatewayError::from_status(400, "bad".into()),
            GatewayError::InvalidRequest(_)
        );
        assert_matches!(
            GatewayError::from_status(429, "slow down".into()),
            GatewayError::RateLimited(_)
        );
        assert_matches!(
            GatewayError::from_status(503, "unavailable".into()),
            GatewayError::ServerError { status: 503, .. }
        );
    }

    #[test]
    fn unexpected_status_keeps_code_in_message() {
        let err = GatewayError::from_status(302, "moved".into());
        assert!(err.to_string().contains("unexpected status 302"), "got: {err}");
    }

    #[test]
    fn remote_rejection_classification() {
        assert!(GatewayError::from_status(500, String::new()).is_remote_rejection());
        assert!(GatewayError::from_status(404, String::new()).is_remote_rejection());
        assert!(!GatewayError::NetworkError("refused".into()).is_remote_rejection());
        assert!(!GatewayError::Timeout(Duration::from_secs(5)).is_remote_rejection());
        assert!(!GatewayError::MalformedResponse("eof".into()).is_remote_rejection());
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(GatewayError::NetworkError("x".into()).error_kind(), "network_error");
        assert_eq!(
            GatewayError::MalformedResponse("x".into()).error_kind(),
            "malformed_response"
        );
        assert_eq!(
            GatewayError::ServerError { status: 500, body: String::new() }.error_kind(),
            "server_error"
        );
    }

    #[test]
    fn load_error_names_path() {
        let err = LoadError::List {
            path: PathBuf::from("/missing/dir"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("/missing/dir"));
        assert_eq!(err.subject(), "/missing/dir");
    }

    #[test]
    fn document_error_names_path() {
        let err = SessionError::Document {
            path: PathBuf::from("out.md"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("out.md"));
    }
}
