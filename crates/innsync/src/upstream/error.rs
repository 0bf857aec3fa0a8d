//! Upstream content API error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors raised by the upstream client.
///
/// The client makes exactly one attempt per request; retry policy belongs
/// to the orchestration layer.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with an error status (>= 400).
    #[error("upstream API error: status {status}")]
    Http { status: u16 },

    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// The response body did not decode as the expected document.
    #[error("upstream decode error: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Whether this is a 4xx business error.
    #[inline]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status } if (400..500).contains(status))
    }

    /// Whether this is a 5xx upstream failure.
    #[inline]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status } if (500..600).contains(status))
    }
}

impl From<HttpError> for UpstreamError {
    fn from(e: HttpError) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Result type for upstream operations.
pub type Result<T> = std::result::Result<T, UpstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes_are_distinguished() {
        let not_found = UpstreamError::Http { status: 404 };
        assert!(not_found.is_client_error());
        assert!(!not_found.is_server_error());

        let unavailable = UpstreamError::Http { status: 503 };
        assert!(unavailable.is_server_error());
        assert!(!unavailable.is_client_error());

        let transport = UpstreamError::Transport("connection refused".to_string());
        assert!(!transport.is_client_error());
        assert!(!transport.is_server_error());
    }
}
