//! Error types for the GitHub client.

use thiserror::Error;

/// Result type for GitHub client operations.
pub type Result<T> = std::result::Result<T, GitHubError>;

/// GitHub client errors.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Transport failure (connection refused, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token cannot be sent as a header value
    #[error("invalid token: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    /// The requested repository or user does not exist (404)
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Any other non-2xx response
    #[error("API error at {url} with code {status}: body={message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("decode error at {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GitHubError {
    /// Whether this error means the remote resource is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitHubError::NotFound { .. })
    }
}
