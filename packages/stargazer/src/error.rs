//! Typed errors for the crawler.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the binary wraps them
//! with context.

use std::fmt;

use github_client::GitHubError;
use thiserror::Error;

/// Infrastructure failures. These abort the current cycle and leave the work
/// item untouched so the next cycle retries it.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// Upstream API call failed
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage operation exceeded the per-call deadline
    #[error("store operation timed out: {operation}")]
    Timeout { operation: &'static str },
}

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Why a repository cannot be tracked. Not a failure: the work item is
/// deleted and the reason logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    MalformedPath,
    Excluded,
    NoLinkedStargazer,
    NotFoundUpstream,
    NoLinkedContributor,
}

impl Ineligibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ineligibility::MalformedPath => "malformed path",
            Ineligibility::Excluded => "excluded",
            Ineligibility::NoLinkedStargazer => "no linked stargazer",
            Ineligibility::NotFoundUpstream => "not found upstream",
            Ineligibility::NoLinkedContributor => "no linked contributor",
        }
    }
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
