//! Raw upstream data kept per repository and per user.

use chrono::{DateTime, Utc};
use github_client::{OwnerKind, Repository};
use serde::{Deserialize, Serialize};

/// Latest metadata fetched for a repository. Keyed by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub path: String,
    pub owner_kind: OwnerKind,
    pub star_count: i64,
    /// The upstream document as last fetched
    pub metadata: Repository,
}

impl RepositorySnapshot {
    /// Build a snapshot stored under `path` (the requested path, which may
    /// differ in case from the canonical `full_name`).
    pub fn from_upstream(path: impl Into<String>, repository: Repository) -> Self {
        Self {
            path: path.into(),
            owner_kind: repository.owner.kind,
            star_count: repository.stargazers_count,
            metadata: repository,
        }
    }
}

/// One sampled stargazer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StargazerRecord {
    pub repository_path: String,
    pub page: u32,
    /// Set on every record of the page presumed to hold the most recent adopters
    pub is_last_page: bool,
    pub login: String,
    pub starred_at: DateTime<Utc>,
}

/// Cached user with its organization logins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub login: String,
    pub expires_at: DateTime<Utc>,
    pub organizations: Vec<String>,
}

impl UserSnapshot {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
