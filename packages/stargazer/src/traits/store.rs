//! Storage traits for repositories, stargazer records, and users.
//!
//! Split the same way the data is keyed:
//! - `RepositoryStore`: snapshots keyed by path
//! - `StargazerStore`: sampled records per repository, with grouped reads
//! - `UserStore`: cached users and their organizations
//! - `SnapshotStore`: composite trait combining all three

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    snapshot::{RepositorySnapshot, StargazerRecord, UserSnapshot},
    stats::Measure,
};

#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn get_repository(&self, path: &str) -> Result<Option<RepositorySnapshot>>;

    /// Insert or replace the snapshot stored under `snapshot.path`.
    async fn upsert_repository(&self, snapshot: &RepositorySnapshot) -> Result<()>;
}

/// Sampled stargazer records.
#[async_trait]
pub trait StargazerStore: Send + Sync {
    async fn count_stargazers(&self, repository: &str) -> Result<u64>;

    /// All records for a repository, most recent first.
    async fn list_stargazers(&self, repository: &str) -> Result<Vec<StargazerRecord>>;

    /// Remove every record for a repository.
    async fn delete_stargazers(&self, repository: &str) -> Result<()>;

    async fn insert_stargazers(&self, records: &[StargazerRecord]) -> Result<()>;

    /// Swap a repository's record set for `records`.
    ///
    /// The default deletes then inserts; implementations that can should do
    /// both atomically so readers never observe an empty set.
    async fn replace_stargazers(
        &self,
        repository: &str,
        records: &[StargazerRecord],
    ) -> Result<()> {
        self.delete_stargazers(repository).await?;
        self.insert_stargazers(records).await
    }

    /// Record counts grouped by (page, UTC day), ordered by page then day.
    /// Every returned measure has `page` set.
    async fn daily_counts_by_page(&self, repository: &str) -> Result<Vec<Measure>>;

    /// Record counts of the last-page records grouped by UTC day, oldest first.
    async fn last_page_daily_counts(&self, repository: &str) -> Result<Vec<Measure>>;

    /// The `limit` most recent last-page records, most recent first.
    async fn latest_last_page(
        &self,
        repository: &str,
        limit: usize,
    ) -> Result<Vec<StargazerRecord>>;

    /// Whether any recorded stargazer of `repository` has a login in
    /// `logins`, or a cached user with an organization in `logins`.
    /// Comparison is case-insensitive.
    async fn any_linked_stargazer(&self, repository: &str, logins: &[String]) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, login: &str) -> Result<Option<UserSnapshot>>;

    async fn upsert_user(&self, user: &UserSnapshot) -> Result<()>;
}

/// Composite trait for full snapshot storage.
pub trait SnapshotStore: RepositoryStore + StargazerStore + UserStore {}

impl<T> SnapshotStore for T where T: RepositoryStore + StargazerStore + UserStore {}
