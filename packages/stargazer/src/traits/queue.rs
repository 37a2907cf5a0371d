//! Work queue of user-requested repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    stats::Stats,
    work_item::{WorkItem, WorkStatus},
};

#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Items with the given status, oldest first.
    async fn list_by_status(&self, status: WorkStatus) -> Result<Vec<WorkItem>>;

    async fn get(&self, repository: &str) -> Result<Option<WorkItem>>;

    /// Create a `Requested` item. The repository must not already be queued.
    async fn create(&self, repository: &str, now: DateTime<Utc>) -> Result<WorkItem>;

    /// Persist every mutable field and stamp `updated_at`.
    async fn update(&self, item: &WorkItem) -> Result<WorkItem>;

    /// Store freshly generated stats and flip the item to `Generated`.
    ///
    /// Touches only status, stats and generation time, so a request stamped
    /// while the crawler was working is kept. `None` if the item is gone.
    async fn mark_generated(
        &self,
        repository: &str,
        stats: &Stats,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkItem>>;

    async fn delete(&self, repository: &str) -> Result<()>;

    async fn count(&self) -> Result<u64>;
}
