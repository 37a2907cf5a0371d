//! Request intake: turns a page view of `owner/name` into queue state.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::queue::WorkQueue;
use crate::types::work_item::{WorkItem, WorkStatus};

#[derive(Debug, Clone)]
pub struct IntakePolicy {
    /// New paths are refused once the queue holds this many items
    pub max_entries: u64,
    /// Generated stats younger than this are served as is. Zero regenerates
    /// on every request.
    pub regenerate_delay: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Created(WorkItem),
    /// Generated stats were stale; the item is back to `Requested`
    Requeued(WorkItem),
    Unchanged(WorkItem),
    Rejected { count: u64, max_entries: u64 },
}

impl IntakePolicy {
    fn can_regenerate(&self, item: &WorkItem, now: DateTime<Utc>) -> bool {
        if self.regenerate_delay == Duration::zero() {
            return true;
        }
        match item.last_generated_at {
            Some(generated_at) => now - generated_at > self.regenerate_delay,
            None => true,
        }
    }

    /// Record a request for `repository` at `now`.
    pub async fn request_repository(
        &self,
        queue: &dyn WorkQueue,
        repository: &str,
        now: DateTime<Utc>,
    ) -> Result<IntakeOutcome> {
        let Some(mut item) = queue.get(repository).await? else {
            let count = queue.count().await?;
            if count >= self.max_entries {
                warn!(repository, count, max_entries = self.max_entries, "Max entries count reached");
                return Ok(IntakeOutcome::Rejected {
                    count,
                    max_entries: self.max_entries,
                });
            }
            let item = queue.create(repository, now).await?;
            debug!(repository, "New entry created");
            return Ok(IntakeOutcome::Created(item));
        };

        item.last_requested_at = now;
        let requeue = item.status == WorkStatus::Generated && self.can_regenerate(&item, now);
        if requeue {
            item.status = WorkStatus::Requested;
        }

        let item = queue.update(&item).await?;
        debug!(repository, requeued = requeue, "Entry updated");
        Ok(if requeue {
            IntakeOutcome::Requeued(item)
        } else {
            IntakeOutcome::Unchanged(item)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::types::stats::Stats;

    fn policy(max_entries: u64, regenerate_secs: i64) -> IntakePolicy {
        IntakePolicy {
            max_entries,
            regenerate_delay: Duration::seconds(regenerate_secs),
        }
    }

    async fn generated(queue: &MemoryStore, repository: &str, at: DateTime<Utc>) {
        let mut item = queue.create(repository, at).await.unwrap();
        item.complete(Stats::default(), at);
        queue.update(&item).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_path_creates_requested_item() {
        let queue = MemoryStore::new();
        let now = Utc::now();
        let outcome = policy(10, 60)
            .request_repository(&queue, "a/b", now)
            .await
            .unwrap();
        let IntakeOutcome::Created(item) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert_eq!(item.status, WorkStatus::Requested);
        assert_eq!(item.last_requested_at, now);
    }

    #[tokio::test]
    async fn test_rejected_when_queue_full() {
        let queue = MemoryStore::new();
        let now = Utc::now();
        queue.create("a/one", now).await.unwrap();
        queue.create("a/two", now).await.unwrap();

        let outcome = policy(2, 60)
            .request_repository(&queue, "a/three", now)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            IntakeOutcome::Rejected {
                count: 2,
                max_entries: 2
            }
        );
        assert!(queue.get("a/three").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_known_path_accepted_even_when_full() {
        let queue = MemoryStore::new();
        let now = Utc::now();
        queue.create("a/one", now).await.unwrap();

        let outcome = policy(1, 60)
            .request_repository(&queue, "a/one", now)
            .await
            .unwrap();
        assert!(matches!(outcome, IntakeOutcome::Unchanged(_)));
    }

    #[tokio::test]
    async fn test_fresh_stats_are_not_regenerated() {
        let queue = MemoryStore::new();
        let generated_at = Utc::now();
        generated(&queue, "a/b", generated_at).await;

        let now = generated_at + Duration::seconds(30);
        let outcome = policy(10, 60)
            .request_repository(&queue, "a/b", now)
            .await
            .unwrap();
        let IntakeOutcome::Unchanged(item) = outcome else {
            panic!("expected Unchanged, got {outcome:?}");
        };
        assert_eq!(item.status, WorkStatus::Generated);
        assert_eq!(item.last_requested_at, now);
    }

    #[tokio::test]
    async fn test_stale_stats_are_requeued() {
        let queue = MemoryStore::new();
        let generated_at = Utc::now();
        generated(&queue, "a/b", generated_at).await;

        let outcome = policy(10, 60)
            .request_repository(&queue, "a/b", generated_at + Duration::seconds(61))
            .await
            .unwrap();
        assert!(matches!(outcome, IntakeOutcome::Requeued(_)));
        assert_eq!(
            queue.get("a/b").await.unwrap().unwrap().status,
            WorkStatus::Requested
        );
    }

    #[tokio::test]
    async fn test_zero_delay_always_requeues() {
        let queue = MemoryStore::new();
        let generated_at = Utc::now();
        generated(&queue, "a/b", generated_at).await;

        let outcome = policy(10, 0)
            .request_repository(&queue, "a/b", generated_at)
            .await
            .unwrap();
        assert!(matches!(outcome, IntakeOutcome::Requeued(_)));
    }
}
