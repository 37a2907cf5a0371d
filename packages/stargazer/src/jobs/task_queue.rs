//! Processes user-requested repositories.
//!
//! Each `Requested` item is checked, sampled within the page budget, and
//! aggregated into stats. Items are handled one at a time in queue order;
//! an infrastructure error aborts the rest of the cycle.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use github_client::GitHubApi;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Ineligibility, Result};
use crate::jobs::runner::Worker;
use crate::pipeline::{
    aggregate,
    eligibility::{Eligibility, EligibilityRules},
    sampler::{self, PageBudget},
};
use crate::traits::{queue::WorkQueue, store::SnapshotStore};
use crate::types::work_item::{WorkItem, WorkStatus};

/// What happened to one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Generated,
    Deleted(Ineligibility),
}

pub struct TaskQueueWorker {
    github: Arc<dyn GitHubApi>,
    store: Arc<dyn SnapshotStore>,
    queue: Arc<dyn WorkQueue>,
    rules: EligibilityRules,
    max_pages: NonZeroU32,
}

impl TaskQueueWorker {
    pub fn new(
        github: Arc<dyn GitHubApi>,
        store: Arc<dyn SnapshotStore>,
        queue: Arc<dyn WorkQueue>,
        rules: EligibilityRules,
        max_pages: NonZeroU32,
    ) -> Self {
        Self {
            github,
            store,
            queue,
            rules,
            max_pages,
        }
    }

    /// Check, sample and aggregate one item.
    pub async fn process(&self, item: WorkItem) -> Result<ItemOutcome> {
        info!(repository = %item.repository, "Processing requested repository");

        let snapshot = match self
            .rules
            .check(&*self.github, &*self.store, &item.repository)
            .await?
        {
            Eligibility::Eligible(snapshot) => snapshot,
            Eligibility::Ineligible(reason) => {
                info!(repository = %item.repository, %reason, "Deleting ineligible repository");
                self.queue.delete(&item.repository).await?;
                return Ok(ItemOutcome::Deleted(reason));
            }
        };

        let budget = PageBudget::for_repository(
            &snapshot.path,
            &self.rules.main_repository,
            self.max_pages,
        );
        sampler::refresh_stargazers(&*self.github, &*self.store, &snapshot, budget).await?;

        let now = Utc::now();
        let stats = aggregate::compute_stats(&*self.store, &snapshot, now).await?;
        if self
            .queue
            .mark_generated(&item.repository, &stats, now)
            .await?
            .is_none()
        {
            warn!(repository = %item.repository, "Item removed while processing, stats dropped");
        }

        info!(repository = %item.repository, count_stars = stats.count_stars, "Stats generated");
        Ok(ItemOutcome::Generated)
    }
}

#[async_trait]
impl Worker for TaskQueueWorker {
    fn name(&self) -> &'static str {
        "task-queue"
    }

    async fn run_cycle(&self, shutdown: &CancellationToken) -> Result<()> {
        let items = self.queue.list_by_status(WorkStatus::Requested).await?;
        info!(count = items.len(), "Requested repositories to process");

        for item in items {
            if shutdown.is_cancelled() {
                break;
            }
            self.process(item).await?;
        }
        Ok(())
    }
}
