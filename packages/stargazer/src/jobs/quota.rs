//! GitHub request accounting using tokio-cron-scheduler.
//!
//! Logs the request count every minute and resets it when the hour changes,
//! matching GitHub's hourly rate-limit window.

use std::sync::Arc;

use anyhow::Result;
use github_client::GitHubApi;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Start the quota report (every minute) and reset (top of every hour) jobs.
pub async fn start_quota_scheduler(github: Arc<dyn GitHubApi>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let report_github = github.clone();
    let report_job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let github = report_github.clone();
        Box::pin(async move {
            tracing::info!(
                request_count = github.request_count(),
                "GitHub requests for current hour"
            );
        })
    })?;

    scheduler.add(report_job).await?;

    let reset_github = github.clone();
    let reset_job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let github = reset_github.clone();
        Box::pin(async move {
            let previous = github.reset_request_count();
            tracing::info!(request_count = previous, "Hour changed, GitHub request count reset");
        })
    })?;

    scheduler.add(reset_job).await?;
    scheduler.start().await?;

    tracing::info!("Quota tasks started (report every minute, reset every hour)");
    Ok(scheduler)
}
