//! Keeps the main repository's stargazers and their users fresh.
//!
//! The main repository's stargazers gate eligibility for every other
//! repository, so it is always sampled in full and each adopter's
//! organizations are cached. Stargazers are resampled only when the star
//! count moves; missing or expired users are refreshed every cycle.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use github_client::GitHubApi;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Result;
use crate::jobs::runner::Worker;
use crate::pipeline::sampler::{self, PageBudget};
use crate::traits::store::SnapshotStore;
use crate::types::snapshot::{RepositorySnapshot, UserSnapshot};

pub struct MainRepositoryWorker {
    github: Arc<dyn GitHubApi>,
    store: Arc<dyn SnapshotStore>,
    main_repository: String,
    /// Zero disables expiry: users are fetched once
    user_ttl: Duration,
}

impl MainRepositoryWorker {
    pub fn new(
        github: Arc<dyn GitHubApi>,
        store: Arc<dyn SnapshotStore>,
        main_repository: impl Into<String>,
        user_ttl: Duration,
    ) -> Self {
        Self {
            github,
            store,
            main_repository: main_repository.into(),
            user_ttl,
        }
    }

    /// Refresh users missing from the cache, or expired when a TTL is set.
    /// Returns how many were fetched.
    async fn refresh_users(&self, shutdown: &CancellationToken) -> Result<usize> {
        let records = self.store.list_stargazers(&self.main_repository).await?;
        let mut refreshed = 0;

        for record in records {
            if shutdown.is_cancelled() {
                break;
            }

            let now = Utc::now();
            let stale = match self.store.get_user(&record.login).await? {
                None => true,
                Some(user) => self.user_ttl > Duration::zero() && user.is_expired(now),
            };
            if !stale {
                continue;
            }

            debug!(login = %record.login, "Refreshing user");
            let user = self.github.get_user(&record.login).await?;
            let organizations = self
                .github
                .list_user_organizations(&user.login)
                .await?
                .into_iter()
                .map(|org| org.login)
                .collect();

            let expires_at = now
                .checked_add_signed(self.user_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.store
                .upsert_user(&UserSnapshot {
                    login: record.login,
                    expires_at,
                    organizations,
                })
                .await?;
            refreshed += 1;
        }

        Ok(refreshed)
    }
}

#[async_trait]
impl Worker for MainRepositoryWorker {
    fn name(&self) -> &'static str {
        "main-repository"
    }

    async fn run_cycle(&self, shutdown: &CancellationToken) -> Result<()> {
        info!(repository = %self.main_repository, "Scanning main repository");

        let upstream = self.github.get_repository(&self.main_repository).await?;
        let stored = self.store.get_repository(&self.main_repository).await?;
        let recorded = self.store.count_stargazers(&self.main_repository).await?;

        let changed = stored.is_none() || upstream.stargazers_count != recorded as i64;
        if changed {
            let snapshot = RepositorySnapshot::from_upstream(&self.main_repository, upstream);
            self.store.upsert_repository(&snapshot).await?;

            let report = sampler::refresh_stargazers(
                &*self.github,
                &*self.store,
                &snapshot,
                PageBudget::Unbounded,
            )
            .await?;
            info!(
                repository = %self.main_repository,
                star_count = snapshot.star_count,
                records = report.records,
                "Main repository stargazers refreshed"
            );
        } else {
            debug!(
                repository = %self.main_repository,
                star_count = upstream.stargazers_count,
                "Main repository unchanged"
            );
        }

        // Runs on unchanged cycles too, so an interrupted refresh resumes
        let refreshed = self.refresh_users(shutdown).await?;
        if refreshed > 0 {
            info!(
                repository = %self.main_repository,
                users_refreshed = refreshed,
                "Main repository users refreshed"
            );
        }
        Ok(())
    }
}
