//! Decides whether a requested repository may be tracked.
//!
//! A repository is tracked only when its owner, one of the owner's
//! organizations, or (for organizations) one of its top contributors has
//! starred the main repository. Checks run cheapest first and stop at the
//! first failure.

use github_client::{GitHubApi, GitHubError, OwnerKind};

use crate::error::{Ineligibility, Result};
use crate::traits::store::SnapshotStore;
use crate::types::snapshot::RepositorySnapshot;

#[derive(Debug, Clone)]
pub struct EligibilityRules {
    /// Repository whose stargazers gate everything else
    pub main_repository: String,
    /// Paths never tracked (case-insensitive)
    pub exclusions: Vec<String>,
    /// Top contributors checked for organization-owned repositories
    pub contributors_to_check: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Upstream snapshot, already persisted
    Eligible(RepositorySnapshot),
    Ineligible(Ineligibility),
}

/// Split `owner/name`. Both parts must be non-empty and there must be
/// exactly one separator.
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    let (owner, name) = path.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

impl EligibilityRules {
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(path))
    }

    /// Run every check against `path`. On success the upstream snapshot is
    /// upserted before returning.
    ///
    /// Upstream `404`s make the repository ineligible; any other upstream or
    /// storage failure is returned as an error so the item is retried.
    pub async fn check(
        &self,
        github: &dyn GitHubApi,
        store: &dyn SnapshotStore,
        path: &str,
    ) -> Result<Eligibility> {
        let Some((owner, _)) = split_path(path) else {
            return Ok(Eligibility::Ineligible(Ineligibility::MalformedPath));
        };

        if self.is_excluded(path) {
            return Ok(Eligibility::Ineligible(Ineligibility::Excluded));
        }

        let owner_login = [owner.to_lowercase()];
        if !store
            .any_linked_stargazer(&self.main_repository, &owner_login)
            .await?
        {
            return Ok(Eligibility::Ineligible(Ineligibility::NoLinkedStargazer));
        }

        let repository = match github.get_repository(path).await {
            Ok(repository) => repository,
            Err(e) if e.is_not_found() => {
                return Ok(Eligibility::Ineligible(Ineligibility::NotFoundUpstream))
            }
            Err(e) => return Err(e.into()),
        };

        if repository.owner.kind == OwnerKind::Organization {
            tracing::debug!(repository = %path, "Owner is an organization, checking contributors");
            let contributors = match github.list_contributors(&repository.full_name).await {
                Ok(contributors) => contributors,
                Err(GitHubError::NotFound { .. }) => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            if contributors.is_empty() {
                return Ok(Eligibility::Ineligible(Ineligibility::NoLinkedContributor));
            }

            let logins: Vec<String> = contributors
                .iter()
                .take(self.contributors_to_check)
                .map(|c| c.login.to_lowercase())
                .collect();
            if !store
                .any_linked_stargazer(&self.main_repository, &logins)
                .await?
            {
                return Ok(Eligibility::Ineligible(Ineligibility::NoLinkedContributor));
            }
        }

        let snapshot = RepositorySnapshot::from_upstream(path, repository);
        store.upsert_repository(&snapshot).await?;
        Ok(Eligibility::Eligible(snapshot))
    }
}
