//! Testing utilities including a mock GitHub.
//!
//! Lets the crawler pipeline run end to end against the in-memory store
//! without network calls.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use github_client::{
    Account, Contributor, GitHubApi, GitHubError, Organization, OwnerKind, Repository,
    RepositoryOwner, RequestCounter, Result, Stargazer, User, PAGE_SIZE,
};

/// Record of a call made to the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockGitHubCall {
    GetRepository { path: String },
    ListContributors { path: String },
    StargazersPage { path: String, page: u32 },
    ListStargazers { path: String },
    GetUser { login: String },
    ListUserOrganizations { login: String },
}

/// A mock GitHub with configurable repositories, stargazers, contributors
/// and organizations. Keys are case-insensitive.
#[derive(Default)]
pub struct MockGitHub {
    repositories: RwLock<HashMap<String, Repository>>,
    stargazers: RwLock<HashMap<String, Vec<Stargazer>>>,
    contributors: RwLock<HashMap<String, Vec<Contributor>>>,
    organizations: RwLock<HashMap<String, Vec<Organization>>>,
    failing_repositories: RwLock<HashSet<String>>,
    failing_pages: RwLock<HashSet<(String, u32)>>,
    flaky_users: RwLock<HashSet<String>>,
    calls: RwLock<Vec<MockGitHubCall>>,
    requests: RequestCounter,
}

fn key(value: &str) -> String {
    value.to_lowercase()
}

/// `count` stargazers `user0..`, oldest first, one every `spacing`.
pub fn stargazers(count: usize, start: DateTime<Utc>, spacing: Duration) -> Vec<Stargazer> {
    (0..count)
        .map(|i| Stargazer {
            user: Account {
                login: format!("user{i}"),
            },
            starred_at: start + spacing * i as i32,
        })
        .collect()
}

/// Upstream repository document for `owner/name`.
pub fn repository(path: &str, stargazers_count: i64, kind: OwnerKind) -> Repository {
    let owner = path.split('/').next().unwrap_or_default();
    Repository {
        full_name: path.to_string(),
        stargazers_count,
        owner: RepositoryOwner {
            login: owner.to_string(),
            kind,
        },
    }
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(self, path: &str, stargazers_count: i64, kind: OwnerKind) -> Self {
        self.set_repository(repository(path, stargazers_count, kind));
        self
    }

    /// Stargazer events for a repository, oldest first.
    pub fn with_stargazers(self, path: &str, events: Vec<Stargazer>) -> Self {
        self.set_stargazers(path, events);
        self
    }

    pub fn with_contributors(self, path: &str, logins: &[&str]) -> Self {
        let contributors = logins
            .iter()
            .map(|login| Contributor {
                login: login.to_string(),
            })
            .collect();
        self.contributors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(path), contributors);
        self
    }

    pub fn with_organizations(self, login: &str, orgs: &[&str]) -> Self {
        let orgs = orgs
            .iter()
            .map(|org| Organization {
                login: org.to_string(),
            })
            .collect();
        self.organizations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(login), orgs);
        self
    }

    /// Every call touching this repository fails with a `500`.
    pub fn with_failing_repository(self, path: &str) -> Self {
        self.failing_repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(path));
        self
    }

    /// Fetching this page fails with a `500`.
    pub fn with_failing_page(self, path: &str, page: u32) -> Self {
        self.failing_pages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((key(path), page));
        self
    }

    /// The next `get_user` for this login fails with a `502`; later calls
    /// succeed.
    pub fn with_flaky_user(self, login: &str) -> Self {
        self.flaky_users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(login));
        self
    }

    pub fn set_repository(&self, repository: Repository) {
        self.repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(&repository.full_name), repository);
    }

    pub fn set_stargazers(&self, path: &str, events: Vec<Stargazer>) {
        self.stargazers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(path), events);
    }

    pub fn calls(&self) -> Vec<MockGitHubCall> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stargazer pages requested for a repository, in request order.
    pub fn page_requests(&self, path: &str) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockGitHubCall::StargazersPage { path: p, page } if p.eq_ignore_ascii_case(path) => {
                    Some(page)
                }
                _ => None,
            })
            .collect()
    }

    /// How many full stargazer listings were requested for a repository.
    pub fn full_listings(&self, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                matches!(call, MockGitHubCall::ListStargazers { path: p } if p.eq_ignore_ascii_case(path))
            })
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: MockGitHubCall) {
        self.requests.increment();
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn check_failure(&self, path: &str) -> Result<()> {
        if self
            .failing_repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&key(path))
        {
            return Err(GitHubError::Api {
                url: format!("mock://repos/{path}"),
                status: 500,
                message: "mock failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn get_repository(&self, path: &str) -> Result<Repository> {
        self.record(MockGitHubCall::GetRepository { path: path.into() });
        self.check_failure(path)?;
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(path))
            .cloned()
            .ok_or_else(|| GitHubError::NotFound {
                resource: format!("mock://repos/{path}"),
            })
    }

    async fn list_contributors(&self, path: &str) -> Result<Vec<Contributor>> {
        self.record(MockGitHubCall::ListContributors { path: path.into() });
        self.check_failure(path)?;
        self.contributors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(path))
            .cloned()
            .ok_or_else(|| GitHubError::NotFound {
                resource: format!("mock://repos/{path}/contributors"),
            })
    }

    async fn stargazers_page(&self, path: &str, page: u32) -> Result<Vec<Stargazer>> {
        self.record(MockGitHubCall::StargazersPage {
            path: path.into(),
            page,
        });
        self.check_failure(path)?;
        if self
            .failing_pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(key(path), page))
        {
            return Err(GitHubError::Api {
                url: format!("mock://repos/{path}/stargazers?page={page}"),
                status: 500,
                message: "mock failure".into(),
            });
        }

        let start = (page.max(1) as usize - 1) * PAGE_SIZE;
        Ok(self
            .stargazers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(path))
            .map(|events| events.iter().skip(start).take(PAGE_SIZE).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_stargazers(&self, path: &str) -> Result<Vec<Stargazer>> {
        self.record(MockGitHubCall::ListStargazers { path: path.into() });
        self.check_failure(path)?;
        let path_key = key(path);
        if let Some((_, page)) = self
            .failing_pages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(p, _)| *p == path_key)
        {
            return Err(GitHubError::Api {
                url: format!("mock://repos/{path}/stargazers?page={page}"),
                status: 500,
                message: "mock failure".into(),
            });
        }
        Ok(self
            .stargazers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&path_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_user(&self, login: &str) -> Result<User> {
        self.record(MockGitHubCall::GetUser {
            login: login.into(),
        });
        if self
            .flaky_users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key(login))
        {
            return Err(GitHubError::Api {
                url: format!("mock://users/{login}"),
                status: 502,
                message: "mock bad gateway".into(),
            });
        }
        Ok(User {
            login: login.to_string(),
        })
    }

    async fn list_user_organizations(&self, login: &str) -> Result<Vec<Organization>> {
        self.record(MockGitHubCall::ListUserOrganizations {
            login: login.into(),
        });
        Ok(self
            .organizations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(login))
            .cloned()
            .unwrap_or_default())
    }

    fn request_count(&self) -> u64 {
        self.requests.get()
    }

    fn reset_request_count(&self) -> u64 {
        self.requests.reset()
    }
}
