//! Typed GitHub REST API client.
//!
//! A minimal client for the handful of endpoints the stargazer crawler needs:
//! repository metadata, contributors, stargazer pages, users and their
//! organizations. Every request is counted in a shared [`RequestCounter`] so
//! the caller can report and reset its hourly quota usage.
//!
//! # Example
//!
//! ```rust,ignore
//! use github_client::{GitHubApi, GitHubClient};
//!
//! let client = GitHubClient::new("ghp_token")?;
//!
//! let repo = client.get_repository("rust-lang/rust").await?;
//! let latest = client.stargazers_page(&repo.full_name, 1).await?;
//! println!("{} requests so far", client.request_count());
//! ```

pub mod counter;
pub mod error;
pub mod token;
pub mod types;

pub use counter::RequestCounter;
pub use error::{GitHubError, Result};
pub use token::Token;
pub use types::{
    Account, Contributor, Organization, OwnerKind, Repository, RepositoryOwner, Stargazer, User,
};

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.github.com";

/// Media type that makes the stargazers endpoint include `starred_at`.
const STAR_MEDIA_TYPE: &str = "application/vnd.github.v3.star+json";

/// GitHub caps `per_page` at 100.
pub const PAGE_SIZE: usize = 100;

const USER_AGENT: &str = "stargazer-crawler";

/// The GitHub operations used by the crawler.
///
/// Implemented by [`GitHubClient`]; tests substitute an in-memory mock.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Repository metadata by `owner/name`.
    async fn get_repository(&self, path: &str) -> Result<Repository>;

    /// Contributors ordered by contribution count (first page only).
    async fn list_contributors(&self, path: &str) -> Result<Vec<Contributor>>;

    /// One page (1-indexed, 100 items) of stargazer events.
    async fn stargazers_page(&self, path: &str, page: u32) -> Result<Vec<Stargazer>>;

    /// Every stargazer event, following pages until a short page.
    async fn list_stargazers(&self, path: &str) -> Result<Vec<Stargazer>>;

    async fn get_user(&self, login: &str) -> Result<User>;

    async fn list_user_organizations(&self, login: &str) -> Result<Vec<Organization>>;

    /// Requests issued since the last reset.
    fn request_count(&self) -> u64;

    /// Reset the request count, returning the previous value.
    fn reset_request_count(&self) -> u64;
}

pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    requests: Arc<RequestCounter>,
}

impl GitHubClient {
    pub fn new(token: impl Into<Token>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, token.into().authorization_header()?);
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            requests: Arc::new(RequestCounter::new()),
        })
    }

    /// Point the client at another API root (GitHub Enterprise, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Shared handle on the request counter.
    pub fn request_counter(&self) -> Arc<RequestCounter> {
        self.requests.clone()
    }

    /// Issue an authenticated GET. Returns `None` for `204 No Content`.
    async fn fetch(&self, url: &str, accept: Option<&str>) -> Result<Option<String>> {
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }

        let count = self.requests.increment();
        tracing::debug!(url, request_count = count, "GitHub request");

        let resp = request.send().await?;
        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound {
                resource: url.to_string(),
            });
        }
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(GitHubError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(Some(body))
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, accept: Option<&str>) -> Result<T> {
        let body = self.fetch(url, accept).await?.unwrap_or_default();
        decode(url, &body)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: Option<&str>,
    ) -> Result<Vec<T>> {
        match self.fetch(url, accept).await? {
            Some(body) => decode(url, &body),
            None => Ok(Vec::new()),
        }
    }

    async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            tracing::debug!(url, page, "Loading paginated page");
            let batch: Vec<T> = self.get_list(&page_url(url, page), accept).await?;
            let len = batch.len();
            items.extend(batch);
            if len < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| GitHubError::Decode {
        url: url.to_string(),
        source,
    })
}

fn page_url(url: &str, page: u32) -> String {
    format!("{}?page={}&per_page={}", url, page, PAGE_SIZE)
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn get_repository(&self, path: &str) -> Result<Repository> {
        let url = format!("{}/repos/{}", self.base_url, path);
        self.get(&url, None).await
    }

    async fn list_contributors(&self, path: &str) -> Result<Vec<Contributor>> {
        let url = format!("{}/repos/{}/contributors", self.base_url, path);
        self.get_list(&url, None).await
    }

    async fn stargazers_page(&self, path: &str, page: u32) -> Result<Vec<Stargazer>> {
        let url = format!("{}/repos/{}/stargazers", self.base_url, path);
        self.get_list(&page_url(&url, page), Some(STAR_MEDIA_TYPE))
            .await
    }

    async fn list_stargazers(&self, path: &str) -> Result<Vec<Stargazer>> {
        let url = format!("{}/repos/{}/stargazers", self.base_url, path);
        self.get_paginated(&url, Some(STAR_MEDIA_TYPE)).await
    }

    async fn get_user(&self, login: &str) -> Result<User> {
        let url = format!("{}/users/{}", self.base_url, login);
        self.get(&url, None).await
    }

    async fn list_user_organizations(&self, login: &str) -> Result<Vec<Organization>> {
        let url = format!("{}/users/{}/orgs", self.base_url, login);
        self.get_paginated(&url, None).await
    }

    fn request_count(&self) -> u64 {
        self.requests.get()
    }

    fn reset_request_count(&self) -> u64 {
        self.requests.reset()
    }
}
