//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::pipeline::aggregate;
use crate::traits::{
    queue::WorkQueue,
    store::{RepositoryStore, StargazerStore, UserStore},
};
use crate::types::{
    snapshot::{RepositorySnapshot, StargazerRecord, UserSnapshot},
    stats::{Measure, Stats},
    work_item::{WorkItem, WorkStatus},
};

/// In-memory snapshots and work queue.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    repositories: RwLock<HashMap<String, RepositorySnapshot>>,
    stargazers: RwLock<HashMap<String, Vec<StargazerRecord>>>,
    users: RwLock<HashMap<String, UserSnapshot>>,
    entries: RwLock<HashMap<String, WorkItem>>,
    next_id: RwLock<i64>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records currently stored for a repository, in insertion order.
    pub fn stargazer_records(&self, repository: &str) -> Vec<StargazerRecord> {
        read(&self.stargazers)
            .get(repository)
            .cloned()
            .unwrap_or_default()
    }

    pub fn user_count(&self) -> usize {
        read(&self.users).len()
    }
}

#[async_trait]
impl RepositoryStore for MemoryStore {
    async fn get_repository(&self, path: &str) -> Result<Option<RepositorySnapshot>> {
        Ok(read(&self.repositories).get(path).cloned())
    }

    async fn upsert_repository(&self, snapshot: &RepositorySnapshot) -> Result<()> {
        write(&self.repositories).insert(snapshot.path.clone(), snapshot.clone());
        Ok(())
    }
}

#[async_trait]
impl StargazerStore for MemoryStore {
    async fn count_stargazers(&self, repository: &str) -> Result<u64> {
        Ok(read(&self.stargazers)
            .get(repository)
            .map_or(0, |records| records.len() as u64))
    }

    async fn list_stargazers(&self, repository: &str) -> Result<Vec<StargazerRecord>> {
        let mut records = self.stargazer_records(repository);
        records.sort_by(|a, b| b.starred_at.cmp(&a.starred_at));
        Ok(records)
    }

    async fn delete_stargazers(&self, repository: &str) -> Result<()> {
        write(&self.stargazers).remove(repository);
        Ok(())
    }

    async fn insert_stargazers(&self, records: &[StargazerRecord]) -> Result<()> {
        let mut stargazers = write(&self.stargazers);
        for record in records {
            stargazers
                .entry(record.repository_path.clone())
                .or_default()
                .push(record.clone());
        }
        Ok(())
    }

    async fn replace_stargazers(
        &self,
        repository: &str,
        records: &[StargazerRecord],
    ) -> Result<()> {
        write(&self.stargazers).insert(repository.to_string(), records.to_vec());
        Ok(())
    }

    async fn daily_counts_by_page(&self, repository: &str) -> Result<Vec<Measure>> {
        Ok(aggregate::group_by_page_and_day(&self.stargazer_records(repository)))
    }

    async fn last_page_daily_counts(&self, repository: &str) -> Result<Vec<Measure>> {
        Ok(aggregate::group_last_page_by_day(&self.stargazer_records(repository)))
    }

    async fn latest_last_page(
        &self,
        repository: &str,
        limit: usize,
    ) -> Result<Vec<StargazerRecord>> {
        Ok(aggregate::latest_last_page(&self.stargazer_records(repository), limit))
    }

    async fn any_linked_stargazer(&self, repository: &str, logins: &[String]) -> Result<bool> {
        let wanted: Vec<String> = logins.iter().map(|l| l.to_lowercase()).collect();
        let matches = |login: &str| wanted.iter().any(|w| w.eq_ignore_ascii_case(login));

        let users = read(&self.users);
        let linked = read(&self.stargazers)
            .get(repository)
            .is_some_and(|records| {
                records.iter().any(|record| {
                    matches(&record.login)
                        || users
                            .values()
                            .filter(|u| u.login.eq_ignore_ascii_case(&record.login))
                            .any(|u| u.organizations.iter().any(|org| matches(org)))
                })
            });
        Ok(linked)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, login: &str) -> Result<Option<UserSnapshot>> {
        Ok(read(&self.users).get(&login.to_lowercase()).cloned())
    }

    async fn upsert_user(&self, user: &UserSnapshot) -> Result<()> {
        write(&self.users).insert(user.login.to_lowercase(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl WorkQueue for MemoryStore {
    async fn list_by_status(&self, status: WorkStatus) -> Result<Vec<WorkItem>> {
        let mut items: Vec<WorkItem> = read(&self.entries)
            .values()
            .filter(|item| item.status == status)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn get(&self, repository: &str) -> Result<Option<WorkItem>> {
        Ok(read(&self.entries).get(repository).cloned())
    }

    async fn create(&self, repository: &str, now: DateTime<Utc>) -> Result<WorkItem> {
        let id = {
            let mut next_id = write(&self.next_id);
            *next_id += 1;
            *next_id
        };
        let item = WorkItem {
            id,
            repository: repository.to_string(),
            status: WorkStatus::Requested,
            stats: Stats::default(),
            last_generated_at: None,
            last_requested_at: now,
            created_at: now,
            updated_at: now,
        };
        write(&self.entries).insert(repository.to_string(), item.clone());
        Ok(item)
    }

    async fn update(&self, item: &WorkItem) -> Result<WorkItem> {
        let mut updated = item.clone();
        updated.updated_at = Utc::now();
        write(&self.entries).insert(item.repository.clone(), updated.clone());
        Ok(updated)
    }

    async fn mark_generated(
        &self,
        repository: &str,
        stats: &Stats,
        now: DateTime<Utc>,
    ) -> Result<Option<WorkItem>> {
        let mut entries = write(&self.entries);
        Ok(entries.get_mut(repository).map(|item| {
            item.complete(stats.clone(), now);
            item.updated_at = Utc::now();
            item.clone()
        }))
    }

    async fn delete(&self, repository: &str) -> Result<()> {
        write(&self.entries).remove(repository);
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(read(&self.entries).len() as u64)
    }
}
