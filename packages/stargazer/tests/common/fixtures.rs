//! Crawler fixtures wired to the in-memory store and mock GitHub.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use github_client::{Account, OwnerKind, Stargazer};
use stargazer_core::testing::MockGitHub;
use stargazer_core::{EligibilityRules, MainRepositoryWorker, MemoryStore, TaskQueueWorker};

pub const MAIN: &str = "richardlt/stargazer";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One event per login, a day apart, oldest first.
pub fn named_stargazers(logins: &[&str]) -> Vec<Stargazer> {
    logins
        .iter()
        .enumerate()
        .map(|(i, login)| Stargazer {
            user: Account {
                login: login.to_string(),
            },
            starred_at: t0() + Duration::days(i as i64),
        })
        .collect()
}

/// A mock where `main_stargazers` starred the main repository.
pub fn github_with_main(main_stargazers: &[&str]) -> MockGitHub {
    MockGitHub::new()
        .with_repository(MAIN, main_stargazers.len() as i64, OwnerKind::User)
        .with_stargazers(MAIN, named_stargazers(main_stargazers))
}

pub struct Crawler {
    pub github: Arc<MockGitHub>,
    pub store: Arc<MemoryStore>,
    pub main: MainRepositoryWorker,
    pub tasks: TaskQueueWorker,
}

pub fn rules() -> EligibilityRules {
    EligibilityRules {
        main_repository: MAIN.to_string(),
        exclusions: vec![MAIN.to_string()],
        contributors_to_check: 3,
    }
}

pub fn crawler(github: MockGitHub) -> Crawler {
    crawler_with(github, rules(), 10, Duration::hours(1))
}

pub fn crawler_with(
    github: MockGitHub,
    rules: EligibilityRules,
    max_pages: u32,
    user_ttl: Duration,
) -> Crawler {
    init_tracing();
    let github = Arc::new(github);
    let store = Arc::new(MemoryStore::new());
    let main = MainRepositoryWorker::new(github.clone(), store.clone(), MAIN, user_ttl);
    let tasks = TaskQueueWorker::new(
        github.clone(),
        store.clone(),
        store.clone(),
        rules,
        NonZeroU32::new(max_pages).unwrap(),
    );
    Crawler {
        github,
        store,
        main,
        tasks,
    }
}
