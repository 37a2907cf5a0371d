//! Stargazer Crawler Library
//!
//! Tracks which GitHub repositories have been starred, and by whom, for a
//! bounded set of user-requested repositories, and turns the sampled events
//! into adoption statistics.
//!
//! # Design
//!
//! - A repository is tracked only when its owner (or, for organizations,
//!   one of its top contributors) starred the main repository
//! - Large repositories are sampled: a fixed page budget, geometrically
//!   spaced, always including the most recent page
//! - Skipped pages are interpolated as full when building the evolution
//!   series
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stargazer_core::{MemoryStore, TaskQueueWorker, WorkQueue};
//! use stargazer_core::testing::MockGitHub;
//!
//! let store = Arc::new(MemoryStore::new());
//! let github = Arc::new(MockGitHub::new());
//! let worker = TaskQueueWorker::new(github, store.clone(), store.clone(), rules, max_pages);
//!
//! store.create("octo/hello", Utc::now()).await?;
//! worker.run_cycle(&shutdown).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Storage abstractions (SnapshotStore, WorkQueue)
//! - [`types`] - Snapshots, work items and stats
//! - [`pipeline`] - Eligibility, page sampling, aggregation
//! - [`jobs`] - Periodic workers and the quota scheduler
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`intake`] - Request intake policy
//! - [`server`] - JSON API
//! - [`testing`] - Mock GitHub for testing

pub mod config;
pub mod error;
pub mod intake;
pub mod jobs;
pub mod pipeline;
pub mod server;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::Config;
pub use error::{CrawlerError, Ineligibility, Result};
pub use intake::{IntakeOutcome, IntakePolicy};
pub use jobs::{
    start_quota_scheduler, ItemOutcome, MainRepositoryWorker, TaskQueueWorker, Worker,
    WorkerRunner,
};
pub use pipeline::{
    aggregate::compute_stats,
    eligibility::{Eligibility, EligibilityRules},
    sampler::{expected_pages, plan_pages, refresh_stargazers, PageBudget, SampleReport},
};
pub use traits::{
    queue::WorkQueue,
    store::{RepositoryStore, SnapshotStore, StargazerStore, UserStore},
};
pub use types::{
    snapshot::{RepositorySnapshot, StargazerRecord, UserSnapshot},
    stats::{Adopter, Measure, Stats},
    work_item::{WorkItem, WorkStatus},
};

pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
