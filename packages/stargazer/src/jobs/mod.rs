//! Background workers.
//!
//! ```text
//! WorkerRunner (main scan delay)
//!     └─► MainRepositoryWorker: sample main repo in full, cache users
//! WorkerRunner (task scan delay)
//!     └─► TaskQueueWorker: eligibility ─► sampler ─► aggregate ─► Generated
//! JobScheduler
//!     └─► quota report (minutely) and reset (hourly)
//! ```

pub mod main_repository;
pub mod quota;
pub mod runner;
pub mod task_queue;

pub use main_repository::MainRepositoryWorker;
pub use quota::start_quota_scheduler;
pub use runner::{Worker, WorkerRunner};
pub use task_queue::{ItemOutcome, TaskQueueWorker};
