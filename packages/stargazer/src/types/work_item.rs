//! User-requested repositories awaiting or holding computed stats.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Requested,
    Generated,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Requested => "requested",
            WorkStatus::Generated => "generated",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(WorkStatus::Requested),
            "generated" => Ok(WorkStatus::Generated),
            other => Err(format!("unknown work status: {other}")),
        }
    }
}

/// A repository path someone asked stats for.
///
/// `repository` is unique across the queue. Items only move
/// `Requested -> Generated` in the crawler; intake moves them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: i64,
    pub repository: String,
    pub status: WorkStatus,
    pub stats: Stats,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub last_requested_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    /// Mark as generated with fresh stats.
    pub fn complete(&mut self, stats: Stats, now: DateTime<Utc>) {
        self.stats = stats;
        self.status = WorkStatus::Generated;
        self.last_generated_at = Some(now);
    }
}
