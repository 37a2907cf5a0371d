//! Bounded sampling of stargazer pages.
//!
//! Stargazer events come back oldest first, 100 per page, so the last page
//! holds the most recent adopters. Large repositories are sampled: the last
//! page, then geometrically spaced pages down to page 1.

use std::num::NonZeroU32;

use crate::error::Result;
use crate::traits::store::SnapshotStore;
use crate::types::snapshot::{RepositorySnapshot, StargazerRecord};
use github_client::{GitHubApi, Stargazer, PAGE_SIZE};

/// Upstream refuses pages past this one.
pub const MAX_PAGES: u32 = 400;

pub const STARGAZERS_PER_PAGE: i64 = 100;

/// How many pages one repository may cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBudget {
    Unbounded,
    Limited(NonZeroU32),
}

impl PageBudget {
    /// The main repository is always fetched in full.
    pub fn for_repository(path: &str, main_repository: &str, limit: NonZeroU32) -> Self {
        if path.eq_ignore_ascii_case(main_repository) {
            PageBudget::Unbounded
        } else {
            PageBudget::Limited(limit)
        }
    }
}

/// Pages upstream would return for `star_count` stars, capped at
/// [`MAX_PAGES`].
pub fn expected_pages(star_count: i64) -> u32 {
    let pages = star_count.max(0) / STARGAZERS_PER_PAGE + 1;
    u32::try_from(pages).unwrap_or(MAX_PAGES).min(MAX_PAGES)
}

/// Page numbers to fetch, in fetch order.
///
/// Within budget every page `1..=expected` is listed. Otherwise exactly
/// `budget` pages are listed: `expected` first, then for `i` from
/// `budget - 1` down to 2 the previous page minus `round(previous / i)`,
/// then page 1.
pub fn plan_pages(expected: u32, budget: PageBudget) -> Vec<u32> {
    let limit = match budget {
        PageBudget::Limited(limit) if expected > limit.get() => limit.get(),
        _ => return (1..=expected).collect(),
    };

    let mut pages = Vec::with_capacity(limit as usize);
    let mut page = expected;
    pages.push(page);
    for i in (1..limit).rev() {
        if i == 1 {
            page = 1;
        } else {
            let step = (f64::from(page) / f64::from(i)).round() as u32;
            page = page.saturating_sub(step).max(1);
        }
        pages.push(page);
    }
    pages
}

/// Outcome of one sampling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReport {
    pub expected_pages: u32,
    pub pages: Vec<u32>,
    pub records: usize,
}

/// Fetch stargazers for `snapshot` and replace its stored records.
///
/// A limited budget fetches the planned pages one by one. An unbounded
/// budget takes the full listing and splits it back into pages, the last
/// non-empty one flagged as the last page. Nothing is written unless every
/// fetch succeeds.
pub async fn refresh_stargazers(
    github: &dyn GitHubApi,
    store: &dyn SnapshotStore,
    snapshot: &RepositorySnapshot,
    budget: PageBudget,
) -> Result<SampleReport> {
    let expected = expected_pages(snapshot.star_count);

    let (pages, records) = match budget {
        PageBudget::Unbounded => {
            tracing::info!(
                repository = %snapshot.path,
                star_count = snapshot.star_count,
                expected_pages = expected,
                "Listing all stargazers"
            );
            let events = github.list_stargazers(&snapshot.path).await?;
            paginate(snapshot, events)
        }
        PageBudget::Limited(_) => {
            let pages = plan_pages(expected, budget);
            tracing::info!(
                repository = %snapshot.path,
                star_count = snapshot.star_count,
                expected_pages = expected,
                sampled_pages = pages.len(),
                "Sampling stargazers"
            );

            let mut records = Vec::new();
            for &page in &pages {
                let batch = github.stargazers_page(&snapshot.path, page).await?;
                tracing::debug!(repository = %snapshot.path, page, count = batch.len(), "Fetched stargazer page");
                records.extend(
                    batch
                        .into_iter()
                        .map(|s| record(snapshot, page, page == expected, s)),
                );
            }
            (pages, records)
        }
    };

    store.replace_stargazers(&snapshot.path, &records).await?;

    Ok(SampleReport {
        expected_pages: expected,
        pages,
        records: records.len(),
    })
}

fn record(
    snapshot: &RepositorySnapshot,
    page: u32,
    is_last_page: bool,
    stargazer: Stargazer,
) -> StargazerRecord {
    StargazerRecord {
        repository_path: snapshot.path.clone(),
        page,
        is_last_page,
        login: stargazer.user.login,
        starred_at: stargazer.starred_at,
    }
}

/// Split a full listing into upstream pages, at most [`MAX_PAGES`].
fn paginate(
    snapshot: &RepositorySnapshot,
    events: Vec<Stargazer>,
) -> (Vec<u32>, Vec<StargazerRecord>) {
    let page_count = events.len().div_ceil(PAGE_SIZE).min(MAX_PAGES as usize);
    let pages: Vec<u32> = (1..=page_count as u32).collect();
    let last = pages.last().copied().unwrap_or(0);

    let records = events
        .into_iter()
        .take(page_count * PAGE_SIZE)
        .enumerate()
        .map(|(i, s)| {
            let page = (i / PAGE_SIZE) as u32 + 1;
            record(snapshot, page, page == last, s)
        })
        .collect();
    (pages, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limited(n: u32) -> PageBudget {
        PageBudget::Limited(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn test_expected_pages() {
        assert_eq!(expected_pages(0), 1);
        assert_eq!(expected_pages(99), 1);
        assert_eq!(expected_pages(150), 2);
        assert_eq!(expected_pages(5000), 51);
        assert_eq!(expected_pages(39_999), 400);
        assert_eq!(expected_pages(1_000_000), 400);
    }

    #[test]
    fn test_within_budget_fetches_every_page() {
        assert_eq!(plan_pages(2, limited(10)), vec![1, 2]);
        assert_eq!(plan_pages(10, limited(10)), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_unbounded_fetches_every_page() {
        assert_eq!(plan_pages(51, PageBudget::Unbounded).len(), 51);
    }

    #[test]
    fn test_geometric_plan_for_five_thousand_stars() {
        assert_eq!(
            plan_pages(51, limited(10)),
            vec![51, 45, 39, 33, 27, 22, 16, 11, 5, 1]
        );
    }

    #[test]
    fn test_geometric_plan_properties() {
        for expected in [11, 57, 200, 400] {
            for budget in [2, 3, 5, 10] {
                let pages = plan_pages(expected, limited(budget));
                assert_eq!(pages.len(), budget as usize);
                assert_eq!(pages[0], expected);
                assert_eq!(*pages.last().unwrap(), 1);
                assert!(pages.iter().all(|&p| (1..=expected).contains(&p)));
                assert_eq!(pages.iter().filter(|&&p| p == expected).count(), 1);
            }
        }
    }

    #[test]
    fn test_budget_of_one_fetches_only_last_page() {
        assert_eq!(plan_pages(7, limited(1)), vec![7]);
    }

    #[test]
    fn test_main_repository_budget_is_unbounded() {
        let limit = NonZeroU32::new(10).unwrap();
        assert_eq!(
            PageBudget::for_repository("Richardlt/Stargazer", "richardlt/stargazer", limit),
            PageBudget::Unbounded
        );
        assert_eq!(
            PageBudget::for_repository("other/repo", "richardlt/stargazer", limit),
            PageBudget::Limited(limit)
        );
    }

    fn snapshot(stars: i64) -> RepositorySnapshot {
        RepositorySnapshot::from_upstream(
            "a/b",
            crate::testing::repository("a/b", stars, github_client::OwnerKind::User),
        )
    }

    #[test]
    fn test_paginate_flags_last_non_empty_page() {
        let start = chrono::Utc::now();
        let events = crate::testing::stargazers(250, start, chrono::Duration::minutes(1));
        let (pages, records) = paginate(&snapshot(250), events);

        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(records.len(), 250);
        assert_eq!(records[99].page, 1);
        assert_eq!(records[100].page, 2);
        let last: Vec<_> = records.iter().filter(|r| r.is_last_page).collect();
        assert_eq!(last.len(), 50);
        assert!(last.iter().all(|r| r.page == 3));
    }

    #[test]
    fn test_paginate_empty_listing() {
        let (pages, records) = paginate(&snapshot(0), Vec::new());
        assert!(pages.is_empty());
        assert!(records.is_empty());
    }
}
